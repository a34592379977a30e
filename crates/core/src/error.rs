/// Why a single ingestion or referral line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not an integer: {value:?}")]
    InvalidInteger { field: &'static str, value: String },
    #[error("field `{0}` cannot be empty")]
    EmptyField(&'static str),
    #[error("field `{field}` failed validation: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// A rejected input line together with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct LineError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("parse error at {0}")]
    Parse(#[from] LineError),
    #[error("invalid patient record: {0}")]
    InvalidRecord(#[from] ParseErrorKind),
    #[error("failed to read input file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write output file: {0}")]
    FileWrite(std::io::Error),
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
    #[error("failed to serialize report: {0}")]
    Serialization(serde_json::Error),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
