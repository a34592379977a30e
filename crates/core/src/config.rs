//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the ingestion and
//! command layers. Nothing in this crate reads process-wide environment variables; binaries
//! read them and hand the raw values to the `*_from_env_value` helpers below.

use crate::constants::{
    ANALYSIS_OUTPUT_FILENAME, COMMAND_FILENAME, DEFAULT_DELIMITER, DISTRIBUTION_OUTPUT_FILENAME,
    PATIENT_INPUT_FILENAME, PATIENT_OUTPUT_FILENAME, PRIORITY_OUTPUT_FILENAME,
    REFERRALS_INPUT_FILENAME, SEARCH_INPUT_FILENAME, SEARCH_OUTPUT_FILENAME,
    SORTED_OUTPUT_FILENAME,
};
use crate::{RegistryError, RegistryResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What ingestion does when a line cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Reject the whole batch; the registry is left exactly as it was.
    #[default]
    AbortBatch,
    /// Reject only the offending line, log it, and keep going.
    SkipLine,
}

impl FromStr for ParsePolicy {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::AbortBatch),
            "skip" => Ok(Self::SkipLine),
            other => Err(RegistryError::InvalidInput(format!(
                "parse policy must be `abort` or `skip`, got {other:?}"
            ))),
        }
    }
}

/// How strictly ingested fields are checked beyond being parseable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Integer id and age, non-empty name and diagnosis.
    #[default]
    Lenient,
    /// Additionally enforces the front-desk rules in [`crate::validation`].
    Strict,
}

impl FromStr for ValidationMode {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(RegistryError::InvalidInput(format!(
                "validation mode must be `lenient` or `strict`, got {other:?}"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    delimiter: char,
    parse_policy: ParsePolicy,
    validation: ValidationMode,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The delimiter must be a single visible, non-alphanumeric character other than `-`, so
    /// that it can never be confused with part of a name or a negative number.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory holding the command, input and output files.
    /// * `delimiter` - Field separator for patient and referral lines.
    /// * `parse_policy` - Whether a malformed line rejects the batch or is skipped.
    /// * `validation` - Whether strict field rules apply on ingestion.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidInput` if the delimiter is not allowed.
    pub fn new(
        data_dir: PathBuf,
        delimiter: char,
        parse_policy: ParsePolicy,
        validation: ValidationMode,
    ) -> RegistryResult<Self> {
        if delimiter.is_alphanumeric() || delimiter.is_whitespace() || delimiter == '-' {
            return Err(RegistryError::InvalidInput(format!(
                "delimiter {delimiter:?} is not allowed"
            )));
        }

        Ok(Self {
            data_dir,
            delimiter,
            parse_policy,
            validation,
        })
    }

    /// Configuration with the default delimiter, abort-on-error parsing and lenient validation.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            delimiter: DEFAULT_DELIMITER,
            parse_policy: ParsePolicy::default(),
            validation: ValidationMode::default(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn parse_policy(&self) -> ParsePolicy {
        self.parse_policy
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    pub fn command_path(&self) -> PathBuf {
        self.data_dir.join(COMMAND_FILENAME)
    }

    pub fn patient_input_path(&self) -> PathBuf {
        self.data_dir.join(PATIENT_INPUT_FILENAME)
    }

    pub fn patient_output_path(&self) -> PathBuf {
        self.data_dir.join(PATIENT_OUTPUT_FILENAME)
    }

    pub fn search_input_path(&self) -> PathBuf {
        self.data_dir.join(SEARCH_INPUT_FILENAME)
    }

    pub fn search_output_path(&self) -> PathBuf {
        self.data_dir.join(SEARCH_OUTPUT_FILENAME)
    }

    pub fn sorted_output_path(&self) -> PathBuf {
        self.data_dir.join(SORTED_OUTPUT_FILENAME)
    }

    pub fn priority_output_path(&self) -> PathBuf {
        self.data_dir.join(PRIORITY_OUTPUT_FILENAME)
    }

    pub fn referrals_input_path(&self) -> PathBuf {
        self.data_dir.join(REFERRALS_INPUT_FILENAME)
    }

    pub fn analysis_output_path(&self) -> PathBuf {
        self.data_dir.join(ANALYSIS_OUTPUT_FILENAME)
    }

    pub fn distribution_output_path(&self) -> PathBuf {
        self.data_dir.join(DISTRIBUTION_OUTPUT_FILENAME)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the field delimiter from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default delimiter.
pub fn delimiter_from_env_value(value: Option<String>) -> RegistryResult<char> {
    let Some(value) = non_blank(value) else {
        return Ok(DEFAULT_DELIMITER);
    };

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(RegistryError::InvalidInput(format!(
            "delimiter must be a single character, got {value:?}"
        ))),
    }
}

/// Parse the parse-failure policy from an optional string value, defaulting to abort.
pub fn parse_policy_from_env_value(value: Option<String>) -> RegistryResult<ParsePolicy> {
    Ok(non_blank(value)
        .map(|v| v.parse::<ParsePolicy>())
        .transpose()?
        .unwrap_or_default())
}

/// Parse the validation mode from an optional string value, defaulting to lenient.
pub fn validation_mode_from_env_value(value: Option<String>) -> RegistryResult<ValidationMode> {
    Ok(non_blank(value)
        .map(|v| v.parse::<ValidationMode>())
        .transpose()?
        .unwrap_or_default())
}
