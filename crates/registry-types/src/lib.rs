//! Shared primitive types for the patient registry.
//!
//! These types carry their own validation so that the registry core never has to re-check
//! identifiers or required labels once a value has been constructed.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing a patient identifier.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IdError {
    #[error("patient identifier is not an integer: {0:?}")]
    NotAnInteger(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so the stored
/// value never starts or ends with whitespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Arguments
    ///
    /// * `input` - Text to validate; surrounding whitespace is removed.
    ///
    /// # Returns
    ///
    /// The trimmed text wrapped as `NonEmptyText`.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Integer identifier naming exactly one patient record.
///
/// Ordering is numeric, which is the order used by the sorted export and by referral sections
/// in the analysis report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
    /// Wraps a raw identifier.
    ///
    /// # Arguments
    ///
    /// * `value` - Any `i64`; negative identifiers are valid.
    ///
    /// # Returns
    ///
    /// The identifier as a `PatientId`.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for PatientId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = IdError;

    /// Parses a decimal identifier, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| IdError::NotAnInteger(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Flu \t").unwrap();
        assert_eq!(text.as_str(), "Flu");
        assert_eq!(text.to_string(), "Flu");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!("".parse::<NonEmptyText>(), Err(TextError::Empty));
    }

    #[test]
    fn test_non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }

    #[test]
    fn test_patient_id_parses_with_whitespace() {
        let id: PatientId = " 42 ".parse().unwrap();
        assert_eq!(id, PatientId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_patient_id_rejects_non_integer() {
        assert_eq!(
            "4x".parse::<PatientId>(),
            Err(IdError::NotAnInteger("4x".into()))
        );
        assert!("".parse::<PatientId>().is_err());
    }

    #[test]
    fn test_patient_id_orders_numerically() {
        let mut ids = vec![PatientId::new(10), PatientId::new(-3), PatientId::new(2)];
        ids.sort();
        assert_eq!(
            ids,
            vec![PatientId::new(-3), PatientId::new(2), PatientId::new(10)]
        );
    }

    #[test]
    fn test_patient_id_serializes_as_number() {
        let json = serde_json::to_string(&PatientId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
