//! Input validation utilities.
//!
//! Front-desk rules applied to ingested fields when [`ValidationMode::Strict`] is configured.
//! Lenient ingestion only requires the fields to parse.
//!
//! [`ValidationMode::Strict`]: crate::config::ValidationMode::Strict

use crate::error::ParseErrorKind;

/// Youngest accepted age, inclusive.
pub const MIN_AGE: u32 = 1;
/// Oldest accepted age, inclusive.
pub const MAX_AGE: u32 = 119;
/// Contact numbers are national mobile numbers without separators.
pub const CONTACT_DIGITS: usize = 11;

/// Names may contain only ASCII letters and whitespace.
pub fn validate_name(name: &str) -> Result<(), ParseErrorKind> {
    let ok = name.chars().all(|c| c.is_ascii_alphabetic() || c.is_whitespace());
    if !ok {
        return Err(ParseErrorKind::Validation {
            field: "name",
            reason: "only letters and whitespace are allowed",
        });
    }
    Ok(())
}

pub fn validate_age(age: u32) -> Result<(), ParseErrorKind> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ParseErrorKind::Validation {
            field: "age",
            reason: "must be between 1 and 119",
        });
    }
    Ok(())
}

pub fn validate_contact(contact: &str) -> Result<(), ParseErrorKind> {
    if contact.len() != CONTACT_DIGITS || !contact.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::Validation {
            field: "contact",
            reason: "must be exactly 11 digits",
        });
    }
    Ok(())
}
