//! Patient records and the priority class derived from them.

use crate::constants::{HIGH_PRIORITY_AGE_THRESHOLD, URGENT_DIAGNOSES};
use registry_types::{NonEmptyText, PatientId};
use serde::Serialize;
use std::fmt;

/// Two-valued urgency flag computed once at ingestion.
///
/// The numeric value (`High` = 1, `Normal` = 2) is what reports print, and the derived
/// ordering follows it: `High < Normal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Priority {
    High = 1,
    Normal = 2,
}

impl Priority {
    /// High when the patient is over the age threshold or the diagnosis is urgent.
    pub fn derive(age: u32, diagnosis: &str) -> Self {
        if age > HIGH_PRIORITY_AGE_THRESHOLD || URGENT_DIAGNOSES.contains(&diagnosis) {
            Priority::High
        } else {
            Priority::Normal
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A single patient as held by the registry.
///
/// Fields are private so the priority can only come from [`Priority::derive`]; a record
/// never changes after construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    id: PatientId,
    name: NonEmptyText,
    age: u32,
    diagnosis: NonEmptyText,
    contact: String,
    priority: Priority,
}

impl PatientRecord {
    pub fn new(
        id: PatientId,
        name: NonEmptyText,
        age: u32,
        diagnosis: NonEmptyText,
        contact: impl Into<String>,
    ) -> Self {
        let priority = Priority::derive(age, diagnosis.as_str());
        Self {
            id,
            name,
            age,
            diagnosis,
            contact: contact.into(),
            priority,
        }
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn diagnosis(&self) -> &str {
        self.diagnosis.as_str()
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Priority::High
    }

    /// The five input fields joined by `delimiter`, without the derived priority.
    pub fn to_line(&self, delimiter: char) -> String {
        format!(
            "{id}{d}{name}{d}{age}{d}{diagnosis}{d}{contact}",
            id = self.id,
            name = self.name,
            age = self.age,
            diagnosis = self.diagnosis,
            contact = self.contact,
            d = delimiter,
        )
    }
}

/// Builds a record from plain values in tests.
#[cfg(test)]
pub(crate) fn record(
    id: i64,
    name: &str,
    age: u32,
    diagnosis: &str,
    contact: &str,
) -> PatientRecord {
    PatientRecord::new(
        PatientId::new(id),
        NonEmptyText::new(name).unwrap(),
        age,
        NonEmptyText::new(diagnosis).unwrap(),
        contact,
    )
}
