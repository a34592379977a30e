//! Identifier-keyed record storage.

use crate::patient::PatientRecord;
use registry_types::PatientId;
use std::collections::HashMap;

/// Authoritative copy of every patient record, keyed by identifier.
///
/// The store only grows: there is no delete, and a `put` with an existing identifier
/// replaces the earlier record.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: HashMap<PatientId, PatientRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites by identifier, returning the record that was replaced.
    pub fn put(&mut self, record: PatientRecord) -> Option<PatientRecord> {
        self.records.insert(record.id(), record)
    }

    pub fn get(&self, id: PatientId) -> Option<&PatientRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: PatientId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of distinct identifiers stored.
    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::record;

    #[test]
    fn test_get_missing_returns_none() {
        let store = RecordStore::new();
        assert!(store.get(PatientId::new(1)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_then_get() {
        let mut store = RecordStore::new();
        assert!(store.put(record(1, "A", 70, "Flu", "555")).is_none());

        let stored = store.get(PatientId::new(1)).unwrap();
        assert_eq!(stored.name(), "A");
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_put_duplicate_overwrites() {
        let mut store = RecordStore::new();
        store.put(record(1, "A", 70, "Flu", "555"));
        let previous = store.put(record(1, "A2", 20, "Cold", "999")).unwrap();

        assert_eq!(previous.name(), "A");
        assert_eq!(store.get(PatientId::new(1)).unwrap().name(), "A2");
        assert_eq!(store.size(), 1);
    }
}
