//! The registry: one owner for the record store, the sorted index and the referral graph.
//!
//! Ingestion is the only path that touches all three structures, and it does so inside a single
//! `&mut self` call, so callers never observe a record that is stored but not yet indexed or
//! grouped.
//!
//! Re-ingesting an identifier is a full upsert: the store overwrites, the index swaps the record
//! held by the existing node, and the identifier moves to its new diagnosis bucket if the
//! diagnosis changed.

use crate::patient::PatientRecord;
use crate::referral::ReferralGraph;
use crate::report::AnalysisReport;
use crate::sorted_index::{IndexInsert, InOrder, SortedIndex};
use crate::store::RecordStore;
use registry_types::PatientId;

/// Whether an ingested record was new or replaced an existing identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Outcome of a point lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    Found {
        record: &'a PatientRecord,
        similar: Vec<&'a PatientRecord>,
    },
    NotFound,
}

#[derive(Debug, Default)]
pub struct Registry {
    store: RecordStore,
    index: SortedIndex,
    graph: ReferralGraph,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `record` into all three structures.
    pub fn ingest(&mut self, record: PatientRecord) -> Upsert {
        let id = record.id();
        let diagnosis = record.diagnosis().to_string();

        let upsert = match self.store.put(record.clone()) {
            None => {
                self.graph.register_diagnosis(id, &diagnosis);
                Upsert::Inserted
            }
            Some(previous) => {
                if previous.diagnosis() != diagnosis {
                    tracing::debug!(
                        "patient {} moved from {:?} to {:?}",
                        id,
                        previous.diagnosis(),
                        diagnosis
                    );
                }
                self.graph
                    .move_diagnosis(id, previous.diagnosis(), &diagnosis);
                Upsert::Replaced
            }
        };

        let indexed = self.index.insert(record);
        debug_assert_eq!(
            indexed == IndexInsert::Replaced,
            upsert == Upsert::Replaced,
            "record store and sorted index disagree about patient {id}"
        );

        upsert
    }

    /// Adds a directed referral; unknown identifiers are accepted as-is.
    pub fn add_referral(&mut self, from: PatientId, to: PatientId, reason: impl Into<String>) {
        self.graph.add_referral(from, to, reason);
    }

    pub fn get(&self, id: PatientId) -> Option<&PatientRecord> {
        self.store.get(id)
    }

    pub fn size(&self) -> usize {
        self.store.size()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Point lookup together with the patients sharing the same diagnosis.
    pub fn lookup(&self, id: PatientId) -> Lookup<'_> {
        let Some(record) = self.store.get(id) else {
            return Lookup::NotFound;
        };

        let similar = self
            .similar_patients(id)
            .into_iter()
            .filter_map(|other| self.store.get(other))
            .collect();

        Lookup::Found { record, similar }
    }

    pub fn export_ordered(&self) -> InOrder<'_> {
        self.index.export_ordered()
    }

    /// High-priority patients in ascending identifier order.
    pub fn high_priority(&self) -> impl Iterator<Item = &PatientRecord> + '_ {
        self.export_ordered().filter(|record| record.is_high_priority())
    }

    pub fn similar_patients(&self, id: PatientId) -> Vec<PatientId> {
        self.graph.similar_patients(id, &self.store)
    }

    pub fn highest_priority(&self, diagnosis: &str) -> Option<PatientId> {
        self.graph.highest_priority(diagnosis, &self.store)
    }

    pub fn diagnosis_distribution(&self) -> Vec<(String, usize)> {
        self.graph.diagnosis_distribution()
    }

    pub fn export_analysis(&self) -> AnalysisReport {
        self.graph.export_analysis(&self.store)
    }

    pub fn index(&self) -> &SortedIndex {
        &self.index
    }

    pub fn graph(&self) -> &ReferralGraph {
        &self.graph
    }
}
