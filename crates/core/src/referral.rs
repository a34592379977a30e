//! Diagnosis grouping and the directed referral network.
//!
//! Both maps are ordered by key, which fixes the section order of the analysis report:
//! diagnoses by label, referral sources by identifier.

use crate::report::{AnalysisReport, DiagnosisSection, MemberEntry, ReferralSection};
use crate::store::RecordStore;
use registry_types::PatientId;
use serde::Serialize;
use std::collections::BTreeMap;

/// One directed, reason-annotated edge out of a source patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Referral {
    pub target: PatientId,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ReferralGraph {
    buckets: BTreeMap<String, Vec<PatientId>>,
    referrals: BTreeMap<PatientId, Vec<Referral>>,
}

impl ReferralGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` to the bucket for `diagnosis`.
    pub fn register_diagnosis(&mut self, id: PatientId, diagnosis: &str) {
        self.buckets
            .entry(diagnosis.to_string())
            .or_default()
            .push(id);
    }

    /// Moves `id` out of the `from` bucket and appends it to the `to` bucket.
    ///
    /// Buckets left empty are removed so they no longer show up in reports.
    pub fn move_diagnosis(&mut self, id: PatientId, from: &str, to: &str) {
        if from == to {
            return;
        }
        if let Some(bucket) = self.buckets.get_mut(from) {
            bucket.retain(|member| *member != id);
            if bucket.is_empty() {
                self.buckets.remove(from);
            }
        }
        self.register_diagnosis(id, to);
    }

    /// Records a referral. Neither end is checked against the record store.
    pub fn add_referral(&mut self, from: PatientId, to: PatientId, reason: impl Into<String>) {
        self.referrals.entry(from).or_default().push(Referral {
            target: to,
            reason: reason.into(),
        });
    }

    /// Members of a diagnosis bucket in registration order.
    pub fn bucket(&self, diagnosis: &str) -> &[PatientId] {
        self.buckets.get(diagnosis).map(Vec::as_slice).unwrap_or_default()
    }

    /// Outgoing referrals of `from` in the order they were added.
    pub fn referrals_from(&self, from: PatientId) -> &[Referral] {
        self.referrals.get(&from).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every other patient sharing `id`'s diagnosis, in bucket order.
    ///
    /// Unknown identifiers yield an empty list.
    pub fn similar_patients(&self, id: PatientId, store: &RecordStore) -> Vec<PatientId> {
        let Some(record) = store.get(id) else {
            return Vec::new();
        };

        self.bucket(record.diagnosis())
            .iter()
            .copied()
            .filter(|member| *member != id)
            .collect()
    }

    /// The most urgent member of a diagnosis bucket; the earliest registered wins a tie.
    pub fn highest_priority(&self, diagnosis: &str, store: &RecordStore) -> Option<PatientId> {
        self.bucket(diagnosis)
            .iter()
            .filter_map(|id| store.get(*id).map(|record| (*id, record.priority())))
            // `min_by_key` keeps the first of equal minima.
            .min_by_key(|(_, priority)| *priority)
            .map(|(id, _)| id)
    }

    /// Number of patients per diagnosis, in label order.
    pub fn diagnosis_distribution(&self) -> Vec<(String, usize)> {
        self.buckets
            .iter()
            .map(|(diagnosis, members)| (diagnosis.clone(), members.len()))
            .collect()
    }

    /// Snapshot of the grouping and the referral network.
    pub fn export_analysis(&self, store: &RecordStore) -> AnalysisReport {
        let diagnoses = self
            .buckets
            .iter()
            .map(|(diagnosis, members)| DiagnosisSection {
                diagnosis: diagnosis.clone(),
                members: members
                    .iter()
                    .filter_map(|id| store.get(*id))
                    .map(|record| MemberEntry {
                        id: record.id(),
                        priority: record.priority(),
                    })
                    .collect(),
            })
            .collect();

        let referrals = self
            .referrals
            .iter()
            .map(|(source, edges)| ReferralSection {
                source: *source,
                referrals: edges.clone(),
            })
            .collect();

        AnalysisReport {
            diagnoses,
            referrals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::{record, Priority};

    fn id(value: i64) -> PatientId {
        PatientId::new(value)
    }

    fn setup(records: &[(i64, u32, &str)]) -> (ReferralGraph, RecordStore) {
        let mut graph = ReferralGraph::new();
        let mut store = RecordStore::new();
        for (pid, age, diagnosis) in records {
            store.put(record(*pid, "P", *age, diagnosis, "555"));
            graph.register_diagnosis(id(*pid), diagnosis);
        }
        (graph, store)
    }

    #[test]
    fn test_similar_patients_excludes_self() {
        let (graph, store) = setup(&[(1, 70, "Flu"), (2, 30, "Emergency"), (3, 40, "Flu")]);
        assert_eq!(graph.similar_patients(id(1), &store), vec![id(3)]);
        assert_eq!(graph.similar_patients(id(3), &store), vec![id(1)]);
        assert!(graph.similar_patients(id(2), &store).is_empty());
    }

    #[test]
    fn test_similar_patients_unknown_id_is_empty() {
        let (mut graph, store) = setup(&[(1, 70, "Flu")]);
        // Registered in a bucket but never stored: still unknown.
        graph.register_diagnosis(id(9), "Flu");
        assert!(graph.similar_patients(id(9), &store).is_empty());
        assert!(graph.similar_patients(id(42), &store).is_empty());
    }

    #[test]
    fn test_highest_priority_prefers_high() {
        let (graph, store) = setup(&[(3, 40, "Flu"), (1, 70, "Flu")]);
        assert_eq!(graph.highest_priority("Flu", &store), Some(id(1)));
    }

    #[test]
    fn test_highest_priority_tie_goes_to_first_registered() {
        let (graph, store) = setup(&[(5, 20, "Cold"), (2, 30, "Cold"), (9, 40, "Cold")]);
        assert_eq!(graph.highest_priority("Cold", &store), Some(id(5)));

        let (graph, store) = setup(&[(5, 20, "Cold"), (7, 65, "Cold"), (2, 90, "Cold")]);
        assert_eq!(graph.highest_priority("Cold", &store), Some(id(7)));
    }

    #[test]
    fn test_highest_priority_unknown_diagnosis() {
        let (graph, store) = setup(&[(1, 70, "Flu")]);
        assert_eq!(graph.highest_priority("Measles", &store), None);
    }

    #[test]
    fn test_move_diagnosis_drops_empty_bucket() {
        let (mut graph, _) = setup(&[(1, 70, "Flu"), (2, 30, "Cold")]);
        graph.move_diagnosis(id(1), "Flu", "Cold");

        assert!(graph.bucket("Flu").is_empty());
        assert_eq!(graph.bucket("Cold"), &[id(2), id(1)]);
        assert_eq!(graph.diagnosis_distribution(), vec![("Cold".to_string(), 2)]);
    }

    #[test]
    fn test_move_diagnosis_same_label_keeps_position() {
        let (mut graph, _) = setup(&[(1, 70, "Flu"), (2, 30, "Flu")]);
        graph.move_diagnosis(id(1), "Flu", "Flu");
        assert_eq!(graph.bucket("Flu"), &[id(1), id(2)]);
    }

    #[test]
    fn test_referrals_keep_duplicates_in_order() {
        let mut graph = ReferralGraph::new();
        graph.add_referral(id(1), id(2), "Specialist");
        graph.add_referral(id(1), id(2), "Specialist");
        graph.add_referral(id(1), id(4), "Imaging");

        let targets: Vec<_> = graph
            .referrals_from(id(1))
            .iter()
            .map(|r| (r.target.value(), r.reason.as_str()))
            .collect();
        assert_eq!(
            targets,
            vec![(2, "Specialist"), (2, "Specialist"), (4, "Imaging")]
        );
        assert!(graph.referrals_from(id(2)).is_empty());
    }

    #[test]
    fn test_export_analysis_orders_sections() {
        let (mut graph, store) = setup(&[(2, 30, "Flu"), (1, 70, "Asthma"), (3, 40, "Flu")]);
        graph.add_referral(id(2), id(3), "Follow-up");
        graph.add_referral(id(1), id(2), "Specialist");

        let report = graph.export_analysis(&store);

        let labels: Vec<_> = report.diagnoses.iter().map(|d| d.diagnosis.as_str()).collect();
        assert_eq!(labels, vec!["Asthma", "Flu"]);
        let flu: Vec<_> = report.diagnoses[1].members.iter().map(|m| m.id).collect();
        assert_eq!(flu, vec![id(2), id(3)]);
        assert_eq!(report.diagnoses[0].members[0].priority, Priority::High);

        let sources: Vec<_> = report.referrals.iter().map(|s| s.source).collect();
        assert_eq!(sources, vec![id(1), id(2)]);
    }
}
