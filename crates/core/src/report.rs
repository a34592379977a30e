//! Text renderings of registry queries.
//!
//! These are the formats exchanged with external collaborators (the command-file runner and
//! the CLI). Each renderer is a pure function of registry state, so rendering twice without an
//! intervening ingestion produces identical output.

use crate::constants::{
    ANALYSIS_REPORT_HEADER, DISTRIBUTION_REPORT_HEADER, PRIORITY_REPORT_HEADER,
};
use crate::ingest::IngestSummary;
use crate::patient::Priority;
use crate::referral::Referral;
use crate::registry::{Lookup, Registry};
use crate::{RegistryError, RegistryResult};
use registry_types::PatientId;
use serde::Serialize;
use std::fmt;

/// Grouping and referral network as returned by `export_analysis`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub diagnoses: Vec<DiagnosisSection>,
    pub referrals: Vec<ReferralSection>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosisSection {
    pub diagnosis: String,
    pub members: Vec<MemberEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MemberEntry {
    pub id: PatientId,
    pub priority: Priority,
}

/// Outgoing referrals of one source patient, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReferralSection {
    pub source: PatientId,
    pub referrals: Vec<Referral>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> RegistryResult<String> {
        serde_json::to_string_pretty(self).map_err(RegistryError::Serialization)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{ANALYSIS_REPORT_HEADER}")?;
        writeln!(f)?;

        for section in &self.diagnoses {
            writeln!(f, "Disease: {}", section.diagnosis)?;
            for member in &section.members {
                writeln!(
                    f,
                    "  Patient ID: {} | Priority: {}",
                    member.id, member.priority
                )?;
            }
            writeln!(f)?;
        }

        for section in &self.referrals {
            writeln!(f, "Patient {} referrals:", section.source)?;
            for referral in &section.referrals {
                writeln!(f, "  -> {} ({})", referral.target, referral.reason)?;
            }
        }

        Ok(())
    }
}

/// One line per patient in ascending identifier order.
pub fn render_ordered(registry: &Registry, delimiter: char) -> String {
    let mut out = String::new();
    for record in registry.export_ordered() {
        out.push_str(&record.to_line(delimiter));
        out.push('\n');
    }
    out
}

/// Header followed by `id | name | diagnosis` for each high-priority patient.
pub fn render_high_priority(registry: &Registry) -> String {
    let mut out = format!("{PRIORITY_REPORT_HEADER}\n\n");
    for record in registry.high_priority() {
        out.push_str(&format!(
            "{} | {} | {}\n",
            record.id(),
            record.name(),
            record.diagnosis()
        ));
    }
    out
}

/// `FOUND` with the record and any similar patients, or `NOT_FOUND`.
pub fn render_lookup(lookup: &Lookup<'_>, delimiter: char) -> String {
    match lookup {
        Lookup::NotFound => "NOT_FOUND\n".to_string(),
        Lookup::Found { record, similar } => {
            let mut out = format!("FOUND\n{}\n", record.to_line(delimiter));
            if !similar.is_empty() {
                out.push_str("\nSimilar Patients:\n");
                for other in similar {
                    out.push_str(&format!("{} - {}\n", other.id(), other.name()));
                }
            }
            out
        }
    }
}

pub fn render_distribution(registry: &Registry) -> String {
    let mut out = format!("{DISTRIBUTION_REPORT_HEADER}\n");
    for (diagnosis, count) in registry.diagnosis_distribution() {
        out.push_str(&format!("  • {diagnosis}: {count} patients\n"));
    }
    out
}

/// Ingestion outcome as written to the patient output file.
pub fn render_ingest_summary(summary: &IngestSummary) -> String {
    let mut out = format!(
        "SUCCESS: Patients added\nTotal Records: {}\n",
        summary.total_records
    );
    if !summary.rejected.is_empty() {
        out.push_str(&format!("Rejected Lines: {}\n", summary.rejected.len()));
        for error in &summary.rejected {
            out.push_str(&format!("  {error}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LineError, ParseErrorKind};
    use crate::patient::record;

    fn scenario() -> Registry {
        let mut registry = Registry::new();
        registry.ingest(record(1, "A", 70, "Flu", "555"));
        registry.ingest(record(2, "B", 30, "Emergency", "556"));
        registry.ingest(record(3, "C", 40, "Flu", "557"));
        registry
    }

    #[test]
    fn test_render_ordered() {
        let mut registry = Registry::new();
        registry.ingest(record(3, "C", 40, "Flu", "557"));
        registry.ingest(record(1, "A", 70, "Flu", "555"));
        registry.ingest(record(2, "B", 30, "Emergency", "556"));

        let first = render_ordered(&registry, ',');
        assert_eq!(first, "1,A,70,Flu,555\n2,B,30,Emergency,556\n3,C,40,Flu,557\n");
        assert_eq!(first, render_ordered(&registry, ','));
    }

    #[test]
    fn test_render_high_priority() {
        let text = render_high_priority(&scenario());
        assert_eq!(
            text,
            "=== HIGH PRIORITY PATIENTS ===\n\n1 | A | Flu\n2 | B | Emergency\n"
        );
    }

    #[test]
    fn test_render_lookup_found_with_similar() {
        let registry = scenario();
        let text = render_lookup(&registry.lookup(PatientId::new(1)), ',');
        assert_eq!(text, "FOUND\n1,A,70,Flu,555\n\nSimilar Patients:\n3 - C\n");
    }

    #[test]
    fn test_render_lookup_found_without_similar() {
        let registry = scenario();
        let text = render_lookup(&registry.lookup(PatientId::new(2)), ',');
        assert_eq!(text, "FOUND\n2,B,30,Emergency,556\n");
    }

    #[test]
    fn test_render_lookup_not_found() {
        let registry = scenario();
        let text = render_lookup(&registry.lookup(PatientId::new(99)), ',');
        assert_eq!(text, "NOT_FOUND\n");
    }

    #[test]
    fn test_render_analysis_scenario() {
        let mut registry = scenario();
        registry.add_referral(PatientId::new(1), PatientId::new(2), "Specialist");
        registry.add_referral(PatientId::new(2), PatientId::new(3), "Follow-up");

        let text = registry.export_analysis().to_string();
        let expected = "\
=== PATIENT REFERRAL ANALYSIS ===

Disease: Emergency
  Patient ID: 2 | Priority: 1

Disease: Flu
  Patient ID: 1 | Priority: 1
  Patient ID: 3 | Priority: 2

Patient 1 referrals:
  -> 2 (Specialist)
Patient 2 referrals:
  -> 3 (Follow-up)
";
        assert_eq!(text, expected);
        assert!(!text.contains("Patient 3 referrals"));
    }

    #[test]
    fn test_analysis_json_shape() {
        let mut registry = scenario();
        registry.add_referral(PatientId::new(1), PatientId::new(2), "Specialist");

        let json: serde_json::Value =
            serde_json::from_str(&registry.export_analysis().to_json().unwrap()).unwrap();
        assert_eq!(json["diagnoses"][1]["diagnosis"], "Flu");
        assert_eq!(json["diagnoses"][1]["members"][1]["priority"], "Normal");
        assert_eq!(json["referrals"][0]["source"], 1);
        assert_eq!(json["referrals"][0]["referrals"][0]["reason"], "Specialist");
    }

    #[test]
    fn test_render_distribution() {
        let text = render_distribution(&scenario());
        assert_eq!(
            text,
            "Disease Distribution:\n  • Emergency: 1 patients\n  • Flu: 2 patients\n"
        );
    }

    #[test]
    fn test_render_ingest_summary_lists_rejections() {
        let summary = IngestSummary {
            accepted: 2,
            replaced: 0,
            total_records: 2,
            rejected: vec![LineError {
                line: 3,
                kind: ParseErrorKind::MissingField("age"),
            }],
        };
        assert_eq!(
            render_ingest_summary(&summary),
            "SUCCESS: Patients added\nTotal Records: 2\nRejected Lines: 1\n\
             \x20 line 3: missing field `age`\n"
        );
    }
}
