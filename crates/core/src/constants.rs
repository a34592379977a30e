//! Constants used throughout the registry core crate.
//!
//! File names for the command-file runner live here alongside the report headers, so the
//! exchange format with external collaborators is defined in one place.

/// Default directory holding command, input and output files.
pub const DEFAULT_DATA_DIR: &str = "data_files";

/// Default field delimiter for ingestion input and ordered export.
pub const DEFAULT_DELIMITER: char = ',';

/// Diagnoses that always rank a patient as high priority.
pub const URGENT_DIAGNOSES: [&str; 2] = ["Emergency", "Critical"];

/// Patients strictly older than this rank as high priority.
pub const HIGH_PRIORITY_AGE_THRESHOLD: u32 = 60;

/// Command token file read by the runner.
pub const COMMAND_FILENAME: &str = "command.txt";
/// Patient records to ingest before every command.
pub const PATIENT_INPUT_FILENAME: &str = "patient_input.txt";
/// Ingestion summary written by `ADD_PATIENT`.
pub const PATIENT_OUTPUT_FILENAME: &str = "patient_output.txt";
/// Identifier to look up for `SEARCH_PATIENT`.
pub const SEARCH_INPUT_FILENAME: &str = "search_input.txt";
pub const SEARCH_OUTPUT_FILENAME: &str = "search_output.txt";
pub const SORTED_OUTPUT_FILENAME: &str = "sorted_patients.txt";
pub const PRIORITY_OUTPUT_FILENAME: &str = "priority_patients.txt";
/// Referral edges (`from,to,reason`) loaded for `ANALYZE_NETWORK`.
pub const REFERRALS_INPUT_FILENAME: &str = "referrals.txt";
pub const ANALYSIS_OUTPUT_FILENAME: &str = "patient_network_analysis.txt";
pub const DISTRIBUTION_OUTPUT_FILENAME: &str = "disease_distribution.txt";

pub const PRIORITY_REPORT_HEADER: &str = "=== HIGH PRIORITY PATIENTS ===";
pub const ANALYSIS_REPORT_HEADER: &str = "=== PATIENT REFERRAL ANALYSIS ===";
pub const DISTRIBUTION_REPORT_HEADER: &str = "Disease Distribution:";
