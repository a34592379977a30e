//! Ingestion of delimited patient and referral files.
//!
//! Patient lines carry `id, name, age, diagnosis, contact` in that order; the contact is
//! everything after the fourth delimiter, so it may itself contain the delimiter. Referral
//! lines carry `from, to, reason`. Blank lines are ignored.
//!
//! A batch is parsed completely before anything is written to the registry. Under
//! [`ParsePolicy::AbortBatch`] the first bad line fails the whole call and the registry is left
//! untouched; under [`ParsePolicy::SkipLine`] bad lines are logged, reported in the summary and
//! skipped.

use crate::config::{CoreConfig, ParsePolicy, ValidationMode};
use crate::error::{LineError, ParseErrorKind};
use crate::patient::PatientRecord;
use crate::registry::{Registry, Upsert};
use crate::validation::{validate_age, validate_contact, validate_name};
use crate::{RegistryError, RegistryResult};
use registry_types::{NonEmptyText, PatientId};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

const PATIENT_FIELDS: [&str; 5] = ["id", "name", "age", "diagnosis", "contact"];

/// What a patient ingestion run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Records written to the registry, including replacements.
    pub accepted: usize,
    /// Accepted records whose identifier was already registered.
    pub replaced: usize,
    /// Lines skipped under [`ParsePolicy::SkipLine`].
    pub rejected: Vec<LineError>,
    /// Distinct patients in the registry after the run.
    pub total_records: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferralSummary {
    pub added: usize,
    pub rejected: Vec<LineError>,
}

fn required<'a>(field: Option<&'a str>, name: &'static str) -> Result<&'a str, ParseErrorKind> {
    field.map(str::trim).ok_or(ParseErrorKind::MissingField(name))
}

fn parse_id(value: &str, field: &'static str) -> Result<PatientId, ParseErrorKind> {
    value
        .parse::<PatientId>()
        .map_err(|_| ParseErrorKind::InvalidInteger {
            field,
            value: value.to_string(),
        })
}

fn non_empty(value: &str, field: &'static str) -> Result<NonEmptyText, ParseErrorKind> {
    NonEmptyText::new(value).map_err(|_| ParseErrorKind::EmptyField(field))
}

/// Parses one patient line and derives its priority.
pub fn parse_patient_line(
    line: &str,
    delimiter: char,
    validation: ValidationMode,
) -> Result<PatientRecord, ParseErrorKind> {
    let mut fields = line.splitn(5, delimiter);

    let id = parse_id(required(fields.next(), "id")?, "id")?;
    let name = non_empty(required(fields.next(), "name")?, "name")?;
    let age_text = required(fields.next(), "age")?;
    let age = age_text
        .parse::<u32>()
        .map_err(|_| ParseErrorKind::InvalidInteger {
            field: "age",
            value: age_text.to_string(),
        })?;
    let diagnosis = non_empty(required(fields.next(), "diagnosis")?, "diagnosis")?;
    // A missing contact field reads as an empty contact.
    let contact = fields.next().map(str::trim).unwrap_or_default();

    if validation == ValidationMode::Strict {
        validate_name(name.as_str())?;
        validate_age(age)?;
        validate_contact(contact)?;
    }

    Ok(PatientRecord::new(id, name, age, diagnosis, contact))
}

/// Parses one `from, to, reason` referral line.
pub fn parse_referral_line(
    line: &str,
    delimiter: char,
) -> Result<(PatientId, PatientId, String), ParseErrorKind> {
    let mut fields = line.splitn(3, delimiter);

    let from = parse_id(required(fields.next(), "from")?, "from")?;
    let to = parse_id(required(fields.next(), "to")?, "to")?;
    let reason = non_empty(required(fields.next(), "reason")?, "reason")?;

    Ok((from, to, reason.into_inner()))
}

/// Parses every non-blank line, applying `policy` to failures.
fn parse_batch<T>(
    reader: impl BufRead,
    policy: ParsePolicy,
    parse: impl Fn(&str) -> Result<T, ParseErrorKind>,
) -> RegistryResult<(Vec<T>, Vec<LineError>)> {
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();

    for (idx, raw) in reader.split(b'\n').enumerate() {
        let mut raw = raw.map_err(RegistryError::FileRead)?;
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        let outcome = String::from_utf8(raw)
            .map_err(|_| ParseErrorKind::InvalidUtf8)
            .and_then(|line| {
                if line.trim().is_empty() {
                    Ok(None)
                } else {
                    parse(&line).map(Some)
                }
            });

        match outcome {
            Ok(None) => {}
            Ok(Some(item)) => parsed.push(item),
            Err(kind) => {
                let error = LineError {
                    line: idx + 1,
                    kind,
                };
                match policy {
                    ParsePolicy::AbortBatch => return Err(error.into()),
                    ParsePolicy::SkipLine => {
                        tracing::warn!("skipping {}", error);
                        rejected.push(error);
                    }
                }
            }
        }
    }

    Ok((parsed, rejected))
}

fn open(path: &Path) -> RegistryResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(RegistryError::FileRead)
}

/// Ingests patient lines from `reader` into `registry`.
pub fn ingest_reader(
    registry: &mut Registry,
    reader: impl BufRead,
    cfg: &CoreConfig,
) -> RegistryResult<IngestSummary> {
    let delimiter = cfg.delimiter();
    let validation = cfg.validation();
    let (records, rejected) = parse_batch(reader, cfg.parse_policy(), |line| {
        parse_patient_line(line, delimiter, validation)
    })?;

    let mut summary = IngestSummary {
        rejected,
        ..IngestSummary::default()
    };
    for record in records {
        if registry.ingest(record) == Upsert::Replaced {
            summary.replaced += 1;
        }
        summary.accepted += 1;
    }
    summary.total_records = registry.size();

    tracing::info!(
        "ingested {} patients ({} replaced, {} rejected), {} on record",
        summary.accepted,
        summary.replaced,
        summary.rejected.len(),
        summary.total_records
    );

    Ok(summary)
}

pub fn ingest_file(
    registry: &mut Registry,
    path: &Path,
    cfg: &CoreConfig,
) -> RegistryResult<IngestSummary> {
    tracing::debug!("reading patients from {}", path.display());
    ingest_reader(registry, open(path)?, cfg)
}

/// Validates a single new patient and appends it to a patient file.
///
/// The record is checked under strict validation regardless of the configured mode, so
/// front-desk entries always meet the name, age and contact rules.
///
/// # Arguments
///
/// * `path` - Patient file to append to; created if it does not exist.
/// * `fields` - `id, name, age, diagnosis, contact` as entered.
/// * `cfg` - Supplies the delimiter written between fields.
///
/// # Returns
///
/// The record exactly as the next ingestion of `path` will read it back.
///
/// # Errors
///
/// Returns `RegistryError::InvalidRecord` if a field fails validation or contains the
/// delimiter; nothing is written in that case. File access failures are returned as
/// `FileRead` or `FileWrite`.
pub fn append_patient(
    path: &Path,
    fields: [&str; 5],
    cfg: &CoreConfig,
) -> RegistryResult<PatientRecord> {
    let delimiter = cfg.delimiter();
    for (value, field) in fields.iter().zip(PATIENT_FIELDS) {
        if value.contains(delimiter) {
            return Err(ParseErrorKind::Validation {
                field,
                reason: "must not contain the field delimiter",
            }
            .into());
        }
    }

    let line = fields.join(&delimiter.to_string());
    let record = parse_patient_line(&line, delimiter, ValidationMode::Strict)?;

    let needs_newline = match fs::read(path) {
        Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(RegistryError::FileRead(e)),
    };

    let mut entry = String::new();
    if needs_newline {
        entry.push('\n');
    }
    entry.push_str(&record.to_line(delimiter));
    entry.push('\n');

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(entry.as_bytes()))
        .map_err(RegistryError::FileWrite)?;

    tracing::info!("appended patient {} to {}", record.id(), path.display());
    Ok(record)
}

/// Adds referral edges read from `reader`.
pub fn load_referrals_reader(
    registry: &mut Registry,
    reader: impl BufRead,
    cfg: &CoreConfig,
) -> RegistryResult<ReferralSummary> {
    let delimiter = cfg.delimiter();
    let (edges, rejected) = parse_batch(reader, cfg.parse_policy(), |line| {
        parse_referral_line(line, delimiter)
    })?;

    let added = edges.len();
    for (from, to, reason) in edges {
        registry.add_referral(from, to, reason);
    }
    tracing::info!("added {} referrals ({} rejected)", added, rejected.len());

    Ok(ReferralSummary { added, rejected })
}

pub fn load_referrals_file(
    registry: &mut Registry,
    path: &Path,
    cfg: &CoreConfig,
) -> RegistryResult<ReferralSummary> {
    tracing::debug!("reading referrals from {}", path.display());
    load_referrals_reader(registry, open(path)?, cfg)
}
