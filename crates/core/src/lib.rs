//! # Registry Core
//!
//! In-memory patient registry with three access paths over the same records:
//! - constant-time lookup by identifier ([`store::RecordStore`])
//! - identifier-ordered export from an AVL tree ([`sorted_index::SortedIndex`])
//! - diagnosis grouping and referral network ([`referral::ReferralGraph`])
//!
//! [`Registry`] owns all three and is the only type callers need to mutate. Ingestion of
//! delimited files, text reports and command-file dispatch are layered on top.
//!
//! **No process concerns**: environment variables and logging setup belong in the binaries.

pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod ingest;
pub mod patient;
pub mod referral;
pub mod registry;
pub mod report;
pub mod sorted_index;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, ParsePolicy, ValidationMode};
pub use error::{LineError, ParseErrorKind, RegistryError, RegistryResult};
pub use patient::{PatientRecord, Priority};
pub use registry::{Lookup, Registry, Upsert};
pub use registry_types::{NonEmptyText, PatientId};
