//! Command-file dispatch.
//!
//! The caller drops a single command token into `command.txt` inside the data directory and
//! reads the matching output file back. Every run starts from an empty registry and ingests
//! `patient_input.txt` first, so queries always see the current input.

use crate::config::CoreConfig;
use crate::ingest::{ingest_file, load_referrals_file};
use crate::registry::Registry;
use crate::report::{
    render_distribution, render_high_priority, render_ingest_summary, render_lookup,
    render_ordered,
};
use crate::{RegistryError, RegistryResult};
use registry_types::PatientId;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    AddPatient,
    SearchPatient,
    GetAllSorted,
    FindHighPriority,
    AnalyzeNetwork,
    DiseaseDistribution,
}

impl Command {
    pub fn token(self) -> &'static str {
        match self {
            Command::AddPatient => "ADD_PATIENT",
            Command::SearchPatient => "SEARCH_PATIENT",
            Command::GetAllSorted => "GET_ALL_SORTED",
            Command::FindHighPriority => "FIND_HIGH_PRIORITY",
            Command::AnalyzeNetwork => "ANALYZE_NETWORK",
            Command::DiseaseDistribution => "DISEASE_DISTRIBUTION",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Command {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ADD_PATIENT" => Ok(Command::AddPatient),
            "SEARCH_PATIENT" => Ok(Command::SearchPatient),
            "GET_ALL_SORTED" => Ok(Command::GetAllSorted),
            "FIND_HIGH_PRIORITY" => Ok(Command::FindHighPriority),
            "ANALYZE_NETWORK" => Ok(Command::AnalyzeNetwork),
            "DISEASE_DISTRIBUTION" => Ok(Command::DiseaseDistribution),
            other => Err(RegistryError::UnknownCommand(other.to_string())),
        }
    }
}

fn write_output(path: &Path, contents: &str) -> RegistryResult<()> {
    fs::write(path, contents).map_err(RegistryError::FileWrite)
}

/// Reads the first line of `command.txt` and runs it.
pub fn run_command_file(cfg: &CoreConfig) -> RegistryResult<Command> {
    let text = fs::read_to_string(cfg.command_path()).map_err(RegistryError::FileRead)?;
    let command: Command = text.lines().next().unwrap_or_default().parse()?;
    execute(command, cfg)?;
    Ok(command)
}

/// Runs `command` against a registry freshly loaded from the data directory.
pub fn execute(command: Command, cfg: &CoreConfig) -> RegistryResult<()> {
    tracing::info!("running {} in {}", command, cfg.data_dir().display());

    let input = cfg.patient_input_path();
    let mut registry = Registry::new();

    if !input.is_file() {
        if command == Command::AddPatient {
            return write_output(
                &cfg.patient_output_path(),
                "ERROR: Input file not found\n",
            );
        }
        tracing::warn!(
            "no patient input at {}; continuing with an empty registry",
            input.display()
        );
    } else {
        match ingest_file(&mut registry, &input, cfg) {
            Ok(summary) if command == Command::AddPatient => {
                return write_output(&cfg.patient_output_path(), &render_ingest_summary(&summary));
            }
            Ok(_) => {}
            Err(e) => {
                if command == Command::AddPatient {
                    write_output(&cfg.patient_output_path(), &format!("ERROR: {e}\n"))?;
                }
                return Err(e);
            }
        }
    }

    match command {
        Command::AddPatient => Ok(()),
        Command::SearchPatient => {
            let raw = fs::read_to_string(cfg.search_input_path()).map_err(RegistryError::FileRead)?;
            let id: PatientId = raw
                .trim()
                .parse()
                .map_err(|e| RegistryError::InvalidInput(format!("search input: {e}")))?;
            let text = render_lookup(&registry.lookup(id), cfg.delimiter());
            write_output(&cfg.search_output_path(), &text)
        }
        Command::GetAllSorted => write_output(
            &cfg.sorted_output_path(),
            &render_ordered(&registry, cfg.delimiter()),
        ),
        Command::FindHighPriority => {
            write_output(&cfg.priority_output_path(), &render_high_priority(&registry))
        }
        Command::AnalyzeNetwork => {
            let referrals = cfg.referrals_input_path();
            if referrals.is_file() {
                load_referrals_file(&mut registry, &referrals, cfg)?;
            }
            let report = registry.export_analysis();
            write_output(&cfg.analysis_output_path(), &report.to_string())
        }
        Command::DiseaseDistribution => write_output(
            &cfg.distribution_output_path(),
            &render_distribution(&registry),
        ),
    }
}
