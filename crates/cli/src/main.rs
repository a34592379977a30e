use clap::{Parser, Subcommand};
use registry_core::ingest::{append_patient, ingest_file, load_referrals_file};
use registry_core::report::{
    render_distribution, render_high_priority, render_ingest_summary, render_lookup,
    render_ordered,
};
use registry_core::{CoreConfig, ParsePolicy, PatientId, Registry, ValidationMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Patient registry CLI")]
struct Cli {
    /// Patient records, one `id,name,age,diagnosis,contact` per line
    #[arg(long, short, global = true, default_value = "patient_input.txt")]
    input: PathBuf,
    /// Referral edges, one `from,to,reason` per line
    #[arg(long, short, global = true)]
    referrals: Option<PathBuf>,
    /// Field delimiter used by both input files
    #[arg(long, global = true, default_value_t = ',')]
    delimiter: char,
    /// Skip malformed lines instead of rejecting the whole file
    #[arg(long, global = true)]
    skip_invalid: bool,
    /// Enforce name, age and contact rules on every record
    #[arg(long, global = true)]
    strict: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one patient, append it to the input file and report the totals
    Add {
        /// Patient identifier
        id: String,
        /// Letters and spaces only
        name: String,
        /// Between 1 and 119
        age: String,
        diagnosis: String,
        /// Exactly 11 digits
        contact: String,
    },
    /// Look up one patient and list patients with the same diagnosis
    Search {
        /// Patient identifier
        id: PatientId,
    },
    /// List all patients in identifier order
    Sorted,
    /// List high-priority patients
    Priority,
    /// Print the diagnosis groups and referral network
    Analyze {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List patients sharing a patient's diagnosis
    Similar {
        /// Patient identifier
        id: PatientId,
    },
    /// Show the most urgent patient with a diagnosis
    Highest {
        /// Diagnosis label, matched exactly
        diagnosis: String,
    },
    /// Count patients per diagnosis
    Distribution,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("Use 'registry --help' for commands");
        return Ok(());
    };

    let policy = if cli.skip_invalid {
        ParsePolicy::SkipLine
    } else {
        ParsePolicy::AbortBatch
    };
    let validation = if cli.strict {
        ValidationMode::Strict
    } else {
        ValidationMode::Lenient
    };
    let data_dir = cli
        .input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let cfg = CoreConfig::new(data_dir, cli.delimiter, policy, validation)?;

    if let Commands::Add {
        id,
        name,
        age,
        diagnosis,
        contact,
    } = &command
    {
        let fields = [
            id.as_str(),
            name.as_str(),
            age.as_str(),
            diagnosis.as_str(),
            contact.as_str(),
        ];
        match append_patient(&cli.input, fields, &cfg) {
            Ok(record) => println!("SUCCESS: Patient {} added successfully", record.name()),
            Err(e) => {
                println!("ERROR: {e}");
                std::process::exit(1);
            }
        }
    }

    let mut registry = Registry::new();
    let summary = ingest_file(&mut registry, &cli.input, &cfg)?;
    if let Some(referrals) = &cli.referrals {
        load_referrals_file(&mut registry, referrals, &cfg)?;
    }

    match command {
        Commands::Add { .. } => print!("{}", render_ingest_summary(&summary)),
        Commands::Search { id } => {
            print!("{}", render_lookup(&registry.lookup(id), cfg.delimiter()))
        }
        Commands::Sorted => print!("{}", render_ordered(&registry, cfg.delimiter())),
        Commands::Priority => print!("{}", render_high_priority(&registry)),
        Commands::Analyze { json } => {
            let report = registry.export_analysis();
            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{report}");
            }
        }
        Commands::Similar { id } => {
            let similar = registry.similar_patients(id);
            if similar.is_empty() {
                println!("No similar patients found.");
            }
            for other in similar {
                if let Some(record) = registry.get(other) {
                    println!("{} - {}", record.id(), record.name());
                }
            }
        }
        Commands::Highest { diagnosis } => match registry.highest_priority(&diagnosis) {
            Some(id) => {
                if let Some(record) = registry.get(id) {
                    println!(
                        "{} - {} (priority {})",
                        record.id(),
                        record.name(),
                        record.priority()
                    );
                }
            }
            None => println!("No patients registered with {diagnosis}."),
        },
        Commands::Distribution => print!("{}", render_distribution(&registry)),
    }

    Ok(())
}
