use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use registry_core::commands::run_command_file;
use registry_core::config::{
    delimiter_from_env_value, parse_policy_from_env_value, validation_mode_from_env_value,
};
use registry_core::constants::DEFAULT_DATA_DIR;
use registry_core::CoreConfig;

/// Command-file runner for the patient registry
///
/// Reads one command token from `command.txt` in the data directory, ingests
/// `patient_input.txt`, and writes the command's output file next to them.
///
/// # Environment Variables
/// - `REGISTRY_DATA_DIR`: directory holding command, input and output files
///   (default: "data_files")
/// - `REGISTRY_DELIMITER`: single-character field delimiter (default: ",")
/// - `REGISTRY_PARSE_POLICY`: `abort` to reject a file with any bad line, `skip` to drop bad
///   lines (default: "abort")
/// - `REGISTRY_VALIDATION`: `lenient` or `strict` field checks (default: "lenient")
///
/// # Returns
/// * `Ok(())` - If the command ran and its output was written
/// * `Err(anyhow::Error)` - If configuration is invalid or the command failed
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registry_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir: PathBuf = std::env::var("REGISTRY_DATA_DIR")
        .unwrap_or_else(|_| DEFAULT_DATA_DIR.into())
        .into();
    let cfg = CoreConfig::new(
        data_dir,
        delimiter_from_env_value(std::env::var("REGISTRY_DELIMITER").ok())?,
        parse_policy_from_env_value(std::env::var("REGISTRY_PARSE_POLICY").ok())?,
        validation_mode_from_env_value(std::env::var("REGISTRY_VALIDATION").ok())?,
    )?;

    match run_command_file(&cfg) {
        Ok(command) => {
            tracing::info!("++ {} complete", command);
            Ok(())
        }
        Err(e) => {
            tracing::error!("command failed: {}", e);
            Err(e.into())
        }
    }
}
