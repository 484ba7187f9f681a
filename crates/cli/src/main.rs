mod config;
mod labs;
mod results;
mod terminal;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use labres_core::Outcome;
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, Overrides, Settings};

// View controllers report their failures through the terminal `Ui`.
const DEFAULT_LOG_FILTER: &str = "labres=warn,labres_core=off";

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Lab results client.
#[derive(Parser)]
#[command(name = "labres", version, about = "Lab results client")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a labres.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the lab results backend
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage lab results
    Results {
        #[command(subcommand)]
        command: results::ResultsCommands,
    },

    /// Browse and manage laboratories
    Labs {
        #[command(subcommand)]
        command: labs::LabsCommands,
    },
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Failed(String),

    #[error("Operación cancelada")]
    Cancelled,

    /// Already shown to the user as a notice; only the exit status remains.
    #[error("La operación falló")]
    Reported,
}

/// Map a controller outcome to the command's exit status.
///
/// Failure details were already reported through the terminal `Ui`.
pub(crate) fn outcome_to_result(outcome: Outcome) -> Result<(), CliError> {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Cancelled => Err(CliError::Cancelled),
        Outcome::Rejected | Outcome::Failed => Err(CliError::Reported),
    }
}

pub(crate) fn print_json(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", pretty);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let output = cli.output;
    let quiet = cli.quiet;
    let overrides = Overrides {
        config: cli.config,
        api_url: cli.api_url,
        page_size: None,
    };

    let result = Settings::load(overrides)
        .map_err(CliError::from)
        .and_then(|settings| run(cli.command, &settings, output, quiet));

    if let Err(e) = result {
        report(&e, output, quiet);
        process::exit(1);
    }
}

fn run(
    command: Commands,
    settings: &Settings,
    output: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    tracing::debug!(
        api_url = %settings.api_url,
        page_size = settings.page_size,
        "settings resolved"
    );
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Failed(format!("failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        match command {
            Commands::Results { command } => results::run(command, settings, output, quiet).await,
            Commands::Labs { command } => labs::run(command, settings, output, quiet).await,
        }
    })
}

fn report(error: &CliError, output: OutputFormat, quiet: bool) {
    // Quiet mode suppressed the notice, so the summary line is all that's left.
    if matches!(error, CliError::Reported) && !quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({ "error": error.to_string() });
            eprintln!("{}", value);
        }
        OutputFormat::Text => eprintln!("error: {}", error),
    }
}
