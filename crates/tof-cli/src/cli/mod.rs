mod commands;
mod documents;

use clap::Parser;
use commands::CommandContext;
use std::path::{Path, PathBuf};
use tof_core::{FocusConfigError, FocusError, FocusErrorCategory, FocusedSpectrumBuilder};
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let args = std::iter::once("tof-focus".to_string())
        .chain(std::env::args().skip(1))
        .collect::<Vec<_>>();

    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.diagnostic();
            eprintln!("{}", diagnostic.line());
            eprintln!("FATAL EXIT CODE: {}", diagnostic.exit_code());
            diagnostic.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(cli.log_level.as_deref())?;
            let context = CommandContext::new(
                load_builder(cli.config.as_deref())?,
                cli.output,
            );
            dispatch_parsed(&context, cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "tof-focus", about = "Time-of-flight spectrum focusing")]
struct Cli {
    /// Focus configuration JSON (tolerances and DIFC constant)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the result to this file instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log filter directive such as `info` or `tof_core=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Relabel a detector spectrum onto a new angle and flight path
    Relabel(commands::RelabelArgs),
    /// Focus a beam-line monitor spectrum onto an angular bank
    Bank(commands::BankArgs),
    /// Summarise the x scale of a spectrum document
    Inspect(commands::InspectArgs),
}

fn dispatch_parsed(context: &CommandContext, command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Relabel(args) => commands::run_relabel_command(context, args),
        CliCommand::Bank(args) => commands::run_bank_command(context, args),
        CliCommand::Inspect(args) => commands::run_inspect_command(context, args),
    }
}

fn init_tracing(log_level: Option<&str>) -> Result<(), CliError> {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive).map_err(|error| {
            CliError::Usage(format!("invalid --log-level '{directive}': {error}"))
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    // A subscriber may already be installed when the CLI is driven in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

fn load_builder(config_path: Option<&Path>) -> Result<FocusedSpectrumBuilder, CliError> {
    let Some(config_path) = config_path else {
        return Ok(FocusedSpectrumBuilder::default());
    };
    let config = tof_core::load_focus_config(config_path)?;
    tracing::info!(path = %config_path.display(), "loaded focus config");
    Ok(FocusedSpectrumBuilder::new(config))
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] FocusConfigError),
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", path.display())]
    Document {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Focus(#[from] FocusError),
    #[error("focused spectrum for group {group_id} has non-finite {field}")]
    NonFinite { group_id: i32, field: &'static str },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Operator-facing rendering of a [`CliError`].
#[derive(Debug, Clone, PartialEq)]
struct Diagnostic {
    category: FocusErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl Diagnostic {
    fn line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }
}

impl CliError {
    fn diagnostic(&self) -> Diagnostic {
        let (category, placeholder) = match self {
            Self::Usage(_) => (FocusErrorCategory::InputValidationError, "INPUT.CLI_USAGE"),
            Self::Config(FocusConfigError::Read { .. }) => {
                (FocusErrorCategory::IoSystemError, "IO.CONFIG_READ")
            }
            Self::Config(_) => (FocusErrorCategory::InputValidationError, "INPUT.CONFIG"),
            Self::Read { .. } => (FocusErrorCategory::IoSystemError, "IO.INPUT_READ"),
            Self::Write { .. } => (FocusErrorCategory::IoSystemError, "IO.OUTPUT_WRITE"),
            Self::Document { .. } => (FocusErrorCategory::InputValidationError, "INPUT.DOCUMENT"),
            Self::Focus(error) => (error.category(), error.placeholder()),
            Self::NonFinite { .. } => (
                FocusErrorCategory::ComputationError,
                "COMPUTE.NON_FINITE_OUTPUT",
            ),
            Self::Internal(_) => (FocusErrorCategory::IoSystemError, "IO.CLI"),
        };
        let message = match self {
            Self::Internal(error) => format!("{error:#}"),
            other => other.to_string(),
        };
        Diagnostic {
            category,
            placeholder,
            message,
        }
    }
}
