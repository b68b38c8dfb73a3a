mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use respack_lib::package::PackageError;
use respack_lib::step::{PipelineError, Verbosity};

use crate::output::{OutputFormat, print_error};

/// respack - Android resource packaging steps
#[derive(Parser)]
#[command(name = "respack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// More output: -v prints each step, -vv also makes aapt verbose
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Log filter (e.g. "debug" or "respack_lib=trace"), overrides RUST_LOG
  #[arg(long, global = true)]
  log_level: Option<String>,

  /// Project root that request paths are relative to
  #[arg(long, global = true, default_value = ".")]
  root: PathBuf,

  /// Output format
  #[arg(short, long, value_enum, global = true, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Filter resources and package them into an unsigned archive
  Package {
    /// Path to the JSON package request
    request: PathBuf,
  },

  /// Only filter the resource directories of a request
  Filter {
    /// Path to the JSON package request
    request: PathBuf,
  },

  /// Print the rule key of a request
  RuleKey {
    /// Path to the JSON package request
    request: PathBuf,
  },

  /// Print the planned steps without running them
  Steps {
    /// Path to the JSON package request
    request: PathBuf,
  },
}

fn init_logging(verbose: u8, log_level: Option<&str>) {
  let default = if verbose > 0 { "debug" } else { "warn" };
  let filter = match log_level {
    Some(level) => EnvFilter::new(level),
    None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

/// Exit status for a failed command: the failing tool's own code when known.
fn exit_code(err: &anyhow::Error) -> u8 {
  let code = if let Some(e) = err.downcast_ref::<PackageError>() {
    e.exit_code()
  } else if let Some(e) = err.downcast_ref::<PipelineError>() {
    e.exit_code()
  } else {
    1
  };
  u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}

fn run(cli: Cli) -> Result<()> {
  let root = dunce::canonicalize(&cli.root)
    .with_context(|| format!("Project root not found: {}", cli.root.display()))?;
  let verbosity = Verbosity::from_level(cli.verbose);

  match cli.command {
    Commands::Package { request } => cmd::cmd_package(&request, &root, verbosity, cli.output),
    Commands::Filter { request } => cmd::cmd_filter(&request, &root, verbosity, cli.output),
    Commands::RuleKey { request } => cmd::cmd_rule_key(&request, &root, cli.output),
    Commands::Steps { request } => cmd::cmd_steps(&request, &root, verbosity, cli.output),
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose, cli.log_level.as_deref());

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::from(exit_code(&err))
    }
  }
}
