//! Command-line interface for the `ampute` binary.
//!
//! Provides run, validate and profile subcommands over CSV datasets.

use std::path::{Path, PathBuf};

use amp_common::{Result, SCHEMA_VERSION};
use amp_config::{resolve_config, AmputerConfig, ConfigSource};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::engine::{Amputer, ValidatedPatterns};
use crate::exit_codes::ExitCode;
use crate::io::{read_csv, write_csv};
use crate::profile::MissingnessProfile;

#[derive(Parser, Debug)]
#[command(name = "ampute")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inject multivariate missing values into complete datasets", long_about = None)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ampute a dataset and write the result
    Run(RunArgs),
    /// Compile and validate a configuration against a dataset
    Validate(ValidateArgs),
    /// Print the missingness profile of a dataset
    Profile(InputArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Input CSV file with a header row
    #[arg(short, long)]
    pub input: PathBuf,

    /// Treat the first column as row labels
    #[arg(long)]
    pub row_labels: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// JSON configuration file (falls back to AMPUTE_CONFIG)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output CSV file
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON configuration file (falls back to AMPUTE_CONFIG)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target proportion of incomplete rows (decimal or percentage)
    #[arg(long)]
    pub prop: Option<f64>,

    /// Use raw feature values in the scores instead of z-scores
    #[arg(long)]
    pub no_std: bool,

    /// Write the run report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool, json: bool) {
    let default = if verbose { "amp_core=debug" } else { "amp_core=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // A subscriber may already be installed when embedded or under test.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Execute the parsed command and report the outcome as an exit code.
pub fn execute(cli: &Cli) -> ExitCode {
    let outcome = match &cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Validate(args) => cmd_validate(args),
        Commands::Profile(args) => cmd_profile(args),
    };
    match outcome {
        Ok(()) => ExitCode::Clean,
        Err(err) => {
            let code = ExitCode::from_error(&err);
            error!(error_code = err.code(), "{}", err);
            eprintln!("error[{}]: {}", err.code(), err);
            code
        }
    }
}

fn load(config: Option<&Path>) -> Result<AmputerConfig> {
    let (config, source) = resolve_config(config)?;
    match &source {
        ConfigSource::Explicit(path) | ConfigSource::Environment(path) => {
            info!(path = %path.display(), "Loaded configuration");
        }
        ConfigSource::Defaults => info!("Using default configuration"),
    }
    Ok(config)
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let mut config = load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(prop) = args.prop {
        config = config.with_prop(prop);
    }
    if args.no_std {
        config = config.with_std(false);
    }

    let data = read_csv(&args.input.input, args.input.row_labels)?;
    let (output, report) = Amputer::new(config).run_with_report(&data)?;
    write_csv(&args.output, &output)?;

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!(path = %path.display(), "Wrote run report");
    }
    info!(
        output = %args.output.display(),
        missing_cells = output.missing_count(),
        "Amputation complete"
    );
    Ok(())
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    schema_version: &'static str,
    n_samples: usize,
    n_features: usize,
    #[serde(flatten)]
    validated: &'a ValidatedPatterns,
}

fn cmd_validate(args: &ValidateArgs) -> Result<()> {
    let config = load(args.config.as_deref())?;
    let data = read_csv(&args.input.input, args.input.row_labels)?;
    let validated = Amputer::new(config).prepare(&data)?;
    let output = ValidateOutput {
        schema_version: SCHEMA_VERSION,
        n_samples: data.n_rows(),
        n_features: data.n_cols(),
        validated: &validated,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_profile(args: &InputArgs) -> Result<()> {
    let data = read_csv(&args.input, args.row_labels)?;
    let profile = MissingnessProfile::from_dataset(&data);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
