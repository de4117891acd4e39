//! Medplum chart guard CLI entrypoint.
//!
//! Loads chart values, runs the validation pipeline and exits non-zero when
//! rendering must not proceed.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use medplum_chart_guard::cli::{Cli, Commands, OutputFormat, OutputFormatter};
use medplum_chart_guard::config::{find_values_file, ConfigSnapshot, SnapshotHasher, ValuesParser};
use medplum_chart_guard::error::Result;
use medplum_chart_guard::validation::Validator;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, matches!(cli.output, OutputFormat::Json));

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system; JSON output also gets JSON log lines.
fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Runs the selected command; `Ok(false)` means the values were rejected.
fn run(cli: &Cli) -> Result<bool> {
    let formatter = OutputFormatter::new(cli.output);
    let snapshot = load_snapshot(cli)?;

    match cli.command {
        Commands::Validate { all } => cmd_validate(&snapshot, all, &formatter),
        Commands::Snapshot => cmd_snapshot(&snapshot, &formatter),
        Commands::Rules => cmd_rules(&snapshot, &formatter),
    }
}

/// Resolves the values files to load.
fn resolve_values_paths(values: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if values.is_empty() {
        let cwd = std::env::current_dir()?;
        Ok(vec![find_values_file(cwd)?])
    } else {
        Ok(values.to_vec())
    }
}

/// Loads, layers and normalizes the chart values.
fn load_snapshot(cli: &Cli) -> Result<ConfigSnapshot> {
    let paths = resolve_values_paths(&cli.values)?;

    let mut parser = ValuesParser::new();
    if let Some(dir) = paths.first().and_then(|p| p.parent()) {
        parser = parser.with_base_path(dir);
    }
    parser.load_dotenv()?;

    debug!("Layering {} values file(s)", paths.len());
    let values = parser.load_layered(&paths, &cli.set)?;
    let snapshot = ConfigSnapshot::from_values(values);
    debug!("Normalized snapshot: {:?}", snapshot);

    Ok(snapshot)
}

/// Validate the values.
fn cmd_validate(snapshot: &ConfigSnapshot, all: bool, formatter: &OutputFormatter) -> Result<bool> {
    let validator = Validator::new();

    if all {
        let report = validator.validate_aggregate(snapshot);
        emit(&formatter.format_report(&report))?;
        return Ok(report.is_valid());
    }

    match validator.validate(snapshot) {
        Ok(report) => {
            emit(&formatter.format_report(&report))?;
            Ok(true)
        }
        Err(error) => {
            let fingerprint = SnapshotHasher::new().hash_snapshot(snapshot);
            emit(&formatter.format_failure(&error, &fingerprint))?;
            Ok(false)
        }
    }
}

/// Print the normalized snapshot.
fn cmd_snapshot(snapshot: &ConfigSnapshot, formatter: &OutputFormatter) -> Result<bool> {
    let fingerprint = SnapshotHasher::new().hash_snapshot(snapshot);
    emit(&formatter.format_snapshot(snapshot, &fingerprint))?;
    Ok(true)
}

/// List the rule pipeline.
fn cmd_rules(snapshot: &ConfigSnapshot, formatter: &OutputFormatter) -> Result<bool> {
    let listing = Validator::new().applicability(snapshot);
    emit(&formatter.format_rules(&listing))?;
    Ok(true)
}

/// Writes formatted output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{output}")?;
    if !output.ends_with('\n') {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}
