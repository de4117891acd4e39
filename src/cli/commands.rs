//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Medplum chart guard - validates chart values before rendering.
#[derive(Parser, Debug)]
#[command(name = "medplum-guard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Values files, merged left to right (defaults to ./values.yaml).
    #[arg(
        short = 'f',
        long = "values",
        global = true,
        env = "MEDPLUM_GUARD_VALUES",
        value_delimiter = ','
    )]
    pub values: Vec<PathBuf>,

    /// Override a value (path.to.key=value), applied after all files.
    #[arg(long = "set", global = true)]
    pub set: Vec<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the values; exits non-zero if rendering must not proceed.
    Validate {
        /// Report every failing rule instead of stopping at the first.
        #[arg(short, long)]
        all: bool,
    },

    /// Print the normalized snapshot the rules see.
    Snapshot,

    /// List the rule pipeline and which rules apply to the values.
    Rules,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
