//! CLI module for the Medplum chart guard.
//!
//! This module provides the command-line interface used by the packaging
//! layer to gate a render.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use output::OutputFormatter;
