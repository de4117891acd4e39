// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Medplum Chart Guard
//!
//! Pre-render validation for the Medplum healthcare server Helm chart.
//!
//! ## Overview
//!
//! The chart renders Kubernetes manifests for a single deployment target. Before
//! any manifest is produced, the values are checked here so that a bad setting
//! stops the render with a message naming the field, the expected shape and a
//! concrete fix:
//!
//! - Load and deep-merge one or more values files, then apply overrides
//! - Normalize them into an immutable [`config::ConfigSnapshot`]
//! - Run an ordered, fail-fast rule set against it
//! - Render failures and advisories for operators or as JSON
//!
//! ## Modules
//!
//! - [`config`]: Values parsing, layering and the normalized snapshot
//! - [`rules`]: The individual validation rules
//! - [`validation`]: Rule pipeline and error rendering
//! - [`error`]: Error types
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```yaml
//! cloudProvider: gcp
//! gcp:
//!   projectId: my-gcp-project
//!   secretId: medplum-server-config
//! serviceAccount:
//!   annotations:
//!     iam.gke.io/gcp-service-account: medplum-server@my-gcp-project.iam.gserviceaccount.com
//! ingress:
//!   domain: medplum.example.com
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod rules;
pub mod validation;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ChartValues, ConfigSnapshot, SnapshotHasher, ValuesParser};
pub use error::{GuardError, Result, ValidationError};
pub use rules::{standard_rules, Advisory, Rule};
pub use validation::{validate_all, ErrorReporter, ValidationReport, Validator};
