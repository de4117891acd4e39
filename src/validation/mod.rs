//! Validation pipeline for chart values.
//!
//! - [`Validator`] runs the rule set in order against a snapshot
//! - [`validate_all`] is the single gate called before rendering
//! - [`ErrorReporter`] turns failures into operator-facing messages

mod reporter;
mod validator;

pub use reporter::ErrorReporter;
pub use validator::{
    validate_all, RuleApplicability, RuleEvaluation, RuleStatus, ValidationReport, Validator,
};
