//! Operator-facing rendering of rule failures.
//!
//! Every rendered failure names the field, states the expected shape or the
//! supported set, gives a concrete example and a `--set` remediation hint, so
//! the values can be fixed without reading the chart.

use std::fmt::Write;

use crate::error::ValidationError;
use crate::rules::Advisory;

/// Formats validation failures and advisories.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    /// Renders a failure as a multi-line message.
    #[must_use]
    pub fn render(error: &ValidationError) -> String {
        let mut output = format!("error[{}]: {error}\n", error.kind());
        let _ = writeln!(output, "  expected: {}", Self::expected(error));
        let _ = writeln!(output, "  example:  {}", error.example());

        if let ValidationError::UnsupportedValue { note: Some(note), .. } = error {
            let _ = writeln!(output, "  note:     {note}");
        }

        let _ = writeln!(output, "  hint:     {}", Self::hint(error));
        output
    }

    /// Renders an advisory as a multi-line message.
    #[must_use]
    pub fn render_advisory(advisory: &Advisory) -> String {
        let mut output = format!(
            "warning[Advisory]: {} is {} ({})\n",
            advisory.field, advisory.value, advisory.rule
        );
        let _ = writeln!(output, "  note:     {}", advisory.message);
        output
    }

    /// Describes the shape or set the field must match.
    #[must_use]
    pub fn expected(error: &ValidationError) -> String {
        match error {
            ValidationError::MissingRequiredField { expected, .. }
            | ValidationError::FormatMismatch { expected, .. }
            | ValidationError::RangeViolation { expected, .. } => expected.clone(),
            ValidationError::UnsupportedValue { supported, .. } => {
                format!("one of: {}", supported.join(", "))
            }
        }
    }

    /// Suggests how to fix the failure.
    #[must_use]
    pub fn hint(error: &ValidationError) -> String {
        let field = error.field_path();
        let set = format!("--set {}={}", Self::set_path(field), error.example());

        match error {
            ValidationError::MissingRequiredField { .. } => {
                format!("set {field} in your values file, or pass {set}")
            }
            ValidationError::UnsupportedValue { .. } => {
                format!("change {field} to a supported value, e.g. {set}")
            }
            ValidationError::FormatMismatch { value, .. } => {
                format!("replace \"{value}\" with a value of the expected shape, e.g. {set}")
            }
            ValidationError::RangeViolation { expected, .. } => {
                format!("adjust {field} to be {expected}, e.g. {set}")
            }
        }
    }

    /// Converts a field path into the key syntax accepted by `--set`.
    ///
    /// `a.b["x.y/z"]` becomes `a.b.x\.y/z`.
    #[must_use]
    pub fn set_path(field: &str) -> String {
        match field
            .split_once("[\"")
            .and_then(|(prefix, rest)| rest.strip_suffix("\"]").map(|key| (prefix, key)))
        {
            Some((prefix, key)) => format!("{prefix}.{}", key.replace('.', "\\.")),
            None => field.to_string(),
        }
    }
}
