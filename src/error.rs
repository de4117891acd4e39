//! Error types for the Medplum chart guard.
//!
//! Two families live here: [`ConfigError`] for everything that can go wrong
//! while loading values, and [`ValidationError`] for rule failures. Rule
//! failures carry structured fields only; the operator-facing text is built by
//! [`crate::validation::ErrorReporter`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the chart guard.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Values loading errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Values loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The values file was not found.
    #[error("Values file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The values file could not be read or parsed.
    #[error(
        "Failed to parse values{}: {message}",
        location.as_ref().map(|l| format!(" in {l}")).unwrap_or_default()
    )]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// A `--set` expression is malformed.
    #[error("Invalid override '{expression}': {reason}")]
    InvalidOverride {
        /// The expression as given on the command line.
        expression: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type alias for chart guard operations.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Category of a fatal rule failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A field without a default is absent or empty.
    MissingRequiredField,
    /// A field holds a value outside the supported set.
    UnsupportedValue,
    /// A field is present but does not match its grammar.
    FormatMismatch,
    /// A numeric field lies outside its allowed range.
    RangeViolation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingRequiredField => "MissingRequiredField",
            Self::UnsupportedValue => "UnsupportedValue",
            Self::FormatMismatch => "FormatMismatch",
            Self::RangeViolation => "RangeViolation",
        };
        f.write_str(name)
    }
}

/// A single rule failure.
///
/// Constructed where the check fails and returned immediately. The `Display`
/// impl is a one-line headline; use [`crate::validation::ErrorReporter`] for
/// the full message with expected shape, example and hint.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum ValidationError {
    /// A required field is absent or empty.
    #[error("{field} is required but not set")]
    MissingRequiredField {
        /// Dotted path of the field.
        field: String,
        /// Shape the value must have.
        expected: String,
        /// A concrete valid value.
        example: String,
    },

    /// A field holds a value outside the supported set.
    #[error("{field} has an unsupported value \"{value}\"")]
    UnsupportedValue {
        /// Dotted path of the field.
        field: String,
        /// The rejected value.
        value: String,
        /// Every accepted value.
        supported: Vec<String>,
        /// Extra context shown below the supported set.
        note: Option<String>,
    },

    /// A field is present but malformed.
    #[error("{field} has an invalid value \"{value}\"")]
    FormatMismatch {
        /// Dotted path of the field.
        field: String,
        /// The rejected value.
        value: String,
        /// Grammar the value must match.
        expected: String,
        /// A concrete valid value.
        example: String,
    },

    /// A numeric field is out of range.
    #[error("{field} is out of range ({value})")]
    RangeViolation {
        /// Dotted path of the field.
        field: String,
        /// The rejected value.
        value: i64,
        /// The bound that was violated.
        expected: String,
        /// A concrete valid value.
        example: String,
    },
}

impl ValidationError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing(
        field: impl Into<String>,
        expected: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            expected: expected.into(),
            example: example.into(),
        }
    }

    /// Creates an unsupported-value error.
    #[must_use]
    pub fn unsupported(
        field: impl Into<String>,
        value: impl Into<String>,
        supported: Vec<String>,
        note: Option<String>,
    ) -> Self {
        Self::UnsupportedValue {
            field: field.into(),
            value: value.into(),
            supported,
            note,
        }
    }

    /// Creates a format-mismatch error.
    #[must_use]
    pub fn format_mismatch(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self::FormatMismatch {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
            example: example.into(),
        }
    }

    /// Creates a range-violation error.
    #[must_use]
    pub fn range(
        field: impl Into<String>,
        value: i64,
        expected: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self::RangeViolation {
            field: field.into(),
            value,
            expected: expected.into(),
            example: example.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            Self::UnsupportedValue { .. } => ErrorKind::UnsupportedValue,
            Self::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            Self::RangeViolation { .. } => ErrorKind::RangeViolation,
        }
    }

    /// Returns the dotted path of the offending field.
    #[must_use]
    pub fn field_path(&self) -> &str {
        match self {
            Self::MissingRequiredField { field, .. }
            | Self::UnsupportedValue { field, .. }
            | Self::FormatMismatch { field, .. }
            | Self::RangeViolation { field, .. } => field,
        }
    }

    /// Returns a concrete valid value for the field.
    ///
    /// For unsupported values this is the first member of the supported set.
    #[must_use]
    pub fn example(&self) -> &str {
        match self {
            Self::MissingRequiredField { example, .. }
            | Self::FormatMismatch { example, .. }
            | Self::RangeViolation { example, .. } => example,
            Self::UnsupportedValue { supported, .. } => {
                supported.first().map_or("", String::as_str)
            }
        }
    }

    /// Returns the accepted values, when the field is restricted to a set.
    #[must_use]
    pub fn supported_values(&self) -> &[String] {
        match self {
            Self::UnsupportedValue { supported, .. } => supported,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_field_path() {
        let err = ValidationError::missing("gcp.projectId", "a non-empty string", "my-project");
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.field_path(), "gcp.projectId");
        assert_eq!(err.example(), "my-project");
        assert!(err.supported_values().is_empty());
    }

    #[test]
    fn test_unsupported_example_is_first_supported() {
        let err = ValidationError::unsupported(
            "cloudProvider",
            "aws",
            vec![String::from("gcp")],
            None,
        );
        assert_eq!(err.example(), "gcp");
        assert_eq!(err.supported_values(), ["gcp".to_string()]);
    }

    #[test]
    fn test_headline() {
        let err = ValidationError::format_mismatch(
            "ingress.domain",
            "-bad-.com",
            "a DNS hostname",
            "medplum.example.com",
        );
        assert_eq!(err.to_string(), "ingress.domain has an invalid value \"-bad-.com\"");
    }

    #[test]
    fn test_parse_error_shows_location() {
        let located = ConfigError::ParseError {
            message: String::from("bad"),
            location: Some(String::from("values.yaml")),
        };
        assert_eq!(located.to_string(), "Failed to parse values in values.yaml: bad");

        let unlocated = ConfigError::ParseError {
            message: String::from("bad"),
            location: None,
        };
        assert_eq!(unlocated.to_string(), "Failed to parse values: bad");
    }

    #[test]
    fn test_serialize_tagged() {
        let err = ValidationError::range("deployment.autoscaling.minReplicas", 0, ">= 1", "1");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "RangeViolation");
        assert_eq!(json["value"], 0);
    }
}
