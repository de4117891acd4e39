//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::config::{ConfigSnapshot, SnapshotHasher};
use crate::error::ValidationError;
use crate::rules::Advisory;
use crate::validation::{ErrorReporter, RuleApplicability, RuleStatus, ValidationReport};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Rule outcome row for table display.
#[derive(Tabled)]
struct RuleStatusRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Rule listing row for table display.
#[derive(Tabled)]
struct RuleListingRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Rule")]
    rule: String,
    #[tabled(rename = "Applies")]
    applies: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the report of a completed pass.
    #[must_use]
    pub fn format_report(&self, report: &ValidationReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&ReportJson::from_report(report))
                .unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats the error that ended a fail-fast pass.
    #[must_use]
    pub fn format_failure(&self, error: &ValidationError, fingerprint: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = ReportJson {
                    status: "invalid",
                    fingerprint,
                    rules: Vec::new(),
                    advisories: &[],
                    errors: vec![ErrorJson::from(error)],
                };
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = ErrorReporter::render(error);
                let _ = write!(
                    output,
                    "\n{} Values rejected ({})\n",
                    "✗".red(),
                    SnapshotHasher::short(fingerprint)
                );
                output
            }
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &ValidationReport) -> String {
        let mut output = String::new();

        for error in &report.errors {
            output.push_str(&ErrorReporter::render(error));
            output.push('\n');
        }

        for advisory in &report.advisories {
            output.push_str(&Self::format_advisory_text(advisory));
            output.push('\n');
        }

        let rows: Vec<RuleStatusRow> = report
            .rules
            .iter()
            .map(|r| RuleStatusRow {
                index: r.order,
                rule: r.rule.to_string(),
                status: Self::format_rule_status(r.status),
            })
            .collect();

        if !rows.is_empty() {
            output.push_str(&Table::new(rows).to_string());
            output.push('\n');
        }

        let summary = if report.is_valid() {
            format!("{} Values are valid", "✓".green())
        } else {
            format!("{} {} error(s) found", "✗".red(), report.errors.len())
        };

        let _ = write!(
            output,
            "\n{summary} ({}, {} of {} rules applied",
            SnapshotHasher::short(&report.fingerprint),
            report.applied_count(),
            report.rules.len()
        );
        if !report.advisories.is_empty() {
            let _ = write!(output, ", {} warning(s)", report.advisories.len());
        }
        output.push_str(")\n");

        output
    }

    /// Formats an advisory as text.
    fn format_advisory_text(advisory: &Advisory) -> String {
        let rendered = ErrorReporter::render_advisory(advisory);
        match rendered.split_once(':') {
            Some((tag, rest)) => format!("{}:{rest}", tag.yellow()),
            None => rendered,
        }
    }

    /// Formats the rule listing.
    #[must_use]
    pub fn format_rules(&self, listing: &[RuleApplicability]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(listing).unwrap_or_default(),
            OutputFormat::Text => {
                let rows: Vec<RuleListingRow> = listing
                    .iter()
                    .map(|r| RuleListingRow {
                        index: r.order,
                        rule: r.rule.to_string(),
                        applies: if r.applies {
                            "yes".green().to_string()
                        } else {
                            "no".dimmed().to_string()
                        },
                        description: r.description.to_string(),
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Formats the normalized snapshot.
    #[must_use]
    pub fn format_snapshot(&self, snapshot: &ConfigSnapshot, fingerprint: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "fingerprint": fingerprint,
                    "snapshot": snapshot,
                });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => {
                let body = serde_yaml::to_string(snapshot).unwrap_or_default();
                format!("# fingerprint: {fingerprint}\n{body}")
            }
        }
    }

    /// Formats a rule status with color.
    fn format_rule_status(status: RuleStatus) -> String {
        match status {
            RuleStatus::Passed => status.to_string().green().to_string(),
            RuleStatus::Skipped => status.to_string().dimmed().to_string(),
            RuleStatus::Failed => status.to_string().red().to_string(),
        }
    }
}

// JSON serialization helpers

#[derive(Serialize)]
struct ReportJson<'a> {
    status: &'static str,
    fingerprint: &'a str,
    rules: Vec<RuleJson>,
    advisories: &'a [Advisory],
    errors: Vec<ErrorJson<'a>>,
}

#[derive(Serialize)]
struct RuleJson {
    order: usize,
    rule: &'static str,
    status: RuleStatus,
}

#[derive(Serialize)]
struct ErrorJson<'a> {
    #[serde(flatten)]
    error: &'a ValidationError,
    message: String,
    hint: String,
}

impl<'a> ReportJson<'a> {
    fn from_report(report: &'a ValidationReport) -> Self {
        Self {
            status: if report.is_valid() { "valid" } else { "invalid" },
            fingerprint: &report.fingerprint,
            rules: report
                .rules
                .iter()
                .map(|r| RuleJson {
                    order: r.order,
                    rule: r.rule,
                    status: r.status,
                })
                .collect(),
            advisories: &report.advisories,
            errors: report.errors.iter().map(ErrorJson::from).collect(),
        }
    }
}

impl<'a> From<&'a ValidationError> for ErrorJson<'a> {
    fn from(error: &'a ValidationError) -> Self {
        Self {
            error,
            message: error.to_string(),
            hint: ErrorReporter::hint(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Validator;

    fn gcp_snapshot() -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot {
            cloud_provider: Some(String::from("gcp")),
            ..ConfigSnapshot::default()
        };
        snapshot.gcp.project_id = Some(String::from("my-gcp-project"));
        snapshot.gcp.secret_id = Some(String::from("medplum-server-config"));
        snapshot.ingress.domain = Some(String::from("medplum.example.com"));
        snapshot.service_account.annotations = Some(
            [(
                String::from("iam.gke.io/gcp-service-account"),
                String::from("medplum-server@my-gcp-project.iam.gserviceaccount.com"),
            )]
            .into_iter()
            .collect(),
        );
        snapshot
    }

    #[test]
    fn test_report_json_shape() {
        let report = Validator::new().validate_aggregate(&ConfigSnapshot {
            cloud_provider: Some(String::from("aws")),
            ..ConfigSnapshot::default()
        });
        let output = OutputFormatter::new(OutputFormat::Json).format_report(&report);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["status"], "invalid");
        assert_eq!(json["errors"][0]["kind"], "UnsupportedValue");
        assert_eq!(json["errors"][0]["field"], "cloudProvider");
        assert!(json["errors"][0]["hint"].as_str().unwrap().contains("--set cloudProvider=gcp"));
        assert_eq!(json["rules"][0]["status"], "failed");
    }

    #[test]
    fn test_failure_json() {
        let err = ValidationError::missing("gcp.projectId", "a GCP project ID", "my-gcp-project");
        let output = OutputFormatter::new(OutputFormat::Json).format_failure(&err, "abc");
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["status"], "invalid");
        assert_eq!(json["fingerprint"], "abc");
        assert_eq!(json["errors"][0]["kind"], "MissingRequiredField");
        assert_eq!(json["errors"][0]["message"], "gcp.projectId is required but not set");
    }

    #[test]
    fn test_report_text_valid() {
        let report = Validator::new().validate(&gcp_snapshot()).unwrap();
        let output = OutputFormatter::new(OutputFormat::Text).format_report(&report);

        assert!(output.contains("Values are valid"));
        assert!(output.contains("cloud-provider"));
        assert!(!output.contains("error["));
    }

    #[test]
    fn test_rules_json() {
        let listing = Validator::new().applicability(&gcp_snapshot());
        let output = OutputFormatter::new(OutputFormat::Json).format_rules(&listing);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json.as_array().unwrap().len(), listing.len());
        assert_eq!(json[0]["rule"], "cloud-provider");
        assert_eq!(json[0]["applies"], true);
    }

    #[test]
    fn test_snapshot_text_is_yaml() {
        let snapshot = gcp_snapshot();
        let output = OutputFormatter::new(OutputFormat::Text).format_snapshot(&snapshot, "abc");

        assert!(output.starts_with("# fingerprint: abc\n"));
        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert!(parsed.is_mapping());
    }
}
