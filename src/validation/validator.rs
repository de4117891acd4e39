//! The rule pipeline.
//!
//! Runs every rule in a fixed order against one snapshot. The default pass is
//! fail-fast: the first applicable rule that fails ends it. An aggregate pass
//! is available for callers that want every failure at once.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ConfigSnapshot, SnapshotHasher};
use crate::error::ValidationError;
use crate::rules::{standard_rules, Advisory, Rule};

/// How a single rule fared in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// The rule applied and its check succeeded.
    Passed,
    /// The rule's applicability predicate did not hold.
    Skipped,
    /// The rule applied and its check failed.
    Failed,
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Status of one rule in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEvaluation {
    /// 1-based position in the pipeline.
    pub order: usize,
    /// Rule name.
    pub rule: &'static str,
    /// Outcome.
    pub status: RuleStatus,
}

/// Whether a rule applies to a snapshot, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleApplicability {
    /// 1-based position in the pipeline.
    pub order: usize,
    /// Rule name.
    pub rule: &'static str,
    /// Rule description.
    pub description: &'static str,
    /// Whether the applicability predicate holds.
    pub applies: bool,
}

/// Result of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Fingerprint of the validated snapshot.
    pub fingerprint: String,
    /// Per-rule outcomes, in pipeline order.
    pub rules: Vec<RuleEvaluation>,
    /// Non-fatal findings.
    pub advisories: Vec<Advisory>,
    /// Fatal findings; empty unless produced by an aggregate pass.
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Returns true if no fatal error was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of rules whose check ran.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.rules
            .iter()
            .filter(|r| r.status != RuleStatus::Skipped)
            .count()
    }
}

/// Single rule outcome.
enum Outcome {
    Skipped,
    Passed(Vec<Advisory>),
    Failed(ValidationError),
}

/// Ordered rule pipeline.
#[derive(Debug)]
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
    hasher: SnapshotHasher,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Creates a validator with the standard rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rules(standard_rules())
    }

    /// Creates a validator running `rules` in the given order.
    #[must_use]
    pub fn with_rules(rules: Vec<Box<dyn Rule>>) -> Self {
        Self {
            rules,
            hasher: SnapshotHasher::new(),
        }
    }

    /// Runs a fail-fast pass.
    ///
    /// # Errors
    ///
    /// Returns the error of the first applicable rule whose check fails.
    pub fn validate(&self, snapshot: &ConfigSnapshot) -> Result<ValidationReport, ValidationError> {
        let mut report = self.empty_report(snapshot);

        for (i, rule) in self.rules.iter().enumerate() {
            match evaluate(rule.as_ref(), snapshot) {
                Outcome::Skipped => report.rules.push(entry(i, rule.as_ref(), RuleStatus::Skipped)),
                Outcome::Passed(advisories) => {
                    report.rules.push(entry(i, rule.as_ref(), RuleStatus::Passed));
                    report.advisories.extend(advisories);
                }
                Outcome::Failed(error) => return Err(error),
            }
        }

        debug!(
            "Validation passed ({} of {} rules applied)",
            report.applied_count(),
            report.rules.len()
        );
        Ok(report)
    }

    /// Runs every rule and collects every failure.
    ///
    /// The first error, if any, is the one [`Validator::validate`] would
    /// return.
    #[must_use]
    pub fn validate_aggregate(&self, snapshot: &ConfigSnapshot) -> ValidationReport {
        let mut report = self.empty_report(snapshot);

        for (i, rule) in self.rules.iter().enumerate() {
            let status = match evaluate(rule.as_ref(), snapshot) {
                Outcome::Skipped => RuleStatus::Skipped,
                Outcome::Passed(advisories) => {
                    report.advisories.extend(advisories);
                    RuleStatus::Passed
                }
                Outcome::Failed(error) => {
                    report.errors.push(error);
                    RuleStatus::Failed
                }
            };
            report.rules.push(entry(i, rule.as_ref(), status));
        }

        report
    }

    /// Lists every rule with whether it applies to `snapshot`.
    #[must_use]
    pub fn applicability(&self, snapshot: &ConfigSnapshot) -> Vec<RuleApplicability> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| RuleApplicability {
                order: i + 1,
                rule: rule.name(),
                description: rule.description(),
                applies: rule.applies(snapshot),
            })
            .collect()
    }

    fn empty_report(&self, snapshot: &ConfigSnapshot) -> ValidationReport {
        ValidationReport {
            fingerprint: self.hasher.hash_snapshot(snapshot),
            rules: Vec::with_capacity(self.rules.len()),
            advisories: Vec::new(),
            errors: Vec::new(),
        }
    }
}

fn entry(index: usize, rule: &dyn Rule, status: RuleStatus) -> RuleEvaluation {
    RuleEvaluation {
        order: index + 1,
        rule: rule.name(),
        status,
    }
}

fn evaluate(rule: &dyn Rule, snapshot: &ConfigSnapshot) -> Outcome {
    if !rule.applies(snapshot) {
        debug!("Skipping rule {} (not applicable)", rule.name());
        return Outcome::Skipped;
    }

    match rule.check(snapshot) {
        Ok(advisories) => {
            for advisory in &advisories {
                warn!("{}: {} ({})", advisory.field, advisory.message, advisory.value);
            }
            debug!("Rule {} passed", rule.name());
            Outcome::Passed(advisories)
        }
        Err(error) => {
            debug!("Rule {} failed on {}", rule.name(), error.field_path());
            Outcome::Failed(error)
        }
    }
}

/// Validates a snapshot with the standard rule set.
///
/// This is the gate the rendering stage calls once per render attempt.
///
/// # Errors
///
/// Returns the first rule failure; rendering must not proceed.
pub fn validate_all(snapshot: &ConfigSnapshot) -> Result<(), ValidationError> {
    Validator::new().validate(snapshot).map(|_| ())
}
