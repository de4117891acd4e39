//! CPU and memory quantity grammars.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::{ConfigSnapshot, Quantities};
use crate::error::ValidationError;

use super::{CheckResult, Rule};

// Literal patterns; construction cannot fail.
#[allow(clippy::expect_used)]
static CPU_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?m?$").expect("cpu pattern"));

#[allow(clippy::expect_used)]
static MEMORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+([KMGT]i?)?$").expect("memory pattern"));

const CPU_EXPECTED: &str =
    "a whole or decimal number of cores, optionally suffixed with `m` for millicores";
const CPU_EXAMPLE: &str = "500m";
const MEMORY_EXPECTED: &str =
    "an integer, optionally followed by K, M, G or T and an optional `i` for binary units";
const MEMORY_EXAMPLE: &str = "512Mi";

/// Returns true if `value` is a valid CPU quantity (`500m`, `1`, `1.5`).
#[must_use]
pub fn is_valid_cpu(value: &str) -> bool {
    CPU_RE.is_match(value)
}

/// Returns true if `value` is a valid memory quantity (`512Mi`, `1Gi`, `2G`).
#[must_use]
pub fn is_valid_memory(value: &str) -> bool {
    MEMORY_RE.is_match(value)
}

/// Checks the shape of resource limits and requests.
///
/// Applies only when both sections are present. Limits are not compared
/// against requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceQuantityRule;

impl ResourceQuantityRule {
    fn check_section(section: &str, quantities: &Quantities) -> Result<(), ValidationError> {
        if let Some(cpu) = quantities.cpu.as_deref()
            && !is_valid_cpu(cpu)
        {
            return Err(ValidationError::format_mismatch(
                format!("deployment.resources.{section}.cpu"),
                cpu,
                CPU_EXPECTED,
                CPU_EXAMPLE,
            ));
        }

        if let Some(memory) = quantities.memory.as_deref()
            && !is_valid_memory(memory)
        {
            return Err(ValidationError::format_mismatch(
                format!("deployment.resources.{section}.memory"),
                memory,
                MEMORY_EXPECTED,
                MEMORY_EXAMPLE,
            ));
        }

        Ok(())
    }
}

impl Rule for ResourceQuantityRule {
    fn name(&self) -> &'static str {
        "resource-quantities"
    }

    fn description(&self) -> &'static str {
        "cpu and memory limits/requests use Kubernetes quantity syntax"
    }

    fn applies(&self, snapshot: &ConfigSnapshot) -> bool {
        snapshot.resources.limits.is_some() && snapshot.resources.requests.is_some()
    }

    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult {
        let sections = [
            ("limits", snapshot.resources.limits.as_ref()),
            ("requests", snapshot.resources.requests.as_ref()),
        ];

        for (section, quantities) in sections {
            if let Some(quantities) = quantities {
                Self::check_section(section, quantities)?;
            }
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn quantities(cpu: &str, memory: &str) -> Option<Quantities> {
        Some(Quantities {
            cpu: Some(cpu.to_string()),
            memory: Some(memory.to_string()),
        })
    }

    fn with_resources(limits: Option<Quantities>, requests: Option<Quantities>) -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::default();
        snapshot.resources.limits = limits;
        snapshot.resources.requests = requests;
        snapshot
    }

    #[test]
    fn test_cpu_grammar() {
        for valid in ["500m", "1", "1.5", "0.25", "2000m"] {
            assert!(is_valid_cpu(valid), "{valid} should be accepted");
        }
        for invalid in ["abc", "-1", "1x", "", "1.", ".5", "500 m", "1mm"] {
            assert!(!is_valid_cpu(invalid), "{invalid} should be rejected");
        }
    }

    #[test]
    fn test_memory_grammar() {
        for valid in ["512Mi", "1Gi", "2G", "1024", "64Ki", "1T"] {
            assert!(is_valid_memory(valid), "{valid} should be accepted");
        }
        for invalid in ["512mb", "1 GB", "", "1.5Gi", "Gi", "512m", "2GB"] {
            assert!(!is_valid_memory(invalid), "{invalid} should be rejected");
        }
    }

    #[test]
    fn test_applies_only_with_both_sections() {
        let rule = ResourceQuantityRule;
        assert!(!rule.applies(&with_resources(None, None)));
        assert!(!rule.applies(&with_resources(quantities("abc", "x"), None)));
        assert!(!rule.applies(&with_resources(None, quantities("abc", "x"))));
        assert!(rule.applies(&with_resources(
            quantities("1", "1Gi"),
            quantities("500m", "512Mi")
        )));
    }

    #[test]
    fn test_valid_resources_pass() {
        let snapshot = with_resources(quantities("1", "1Gi"), quantities("500m", "512Mi"));
        assert!(ResourceQuantityRule.check(&snapshot).is_ok());
    }

    #[test]
    fn test_request_below_limit_not_compared() {
        let snapshot = with_resources(quantities("100m", "128Mi"), quantities("4", "8Gi"));
        assert!(ResourceQuantityRule.check(&snapshot).is_ok());
    }

    #[test]
    fn test_invalid_cpu_names_field() {
        let snapshot = with_resources(quantities("1x", "1Gi"), quantities("500m", "512Mi"));
        let err = ResourceQuantityRule.check(&snapshot).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatMismatch);
        assert_eq!(err.field_path(), "deployment.resources.limits.cpu");
        assert_eq!(err.example(), "500m");
    }

    #[test]
    fn test_invalid_request_memory() {
        let snapshot = with_resources(quantities("1", "1Gi"), quantities("500m", "512mb"));
        let err = ResourceQuantityRule.check(&snapshot).unwrap_err();
        assert_eq!(err.field_path(), "deployment.resources.requests.memory");
        match err {
            ValidationError::FormatMismatch { value, .. } => assert_eq!(value, "512mb"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_limits_checked_before_requests() {
        let snapshot = with_resources(quantities("1", "1 GB"), quantities("abc", "512Mi"));
        let err = ResourceQuantityRule.check(&snapshot).unwrap_err();
        assert_eq!(err.field_path(), "deployment.resources.limits.memory");
    }

    #[test]
    fn test_absent_keys_skipped() {
        let snapshot = with_resources(Some(Quantities::default()), Some(Quantities::default()));
        assert!(ResourceQuantityRule.check(&snapshot).is_ok());
    }
}
