//! Horizontal pod autoscaler bounds.

use crate::config::ConfigSnapshot;
use crate::error::ValidationError;

use super::{Advisory, CheckResult, Rule};

/// Replica ceiling above which an advisory is raised.
pub const MAX_REPLICAS_ADVISORY: i64 = 100;

/// Checks replica bounds and utilization targets of an enabled autoscaler.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoscalingRule;

impl AutoscalingRule {
    fn check_percentage(field: &str, value: Option<i64>) -> Result<(), ValidationError> {
        match value {
            Some(v) if !(1..=100).contains(&v) => Err(ValidationError::range(
                field,
                v,
                "a percentage between 1 and 100",
                "80",
            )),
            _ => Ok(()),
        }
    }
}

impl Rule for AutoscalingRule {
    fn name(&self) -> &'static str {
        "autoscaling"
    }

    fn description(&self) -> &'static str {
        "autoscaler replica bounds and utilization targets are in range"
    }

    fn applies(&self, snapshot: &ConfigSnapshot) -> bool {
        snapshot.autoscaling.enabled
    }

    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult {
        let hpa = &snapshot.autoscaling;
        let mut advisories = Vec::new();

        if hpa.min_replicas < 1 {
            return Err(ValidationError::range(
                "deployment.autoscaling.minReplicas",
                hpa.min_replicas,
                "at least 1",
                "1",
            ));
        }

        if hpa.max_replicas < hpa.min_replicas {
            return Err(ValidationError::range(
                "deployment.autoscaling.maxReplicas",
                hpa.max_replicas,
                format!("at least minReplicas ({})", hpa.min_replicas),
                hpa.min_replicas.max(10).to_string(),
            ));
        }

        if hpa.max_replicas > MAX_REPLICAS_ADVISORY {
            advisories.push(Advisory {
                rule: self.name(),
                field: String::from("deployment.autoscaling.maxReplicas"),
                value: hpa.max_replicas.to_string(),
                message: format!(
                    "maxReplicas is above {MAX_REPLICAS_ADVISORY}; this may be unintentionally high"
                ),
            });
        }

        Self::check_percentage(
            "deployment.autoscaling.targetCPUUtilizationPercentage",
            hpa.target_cpu_utilization_percentage,
        )?;
        Self::check_percentage(
            "deployment.autoscaling.targetMemoryUtilizationPercentage",
            hpa.target_memory_utilization_percentage,
        )?;

        Ok(advisories)
    }
}
