//! Normalized, read-only view of the chart values.
//!
//! A [`ConfigSnapshot`] is built once from [`ChartValues`] with every
//! documented default resolved. Fields that have no default stay `None` and are
//! only demanded by the rules that read them, through [`ConfigSnapshot::require`].

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ValidationError;

use super::values::{ChartValues, QuantityValues};

/// Default for `serviceAccount.create`.
pub const DEFAULT_SERVICE_ACCOUNT_CREATE: bool = true;
/// Default for `deployment.autoscaling.minReplicas`.
pub const DEFAULT_MIN_REPLICAS: i64 = 1;
/// Default for `deployment.autoscaling.maxReplicas`.
pub const DEFAULT_MAX_REPLICAS: i64 = 10;

/// Immutable configuration consumed by every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    /// Deployment target family.
    pub cloud_provider: Option<String>,
    /// Google Cloud identifiers.
    pub gcp: GcpSnapshot,
    /// Service account binding.
    pub service_account: ServiceAccountSnapshot,
    /// Container resources.
    pub resources: ResourcesSnapshot,
    /// Autoscaler settings.
    pub autoscaling: AutoscalingSnapshot,
    /// Ingress settings.
    pub ingress: IngressSnapshot,
}

/// Google Cloud identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcpSnapshot {
    /// GCP project identifier.
    pub project_id: Option<String>,
    /// Secret Manager secret identifier.
    pub secret_id: Option<String>,
}

/// Service account binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceAccountSnapshot {
    /// Whether the chart creates the account.
    pub create: bool,
    /// Explicit account name.
    pub name: Option<String>,
    /// Account annotations; `None` when the mapping is absent.
    pub annotations: Option<BTreeMap<String, String>>,
}

impl Default for ServiceAccountSnapshot {
    fn default() -> Self {
        Self {
            create: DEFAULT_SERVICE_ACCOUNT_CREATE,
            name: None,
            annotations: None,
        }
    }
}

/// Container resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourcesSnapshot {
    /// `deployment.resources.limits`, if the section is present.
    pub limits: Option<Quantities>,
    /// `deployment.resources.requests`, if the section is present.
    pub requests: Option<Quantities>,
}

/// A cpu/memory pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Quantities {
    /// CPU quantity.
    pub cpu: Option<String>,
    /// Memory quantity.
    pub memory: Option<String>,
}

/// Autoscaler settings with defaults resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingSnapshot {
    /// Whether the autoscaler is rendered.
    pub enabled: bool,
    /// Lower replica bound.
    pub min_replicas: i64,
    /// Upper replica bound.
    pub max_replicas: i64,
    /// CPU utilization target.
    #[serde(rename = "targetCPUUtilizationPercentage")]
    pub target_cpu_utilization_percentage: Option<i64>,
    /// Memory utilization target.
    #[serde(rename = "targetMemoryUtilizationPercentage")]
    pub target_memory_utilization_percentage: Option<i64>,
}

impl Default for AutoscalingSnapshot {
    fn default() -> Self {
        Self {
            enabled: false,
            min_replicas: DEFAULT_MIN_REPLICAS,
            max_replicas: DEFAULT_MAX_REPLICAS,
            target_cpu_utilization_percentage: None,
            target_memory_utilization_percentage: None,
        }
    }
}

/// Ingress settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngressSnapshot {
    /// Whether the ingress is rendered.
    pub deploy: bool,
    /// Public hostname.
    pub domain: Option<String>,
}

impl From<QuantityValues> for Quantities {
    fn from(values: QuantityValues) -> Self {
        Self {
            cpu: values.cpu,
            memory: values.memory,
        }
    }
}

impl ConfigSnapshot {
    /// Builds a snapshot from raw values, applying every documented default.
    #[must_use]
    pub fn from_values(values: ChartValues) -> Self {
        let gcp = values.gcp.unwrap_or_default();
        let service_account = values.service_account.unwrap_or_default();
        let deployment = values.deployment.unwrap_or_default();
        let resources = deployment.resources.unwrap_or_default();
        let autoscaling = deployment.autoscaling.unwrap_or_default();
        let ingress = values.ingress.unwrap_or_default();

        Self {
            cloud_provider: values.cloud_provider,
            gcp: GcpSnapshot {
                project_id: gcp.project_id,
                secret_id: gcp.secret_id,
            },
            service_account: ServiceAccountSnapshot {
                create: service_account
                    .create
                    .unwrap_or(DEFAULT_SERVICE_ACCOUNT_CREATE),
                name: service_account.name,
                annotations: service_account.annotations,
            },
            resources: ResourcesSnapshot {
                limits: resources.limits.map(Quantities::from),
                requests: resources.requests.map(Quantities::from),
            },
            autoscaling: AutoscalingSnapshot {
                enabled: autoscaling.enabled.unwrap_or(false),
                min_replicas: autoscaling.min_replicas.unwrap_or(DEFAULT_MIN_REPLICAS),
                max_replicas: autoscaling.max_replicas.unwrap_or(DEFAULT_MAX_REPLICAS),
                target_cpu_utilization_percentage: autoscaling.target_cpu_utilization_percentage,
                target_memory_utilization_percentage: autoscaling
                    .target_memory_utilization_percentage,
            },
            ingress: IngressSnapshot {
                deploy: ingress.deploy.unwrap_or(false),
                domain: ingress.domain,
            },
        }
    }

    /// Returns true when the deployment targets Google Cloud.
    #[must_use]
    pub fn is_gcp(&self) -> bool {
        self.cloud_provider.as_deref() == Some("gcp")
    }

    /// Returns the value of a field that has no default.
    ///
    /// Absent and blank values are both treated as not set.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` naming `field` when the value is absent
    /// or blank.
    pub fn require<'a>(
        value: Option<&'a str>,
        field: &str,
        expected: &str,
        example: &str,
    ) -> Result<&'a str, ValidationError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ValidationError::missing(field, expected, example)),
        }
    }

    /// Returns a service account annotation by key.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.service_account
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_applied_to_empty_values() {
        let snapshot = ConfigSnapshot::from_values(ChartValues::default());
        assert!(snapshot.cloud_provider.is_none());
        assert!(snapshot.service_account.create);
        assert!(!snapshot.autoscaling.enabled);
        assert_eq!(snapshot.autoscaling.min_replicas, 1);
        assert_eq!(snapshot.autoscaling.max_replicas, 10);
        assert!(!snapshot.ingress.deploy);
        assert!(snapshot.resources.limits.is_none());
        assert_eq!(snapshot, ConfigSnapshot::default());
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let yaml = r"
cloudProvider: gcp
serviceAccount:
  create: false
deployment:
  autoscaling:
    enabled: true
    maxReplicas: 4
";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        let snapshot = ConfigSnapshot::from_values(values);
        assert!(snapshot.is_gcp());
        assert!(!snapshot.service_account.create);
        assert!(snapshot.autoscaling.enabled);
        assert_eq!(snapshot.autoscaling.min_replicas, 1);
        assert_eq!(snapshot.autoscaling.max_replicas, 4);
    }

    #[test]
    fn test_empty_resource_section_is_present() {
        let yaml = r"
deployment:
  resources:
    limits: {}
";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        let snapshot = ConfigSnapshot::from_values(values);
        assert_eq!(snapshot.resources.limits, Some(Quantities::default()));
        assert!(snapshot.resources.requests.is_none());
    }

    #[test]
    fn test_require_rejects_blank() {
        let err = ConfigSnapshot::require(Some("  "), "gcp.projectId", "a project id", "my-project")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert_eq!(err.field_path(), "gcp.projectId");

        let ok = ConfigSnapshot::require(Some("p"), "gcp.projectId", "a project id", "my-project");
        assert_eq!(ok, Ok("p"));
    }

    #[test]
    fn test_annotation_lookup() {
        let mut snapshot = ConfigSnapshot::default();
        assert!(snapshot.annotation("iam.gke.io/gcp-service-account").is_none());

        snapshot.service_account.annotations = Some(BTreeMap::from([(
            String::from("iam.gke.io/gcp-service-account"),
            String::from("svc@p.iam.gserviceaccount.com"),
        )]));
        assert_eq!(
            snapshot.annotation("iam.gke.io/gcp-service-account"),
            Some("svc@p.iam.gserviceaccount.com")
        );
    }
}
