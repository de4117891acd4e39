//! Raw values types for the Medplum chart.
//!
//! These structs map to the chart's `values.yaml`. Every field is optional at
//! this layer; defaults are resolved once when the values are turned into a
//! [`super::ConfigSnapshot`]. Keys the guard does not inspect (image, env,
//! pod annotations, ...) are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Root of the chart values document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChartValues {
    /// Deployment target family (e.g. "gcp").
    #[serde(default, deserialize_with = "scalar_string")]
    pub cloud_provider: Option<String>,
    /// Google Cloud settings.
    #[serde(default)]
    pub gcp: Option<GcpValues>,
    /// Kubernetes service account settings.
    #[serde(default)]
    pub service_account: Option<ServiceAccountValues>,
    /// Deployment settings.
    #[serde(default)]
    pub deployment: Option<DeploymentValues>,
    /// Ingress settings.
    #[serde(default)]
    pub ingress: Option<IngressValues>,
}

/// Google Cloud identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GcpValues {
    /// GCP project identifier.
    #[serde(default, deserialize_with = "scalar_string")]
    pub project_id: Option<String>,
    /// Secret Manager secret holding the server configuration.
    #[serde(default, deserialize_with = "scalar_string")]
    pub secret_id: Option<String>,
}

/// Service account values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountValues {
    /// Whether the chart creates the service account.
    #[serde(default)]
    pub create: Option<bool>,
    /// Explicit service account name.
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,
    /// Annotations attached to the service account.
    #[serde(default)]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// Deployment values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentValues {
    /// Container resource limits and requests.
    #[serde(default)]
    pub resources: Option<ResourcesValues>,
    /// Horizontal pod autoscaler settings.
    #[serde(default)]
    pub autoscaling: Option<AutoscalingValues>,
}

/// Resource limits and requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcesValues {
    /// Upper bounds.
    #[serde(default)]
    pub limits: Option<QuantityValues>,
    /// Scheduling requests.
    #[serde(default)]
    pub requests: Option<QuantityValues>,
}

/// A cpu/memory pair of quantity strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuantityValues {
    /// CPU quantity (e.g. "500m").
    #[serde(default, deserialize_with = "scalar_string")]
    pub cpu: Option<String>,
    /// Memory quantity (e.g. "512Mi").
    #[serde(default, deserialize_with = "scalar_string")]
    pub memory: Option<String>,
}

/// Autoscaler values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingValues {
    /// Whether the autoscaler is rendered.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// Lower replica bound.
    #[serde(default)]
    pub min_replicas: Option<i64>,
    /// Upper replica bound.
    #[serde(default)]
    pub max_replicas: Option<i64>,
    /// CPU utilization target, in percent.
    #[serde(default, rename = "targetCPUUtilizationPercentage")]
    pub target_cpu_utilization_percentage: Option<i64>,
    /// Memory utilization target, in percent.
    #[serde(default, rename = "targetMemoryUtilizationPercentage")]
    pub target_memory_utilization_percentage: Option<i64>,
}

/// Ingress values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressValues {
    /// Whether the ingress and its certificate are rendered.
    #[serde(default)]
    pub deploy: Option<bool>,
    /// Public hostname.
    #[serde(default, deserialize_with = "scalar_string")]
    pub domain: Option<String>,
}

/// YAML scalar accepted in a string position.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// Accepts unquoted numbers and booleans where the chart expects a string.
///
/// `cpu: 1` and `projectId: 12345` are common in hand-written values files.
/// Unquoted floats are normalized the way the renderer would print them:
/// `.5` becomes `0.5`, `1.` becomes `1` and `1e3` becomes `1000`. Quoted
/// strings are kept verbatim.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar = Option::<Scalar>::deserialize(deserializer)?;
    Ok(scalar.map(|s| match s {
        Scalar::Text(text) => text,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(x) => x.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_scalars_become_strings() {
        let yaml = r"
gcp:
  projectId: 12345
deployment:
  resources:
    limits:
      cpu: 1.5
      memory: 512Mi
    requests:
      cpu: 1
";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        let gcp = values.gcp.unwrap();
        assert_eq!(gcp.project_id.as_deref(), Some("12345"));

        let resources = values.deployment.unwrap().resources.unwrap();
        assert_eq!(resources.limits.unwrap().cpu.as_deref(), Some("1.5"));
        assert_eq!(resources.requests.unwrap().cpu.as_deref(), Some("1"));
    }

    #[test]
    fn test_unquoted_floats_are_normalized() {
        let yaml = r#"
deployment:
  resources:
    limits:
      cpu: .5
      memory: 1Gi
    requests:
      cpu: 1.
"#;
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        let resources = values.deployment.unwrap().resources.unwrap();
        assert_eq!(resources.limits.unwrap().cpu.as_deref(), Some("0.5"));
        assert_eq!(resources.requests.unwrap().cpu.as_deref(), Some("1"));

        let values: ChartValues =
            serde_yaml::from_str("deployment:\n  resources:\n    limits:\n      cpu: 1e3\n")
                .unwrap();
        let limits = values.deployment.unwrap().resources.unwrap().limits.unwrap();
        assert_eq!(limits.cpu.as_deref(), Some("1000"));
    }

    #[test]
    fn test_quoted_quantities_kept_verbatim() {
        let yaml = "deployment:\n  resources:\n    limits:\n      cpu: \".5\"\n    requests:\n      cpu: \"1.\"\n";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        let resources = values.deployment.unwrap().resources.unwrap();
        assert_eq!(resources.limits.unwrap().cpu.as_deref(), Some(".5"));
        assert_eq!(resources.requests.unwrap().cpu.as_deref(), Some("1."));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let yaml = r"
cloudProvider: gcp
image:
  repository: medplum/medplum-server
  tag: latest
ingress:
  deploy: true
  domain: medplum.example.com
  tls: {}
";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(values.cloud_provider.as_deref(), Some("gcp"));
        assert_eq!(values.ingress.unwrap().deploy, Some(true));
    }

    #[test]
    fn test_null_string_is_none() {
        let yaml = "cloudProvider: ~\n";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        assert!(values.cloud_provider.is_none());
    }

    #[test]
    fn test_autoscaling_keys() {
        let yaml = r"
deployment:
  autoscaling:
    enabled: true
    minReplicas: 2
    targetCPUUtilizationPercentage: 80
";
        let values: ChartValues = serde_yaml::from_str(yaml).unwrap();
        let hpa = values.deployment.unwrap().autoscaling.unwrap();
        assert_eq!(hpa.min_replicas, Some(2));
        assert_eq!(hpa.max_replicas, None);
        assert_eq!(hpa.target_cpu_utilization_percentage, Some(80));
    }
}
