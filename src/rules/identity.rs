//! GCP project and secret identifiers.

use crate::config::ConfigSnapshot;

use super::{CheckResult, Rule};

/// Requires the GCP identifiers, and the ingress domain when an ingress is
/// deployed.
///
/// The domain pre-check overlaps with [`super::IngressDomainRule`]; this rule
/// owns the "domain is set" requirement for GCP deployments and the ingress
/// rule owns its shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcpIdentityRule;

impl Rule for GcpIdentityRule {
    fn name(&self) -> &'static str {
        "gcp-identity"
    }

    fn description(&self) -> &'static str {
        "gcp.projectId and gcp.secretId are set (and ingress.domain when deployed)"
    }

    fn applies(&self, snapshot: &ConfigSnapshot) -> bool {
        snapshot.is_gcp()
    }

    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult {
        ConfigSnapshot::require(
            snapshot.gcp.project_id.as_deref(),
            "gcp.projectId",
            "the ID of the GCP project hosting the deployment",
            "my-gcp-project",
        )?;

        ConfigSnapshot::require(
            snapshot.gcp.secret_id.as_deref(),
            "gcp.secretId",
            "the Secret Manager secret holding the server configuration",
            "medplum-server-config",
        )?;

        if snapshot.ingress.deploy {
            ConfigSnapshot::require(
                snapshot.ingress.domain.as_deref(),
                "ingress.domain",
                "the public hostname served by the ingress",
                "medplum.example.com",
            )?;
        }

        Ok(Vec::new())
    }
}
