//! GKE workload identity binding.

use crate::config::ConfigSnapshot;
use crate::error::ValidationError;

use super::{CheckResult, Rule};

/// Annotation binding the Kubernetes service account to a GCP identity.
pub const WORKLOAD_IDENTITY_ANNOTATION: &str = "iam.gke.io/gcp-service-account";

const FIELD: &str = "serviceAccount.annotations[\"iam.gke.io/gcp-service-account\"]";
const EXPECTED: &str = "a GCP service account email (must contain '@')";
const EXAMPLE: &str = "medplum-server@my-gcp-project.iam.gserviceaccount.com";

/// Requires the workload identity annotation with an email-like value.
///
/// Only the presence of `@` is checked; the domain suffix is not.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceAccountRule;

impl Rule for ServiceAccountRule {
    fn name(&self) -> &'static str {
        "service-account-identity"
    }

    fn description(&self) -> &'static str {
        "serviceAccount carries the iam.gke.io/gcp-service-account annotation"
    }

    fn applies(&self, snapshot: &ConfigSnapshot) -> bool {
        snapshot.is_gcp()
    }

    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult {
        let account = ConfigSnapshot::require(
            snapshot.annotation(WORKLOAD_IDENTITY_ANNOTATION),
            FIELD,
            EXPECTED,
            EXAMPLE,
        )?;

        if account.contains('@') {
            Ok(Vec::new())
        } else {
            Err(ValidationError::format_mismatch(FIELD, account, EXPECTED, EXAMPLE))
        }
    }
}
