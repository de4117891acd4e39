//! Cloud provider selection.

use std::collections::BTreeSet;

use crate::config::ConfigSnapshot;
use crate::error::ValidationError;

use super::{CheckResult, Rule};

/// Providers the chart can render for out of the box.
pub const SUPPORTED_PROVIDERS: &[&str] = &["gcp"];

const ROADMAP_NOTE: &str =
    "Additional cloud providers are on the roadmap but not yet implemented.";

/// Requires `cloudProvider` to name a supported provider.
#[derive(Debug, Clone)]
pub struct CloudProviderRule {
    supported: BTreeSet<String>,
}

impl Default for CloudProviderRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudProviderRule {
    /// Creates the rule with the default supported set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            supported: SUPPORTED_PROVIDERS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Adds a provider to the supported set.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.supported.insert(provider.into());
        self
    }

    fn supported_list(&self) -> Vec<String> {
        self.supported.iter().cloned().collect()
    }
}

impl Rule for CloudProviderRule {
    fn name(&self) -> &'static str {
        "cloud-provider"
    }

    fn description(&self) -> &'static str {
        "cloudProvider names a supported deployment target"
    }

    fn applies(&self, _snapshot: &ConfigSnapshot) -> bool {
        true
    }

    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult {
        let supported = self.supported_list();
        let example = supported.first().cloned().unwrap_or_default();

        let provider = ConfigSnapshot::require(
            snapshot.cloud_provider.as_deref(),
            "cloudProvider",
            &format!("one of: {}", supported.join(", ")),
            &example,
        )?;

        if self.supported.contains(provider) {
            Ok(Vec::new())
        } else {
            Err(ValidationError::unsupported(
                "cloudProvider",
                provider,
                supported,
                Some(ROADMAP_NOTE.to_string()),
            ))
        }
    }
}
