//! The rule set gating chart rendering.
//!
//! Each rule is a pure function of a [`ConfigSnapshot`]: an applicability
//! predicate plus a check that either passes (possibly with advisories) or
//! returns exactly one [`ValidationError`]. [`standard_rules`] returns them in
//! the order the validator runs them.

mod autoscaling;
mod cloud;
mod identity;
mod ingress;
mod quantity;
mod service_account;

pub use autoscaling::{AutoscalingRule, MAX_REPLICAS_ADVISORY};
pub use cloud::{CloudProviderRule, SUPPORTED_PROVIDERS};
pub use identity::GcpIdentityRule;
pub use ingress::{is_valid_hostname, IngressDomainRule};
pub use quantity::{is_valid_cpu, is_valid_memory, ResourceQuantityRule};
pub use service_account::{ServiceAccountRule, WORKLOAD_IDENTITY_ANNOTATION};

use serde::Serialize;
use std::fmt;

use crate::config::ConfigSnapshot;
use crate::error::ValidationError;

/// Outcome of a rule check: advisories on success, one error on failure.
pub type CheckResult = Result<Vec<Advisory>, ValidationError>;

/// A single named validation check.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Stable rule identifier.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    /// Whether the rule applies to this snapshot.
    fn applies(&self, snapshot: &ConfigSnapshot) -> bool;

    /// Runs the check. Only called when [`Rule::applies`] holds.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult;
}

/// A non-fatal finding that does not block rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advisory {
    /// Rule that raised it.
    pub rule: &'static str,
    /// Dotted path of the field.
    pub field: String,
    /// The value that triggered it.
    pub value: String,
    /// What may be wrong.
    pub message: String,
}

/// Returns the six standard rules in evaluation order.
#[must_use]
pub fn standard_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(CloudProviderRule::new()),
        Box::new(GcpIdentityRule),
        Box::new(ServiceAccountRule),
        Box::new(ResourceQuantityRule),
        Box::new(AutoscalingRule),
        Box::new(IngressDomainRule),
    ]
}
