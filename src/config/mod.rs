//! Configuration module for the Medplum chart guard.
//!
//! This module handles everything between the values files and the rules:
//! - Parsing, layering and overriding `values.yaml`
//! - Building the normalized, read-only [`ConfigSnapshot`]
//! - Fingerprinting snapshots for run-to-run comparison

mod hash;
mod parser;
mod snapshot;
mod values;

pub use hash::SnapshotHasher;
pub use parser::{
    apply_env_overrides, apply_set_override, find_values_file, merge_values, ValuesParser,
    DEFAULT_VALUES_FILES, ENV_OVERRIDES,
};
pub use snapshot::{
    AutoscalingSnapshot, ConfigSnapshot, GcpSnapshot, IngressSnapshot, Quantities,
    ResourcesSnapshot, ServiceAccountSnapshot, DEFAULT_MAX_REPLICAS, DEFAULT_MIN_REPLICAS,
    DEFAULT_SERVICE_ACCOUNT_CREATE,
};
pub use values::{
    AutoscalingValues, ChartValues, DeploymentValues, GcpValues, IngressValues, QuantityValues,
    ResourcesValues, ServiceAccountValues,
};
