//! Snapshot fingerprinting.
//!
//! Produces a deterministic SHA-256 over every field the rules read, so two
//! validation runs can be compared by a short identifier.

use sha2::{Digest, Sha256};

use super::snapshot::{ConfigSnapshot, Quantities};

/// Hasher for computing snapshot fingerprints.
#[derive(Debug, Default)]
pub struct SnapshotHasher;

impl SnapshotHasher {
    /// Creates a new snapshot hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the hex fingerprint of a snapshot.
    #[must_use]
    pub fn hash_snapshot(&self, snapshot: &ConfigSnapshot) -> String {
        let mut hasher = Sha256::new();

        update_opt(&mut hasher, "cloudProvider", snapshot.cloud_provider.as_deref());
        update_opt(&mut hasher, "gcp.projectId", snapshot.gcp.project_id.as_deref());
        update_opt(&mut hasher, "gcp.secretId", snapshot.gcp.secret_id.as_deref());

        let account = &snapshot.service_account;
        update_field(&mut hasher, "serviceAccount.create", &[u8::from(account.create)]);
        update_opt(&mut hasher, "serviceAccount.name", account.name.as_deref());
        match &account.annotations {
            // BTreeMap iterates in key order
            Some(annotations) => {
                let count = u64::try_from(annotations.len()).unwrap_or(u64::MAX);
                update_field(&mut hasher, "serviceAccount.annotations", &count.to_be_bytes());
                for (key, value) in annotations {
                    update_field(&mut hasher, key, value.as_bytes());
                }
            }
            None => update_field(&mut hasher, "serviceAccount.annotations", b"none"),
        }

        update_quantities(&mut hasher, "limits", snapshot.resources.limits.as_ref());
        update_quantities(&mut hasher, "requests", snapshot.resources.requests.as_ref());

        let hpa = &snapshot.autoscaling;
        update_field(&mut hasher, "autoscaling.enabled", &[u8::from(hpa.enabled)]);
        update_field(&mut hasher, "autoscaling.minReplicas", &hpa.min_replicas.to_be_bytes());
        update_field(&mut hasher, "autoscaling.maxReplicas", &hpa.max_replicas.to_be_bytes());
        update_opt_int(&mut hasher, "autoscaling.targetCpu", hpa.target_cpu_utilization_percentage);
        update_opt_int(
            &mut hasher,
            "autoscaling.targetMemory",
            hpa.target_memory_utilization_percentage,
        );

        update_field(&mut hasher, "ingress.deploy", &[u8::from(snapshot.ingress.deploy)]);
        update_opt(&mut hasher, "ingress.domain", snapshot.ingress.domain.as_deref());

        hex::encode(hasher.finalize())
    }

    /// Returns the first 12 characters of a fingerprint.
    #[must_use]
    pub fn short(fingerprint: &str) -> &str {
        &fingerprint[..12.min(fingerprint.len())]
    }
}

/// Feeds a length-prefixed label and value so adjacent fields cannot collide.
fn update_field(hasher: &mut Sha256, label: &str, value: &[u8]) {
    hasher.update((label.len() as u64).to_be_bytes());
    hasher.update(label.as_bytes());
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value);
}

fn update_opt(hasher: &mut Sha256, label: &str, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            update_field(hasher, label, v.as_bytes());
        }
        None => {
            hasher.update([0u8]);
            update_field(hasher, label, &[]);
        }
    }
}

fn update_opt_int(hasher: &mut Sha256, label: &str, value: Option<i64>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            update_field(hasher, label, &v.to_be_bytes());
        }
        None => {
            hasher.update([0u8]);
            update_field(hasher, label, &[]);
        }
    }
}

fn update_quantities(hasher: &mut Sha256, section: &str, quantities: Option<&Quantities>) {
    match quantities {
        Some(q) => {
            hasher.update([1u8]);
            update_opt(hasher, &format!("{section}.cpu"), q.cpu.as_deref());
            update_opt(hasher, &format!("{section}.memory"), q.memory.as_deref());
        }
        None => {
            hasher.update([0u8]);
            update_field(hasher, section, &[]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_hash_deterministic() {
        let hasher = SnapshotHasher::new();
        let snapshot = ConfigSnapshot::default();

        let hash1 = hasher.hash_snapshot(&snapshot);
        let hash2 = hasher.hash_snapshot(&snapshot.clone());

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_hash_changes_with_field() {
        let hasher = SnapshotHasher::new();
        let base = ConfigSnapshot::default();

        let mut changed = base.clone();
        changed.ingress.domain = Some(String::from("medplum.example.com"));

        assert_ne!(hasher.hash_snapshot(&base), hasher.hash_snapshot(&changed));
    }

    #[test]
    fn test_absent_and_empty_sections_differ() {
        let hasher = SnapshotHasher::new();
        let base = ConfigSnapshot::default();

        let mut empty_limits = base.clone();
        empty_limits.resources.limits = Some(Quantities::default());

        assert_ne!(hasher.hash_snapshot(&base), hasher.hash_snapshot(&empty_limits));
    }

    #[test]
    fn test_annotation_entries_are_counted() {
        let hasher = SnapshotHasher::new();
        let mut absent = ConfigSnapshot::default();
        absent.ingress.domain = Some(String::from("medplum.example.com"));

        let mut empty = absent.clone();
        empty.service_account.annotations = Some(BTreeMap::new());

        let mut one = absent.clone();
        one.service_account.annotations =
            Some([(String::from("k"), String::from("v"))].into_iter().collect());

        let mut two = one.clone();
        if let Some(annotations) = two.service_account.annotations.as_mut() {
            annotations.insert(String::from("k2"), String::from("v2"));
        }

        let hashes = [
            hasher.hash_snapshot(&absent),
            hasher.hash_snapshot(&empty),
            hasher.hash_snapshot(&one),
            hasher.hash_snapshot(&two),
        ];
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_short() {
        assert_eq!(SnapshotHasher::short("abcdef0123456789"), "abcdef012345");
        assert_eq!(SnapshotHasher::short("abc"), "abc");
    }
}
