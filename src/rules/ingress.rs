//! Ingress hostname.

use crate::config::ConfigSnapshot;
use crate::error::ValidationError;

use super::{CheckResult, Rule};

const FIELD: &str = "ingress.domain";
const EXPECTED: &str = "a DNS hostname: dot-separated labels of 1-63 letters, digits or \
                        inner hyphens";
const EXAMPLE: &str = "medplum.example.com";

/// Returns true if `name` is a DNS hostname.
///
/// One or more dot-separated labels, each 1-63 ASCII alphanumerics with
/// optional internal hyphens.
#[must_use]
pub fn is_valid_hostname(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    if label.is_empty() || label.len() > 63 {
        return false;
    }

    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }

    label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Requires a well-formed domain when an ingress is deployed.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngressDomainRule;

impl Rule for IngressDomainRule {
    fn name(&self) -> &'static str {
        "ingress-domain"
    }

    fn description(&self) -> &'static str {
        "ingress.domain is a valid DNS hostname when the ingress is deployed"
    }

    fn applies(&self, snapshot: &ConfigSnapshot) -> bool {
        snapshot.ingress.deploy
    }

    fn check(&self, snapshot: &ConfigSnapshot) -> CheckResult {
        let domain =
            ConfigSnapshot::require(snapshot.ingress.domain.as_deref(), FIELD, EXPECTED, EXAMPLE)?;

        if is_valid_hostname(domain) {
            Ok(Vec::new())
        } else {
            Err(ValidationError::format_mismatch(FIELD, domain, EXPECTED, EXAMPLE))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn deployed(domain: Option<&str>) -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::default();
        snapshot.ingress.deploy = true;
        snapshot.ingress.domain = domain.map(String::from);
        snapshot
    }

    #[test]
    fn test_valid_hostname() {
        assert!(is_valid_hostname("medplum.example.com"));
        assert!(is_valid_hostname("localhost"));
        assert!(is_valid_hostname("api-1.Medplum.io"));
        assert!(is_valid_hostname(&format!("{}.com", "a".repeat(63))));
    }

    #[test]
    fn test_invalid_hostname() {
        assert!(!is_valid_hostname(""));
        assert!(!is_valid_hostname("-bad-.com"));
        assert!(!is_valid_hostname("bad-.com"));
        assert!(!is_valid_hostname("example..com"));
        assert!(!is_valid_hostname("example.com."));
        assert!(!is_valid_hostname("under_score.com"));
        assert!(!is_valid_hostname("https://medplum.example.com"));
        assert!(!is_valid_hostname(&format!("{}.com", "a".repeat(64))));
    }

    #[test]
    fn test_not_deployed_not_applicable() {
        let mut snapshot = deployed(None);
        snapshot.ingress.deploy = false;
        assert!(!IngressDomainRule.applies(&snapshot));
    }

    #[test]
    fn test_empty_domain_missing() {
        for snapshot in [deployed(None), deployed(Some(""))] {
            let err = IngressDomainRule.check(&snapshot).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
            assert_eq!(err.field_path(), "ingress.domain");
        }
    }

    #[test]
    fn test_bad_domain_format() {
        let err = IngressDomainRule.check(&deployed(Some("-bad-.com"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatMismatch);
        assert_eq!(err.example(), "medplum.example.com");
    }

    #[test]
    fn test_good_domain() {
        assert!(IngressDomainRule.check(&deployed(Some("medplum.example.com"))).is_ok());
    }
}
