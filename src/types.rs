use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A published release as returned by the GitHub releases listing, newest
/// first. The fields are taken verbatim from the API response and never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub id: u64,
    /// Tag string, e.g. "v2.5.0".
    pub name: String,
    #[serde(default)]
    pub prerelease: bool,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("requested version '{version}' does not start with required version prefix '{prefix}'")]
pub struct InvalidVersion {
    pub version: String,
    pub prefix: String,
}

/// The version the caller asked for: an optional exact tag plus the prefix
/// this build of the action supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    /// Exact tag requested by the caller; `None` means "latest stable
    /// matching the prefix". Empty strings are normalized to `None` before
    /// construction.
    pub explicit: Option<String>,
    pub required_prefix: String,
}

impl VersionConstraint {
    pub fn new(explicit: Option<String>, required_prefix: impl Into<String>) -> Self {
        Self {
            explicit: explicit.filter(|v| !v.is_empty()),
            required_prefix: required_prefix.into(),
        }
    }

    /// Configuration check run once, before any network access.
    pub fn validate(&self) -> Result<(), InvalidVersion> {
        match &self.explicit {
            Some(version) if !version.starts_with(&self.required_prefix) => Err(InvalidVersion {
                version: version.clone(),
                prefix: self.required_prefix.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Whether a release is eligible for an install attempt.
    ///
    /// Inclusive-or: an exact name match counts even for a prerelease or a
    /// tag outside the prefix. Because `validate()` already rejected
    /// explicit versions outside the prefix, the exact-match arm is only
    /// reachable for prefixed tags; the OR is kept as-is since it decides
    /// which releases are attempted when several stable tags share the
    /// prefix.
    pub fn is_candidate(&self, release: &Release) -> bool {
        let exact = self
            .explicit
            .as_deref()
            .is_some_and(|wanted| release.name == wanted);
        exact || (!release.prerelease && release.name.starts_with(&self.required_prefix))
    }

    /// Human-readable description of what is being looked for.
    pub fn describe(&self) -> String {
        match &self.explicit {
            Some(version) => format!("version {}", version),
            None => format!("latest stable version starting with {}", self.required_prefix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: &str, prerelease: bool) -> Release {
        Release {
            id: 1,
            name: name.to_string(),
            prerelease,
        }
    }

    #[test]
    fn test_explicit_version_must_match_prefix() {
        let constraint = VersionConstraint::new(Some("v1.0.0".to_string()), "v2.");
        let err = constraint.validate().unwrap_err();
        assert_eq!(err.version, "v1.0.0");
        assert_eq!(err.prefix, "v2.");
    }

    #[test]
    fn test_empty_explicit_version_is_unset() {
        let constraint = VersionConstraint::new(Some(String::new()), "v2.");
        assert_eq!(constraint.explicit, None);
        assert!(constraint.validate().is_ok());
    }

    #[test]
    fn test_prefixed_explicit_version_validates() {
        let constraint = VersionConstraint::new(Some("v2.3.0".to_string()), "v2.");
        assert!(constraint.validate().is_ok());
    }

    #[test]
    fn test_stable_prefixed_release_is_candidate() {
        let constraint = VersionConstraint::new(None, "v2.");
        assert!(constraint.is_candidate(&release("v2.1.0", false)));
        assert!(!constraint.is_candidate(&release("v1.9.0", false)));
    }

    #[test]
    fn test_prerelease_is_not_candidate_without_exact_match() {
        let constraint = VersionConstraint::new(None, "v2.");
        assert!(!constraint.is_candidate(&release("v2.2.0-rc1", true)));
    }

    #[test]
    fn test_exact_match_admits_prerelease() {
        let constraint = VersionConstraint::new(Some("v2.2.0-rc1".to_string()), "v2.");
        assert!(constraint.is_candidate(&release("v2.2.0-rc1", true)));
        // Other prereleases are still excluded.
        assert!(!constraint.is_candidate(&release("v2.3.0-rc1", true)));
    }
}
