//! Candidate selection over the release list.

use crate::types::{Release, VersionConstraint};

/// Yield every release eligible for an install attempt, lazily and in the
/// list's own order (newest first, as returned by the API; no re-sorting).
pub fn candidates<'a>(
    releases: &'a [Release],
    constraint: &'a VersionConstraint,
) -> impl Iterator<Item = &'a Release> {
    releases
        .iter()
        .filter(move |release| constraint.is_candidate(release))
}
