//! The orchestrator: resolve a release, then attempt installs across
//! candidates until one succeeds or the retry budget is spent.

use crate::config::SetupConfig;
use crate::github::GithubClient;
use crate::install::{install_from_release, InstallError};
use crate::platform::{PlatformTarget, UnrecognizedPlatform};
use crate::selector::candidates;
use crate::types::{InvalidVersion, Release};
use std::future::Future;
use thiserror::Error;

/// Maximum number of failed install attempts tolerated across candidate
/// releases. The failure that pushes the counter past this is fatal and is
/// surfaced verbatim. Releases the selector never yields do not count.
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    InvalidVersion(#[from] InvalidVersion),
    #[error(transparent)]
    UnrecognizedPlatform(#[from] UnrecognizedPlatform),
    #[error("failed to list releases for {org}/{repo}: {cause}")]
    ReleaseList {
        org: String,
        repo: String,
        cause: anyhow::Error,
    },
    #[error("no release matching {wanted} found in the first page of {org}/{repo} releases")]
    NoMatch {
        wanted: String,
        org: String,
        repo: String,
    },
    #[error("all {attempts} matching release(s) failed to install; last error: {last}")]
    Exhausted { attempts: u32, last: InstallError },
    #[error("giving up after {attempts} failed install attempts: {last}")]
    RetriesExceeded { attempts: u32, last: InstallError },
}

/// How the candidate drive loop ended when it did not succeed. Mapped onto
/// [`SetupError`] by [`run`], which has the repository context.
#[derive(Debug)]
enum DriveFailure {
    NoMatch,
    Exhausted { attempts: u32, last: InstallError },
    RetriesExceeded { attempts: u32, last: InstallError },
}

/// Resolve and install the tool. Returns the name of the release that was
/// installed.
///
/// The constraint is validated before any network access; platform
/// detection happens in the caller so tests can substitute the target's
/// directories.
pub async fn run(
    config: &SetupConfig,
    client: &GithubClient,
    target: &PlatformTarget,
) -> Result<String, SetupError> {
    let constraint = config.version_constraint();
    constraint.validate()?;

    tracing::info!(
        "Downloading {} {} from {}/{}...",
        crate::config::TOOL_NAME,
        constraint.describe(),
        config.org,
        config.repo
    );

    let releases = client
        .list_releases(&config.org, &config.repo)
        .await
        .map_err(|cause| SetupError::ReleaseList {
            org: config.org.clone(),
            repo: config.repo.clone(),
            cause,
        })?;

    let installed = drive(candidates(&releases, &constraint), |release| {
        install_from_release(client, &config.org, &config.repo, release, target)
    })
    .await
    .map_err(|failure| match failure {
        DriveFailure::NoMatch => SetupError::NoMatch {
            wanted: constraint.describe(),
            org: config.org.clone(),
            repo: config.repo.clone(),
        },
        DriveFailure::Exhausted { attempts, last } => SetupError::Exhausted { attempts, last },
        DriveFailure::RetriesExceeded { attempts, last } => {
            SetupError::RetriesExceeded { attempts, last }
        }
    })?;

    Ok(installed.name.clone())
}

/// Attempt candidates in order, holding an explicit failure counter.
/// Every failed attempt counts toward [`MAX_RETRIES`], whatever the
/// failure point was.
async fn drive<'a, I, F, Fut>(releases: I, mut attempt: F) -> Result<&'a Release, DriveFailure>
where
    I: Iterator<Item = &'a Release>,
    F: FnMut(&'a Release) -> Fut,
    Fut: Future<Output = Result<(), InstallError>>,
{
    let mut failures = 0u32;
    let mut last_error: Option<InstallError> = None;

    for release in releases {
        tracing::info!("Attempting install from release {}...", release.name);
        match attempt(release).await {
            Ok(()) => return Ok(release),
            Err(err) => {
                failures += 1;
                if failures > MAX_RETRIES {
                    return Err(DriveFailure::RetriesExceeded {
                        attempts: failures,
                        last: err,
                    });
                }
                tracing::warn!(
                    "Install from release {} failed (failure {} of {} tolerated): {}",
                    release.name,
                    failures,
                    MAX_RETRIES,
                    err
                );
                last_error = Some(err);
            }
        }
    }

    match last_error {
        None => Err(DriveFailure::NoMatch),
        Some(last) => Err(DriveFailure::Exhausted {
            attempts: failures,
            last,
        }),
    }
}
