//! A single install attempt against one candidate release.

use crate::download::{download_file, expose_binary, extract_archive};
use crate::github::GithubClient;
use crate::platform::PlatformTarget;
use crate::types::Release;
use std::fs;
use thiserror::Error;

/// Outcome of one failed attempt, one variant per failure point. The
/// orchestrator's driver loop consumes these and decides whether to move on
/// to the next candidate release.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to list assets for release {release}: {cause}")]
    AssetList {
        release: String,
        cause: anyhow::Error,
    },
    #[error("release {release} has no asset ending in '{suffix}'")]
    NoMatchingAsset { release: String, suffix: String },
    #[error("failed to download {asset}: {cause}")]
    Download {
        asset: String,
        cause: anyhow::Error,
    },
    #[error("failed to install {asset}: {cause}")]
    Extract {
        asset: String,
        cause: anyhow::Error,
    },
}

/// Try to install the tool from one release: list its assets, pick the one
/// matching the platform suffix, download it to the fixed temporary path,
/// unpack it into the install directory and put the binary on the search
/// path.
///
/// Side effects are irreversible on partial failure; a later attempt for a
/// different release simply writes over the same paths.
pub async fn install_from_release(
    client: &GithubClient,
    org: &str,
    repo: &str,
    release: &Release,
    target: &PlatformTarget,
) -> Result<(), InstallError> {
    let assets = client
        .list_assets(org, repo, release.id)
        .await
        .map_err(|cause| InstallError::AssetList {
            release: release.name.clone(),
            cause,
        })?;

    // First asset in listed order whose name carries the platform suffix.
    let asset = assets
        .iter()
        .find(|asset| asset.name.ends_with(&target.asset_suffix))
        .ok_or_else(|| InstallError::NoMatchingAsset {
            release: release.name.clone(),
            suffix: target.asset_suffix.clone(),
        })?;

    tracing::info!("Selected asset {} from release {}", asset.name, release.name);

    download_file(&asset.browser_download_url, client.token(), &target.archive_path)
        .await
        .map_err(|cause| InstallError::Download {
            asset: asset.name.clone(),
            cause,
        })?;

    extract_archive(&target.archive_path, &target.install_dir, target.os)
        .and_then(|()| expose_binary(target))
        .map_err(|cause| InstallError::Extract {
            asset: asset.name.clone(),
            cause,
        })?;

    // A leftover archive is not a correctness problem; surface it and move on.
    if let Err(err) = fs::remove_file(&target.archive_path) {
        tracing::warn!(
            "Could not remove downloaded archive {}: {}",
            target.archive_path.display(),
            err
        );
    }

    Ok(())
}
