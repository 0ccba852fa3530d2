//! GitHub API interaction module
//!
//! Provides the release and asset listing calls used to resolve a
//! downloadable build of the tool.

use crate::types::{Release, ReleaseAsset};
use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("setup-gotestfmt/", env!("CARGO_PKG_VERSION"));

/// Thin client over the GitHub REST API. Carries the optional bearer token
/// so authenticated calls are less likely to be rate limited on shared CI
/// runners.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Point the client at a different API base URL (mock servers in tests).
    pub fn with_api_url(token: Option<String>, api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error response".to_string());
            return Err(anyhow!("GitHub API request failed: {} - {}", status, body));
        }

        Ok(response.json().await?)
    }

    /// List the repository's releases, newest first.
    ///
    /// Only the first page (the service default, ~100 entries) is fetched;
    /// no pagination parameter is sent. A matching release beyond the first
    /// page is treated as not found.
    pub async fn list_releases(&self, org: &str, repo: &str) -> Result<Vec<Release>> {
        let url = format!("{}/repos/{}/{}/releases", self.api_url, org, repo);
        self.get_json(&url).await
    }

    /// List the assets attached to one release. Fetched lazily, per
    /// candidate, so releases that are never attempted cost no extra call.
    pub async fn list_assets(
        &self,
        org: &str,
        repo: &str,
        release_id: u64,
    ) -> Result<Vec<ReleaseAsset>> {
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.api_url, org, repo, release_id
        );
        self.get_json(&url).await
    }
}
