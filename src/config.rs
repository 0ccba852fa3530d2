use crate::cli::Cli;
use crate::types::VersionConstraint;
use std::env;

/// Name of the binary this action installs.
pub const TOOL_NAME: &str = "gotestfmt";

/// Version prefix this build of the action supports. An explicit version
/// outside this prefix is a configuration error.
pub const VERSION_PREFIX: &str = "v2.";

pub const DEFAULT_ORG: &str = "GoTestTools";
pub const DEFAULT_REPO: &str = "gotestfmt";

/// Resolved inputs for one run. CLI flags win; otherwise the GitHub Actions
/// `INPUT_*` environment is consulted, the way the runner passes action
/// inputs.
#[derive(Debug, Clone)]
pub struct SetupConfig {
    pub token: Option<String>,
    /// Exact release tag to install; empty/absent means latest stable.
    pub version: Option<String>,
    pub org: String,
    pub repo: String,
}

impl SetupConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let token = cli
            .token
            .clone()
            .or_else(|| input_from_env("token"))
            .or_else(|| nonempty_env("GITHUB_TOKEN"));
        let version = cli.tag.clone().or_else(|| input_from_env("version"));
        let org = cli
            .org
            .clone()
            .or_else(|| input_from_env("org"))
            .unwrap_or_else(|| DEFAULT_ORG.to_string());
        let repo = cli
            .repo
            .clone()
            .or_else(|| input_from_env("repo"))
            .unwrap_or_else(|| DEFAULT_REPO.to_string());

        Self {
            token,
            version,
            org,
            repo,
        }
    }

    pub fn version_constraint(&self) -> VersionConstraint {
        VersionConstraint::new(self.version.clone(), VERSION_PREFIX)
    }
}

/// Read a GitHub Actions input (`INPUT_<NAME>`), treating empty values as
/// unset the way the runner does for omitted inputs.
fn input_from_env(name: &str) -> Option<String> {
    nonempty_env(&format!("INPUT_{}", name.to_uppercase()))
}

fn nonempty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}
