use clap::Parser;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("SETUP_GOTESTFMT_GIT_TAG") {
        return tag;
    }

    // Not on a tag - include commit hash and branch (dev build)
    let commit = option_env!("SETUP_GOTESTFMT_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("SETUP_GOTESTFMT_GIT_BRANCH").unwrap_or("unknown");

    // Return a static string by leaking the formatted string
    // This is safe because it only happens once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "setup-gotestfmt")]
#[command(about = "Install the gotestfmt binary from GitHub Releases")]
#[command(version = get_version())]
pub struct Cli {
    /// GitHub token used as a bearer credential for API calls and downloads
    /// (falls back to INPUT_TOKEN, then GITHUB_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Exact release tag to install, e.g. 'v2.5.0' (falls back to
    /// INPUT_VERSION; default is the latest stable release)
    #[arg(long)]
    pub tag: Option<String>,

    /// GitHub organization hosting the releases (falls back to INPUT_ORG)
    #[arg(long)]
    pub org: Option<String>,

    /// Repository name within the organization (falls back to INPUT_REPO)
    #[arg(long)]
    pub repo: Option<String>,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long)]
    pub quiet: bool,
}
