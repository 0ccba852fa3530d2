use clap::Parser;
use setup_gotestfmt::cli::Cli;
use setup_gotestfmt::config::{SetupConfig, TOOL_NAME};
use setup_gotestfmt::github::GithubClient;
use setup_gotestfmt::platform::PlatformTarget;
use setup_gotestfmt::setup;
use std::env;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(&cli);

    let config = SetupConfig::from_cli(&cli);

    let target = match PlatformTarget::for_host(TOOL_NAME) {
        Ok(target) => target,
        Err(err) => fail(&err.to_string()),
    };

    let client = GithubClient::new(config.token.clone());

    match setup::run(&config, &client, &target).await {
        Ok(version) => {
            println!("Download successful. Installed {} {}.", TOOL_NAME, version);
        }
        Err(err) => fail(&err.to_string()),
    }
}

/// Report a fatal error through the calling environment's failure-signaling
/// mechanism. Under a GitHub Actions runner this is the `::error::`
/// workflow command plus a non-zero exit; elsewhere just the log and the
/// exit code.
fn fail(message: &str) -> ! {
    if env::var_os("GITHUB_ACTIONS").is_some() {
        println!("::error::{}", message);
    }
    tracing::error!("{}", message);
    std::process::exit(1);
}

fn setup_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}
