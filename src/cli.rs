use crate::{
    banner::print_summary,
    config::{Config, Inputs},
    error::Result,
    git::GitCli,
    github::GitHubClient,
    publisher::{self, Outcome},
};

use clap::Parser;
use console::style;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

/// Validates the inputs, wires the real collaborators and publishes.
fn run(inputs: Inputs) -> Result<(Config, Outcome)> {
    let config = Config::from_inputs(inputs)?;
    info!(
        "updating {} in {}/{} to {} ({} field mapping(s))",
        config.file.display(),
        config.owner,
        config.repo,
        config.version,
        config.fields.len()
    );

    let git = GitCli::locate()?;
    let github = GitHubClient::new(&config.api_url, &config.token);
    let outcome = publisher::publish(&config, &github, &git)?;
    Ok((config, outcome))
}

/// Main CLI entry point for `formula-bump`.
///
/// This function:
/// 1. Parses inputs from flags and `INPUT_*` environment variables
///    (`--help`/`--version` exit here).
/// 2. Installs logging.
/// 3. Validates the configuration, decoding `fields` if given.
/// 4. Verifies that `git` is installed.
/// 5. Runs the publish sequence.
/// 6. Prints a summary box.
///
/// Returns `Ok(0)` on success, or `Err(())` after printing one red line
/// naming the failed step and its cause.
///
/// # Exit Codes
///
/// * `0` – The pull request was opened (or the dry run finished).
/// * Non-zero – Any failure along the way.
pub fn entry() -> std::result::Result<i32, ()> {
    let inputs = Inputs::parse();
    init_logging(inputs.verbose);

    match run(inputs) {
        Ok((config, outcome)) => {
            print_summary(&config, &outcome);
            Ok(0)
        }
        Err(e) => {
            eprintln!("{}", style(format!("❌ {}", e)).red().bold());
            Err(())
        }
    }
}
