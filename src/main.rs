use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use taurus_reset::{cli, config::TaurusConfig};
use tracing_subscriber::EnvFilter;

/// Reset Taurus Engine's message queues/exchanges, model checkpoints, and
/// repository database.
///
/// NOTE: must be executed while all Taurus Engine and Taurus Collector
/// services are stopped.
#[derive(Parser)]
#[command(name = "taurus-reset", version)]
struct Cli {
    /// Suppress confirmation prompt and proceed with this DESTRUCTIVE
    /// operation. This option is intended for scripting.
    #[arg(long = "suppress-prompt-and-obliterate")]
    suppress_prompt: bool,

    /// Config file (default: ~/.taurus/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<TaurusConfig> {
    match path {
        Some(path) => TaurusConfig::load_from(path),
        None => TaurusConfig::load(),
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let config = load_config(args.config.as_ref());

    // Log to stderr so stdout stays clean for the warning prompt.
    let level = config.as_ref().map_or("info", |c| c.logging.level.as_str());
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = config.and_then(|config| run(&config, args.suppress_prompt));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("taurus-reset failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &TaurusConfig, suppress_prompt: bool) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(cli::reset(config, suppress_prompt));
    // A timed-out prompt leaves a blocking stdin read behind; don't wait for it.
    runtime.shutdown_background();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_required_by_default() {
        let args = Cli::try_parse_from(["taurus-reset"]).unwrap();
        assert!(!args.suppress_prompt);
        assert!(args.config.is_none());
    }

    #[test]
    fn obliterate_flag_suppresses_prompt() {
        let args = Cli::try_parse_from([
            "taurus-reset",
            "--suppress-prompt-and-obliterate",
            "--config",
            "/etc/taurus.toml",
        ])
        .unwrap();
        assert!(args.suppress_prompt);
        assert_eq!(args.config, Some(PathBuf::from("/etc/taurus.toml")));
    }

    #[test]
    fn help_exits_successfully() {
        let err = Cli::try_parse_from(["taurus-reset", "--help"]).err().unwrap();
        assert_eq!(err.exit_code(), 0);
    }
}
