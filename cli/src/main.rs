//! daocore command line: validate a governance configuration or replay a
//! script of governance operations against it.

mod replay;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use daocore_governance::GovernanceConfig;
use daocore_utils::{format_blocks, init_logging, LogFormat};

use crate::replay::{Replayer, Script};

#[derive(Parser)]
#[command(name = "daocore", about = "Token-weighted governance state machine")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "DAOCORE_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json". Logs are written to stderr.
    #[arg(long, default_value = "human", env = "DAOCORE_LOG_FORMAT")]
    log_format: LogFormat,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate a configuration file and print the effective settings.
    Config {
        /// Path to a TOML configuration file.
        #[arg(long, env = "DAOCORE_CONFIG")]
        config: PathBuf,
    },
    /// Replay a JSON script and print one JSON outcome per step.
    Replay {
        /// Path to a TOML configuration file.
        #[arg(long, env = "DAOCORE_CONFIG")]
        config: PathBuf,

        /// Path to the JSON script.
        #[arg(long)]
        script: PathBuf,

        /// Exit with an error if any step was rejected.
        #[arg(long)]
        strict: bool,
    },
}

fn load_config(path: &Path) -> anyhow::Result<GovernanceConfig> {
    let config = GovernanceConfig::from_toml_file(path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        admin = %config.admin,
        duration = config.proposal_duration,
        quorum = config.quorum_threshold,
        "loaded config"
    );
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level);

    match cli.command {
        Command::Config { config } => {
            let config = load_config(&config)?;
            print!("{}", config.to_toml_string()?);
            println!("# voting window: {}", format_blocks(config.proposal_duration));
        }
        Command::Replay {
            config,
            script,
            strict,
        } => {
            let config = load_config(&config)?;
            let raw = std::fs::read_to_string(&script)
                .with_context(|| format!("reading script {}", script.display()))?;
            let script = Script::from_json(&raw)
                .with_context(|| format!("parsing script {}", script.display()))?;

            let mut replayer = Replayer::new(config, &script)?;
            let outcomes = replayer.run(script.steps);
            for outcome in &outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }

            let rejected = outcomes.iter().filter(|o| !o.ok).count();
            tracing::info!(
                steps = outcomes.len(),
                rejected,
                proposals = replayer.engine().proposal_count(),
                "replay finished"
            );
            if strict && rejected > 0 {
                anyhow::bail!("{rejected} of {} steps were rejected", outcomes.len());
            }
        }
    }

    Ok(())
}
