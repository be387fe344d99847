/// Media Player CLI - scripted player sessions
use anyhow::Context;
use clap::{Parser, Subcommand};
use media_player::OBSERVED_ATTRIBUTES;
use media_player_cli::{load_config, parse_script, run_session};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "media-player-cli")]
#[command(about = "Run scripted sessions against the media player core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session script and print the final state as JSON
    Run {
        /// Script path
        script: PathBuf,
        /// Configuration file path
        #[arg(short, long, env = "MEDIA_PLAYER_CONFIG")]
        config: Option<PathBuf>,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Configuration file path
        #[arg(short, long, env = "MEDIA_PLAYER_CONFIG")]
        config: Option<PathBuf>,
    },
    /// List the observed attribute names
    Attributes,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_player=info,media_player_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            script,
            config,
            pretty,
        } => {
            let config = load_config(config.as_deref())?;
            let source = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let steps = parse_script(&source)
                .with_context(|| format!("Invalid script {}", script.display()))?;

            let report = run_session(config, &steps).context("Session aborted")?;

            let json = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{json}");
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Attributes => {
            for name in OBSERVED_ATTRIBUTES {
                println!("{name}");
            }
        }
    }

    Ok(())
}
