mod cmd;
mod executor;
mod output;
mod snapshot;

use clap::{Parser, Subcommand};
use cmd::{config::ConfigSubcommand, tags::TagsSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "mailpool",
    about = "Mailbox pool lifecycle manager — classify, rotate, and repair sending accounts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file path
    #[arg(
        long,
        global = true,
        env = "MAILPOOL_CONFIG",
        default_value = "mailpool.yaml"
    )]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one evaluation cycle against the registry and apply the decisions
    Run {
        /// Registry API key
        #[arg(long, env = "MAILPOOL_API_KEY")]
        key: String,

        /// Registry base URL
        #[arg(long, env = "MAILPOOL_BASE_URL", default_value = mailpool_registry::DEFAULT_BASE_URL)]
        base_url: String,

        /// Evaluate and print decisions without applying them
        #[arg(long)]
        dry_run: bool,

        /// Write the run's decisions to this file as JSON lines
        #[arg(long, value_name = "PATH")]
        log: Option<PathBuf>,
    },

    /// Evaluate a pool from a local snapshot without touching the registry
    Plan {
        /// JSON file holding an array of registry account records
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,
    },

    /// List accounts with their effective status, health, and age
    Accounts {
        /// Registry API key
        #[arg(long, env = "MAILPOOL_API_KEY")]
        key: String,

        /// Registry base URL
        #[arg(long, env = "MAILPOOL_BASE_URL", default_value = mailpool_registry::DEFAULT_BASE_URL)]
        base_url: String,
    },

    /// Manage the status label vocabulary in the registry
    Tags {
        #[command(subcommand)]
        subcommand: TagsSubcommand,
    },

    /// Manage the local configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // Keep --json output machine-readable: info-level progress lines are
    // only the default for a human-facing run.
    let default_level = match &cli.command {
        Commands::Run { .. } if !cli.json => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run {
            key,
            base_url,
            dry_run,
            log,
        } => cmd::run::run(
            &cli.config,
            &key,
            &base_url,
            dry_run,
            log.as_deref(),
            cli.json,
        ),
        Commands::Plan { snapshot } => cmd::plan::run(&cli.config, &snapshot, cli.json),
        Commands::Accounts { key, base_url } => {
            cmd::accounts::run(&cli.config, &key, &base_url, cli.json)
        }
        Commands::Tags { subcommand } => cmd::tags::run(subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&cli.config, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
