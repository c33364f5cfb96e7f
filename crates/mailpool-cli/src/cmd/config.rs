use std::path::Path;

use anyhow::Context;
use clap::Subcommand;

use mailpool_core::config::{PoolConfig, WarnLevel};
use mailpool_core::io;

use crate::output::print_json;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Write a commented default config if none exists
    Init,

    /// Validate the config for common mistakes
    Validate,
}

pub fn run(config_path: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Init => init(config_path),
        ConfigSubcommand::Validate => validate(config_path, json),
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = "\
# mailpool configuration
version: 1

# Health floor. Accounts scoring below this are marked sick and pulled
# from their campaigns.
warmup_threshold: 70

# A sick account must score strictly above this to come off the sick list.
health_recovery_threshold: 95

# A benched account at or above this score may return to sending.
health_return_threshold: 90

# Accounts younger than this many days stay in warmup.
min_age_days: 14

# Share of each bucket to keep benched for recovery. 0 disables rotation.
bench_percent: 0

# Treat the whole pool as one shared bucket, ignoring customer groups.
single_pool: false
";

fn init(path: &Path) -> anyhow::Result<()> {
    let created = io::write_if_missing(path, DEFAULT_CONFIG.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    if created {
        println!("created: {}", path.display());
    } else {
        println!("exists:  {}", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(path: &Path, json: bool) -> anyhow::Result<()> {
    let config = PoolConfig::load(path).context("failed to load config")?;
    let findings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": findings }))?;
    } else if findings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for f in &findings {
            let prefix = match f.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", f.message);
        }
    }

    if findings.iter().any(|f| f.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
