use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use mailpool_core::account::Account;
use mailpool_core::cycle::evaluate_pool;
use mailpool_core::engine::{Decision, Engine};
use mailpool_core::executor::apply_decision;
use mailpool_core::io::atomic_write;
use mailpool_core::types::distinct_statuses;
use mailpool_registry::RegistryClient;

use crate::executor::RegistryExecutor;
use crate::output::{print_decisions, print_json};
use crate::snapshot;

/// One full lifecycle cycle: fetch the pool, evaluate it, and apply the
/// decisions back to the registry.
pub fn run(
    config_path: &Path,
    key: &str,
    base_url: &str,
    dry_run: bool,
    log: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let config = super::load_checked_config(config_path)?;
    let client = RegistryClient::new(base_url, key)?;

    let tags = client
        .list_tags()
        .context("failed to list tags from the registry")?;
    let tag_map: HashMap<String, String> = tags
        .iter()
        .map(|t| (t.id.clone(), t.label.clone()))
        .collect();
    let records = client
        .list_accounts()
        .context("failed to list accounts from the registry")?;
    let campaigns = client
        .list_campaigns()
        .context("failed to list campaigns from the registry")?;

    let accounts = snapshot::sanitize_accounts(&records, &tag_map);
    let groups = snapshot::active_groups(&campaigns, &tag_map);
    info!(
        accounts = accounts.len(),
        skipped = records.len() - accounts.len(),
        campaigns = campaigns.len(),
        active_groups = groups.len(),
        "pool fetched"
    );

    let engine = Engine::new(config);
    let decisions = evaluate_pool(&accounts, &groups, &engine, Utc::now());

    if let Some(path) = log {
        write_decision_log(path, &decisions)?;
        info!(path = %path.display(), count = decisions.len(), "decision log written");
    }

    if !json {
        if decisions.is_empty() {
            println!("Pool is settled. No changes needed.");
        } else {
            print_decisions(&decisions);
        }
    }

    let (applied, failed) = if dry_run {
        (0, 0)
    } else {
        let mut executor = RegistryExecutor::new(&client, &tags, &records);
        apply_all(&mut executor, &decisions, &accounts)
    };

    if json {
        print_json(&serde_json::json!({
            "accounts": accounts.len(),
            "decisions": decisions,
            "applied": applied,
            "failed": failed,
            "dry_run": dry_run,
        }))?;
    } else if dry_run {
        println!("\nDry run: {} decision(s), nothing applied.", decisions.len());
    } else if !decisions.is_empty() {
        println!("\nApplied {applied} of {} decision(s).", decisions.len());
    }

    if failed > 0 {
        anyhow::bail!("{failed} decision(s) failed to apply");
    }
    Ok(())
}

/// Apply every decision, continuing past per-account failures so one bad
/// account cannot wedge the rest of the pool.
fn apply_all(
    executor: &mut RegistryExecutor<'_>,
    decisions: &[Decision],
    accounts: &[Account],
) -> (usize, usize) {
    let by_id: HashMap<&str, &Account> = accounts.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut applied = 0usize;
    let mut failed = 0usize;
    for decision in decisions {
        let current = by_id
            .get(decision.account_id.as_str())
            .map(|a| distinct_statuses(&a.tags_resolved))
            .unwrap_or_default();
        match apply_decision(executor, decision, &current) {
            Ok(()) => applied += 1,
            Err(err) => {
                failed += 1;
                warn!(account = %decision.email, %err, "failed to apply decision");
            }
        }
    }
    (applied, failed)
}

/// One JSON record per line, written atomically so a crashed run never
/// leaves a half-written log.
fn write_decision_log(path: &Path, decisions: &[Decision]) -> anyhow::Result<()> {
    let mut lines = String::new();
    for decision in decisions {
        lines.push_str(&serde_json::to_string(decision)?);
        lines.push('\n');
    }
    atomic_write(path, lines.as_bytes())
        .with_context(|| format!("failed to write decision log {}", path.display()))
}
