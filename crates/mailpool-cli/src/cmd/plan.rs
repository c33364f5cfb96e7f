use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::Utc;

use mailpool_core::cycle::evaluate_pool;
use mailpool_core::engine::Engine;

use crate::output::{print_decisions, print_json};
use crate::snapshot;

/// Evaluate a pool from a local snapshot, printing what a live run would
/// decide. Snapshots carry no campaign data, so every customer group is
/// treated as having active campaigns.
pub fn run(config_path: &Path, snapshot_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = super::load_checked_config(config_path)?;

    let records = snapshot::load_snapshot(snapshot_path)?;
    let accounts = snapshot::sanitize_accounts(&records, &HashMap::new());
    let groups: HashSet<String> = accounts
        .iter()
        .filter_map(|a| a.group_key().map(str::to_string))
        .collect();

    let engine = Engine::new(config);
    let decisions = evaluate_pool(&accounts, &groups, &engine, Utc::now());

    if json {
        print_json(&decisions)
    } else if decisions.is_empty() {
        println!("Pool is settled. No changes needed.");
        Ok(())
    } else {
        print_decisions(&decisions);
        println!("\n{} decision(s) for {} account(s).", decisions.len(), accounts.len());
        Ok(())
    }
}
