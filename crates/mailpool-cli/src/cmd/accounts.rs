use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;

use mailpool_core::classifier::classify;
use mailpool_registry::RegistryClient;

use crate::output::{print_json, print_table};
use crate::snapshot;

#[derive(Serialize)]
struct AccountRow {
    email: String,
    status: Option<&'static str>,
    conflict: bool,
    health: u8,
    age_days: i64,
    group: Option<String>,
}

pub fn run(config_path: &Path, key: &str, base_url: &str, json: bool) -> anyhow::Result<()> {
    let config = super::load_checked_config(config_path)?;
    let client = RegistryClient::new(base_url, key)?;

    let tag_map = client
        .tag_map()
        .context("failed to list tags from the registry")?;
    let records = client
        .list_accounts()
        .context("failed to list accounts from the registry")?;
    let accounts = snapshot::sanitize_accounts(&records, &tag_map);

    let now = Utc::now();
    let mut rows: Vec<AccountRow> = accounts
        .iter()
        .map(|a| {
            let c = classify(&a.tags_resolved, a.health_score, config.warmup_threshold);
            AccountRow {
                email: a.email.clone(),
                status: c.effective.map(|s| s.as_str()),
                conflict: c.conflict,
                health: a.health_score,
                age_days: a.age_days(now),
                group: a.group_key().map(str::to_string),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.email.cmp(&b.email));

    if json {
        return print_json(&rows);
    }

    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.email.clone(),
                r.status.unwrap_or("-").to_string(),
                if r.conflict { "yes" } else { "" }.to_string(),
                r.health.to_string(),
                r.age_days.to_string(),
                r.group.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print_table(
        &["EMAIL", "STATUS", "CONFLICT", "HEALTH", "AGE(D)", "GROUP"],
        &table,
    );
    println!("\n{} account(s).", rows.len());
    Ok(())
}
