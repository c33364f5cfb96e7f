//! Boundary between raw registry records and the pool model: resolve tag
//! ids to labels, parse timestamps, clamp scores, and derive which customer
//! groups currently have campaigns running.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::warn;

use mailpool_core::account::Account;
use mailpool_core::types::Status;
use mailpool_registry::{AccountRecord, CampaignRecord};

/// Convert raw registry records into pool accounts. Records without a
/// parseable creation timestamp are skipped with a warning; everything else
/// degrades to a safe default (missing id falls back to the email, missing
/// score to 0, the score is clamped to 0..=100).
///
/// Tag ids with no entry in `tag_map` pass through unchanged, so offline
/// snapshots may carry plain labels with an empty map.
pub fn sanitize_accounts(
    records: &[AccountRecord],
    tag_map: &HashMap<String, String>,
) -> Vec<Account> {
    let mut accounts = Vec::with_capacity(records.len());
    for record in records {
        let created_at = match record.timestamp_created.as_deref() {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => dt.with_timezone(&Utc),
                Err(err) => {
                    warn!(email = %record.email, timestamp = raw, %err, "skipping account with bad timestamp");
                    continue;
                }
            },
            None => {
                warn!(email = %record.email, "skipping account without creation timestamp");
                continue;
            }
        };
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| record.email.clone());
        let score = record.stat_warmup_score.unwrap_or(0).clamp(0, 100) as u8;
        let tags: Vec<String> = record
            .tag_ids()
            .iter()
            .map(|tag_id| tag_map.get(tag_id).cloned().unwrap_or_else(|| tag_id.clone()))
            .collect();
        accounts.push(Account::new(id, record.email.clone(), created_at, score).with_tags(tags));
    }
    accounts
}

/// Customer groups with at least one active campaign. A campaign belongs to
/// a group when it carries the group's tag; status labels on campaigns are
/// ignored.
pub fn active_groups(
    campaigns: &[CampaignRecord],
    tag_map: &HashMap<String, String>,
) -> HashSet<String> {
    let mut groups = HashSet::new();
    for campaign in campaigns.iter().filter(|c| c.is_active()) {
        for tag_id in campaign.tag_ids() {
            let label = tag_map.get(tag_id).cloned().unwrap_or_else(|| tag_id.clone());
            if Status::from_label(&label).is_none() {
                groups.insert(label);
            }
        }
    }
    groups
}

/// Read a pool snapshot: a JSON array of registry account records, as
/// captured from a live listing or written by hand for planning.
pub fn load_snapshot(path: &Path) -> anyhow::Result<Vec<AccountRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let records: Vec<AccountRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("snapshot {} is not a JSON array of account records", path.display()))?;
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
