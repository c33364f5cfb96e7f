use std::collections::HashMap;

use anyhow::Context;
use clap::Subcommand;

use mailpool_core::types::Status;
use mailpool_registry::RegistryClient;

use crate::output::print_json;

#[derive(Subcommand)]
pub enum TagsSubcommand {
    /// Create any missing status labels in the registry
    Init {
        /// Registry API key
        #[arg(long, env = "MAILPOOL_API_KEY")]
        key: String,
        /// Registry base URL
        #[arg(long, env = "MAILPOOL_BASE_URL", default_value = mailpool_registry::DEFAULT_BASE_URL)]
        base_url: String,
    },

    /// Move accounts off legacy status-* labels, then delete those tags
    Migrate {
        /// Registry API key
        #[arg(long, env = "MAILPOOL_API_KEY")]
        key: String,
        /// Registry base URL
        #[arg(long, env = "MAILPOOL_BASE_URL", default_value = mailpool_registry::DEFAULT_BASE_URL)]
        base_url: String,
        /// Report what would change without touching the registry
        #[arg(long)]
        dry_run: bool,
    },
}

pub fn run(subcmd: TagsSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TagsSubcommand::Init { key, base_url } => init(&key, &base_url, json),
        TagsSubcommand::Migrate {
            key,
            base_url,
            dry_run,
        } => migrate(&key, &base_url, dry_run, json),
    }
}

fn status_color(status: Status) -> &'static str {
    match status {
        Status::Sending => "#10B981",
        Status::Benched => "#6B7280",
        Status::Warming => "#3B82F6",
        Status::Sick => "#EF4444",
        Status::Dead => "#111827",
    }
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(key: &str, base_url: &str, json: bool) -> anyhow::Result<()> {
    let client = RegistryClient::new(base_url, key)?;
    let existing = client
        .list_tags()
        .context("failed to list tags from the registry")?;

    let mut created = Vec::new();
    let mut present = Vec::new();
    for &status in Status::all() {
        let label = status.label();
        if existing.iter().any(|t| t.label == label) {
            present.push(label);
        } else {
            client
                .create_tag(label, status_color(status))
                .with_context(|| format!("failed to create tag '{label}'"))?;
            created.push(label);
        }
    }

    if json {
        return print_json(&serde_json::json!({
            "created": created,
            "existing": present,
        }));
    }
    for label in &present {
        println!("exists:  {label}");
    }
    for label in &created {
        println!("created: {label}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// migrate
// ---------------------------------------------------------------------------

fn migrate(key: &str, base_url: &str, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let client = RegistryClient::new(base_url, key)?;
    let tags = client
        .list_tags()
        .context("failed to list tags from the registry")?;

    let mut current: HashMap<Status, String> = HashMap::new();
    let mut legacy: HashMap<String, Status> = HashMap::new();
    for tag in &tags {
        if let Some(status) = Status::from_label(&tag.label) {
            if tag.label == status.label() {
                current.insert(status, tag.id.clone());
            } else if tag.label == status.legacy_label() {
                legacy.insert(tag.id.clone(), status);
            }
        }
    }

    if legacy.is_empty() {
        if json {
            return print_json(&serde_json::json!({ "migrated": 0, "deleted": [] }));
        }
        println!("No legacy status tags found.");
        return Ok(());
    }

    // Every legacy label needs a current-scheme tag to land on.
    for status in legacy.values() {
        if !current.contains_key(status) {
            anyhow::bail!(
                "missing current tag for '{}' (run 'mailpool tags init' first)",
                status.label()
            );
        }
    }

    let records = client
        .list_accounts()
        .context("failed to list accounts from the registry")?;

    let mut migrated = 0usize;
    for record in &records {
        let ids = record.tag_ids();
        if !ids.iter().any(|id| legacy.contains_key(id)) {
            continue;
        }
        let mut next: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            let replacement = match legacy.get(id) {
                Some(status) => current[status].clone(),
                None => id.clone(),
            };
            if !next.contains(&replacement) {
                next.push(replacement);
            }
        }
        migrated += 1;
        if dry_run {
            if !json {
                println!("would update: {}", record.email);
            }
        } else {
            client
                .set_account_tags(&record.email, &next)
                .with_context(|| format!("failed to update tags for {}", record.email))?;
        }
    }

    let mut deleted = Vec::new();
    for (id, status) in &legacy {
        deleted.push(status.legacy_label());
        if dry_run {
            if !json {
                println!("would delete: {}", status.legacy_label());
            }
        } else {
            client
                .delete_tag(id)
                .with_context(|| format!("failed to delete tag '{}'", status.legacy_label()))?;
        }
    }
    deleted.sort_unstable();

    if json {
        return print_json(&serde_json::json!({
            "migrated": migrated,
            "deleted": deleted,
            "dry_run": dry_run,
        }));
    }
    if dry_run {
        println!("Dry run: {migrated} account(s) would migrate.");
    } else {
        println!("{migrated} account(s) migrated, {} legacy tag(s) deleted.", deleted.len());
    }
    Ok(())
}
