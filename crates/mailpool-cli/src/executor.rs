use std::collections::HashMap;

use mailpool_core::error::{PoolError, Result};
use mailpool_core::executor::ActionExecutor;
use mailpool_core::types::{MembershipChange, Status};
use mailpool_registry::{AccountRecord, RegistryClient, RegistryError, TagRecord};

struct AccountTags {
    email: String,
    tag_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// RegistryExecutor
// ---------------------------------------------------------------------------

/// Applies engine decisions against the live registry.
///
/// The registry stores tags as opaque id lists with a replace-all update
/// call, so the executor keeps each account's current id list from the
/// fetch, edits it locally, and pushes the whole list. Removing a status
/// strips its tags in both label schemes; adding one always uses the
/// current-scheme tag.
pub struct RegistryExecutor<'a> {
    client: &'a RegistryClient,
    /// Current-scheme tag id per status, used for adds.
    label_ids: HashMap<Status, String>,
    /// Every tag id that means this status, either scheme, used for removes.
    status_ids: HashMap<Status, Vec<String>>,
    accounts: HashMap<String, AccountTags>,
}

impl<'a> RegistryExecutor<'a> {
    pub fn new(
        client: &'a RegistryClient,
        tags: &[TagRecord],
        records: &[AccountRecord],
    ) -> Self {
        let mut label_ids = HashMap::new();
        let mut status_ids: HashMap<Status, Vec<String>> = HashMap::new();
        for tag in tags {
            if let Some(status) = Status::from_label(&tag.label) {
                status_ids.entry(status).or_default().push(tag.id.clone());
                if tag.label == status.label() {
                    label_ids.insert(status, tag.id.clone());
                }
            }
        }

        let accounts = records
            .iter()
            .map(|r| {
                let id = r.id.clone().unwrap_or_else(|| r.email.clone());
                let entry = AccountTags {
                    email: r.email.clone(),
                    tag_ids: r.tag_ids().to_vec(),
                };
                (id, entry)
            })
            .collect();

        RegistryExecutor {
            client,
            label_ids,
            status_ids,
            accounts,
        }
    }

    fn email(&self, account_id: &str) -> Result<&str> {
        self.accounts
            .get(account_id)
            .map(|a| a.email.as_str())
            .ok_or_else(|| unknown_account(account_id))
    }
}

fn unknown_account(account_id: &str) -> PoolError {
    PoolError::Executor(format!("account {account_id} not in the fetched pool"))
}

fn registry_err(err: RegistryError) -> PoolError {
    PoolError::Executor(err.to_string())
}

impl ActionExecutor for RegistryExecutor<'_> {
    fn add_tag(&mut self, account_id: &str, status: Status) -> Result<()> {
        let tag_id = self.label_ids.get(&status).cloned().ok_or_else(|| {
            PoolError::Executor(format!(
                "no registry tag for label '{}' (run 'mailpool tags init' first)",
                status.label()
            ))
        })?;
        let entry = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| unknown_account(account_id))?;
        if entry.tag_ids.contains(&tag_id) {
            return Ok(());
        }
        let mut next = entry.tag_ids.clone();
        next.push(tag_id);
        self.client
            .set_account_tags(&entry.email, &next)
            .map_err(registry_err)?;
        entry.tag_ids = next;
        Ok(())
    }

    fn remove_tag(&mut self, account_id: &str, status: Status) -> Result<()> {
        let doomed = self.status_ids.get(&status).cloned().unwrap_or_default();
        let entry = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| unknown_account(account_id))?;
        let next: Vec<String> = entry
            .tag_ids
            .iter()
            .filter(|id| !doomed.contains(id))
            .cloned()
            .collect();
        if next.len() == entry.tag_ids.len() {
            return Ok(());
        }
        self.client
            .set_account_tags(&entry.email, &next)
            .map_err(registry_err)?;
        entry.tag_ids = next;
        Ok(())
    }

    fn set_warmup(&mut self, account_id: &str, enabled: bool) -> Result<()> {
        let email = self.email(account_id)?;
        self.client.set_warmup(email, enabled).map_err(registry_err)
    }

    fn set_campaign_membership(
        &mut self,
        account_id: &str,
        change: MembershipChange,
    ) -> Result<()> {
        let email = self.email(account_id)?;
        let enrolled = matches!(change, MembershipChange::Add);
        self.client
            .set_campaign_membership(email, enrolled)
            .map_err(registry_err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
