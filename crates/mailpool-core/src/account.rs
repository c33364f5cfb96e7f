use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Status;

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A sanitized mailbox account as the engine sees it. Construction happens at
/// the registry boundary: timestamps already parsed, missing health scores
/// already defaulted to zero, tag ids already resolved to labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Warmup health score, 0-100. Missing upstream data maps to 0 so the
    /// account reads as unhealthy rather than healthy.
    pub health_score: u8,
    /// Registry labels after tag-id resolution. May mix status labels from
    /// either label scheme with customer group labels.
    #[serde(default)]
    pub tags_resolved: Vec<String>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
        health_score: u8,
    ) -> Self {
        Account {
            id: id.into(),
            email: email.into(),
            created_at,
            health_score,
            tags_resolved: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags_resolved = tags;
        self
    }

    /// Whole days elapsed since the account was created. Negative when the
    /// registry reports a creation time in the future.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }

    /// Customer group this account belongs to: the first resolved label that
    /// is not a status label under either scheme. None means the account is
    /// ungrouped and rotates in the shared pool.
    pub fn group_key(&self) -> Option<&str> {
        self.tags_resolved
            .iter()
            .map(String::as_str)
            .find(|label| Status::from_label(label).is_none())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
