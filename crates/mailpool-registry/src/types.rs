use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AccountRecord
// ---------------------------------------------------------------------------

/// A mailbox account as the registry returns it. Wire data is messy:
/// identifiers may be absent, timestamps are strings, tags may be null.
/// Sanitizing this into a domain account is the consumer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    /// RFC 3339 creation timestamp, verbatim from the wire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_warmup_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warmup_status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    /// Tag ids, not labels. Resolve through the tag map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl AccountRecord {
    pub fn tag_ids(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// CampaignRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Registry campaign state code. 1 is a running campaign; everything
    /// else (draft, paused, completed) counts as inactive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl CampaignRecord {
    pub fn is_active(&self) -> bool {
        self.status == Some(1)
    }

    pub fn tag_ids(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// TagRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
