use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::types::{AccountRecord, CampaignRecord, TagRecord};

pub const DEFAULT_BASE_URL: &str = "https://api.instantly.ai/api/v2";

const PAGE_LIMIT: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Page<T> {
    #[serde(default)]
    items: Vec<T>,
}

// ---------------------------------------------------------------------------
// RegistryClient
// ---------------------------------------------------------------------------

/// Blocking client for the account registry. One instance per run; all
/// calls carry the bearer key and a request timeout.
pub struct RegistryClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(RegistryClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
        })
    }

    // -- listing ------------------------------------------------------------

    pub fn list_accounts(&self) -> Result<Vec<AccountRecord>> {
        self.get_all("/accounts")
    }

    pub fn list_campaigns(&self) -> Result<Vec<CampaignRecord>> {
        self.get_all("/campaigns")
    }

    pub fn list_tags(&self) -> Result<Vec<TagRecord>> {
        let page: Page<TagRecord> = self.get("/custom-tags", &[])?;
        Ok(page.items)
    }

    /// Tag id to label, for resolving the opaque ids on account and
    /// campaign records.
    pub fn tag_map(&self) -> Result<HashMap<String, String>> {
        let tags = self.list_tags()?;
        Ok(tags.into_iter().map(|t| (t.id, t.label)).collect())
    }

    // -- tag management -----------------------------------------------------

    pub fn create_tag(&self, label: &str, color: &str) -> Result<TagRecord> {
        self.post_json("/custom-tags", &json!({ "label": label, "color": color }))
    }

    pub fn delete_tag(&self, tag_id: &str) -> Result<()> {
        let endpoint = format!("/custom-tags/{tag_id}");
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self.http.delete(&url).bearer_auth(&self.api_key).send()?;
        Self::check(&endpoint, resp)
    }

    // -- account updates ----------------------------------------------------

    /// Replace the account's full tag list. The registry has no incremental
    /// tag endpoint; callers add or remove by sending the edited list.
    pub fn set_account_tags(&self, email: &str, tag_ids: &[String]) -> Result<()> {
        self.post_unit("/accounts/update", &json!({ "email": email, "tags": tag_ids }))
    }

    pub fn set_warmup(&self, email: &str, enabled: bool) -> Result<()> {
        let flag = if enabled { 1 } else { 0 };
        self.post_unit(
            "/accounts/update",
            &json!({ "email": email, "warmup_status": flag }),
        )
    }

    /// The registry's account `status` field gates campaign participation:
    /// 1 sends in its campaigns, 0 sits them out.
    pub fn set_campaign_membership(&self, email: &str, enrolled: bool) -> Result<()> {
        let status = if enrolled { 1 } else { 0 };
        self.post_unit(
            "/accounts/update",
            &json!({ "email": email, "status": status }),
        )
    }

    // -- plumbing -----------------------------------------------------------

    fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(params)
            .send()?;
        Self::decode(endpoint, resp)
    }

    fn post_json<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;
        Self::decode(endpoint, resp)
    }

    fn post_unit<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()?;
        Self::check(endpoint, resp)
    }

    /// Fetch every page of a listing endpoint with limit/skip pagination.
    /// A short page ends the walk.
    fn get_all<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut skip = 0usize;
        loop {
            let params = [
                ("limit", PAGE_LIMIT.to_string()),
                ("skip", skip.to_string()),
            ];
            let page: Page<T> = self.get(endpoint, &params)?;
            let count = page.items.len();
            all.extend(page.items);
            if count < PAGE_LIMIT {
                break;
            }
            skip += PAGE_LIMIT;
        }
        debug!(endpoint, total = all.len(), "listing fetched");
        Ok(all)
    }

    fn decode<T: DeserializeOwned>(endpoint: &str, resp: reqwest::blocking::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Api {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                body: resp.text().unwrap_or_default(),
            });
        }
        Ok(resp.json()?)
    }

    fn check(endpoint: &str, resp: reqwest::blocking::Response) -> Result<()> {
        let status = resp.status();
        if !status.is_success() {
            return Err(RegistryError::Api {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
                body: resp.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
