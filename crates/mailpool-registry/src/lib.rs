//! Blocking client for the hosted account registry: account and campaign
//! listings, custom tag management, and the per-account update calls the
//! pool executor drives.

pub mod client;
pub mod error;
pub mod types;

pub use client::{RegistryClient, DEFAULT_BASE_URL};
pub use error::{RegistryError, Result};
pub use types::{AccountRecord, CampaignRecord, TagRecord};
