pub mod accounts;
pub mod config;
pub mod plan;
pub mod run;
pub mod tags;

use std::path::Path;

use anyhow::Context;
use tracing::{error, warn};

use mailpool_core::config::{PoolConfig, WarnLevel};

/// Load the pool config, falling back to defaults when the file is absent.
/// Validation errors abort; warnings are logged and tolerated.
pub(crate) fn load_checked_config(path: &Path) -> anyhow::Result<PoolConfig> {
    let config = PoolConfig::load_or_default(path)
        .with_context(|| format!("failed to load config {}", path.display()))?;

    let mut has_errors = false;
    for finding in config.validate() {
        match finding.level {
            WarnLevel::Warning => warn!("config: {}", finding.message),
            WarnLevel::Error => {
                has_errors = true;
                error!("config: {}", finding.message);
            }
        }
    }
    if has_errors {
        anyhow::bail!(
            "config {} has errors (see 'mailpool config validate')",
            path.display()
        );
    }
    Ok(config)
}
