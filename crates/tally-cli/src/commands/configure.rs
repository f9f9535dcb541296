//! Configure command implementation.

use anyhow::{Context, Result};

use tally_core::{ApiKey, BaseUrl};

use crate::config::{self, StoredConfig};
use crate::output;

/// Store the key and base URL given by `--api-key` and `--base-url` (or
/// their environment variables).
pub fn run(api_key: Option<&str>, base_url: Option<&str>) -> Result<()> {
    let key = api_key.context("Missing --api-key")?;
    let key = ApiKey::new(key).context("Invalid API key")?;
    let base_url = base_url
        .map(|url| BaseUrl::new(url).context("Invalid base URL"))
        .transpose()?;

    let stored = StoredConfig {
        api_key: Some(key.expose().to_string()),
        base_url: base_url.as_ref().map(ToString::to_string),
    };
    let path = config::save_config(&stored).context("Failed to save config")?;

    output::saved(&path.display().to_string(), stored.base_url.as_deref());

    Ok(())
}
