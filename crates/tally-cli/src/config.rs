//! Stored configuration.
//!
//! Settings are resolved with flags first, then environment variables (both
//! handled by clap), then the config file written by `tally configure`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tally_core::{ApiKey, BaseUrl};
use tally_http::ClientOptions;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Contents of `config.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "tally").context("Could not determine config directory")?;

    let config_dir = dirs.config_dir();
    fs::create_dir_all(config_dir).context("Failed to create config directory")?;

    Ok(config_dir.join("config.json"))
}

/// Save the config to disk, readable only by the current user.
pub fn save_config(config: &StoredConfig) -> Result<PathBuf> {
    let path = config_path()?;
    let json = serde_json::to_string_pretty(config)?;

    fs::write(&path, &json).context("Failed to write config file")?;

    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(path)
}

/// Load the config from disk, if it exists.
pub fn load_config() -> Result<Option<StoredConfig>> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read config file")?;
    let config = serde_json::from_str(&json).context("Invalid config file")?;
    debug!(path = %path.display(), "Loaded config");

    Ok(Some(config))
}

/// Build client options from flags or environment, falling back to the
/// stored config.
pub fn client_options(api_key: Option<&str>, base_url: Option<&str>) -> Result<ClientOptions> {
    let stored = load_config()?.unwrap_or_default();
    let mut options = ClientOptions::default();

    if let Some(url) = base_url.or(stored.base_url.as_deref()) {
        options.base_url = BaseUrl::new(url).context("Invalid base URL")?;
    }

    let key = api_key
        .or(stored.api_key.as_deref())
        .context("No API key. Run 'tally configure --api-key <KEY>' or set TALLY_API_KEY.")?;
    options.api_key = Some(ApiKey::new(key).context("Invalid API key")?);

    Ok(options)
}
