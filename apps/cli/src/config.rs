use std::{fs, path::Path};

use anyhow::{anyhow, bail, Context};
use client_core::DEFAULT_API_BASE_URL;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "vote-client.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: String,
    /// sqlite url of the session store; `None` means the per-user default.
    pub store_url: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_BASE_URL.into(),
            store_url: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    store_url: Option<String>,
}

impl ClientSettings {
    pub fn resolve_store_url(&self) -> anyhow::Result<String> {
        match &self.store_url {
            Some(url) if !url.trim().is_empty() => Ok(storage::sqlite_url_for_path(url)),
            _ => default_store_url(),
        }
    }
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

/// Defaults, then the settings file, then env vars. Later sources win.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_url {
                    settings.api_url = v;
                }
                if let Some(v) = file_cfg.store_url {
                    settings.store_url = Some(v);
                }
            }
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
        }
    }

    let read = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = read("VOTE_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = read("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = read("VOTE_STORE_URL") {
        settings.store_url = Some(v);
    }
    if let Some(v) = read("APP__STORE_URL") {
        settings.store_url = Some(v);
    }

    settings
}

/// Checks that `raw` is an absolute http(s) url and strips trailing slashes.
pub fn validate_api_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid api url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("api url must start with http:// or https://, got '{raw}'");
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn default_store_url() -> anyhow::Result<String> {
    let base = dirs::data_local_dir()
        .ok_or_else(|| anyhow!("unable to resolve local app data dir"))?;
    let path = base.join("mini_vote").join("session.db");
    Ok(storage::sqlite_url_for_path(&path.to_string_lossy()))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
