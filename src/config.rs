use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "gator_mail";
pub const API_URL_ENV: &str = "GATOR_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub redirect_uri: String,
    pub storage: StorageKind,
    pub request_timeout_secs: u64,
    pub callback_timeout_secs: u64,
    pub draft_tone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            redirect_uri: "http://127.0.0.1:5173/auth/callback".to_string(),
            storage: StorageKind::File,
            request_timeout_secs: 30,
            callback_timeout_secs: 120,
            draft_tone: "professional".to_string(),
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let p = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join(APP_DIR);
    fs::create_dir_all(&p)?;
    Ok(p)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Reads `path`, writing a template with the defaults first when it does not
/// exist yet. `GATOR_API_URL` overrides the base URL either way.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let mut cfg = if path.exists() {
        let s = fs::read_to_string(path)?;
        toml::from_str(&s)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))?
    } else {
        let sample = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&sample)?)?;
        log::info!("Created template config at {}", path.display());
        sample
    };

    if let Ok(url) = std::env::var(API_URL_ENV)
        && !url.trim().is_empty()
    {
        cfg.api_base_url = url.trim().to_string();
    }

    Ok(cfg)
}
