use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Retry parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per file (including the first).
    pub max_attempts: u32,
    /// Upper bound in seconds of the random pause before every request attempt.
    pub politeness_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            politeness_delay_secs: 2.0,
        }
    }
}

/// Global configuration loaded from `~/.config/pemsdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PemsConfig {
    /// Portal root; login, listings, and relative file URLs all resolve against it.
    pub base_url: String,
    /// PeMS districts to walk, in order.
    pub districts: Vec<u32>,
    /// Years to walk for every district, in order.
    pub years: Vec<i32>,
    /// Last embedded file date to include (inclusive). Absent = no cutoff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff: Option<NaiveDate>,
    /// Receive buffer size in bytes; the body is written to disk in chunks of at most this size.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_chunk_size() -> usize {
    8192
}

impl Default for PemsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pems.dot.ca.gov/".to_string(),
            districts: vec![3, 4, 5, 6, 7, 8, 10, 11, 12],
            years: vec![2022],
            cutoff: NaiveDate::from_ymd_opt(2022, 8, 18),
            chunk_size: default_chunk_size(),
            retry: None,
        }
    }
}

impl PemsConfig {
    /// `base_url` parsed; everything the portal serves resolves against it.
    pub fn portal_url(&self) -> Result<Url> {
        Url::parse(&self.base_url).with_context(|| format!("invalid base_url {:?}", self.base_url))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pemsdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PemsConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PemsConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PemsConfig = toml::from_str(&data)?;
    Ok(cfg)
}
