//! Configuration: the on-disk `config.toml` and the immutable per-run view.

mod run;

pub use run::RunConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Persistence backend deciding whether an asset is already archived.
///
/// Selected once per run; the two modes are never mixed for the same asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Probe the output directory: existence plus size comparison.
    #[default]
    Filesystem,
    /// Consult the SQLite download-record ledger.
    Database,
}

/// Global configuration loaded from `~/.config/parc/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcConfig {
    /// Base URL of the platform JSON API (trailing slash expected).
    pub api_base: String,
    /// Base URL of the public site, used to build post URLs for the link ledger.
    pub site_base: String,
    /// Page size requested from the post listing endpoint.
    pub posts_per_page: u32,
    /// Concurrent asset transfers per post (1 = sequential).
    pub download_workers: usize,
    /// Connect timeout for every HTTP request.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout for asset transfers.
    pub request_timeout_secs: u64,
    /// Default backend when `--use-db` is not given.
    #[serde(default)]
    pub backend: Option<BackendKind>,
    /// Relational ledger location; defaults to the XDG state dir.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Bearer token file; defaults to `token.txt` next to this config.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    /// Netscape cookie jar; defaults to `cookies.txt` next to this config.
    #[serde(default)]
    pub cookies_path: Option<PathBuf>,
    /// Database mode only: re-download recorded assets whose recorded size
    /// differs from the size the API now reports. Off by default.
    #[serde(default)]
    pub verify_recorded_sizes: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for ParcConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.boosty.to/v1/".to_string(),
            site_base: "https://boosty.to".to_string(),
            posts_per_page: 100,
            download_workers: 1,
            connect_timeout_secs: 30,
            request_timeout_secs: 3600,
            backend: None,
            db_path: None,
            token_path: None,
            cookies_path: None,
            verify_recorded_sizes: false,
            retry: None,
        }
    }
}

impl ParcConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().policy()
    }

    pub fn token_path(&self) -> Result<PathBuf> {
        match &self.token_path {
            Some(p) => Ok(p.clone()),
            None => default_config_file("token.txt"),
        }
    }

    pub fn cookies_path(&self) -> Result<PathBuf> {
        match &self.cookies_path {
            Some(p) => Ok(p.clone()),
            None => default_config_file("cookies.txt"),
        }
    }
}

fn default_config_file(name: &str) -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("parc")?;
    Ok(xdg_dirs.get_config_file(name))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("parc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ParcConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ParcConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ParcConfig = toml::from_str(&data)?;
    Ok(cfg)
}
