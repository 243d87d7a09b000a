//! Immutable per-run configuration threaded through every component.

use std::path::PathBuf;
use std::time::Duration;

use super::{BackendKind, ParcConfig};
use crate::auth::Credentials;
use crate::retry::RetryPolicy;

/// Everything a run needs, resolved once from `config.toml` plus CLI flags.
///
/// Built before the run starts and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root output directory; each creator gets a sub-directory.
    pub output_dir: PathBuf,
    /// Ignore every skip decision and fetch all assets again.
    pub force_redownload: bool,
    pub backend: BackendKind,
    /// SQLite ledger path for database mode (None = XDG default).
    pub db_path: Option<PathBuf>,
    pub credentials: Credentials,
    pub api_base: String,
    pub site_base: String,
    pub posts_per_page: u32,
    /// Concurrent transfers per post, at least 1.
    pub workers: usize,
    pub retry: RetryPolicy,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub verify_recorded_sizes: bool,
}

impl RunConfig {
    /// Run configuration with every knob taken from `cfg`.
    pub fn new(cfg: &ParcConfig, output_dir: PathBuf, credentials: Credentials) -> Self {
        Self {
            output_dir,
            force_redownload: false,
            backend: cfg.backend.unwrap_or_default(),
            db_path: cfg.db_path.clone(),
            credentials,
            api_base: cfg.api_base.clone(),
            site_base: cfg.site_base.trim_end_matches('/').to_string(),
            posts_per_page: cfg.posts_per_page.max(1),
            workers: cfg.download_workers.max(1),
            retry: cfg.retry_policy(),
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            request_timeout: Duration::from_secs(cfg.request_timeout_secs),
            verify_recorded_sizes: cfg.verify_recorded_sizes,
        }
    }

    /// Directory holding one creator's archive.
    pub fn user_dir(&self, user: &str) -> PathBuf {
        self.output_dir.join(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CookieJar;

    #[test]
    fn run_config_takes_defaults_from_file_config() {
        let mut cfg = ParcConfig::default();
        cfg.site_base = "https://site.example/".to_string();
        cfg.download_workers = 0;
        cfg.backend = Some(BackendKind::Database);
        let run = RunConfig::new(
            &cfg,
            PathBuf::from("/archive"),
            Credentials::new("tok", CookieJar::default()),
        );
        assert_eq!(run.site_base, "https://site.example");
        assert_eq!(run.workers, 1);
        assert_eq!(run.backend, BackendKind::Database);
        assert!(!run.force_redownload);
        assert_eq!(run.user_dir("alice"), PathBuf::from("/archive/alice"));
    }
}
