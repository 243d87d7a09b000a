//! Backend selection. The only place that looks at [`BackendKind`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::archive_db::ArchiveDb;
use crate::config::{BackendKind, RunConfig};
use crate::decision::{DatabaseBackend, DownloadBackend, FilesystemBackend, ForceRedownload};
use crate::ledger::{DbLinkStore, FileLinkStore, LinkStore};

enum LinkStores {
    Files { output_dir: PathBuf },
    Database(ArchiveDb),
}

/// Download backend and link stores for one run, chosen once at startup.
pub struct Persistence {
    backend: Arc<dyn DownloadBackend>,
    links: LinkStores,
}

impl Persistence {
    /// Opens the configured backend. A database that cannot be opened is an
    /// error; there is no fallback to filesystem mode.
    pub async fn open(cfg: &RunConfig) -> Result<Self> {
        let backend: Arc<dyn DownloadBackend>;
        let links;
        match cfg.backend {
            BackendKind::Filesystem => {
                backend = Arc::new(FilesystemBackend::new(cfg.output_dir.clone()));
                links = LinkStores::Files {
                    output_dir: cfg.output_dir.clone(),
                };
            }
            BackendKind::Database => {
                let db = match &cfg.db_path {
                    Some(path) => ArchiveDb::open_at(path).await,
                    None => ArchiveDb::open_default().await,
                }
                .context("archive database unavailable")?;
                backend = Arc::new(DatabaseBackend::new(db.clone(), cfg.verify_recorded_sizes));
                links = LinkStores::Database(db);
            }
        }

        let backend: Arc<dyn DownloadBackend> = if cfg.force_redownload {
            Arc::new(ForceRedownload::new(backend))
        } else {
            backend
        };
        tracing::info!(
            backend = backend.name(),
            force = cfg.force_redownload,
            "persistence backend selected"
        );
        Ok(Self { backend, links })
    }

    pub fn backend(&self) -> Arc<dyn DownloadBackend> {
        Arc::clone(&self.backend)
    }

    /// Link store holding `creator`'s ledger.
    pub fn link_store(&self, creator: &str) -> Arc<dyn LinkStore> {
        match &self.links {
            LinkStores::Files { output_dir } => Arc::new(FileLinkStore::new(&output_dir.join(creator))),
            LinkStores::Database(db) => Arc::new(DbLinkStore::new(db.clone(), creator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CookieJar, Credentials};
    use crate::config::ParcConfig;
    use crate::decision::{Decision, DownloadReason};
    use crate::resolver::{AssetDescriptor, AssetKind, AssetSource, ExtensionSource};

    fn run_config(dir: &std::path::Path, backend: BackendKind, force: bool) -> RunConfig {
        let mut cfg = RunConfig::new(
            &ParcConfig::default(),
            dir.join("out"),
            Credentials::new("t", CookieJar::default()),
        );
        cfg.backend = backend;
        cfg.db_path = Some(dir.join("state").join("archive.db"));
        cfg.force_redownload = force;
        cfg
    }

    fn text_asset() -> AssetDescriptor {
        AssetDescriptor {
            creator: "alice".into(),
            post_id: 1,
            post_title: "t".into(),
            kind: AssetKind::Text,
            index: 0,
            filename: "post".into(),
            extension: ExtensionSource::Fixed("txt"),
            expected_size: Some(2),
            source: AssetSource::Inline("hi".into()),
        }
    }

    #[tokio::test]
    async fn selects_backend_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let fs = Persistence::open(&run_config(dir.path(), BackendKind::Filesystem, false))
            .await
            .unwrap();
        assert_eq!(fs.backend().name(), "filesystem");

        let db = Persistence::open(&run_config(dir.path(), BackendKind::Database, false))
            .await
            .unwrap();
        assert_eq!(db.backend().name(), "database");
        assert!(dir.path().join("state").join("archive.db").exists());
    }

    #[tokio::test]
    async fn force_wraps_selected_backend() {
        let dir = tempfile::tempdir().unwrap();
        let p = Persistence::open(&run_config(dir.path(), BackendKind::Filesystem, true))
            .await
            .unwrap();
        std::fs::create_dir_all(dir.path().join("out/alice")).unwrap();
        std::fs::write(dir.path().join("out/alice/1_t_0_post.txt"), "hi").unwrap();
        assert_eq!(
            p.backend().decide(&text_asset()).await.unwrap(),
            Decision::Download(DownloadReason::Forced)
        );
    }
}
