//! Run orchestrator: users → posts → assets.
//!
//! Per-asset, per-post and per-user failures are counted and the run goes on.
//! Authentication and backend failures end the run.

mod error;
mod event;
mod post;
mod summary;

pub use error::ArchiveError;
pub use event::ArchiveEvent;
pub use summary::{RunSummary, UserSummary};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::{resolve_user, ApiClient, ApiError, RawPost};
use crate::config::RunConfig;
use crate::decision::DownloadBackend;
use crate::executor::Executor;
use crate::ledger::{write_export, LinkLedger};
use crate::naming::LINKS_EXPORT_FILE;
use crate::persistence::Persistence;
use crate::transport::Transport;

pub struct Archiver {
    cfg: Arc<RunConfig>,
    api: ApiClient,
    persistence: Persistence,
    backend: Arc<dyn DownloadBackend>,
    executor: Arc<Executor>,
    events: Option<mpsc::Sender<ArchiveEvent>>,
}

impl Archiver {
    /// Opens the persistence backend selected by `cfg`.
    pub async fn new(cfg: Arc<RunConfig>, transport: Arc<dyn Transport>) -> Result<Self, ArchiveError> {
        let persistence = Persistence::open(&cfg).await.map_err(ArchiveError::backend)?;
        let backend = persistence.backend();
        let api = ApiClient::new(Arc::clone(&transport), &cfg);
        let executor = Arc::new(Executor::new(
            transport,
            cfg.credentials.clone(),
            cfg.output_dir.clone(),
            cfg.retry,
        ));
        Ok(Self {
            cfg,
            api,
            persistence,
            backend,
            executor,
            events: None,
        })
    }

    /// Sends progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<ArchiveEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    async fn emit(&self, event: ArchiveEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event).await;
        }
    }

    /// Archives every user in order.
    pub async fn archive_users(&self, users: &[String]) -> Result<RunSummary, ArchiveError> {
        let mut run = RunSummary::default();
        for input in users {
            run.users.push(self.archive_user(input).await?);
        }
        Ok(run)
    }

    /// Archives one creator, given by name or URL.
    pub async fn archive_user(&self, input: &str) -> Result<UserSummary, ArchiveError> {
        let Some(user) = resolve_user(input, &self.cfg.site_base) else {
            tracing::warn!(input = %input, "unsupported user");
            let mut summary = UserSummary::new(input);
            summary.error = Some(format!("unsupported user or URL: {}", input));
            self.emit(ArchiveEvent::UserFinished {
                summary: summary.clone(),
                links: Vec::new(),
            })
            .await;
            return Ok(summary);
        };

        tracing::info!(user = %user, "archiving user");
        self.emit(ArchiveEvent::UserStarted { user: user.clone() }).await;
        let mut summary = UserSummary::new(&user);

        let mut ledger = LinkLedger::open(self.persistence.link_store(&user))
            .await
            .map_err(ArchiveError::backend)?;
        let links_before = ledger.len();

        if let Err(e) = self.walk_posts(&user, &mut ledger, &mut summary).await {
            match e {
                Walk::Abort(e) => return Err(e),
                Walk::User(msg) => {
                    tracing::warn!(user = %user, error = %msg, "user not fully processed");
                    summary.error = Some(msg);
                }
            }
        }

        let links = ledger.export();
        summary.links_total = links.len() as u64;
        summary.links_new = (ledger.len() - links_before) as u64;
        let export_path = self.cfg.user_dir(&user).join(LINKS_EXPORT_FILE);
        if !links.is_empty() || export_path.exists() {
            if let Err(e) = write_export(&export_path, &links) {
                tracing::warn!(user = %user, error = %format!("{:#}", e), "link export failed");
                if summary.error.is_none() {
                    summary.error = Some(format!("link export: {:#}", e));
                }
            }
        }

        tracing::info!(
            user = %user,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            links = summary.links_total,
            "user done"
        );
        self.emit(ArchiveEvent::UserFinished {
            summary: summary.clone(),
            links,
        })
        .await;
        Ok(summary)
    }

    async fn walk_posts(
        &self,
        user: &str,
        ledger: &mut LinkLedger,
        summary: &mut UserSummary,
    ) -> Result<(), Walk> {
        let creator = self.api.creator(user).await.map_err(api_failure)?;
        let mut signed_query = match creator.signed_query {
            Some(q) => q,
            None => {
                tracing::warn!(user = %user, "creator record has no signed query; credentials may be stale");
                String::new()
            }
        };

        let mut offset: Option<String> = None;
        loop {
            let page = self
                .api
                .posts_page(user, offset.as_deref())
                .await
                .map_err(api_failure)?;
            let fetched = page.data.len();
            for (position, value) in page.data.iter().enumerate() {
                let raw = match RawPost::from_value(value) {
                    Ok(raw) => raw,
                    Err(e) => {
                        summary.failed += 1;
                        tracing::warn!(
                            user = %user,
                            position,
                            int_id = ?value.get("int_id"),
                            error = %e,
                            "malformed post skipped"
                        );
                        continue;
                    }
                };
                if let Some(q) = raw.signed_query.as_deref().filter(|q| !q.is_empty()) {
                    signed_query = q.to_string();
                }
                self.archive_post(user, &raw, &signed_query, ledger, summary)
                    .await
                    .map_err(Walk::Abort)?;
            }
            tracing::debug!(user = %user, posts = fetched, last = page.extra.is_last, "page done");
            match page.extra.offset {
                Some(next) if !page.extra.is_last && fetched > 0 => offset = Some(next),
                _ => break,
            }
        }
        Ok(())
    }
}

/// Why walking a creator's posts stopped early.
enum Walk {
    Abort(ArchiveError),
    User(String),
}

fn api_failure(e: ApiError) -> Walk {
    match e.unauthorized() {
        Some((url, _)) => Walk::Abort(ArchiveError::rejected(url)),
        None => Walk::User(e.to_string()),
    }
}
