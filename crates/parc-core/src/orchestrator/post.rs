//! One post: absorb links, then decide and fetch each asset.

use std::sync::Arc;

use tokio::task::JoinSet;

use super::{ArchiveError, ArchiveEvent, Archiver, UserSummary};
use crate::api::RawPost;
use crate::decision::{Decision, DownloadBackend, SkipReason, StoredAsset};
use crate::executor::Executor;
use crate::ledger::LinkLedger;
use crate::resolver::{resolve_post, AssetDescriptor, PostContext};
use crate::retry::FetchError;

enum Outcome {
    Skipped(SkipReason),
    Downloaded(StoredAsset),
    Failed(FetchError),
}

impl Archiver {
    pub(super) async fn archive_post(
        &self,
        user: &str,
        raw: &RawPost,
        signed_query: &str,
        ledger: &mut LinkLedger,
        summary: &mut UserSummary,
    ) -> Result<(), ArchiveError> {
        let ctx = PostContext {
            creator: user,
            site_base: &self.cfg.site_base,
            signed_query,
        };
        let post = resolve_post(raw, &ctx);
        summary.posts += 1;
        self.emit(ArchiveEvent::PostStarted {
            post_id: post.post_id,
            title: post.title.clone(),
            post_url: post.post_url.clone(),
            has_access: post.has_access,
            assets: post.assets.len(),
        })
        .await;

        ledger
            .record(post.post_id, &post.post_url, &post.links)
            .await
            .map_err(ArchiveError::backend)?;

        summary.failed += post.malformed.len() as u64;
        if !post.has_access {
            tracing::info!(post_id = post.post_id, "no access, assets skipped");
            summary.posts_no_access += 1;
            return Ok(());
        }

        for u in &post.unavailable {
            summary.unavailable += 1;
            self.emit(ArchiveEvent::AssetUnavailable {
                post_id: post.post_id,
                kind: u.kind,
                index: u.index,
                reason: u.reason,
            })
            .await;
        }

        let mut pending = post.assets.into_iter();
        let mut join_set = JoinSet::new();
        loop {
            while join_set.len() < self.cfg.workers {
                let Some(asset) = pending.next() else {
                    break;
                };
                let backend = Arc::clone(&self.backend);
                let executor = Arc::clone(&self.executor);
                join_set.spawn(async move {
                    let identity = asset.identity();
                    (identity, handle_asset(backend, executor, asset).await)
                });
            }

            let Some(joined) = join_set.join_next().await else {
                break;
            };
            let (identity, outcome) = match joined {
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(post_id = post.post_id, error = %e, "asset task failed");
                    summary.failed += 1;
                    continue;
                }
            };
            match outcome? {
                Outcome::Skipped(reason) => {
                    tracing::debug!(asset = %identity, "skipped");
                    summary.skipped += 1;
                    self.emit(ArchiveEvent::AssetSkipped { identity, reason }).await;
                }
                Outcome::Downloaded(stored) => {
                    summary.downloaded += 1;
                    summary.bytes += stored.size;
                    self.emit(ArchiveEvent::AssetDownloaded {
                        identity,
                        path: stored.path,
                        bytes: stored.size,
                    })
                    .await;
                }
                Outcome::Failed(e) => {
                    tracing::warn!(
                        post_id = identity.post_id,
                        kind = %identity.kind,
                        index = identity.index,
                        error = %e,
                        "asset failed"
                    );
                    summary.failed += 1;
                    self.emit(ArchiveEvent::AssetFailed {
                        identity,
                        error: e.to_string(),
                    })
                    .await;
                }
            }
        }
        Ok(())
    }
}

async fn handle_asset(
    backend: Arc<dyn DownloadBackend>,
    executor: Arc<Executor>,
    asset: AssetDescriptor,
) -> Result<Outcome, ArchiveError> {
    let decision = backend.decide(&asset).await.map_err(ArchiveError::backend)?;
    let reason = match decision {
        Decision::Skip(reason) => return Ok(Outcome::Skipped(reason)),
        Decision::Download(reason) => reason,
    };
    tracing::debug!(asset = %asset.identity(), reason = ?reason, "downloading");

    match executor.execute(&asset).await {
        Ok(stored) => {
            backend
                .commit(&asset, &stored)
                .await
                .map_err(ArchiveError::backend)?;
            Ok(Outcome::Downloaded(stored))
        }
        Err(e) if e.is_unauthorized() => {
            Err(ArchiveError::rejected(asset.primary_url().unwrap_or_default()))
        }
        Err(e) => Ok(Outcome::Failed(e)),
    }
}
