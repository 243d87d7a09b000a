//! Fetch & persist: transfer approved assets to their canonical path.
//!
//! Remote bodies stream into `<stem>.part` and are renamed into place only
//! after the transport reports a complete body, so a failed or truncated
//! transfer leaves nothing a later size probe could take for a complete file.

mod fetch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::auth::Credentials;
use crate::decision::StoredAsset;
use crate::resolver::{AssetDescriptor, AssetSource};
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::storage::write_atomically;
use crate::transport::Transport;

pub struct Executor {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    output_dir: PathBuf,
    retry: RetryPolicy,
}

impl Executor {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        output_dir: PathBuf,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            credentials,
            output_dir,
            retry,
        }
    }

    /// Fetches `asset` and writes it under `<output>/<creator>/`.
    ///
    /// Transient errors are retried per the policy. When the primary URL is
    /// exhausted and the asset has a fallback URL, one more attempt goes there.
    pub async fn execute(&self, asset: &AssetDescriptor) -> Result<StoredAsset, FetchError> {
        let dir = self.output_dir.join(&asset.creator);
        match &asset.source {
            AssetSource::Inline(body) => {
                let path = asset.canonical_path(&dir, None);
                let bytes = body.clone().into_bytes();
                let size = bytes.len() as u64;
                let target = path.clone();
                tokio::task::spawn_blocking(move || write_atomically(&target, &bytes))
                    .await?
                    .map_err(FetchError::Storage)?;
                Ok(StoredAsset { path, size })
            }
            AssetSource::Remote { url, fallback_url } => {
                let dir_ref: &Path = &dir;
                let primary = run_with_retry(&self.retry, |attempt| {
                    tracing::debug!(post_id = asset.post_id, kind = %asset.kind, index = asset.index, attempt, "fetch");
                    self.fetch(asset, dir_ref, url)
                })
                .await;
                match (primary, fallback_url) {
                    (Err(e), Some(fallback))
                        if !e.is_unauthorized() && !matches!(e, FetchError::Storage(_)) =>
                    {
                        tracing::warn!(
                            post_id = asset.post_id,
                            kind = %asset.kind,
                            index = asset.index,
                            error = %e,
                            url = %fallback,
                            "primary host exhausted, trying failover host"
                        );
                        self.fetch(asset, &dir, fallback).await
                    }
                    (res, _) => res,
                }
            }
        }
    }

    async fn fetch(
        &self,
        asset: &AssetDescriptor,
        dir: &Path,
        url: &str,
    ) -> Result<StoredAsset, FetchError> {
        let transport = Arc::clone(&self.transport);
        let headers = self.credentials.headers_for(url);
        let asset = asset.clone();
        let dir = dir.to_path_buf();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            fetch::fetch_to_disk(transport.as_ref(), &url, &headers, &asset, &dir)
        })
        .await?
    }
}
