//! Filesystem-probe backend: the file on disk is the record.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{Decision, DownloadBackend, DownloadReason, SkipReason, StoredAsset};
use crate::resolver::AssetDescriptor;

/// Compares on-disk length with the declared size.
///
/// Without a declared size, presence alone counts as complete. Transfers go
/// through a temp file and rename, so a present file is never a half-written one.
pub struct FilesystemBackend {
    output_dir: PathBuf,
}

impl FilesystemBackend {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl DownloadBackend for FilesystemBackend {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn decide(&self, asset: &AssetDescriptor) -> Result<Decision> {
        let dir = self.output_dir.join(&asset.creator);
        for path in asset.candidate_paths(&dir) {
            let meta = match tokio::fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("probe {}", path.display()));
                }
            };
            if !meta.is_file() {
                continue;
            }
            let on_disk = meta.len();
            return Ok(match asset.expected_size {
                Some(expected) if expected != on_disk => {
                    Decision::Download(DownloadReason::SizeMismatch { on_disk, expected })
                }
                _ => Decision::Skip(SkipReason::PresentMatching { path }),
            });
        }
        Ok(Decision::Download(DownloadReason::Absent))
    }

    async fn commit(&self, _asset: &AssetDescriptor, _stored: &StoredAsset) -> Result<()> {
        Ok(())
    }
}
