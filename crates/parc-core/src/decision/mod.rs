//! Download decision engine: skip or (re)download, per asset.
//!
//! One [`DownloadBackend`] is chosen per run (see [`crate::persistence`]);
//! orchestration only ever talks to the trait.

mod database;
mod filesystem;

pub use database::DatabaseBackend;
pub use filesystem::FilesystemBackend;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::resolver::AssetDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File on disk matches the declared size (or no size was declared).
    PresentMatching { path: PathBuf },
    /// A download record exists.
    Recorded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadReason {
    Absent,
    /// On-disk length differs from the declared size.
    SizeMismatch { on_disk: u64, expected: u64 },
    NotRecorded,
    /// Recorded size differs from the declared size (opt-in re-verification).
    RecordedSizeMismatch { recorded: u64, expected: u64 },
    Forced,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Download(DownloadReason),
}

impl Decision {
    pub fn is_skip(&self) -> bool {
        matches!(self, Decision::Skip(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Skip(SkipReason::PresentMatching { .. }) => f.write_str("present"),
            Decision::Skip(SkipReason::Recorded) => f.write_str("recorded"),
            Decision::Download(DownloadReason::Absent) => f.write_str("absent"),
            Decision::Download(DownloadReason::SizeMismatch { on_disk, expected }) => {
                write!(f, "size mismatch ({} on disk, {} expected)", on_disk, expected)
            }
            Decision::Download(DownloadReason::NotRecorded) => f.write_str("not recorded"),
            Decision::Download(DownloadReason::RecordedSizeMismatch { recorded, expected }) => {
                write!(f, "recorded size {} differs from {}", recorded, expected)
            }
            Decision::Download(DownloadReason::Forced) => f.write_str("forced"),
        }
    }
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub path: PathBuf,
    pub size: u64,
}

/// Persistence backend deciding and recording downloads.
///
/// Errors from either method are backend failures and abort the run.
#[async_trait]
pub trait DownloadBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn decide(&self, asset: &AssetDescriptor) -> Result<Decision>;

    /// Records a successful download, overwriting any previous record.
    async fn commit(&self, asset: &AssetDescriptor, stored: &StoredAsset) -> Result<()>;
}

/// Treats every asset as needing a download; commits go to the wrapped backend.
pub struct ForceRedownload {
    inner: Arc<dyn DownloadBackend>,
}

impl ForceRedownload {
    pub fn new(inner: Arc<dyn DownloadBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DownloadBackend for ForceRedownload {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn decide(&self, _asset: &AssetDescriptor) -> Result<Decision> {
        Ok(Decision::Download(DownloadReason::Forced))
    }

    async fn commit(&self, asset: &AssetDescriptor, stored: &StoredAsset) -> Result<()> {
        self.inner.commit(asset, stored).await
    }
}

#[cfg(test)]
mod tests;
