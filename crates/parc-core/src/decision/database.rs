//! Relational-ledger backend: download records in the archive database.

use anyhow::Result;
use async_trait::async_trait;

use super::{Decision, DownloadBackend, DownloadReason, SkipReason, StoredAsset};
use crate::archive_db::{ArchiveDb, DownloadRecord};
use crate::resolver::AssetDescriptor;

/// A recorded asset is skipped without looking at the disk. With
/// `verify_sizes`, a record whose size differs from the declared size is
/// downloaded again.
pub struct DatabaseBackend {
    db: ArchiveDb,
    verify_sizes: bool,
}

impl DatabaseBackend {
    pub fn new(db: ArchiveDb, verify_sizes: bool) -> Self {
        Self { db, verify_sizes }
    }
}

#[async_trait]
impl DownloadBackend for DatabaseBackend {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn decide(&self, asset: &AssetDescriptor) -> Result<Decision> {
        let Some(recorded) = self.db.recorded_size(&asset.identity()).await? else {
            return Ok(Decision::Download(DownloadReason::NotRecorded));
        };
        if self.verify_sizes {
            if let Some(expected) = asset.expected_size {
                if expected != recorded {
                    return Ok(Decision::Download(DownloadReason::RecordedSizeMismatch {
                        recorded,
                        expected,
                    }));
                }
            }
        }
        Ok(Decision::Skip(SkipReason::Recorded))
    }

    async fn commit(&self, asset: &AssetDescriptor, stored: &StoredAsset) -> Result<()> {
        self.db
            .upsert_record(&DownloadRecord {
                identity: asset.identity(),
                creator: asset.creator.clone(),
                path: stored.path.clone(),
                size: stored.size,
            })
            .await
    }
}
