//! Row types for the relational ledger.

use std::path::PathBuf;

use crate::resolver::AssetIdentity;

/// A successful download, keyed by asset identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub identity: AssetIdentity,
    pub creator: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Per-creator totals for `parc status`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorStats {
    pub creator: String,
    pub downloads: u64,
    pub bytes: u64,
    pub links: u64,
}
