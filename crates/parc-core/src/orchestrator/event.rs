//! Progress events for the CLI printer.

use std::path::PathBuf;

use super::summary::UserSummary;
use crate::decision::SkipReason;
use crate::ledger::LinkEntry;
use crate::resolver::{AssetIdentity, AssetKind};

#[derive(Debug, Clone)]
pub enum ArchiveEvent {
    UserStarted {
        user: String,
    },
    PostStarted {
        post_id: i64,
        title: String,
        post_url: String,
        has_access: bool,
        assets: usize,
    },
    AssetSkipped {
        identity: AssetIdentity,
        reason: SkipReason,
    },
    AssetUnavailable {
        post_id: i64,
        kind: AssetKind,
        index: u32,
        reason: &'static str,
    },
    AssetDownloaded {
        identity: AssetIdentity,
        path: PathBuf,
        bytes: u64,
    },
    AssetFailed {
        identity: AssetIdentity,
        error: String,
    },
    UserFinished {
        summary: UserSummary,
        links: Vec<LinkEntry>,
    },
}
