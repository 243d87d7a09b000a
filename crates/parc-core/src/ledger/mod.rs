//! Link ledger: every external link ever seen, per creator, never shrinking.
//!
//! The ledger is a set-union accumulator over `(post_id, url)`. Re-observing a
//! pair is a no-op and nothing is ever removed, so links survive edits, tier
//! downgrades and takedowns of the posts that carried them.

mod export;
mod file_store;

pub use export::{format_export, parse_export, write_export};
pub use file_store::FileLinkStore;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::archive_db::ArchiveDb;

/// One `(post_id, post_url, url)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkEntry {
    pub post_id: i64,
    pub post_url: String,
    pub url: String,
}

/// Durable storage behind a [`LinkLedger`]. Implementations only ever add.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// All stored entries in insertion order.
    async fn load(&self) -> Result<Vec<LinkEntry>>;
    /// Persists `entries`, which the caller guarantees are new.
    async fn append(&self, entries: &[LinkEntry]) -> Result<()>;
}

/// Link store backed by the `links` table of the archive database.
pub struct DbLinkStore {
    db: ArchiveDb,
    creator: String,
}

impl DbLinkStore {
    pub fn new(db: ArchiveDb, creator: impl Into<String>) -> Self {
        Self {
            db,
            creator: creator.into(),
        }
    }
}

#[async_trait]
impl LinkStore for DbLinkStore {
    async fn load(&self) -> Result<Vec<LinkEntry>> {
        self.db.links_for(&self.creator).await
    }

    async fn append(&self, entries: &[LinkEntry]) -> Result<()> {
        for e in entries {
            self.db.insert_link(&self.creator, e).await?;
        }
        Ok(())
    }
}

/// In-memory view of one creator's ledger with write-through to its store.
pub struct LinkLedger {
    store: Arc<dyn LinkStore>,
    entries: Vec<LinkEntry>,
    seen: HashSet<(i64, String)>,
}

impl LinkLedger {
    /// Loads everything the store holds.
    pub async fn open(store: Arc<dyn LinkStore>) -> Result<Self> {
        let mut ledger = LinkLedger {
            store,
            entries: Vec::new(),
            seen: HashSet::new(),
        };
        for e in ledger.store.load().await? {
            if ledger.seen.insert((e.post_id, e.url.clone())) {
                ledger.entries.push(e);
            }
        }
        Ok(ledger)
    }

    /// Adds every `(post_id, url)` pair not already present and returns how
    /// many were new. Pairs for `post_id` missing from `links` are untouched.
    pub async fn record(&mut self, post_id: i64, post_url: &str, links: &[String]) -> Result<usize> {
        let mut fresh = Vec::new();
        let mut batch = HashSet::new();
        for url in links {
            let key = (post_id, url.clone());
            if self.seen.contains(&key) || !batch.insert(key) {
                continue;
            }
            fresh.push(LinkEntry {
                post_id,
                post_url: post_url.to_string(),
                url: url.clone(),
            });
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        self.store.append(&fresh).await?;
        tracing::debug!(post_id, new = fresh.len(), "links recorded");
        self.seen.extend(batch);
        self.entries.extend(fresh.iter().cloned());
        Ok(fresh.len())
    }

    /// All entries sorted by post id; ties keep insertion order.
    pub fn export(&self) -> Vec<LinkEntry> {
        let mut out = self.entries.clone();
        out.sort_by_key(|e| e.post_id);
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
