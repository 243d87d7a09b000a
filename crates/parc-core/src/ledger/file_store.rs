//! Filesystem link store: an append-only journal next to the archive.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::export::{format_export, parse_export};
use super::{LinkEntry, LinkStore};
use crate::naming::{LINKS_EXPORT_FILE, LINKS_JOURNAL_FILE};

/// Journal at `<dir>/.post_links.ledger`. When it does not exist yet, a legacy
/// `<dir>/_post_links.txt` export seeds it.
pub struct FileLinkStore {
    journal: PathBuf,
    legacy_export: PathBuf,
}

impl FileLinkStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            journal: dir.join(LINKS_JOURNAL_FILE),
            legacy_export: dir.join(LINKS_EXPORT_FILE),
        }
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal
    }
}

#[async_trait]
impl LinkStore for FileLinkStore {
    async fn load(&self) -> Result<Vec<LinkEntry>> {
        if tokio::fs::try_exists(&self.journal).await.unwrap_or(false) {
            let contents = tokio::fs::read_to_string(&self.journal)
                .await
                .with_context(|| format!("read link journal {}", self.journal.display()))?;
            return Ok(parse_export(&contents));
        }

        if !tokio::fs::try_exists(&self.legacy_export).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let contents = tokio::fs::read_to_string(&self.legacy_export)
            .await
            .with_context(|| format!("read link export {}", self.legacy_export.display()))?;
        let seeded = parse_export(&contents);
        tracing::info!(
            journal = %self.journal.display(),
            entries = seeded.len(),
            "seeding link journal from existing export"
        );
        self.append(&seeded).await?;
        Ok(seeded)
    }

    async fn append(&self, entries: &[LinkEntry]) -> Result<()> {
        let journal = self.journal.clone();
        let lines = format_export(entries);
        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(dir) = journal.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let mut f = std::fs::OpenOptions::new()
                .create(true)
                .read(true)
                .append(true)
                .open(&journal)?;
            // A crash can leave the last line without its newline.
            let len = f.metadata()?.len();
            let mut out = String::with_capacity(lines.len() + 1);
            if len > 0 {
                let mut last = [0u8; 1];
                f.seek(SeekFrom::Start(len - 1))?;
                f.read_exact(&mut last)?;
                if last[0] != b'\n' {
                    out.push('\n');
                }
            }
            out.push_str(&lines);
            f.write_all(out.as_bytes())?;
            f.sync_data()?;
            Ok(())
        })
        .await
        .context("link journal task join")?
        .with_context(|| format!("append to link journal {}", self.journal.display()))
    }
}
