//! `parc status` – per-creator counts from the SQLite ledger.

use anyhow::Result;
use parc_core::archive_db::ArchiveDb;
use std::path::Path;

use super::archive::human_bytes;

pub async fn run_status(db_path: Option<&Path>) -> Result<()> {
    let db = match db_path {
        Some(p) => ArchiveDb::open_at(p).await?,
        None => ArchiveDb::open_default().await?,
    };
    let stats = db.counts().await?;
    if stats.is_empty() {
        println!("No creators in database.");
    } else {
        println!("{:<24} {:>10} {:>12} {:>8}", "CREATOR", "FILES", "SIZE", "LINKS");
        for s in stats {
            println!(
                "{:<24} {:>10} {:>12} {:>8}",
                s.creator,
                s.downloads,
                human_bytes(s.bytes),
                s.links
            );
        }
    }
    Ok(())
}
