//! `parc export-links` – rewrite `_post_links.txt` from the ledger.

use anyhow::Result;
use parc_core::archive_db::ArchiveDb;
use parc_core::ledger::{write_export, DbLinkStore, FileLinkStore, LinkLedger, LinkStore};
use parc_core::naming::LINKS_EXPORT_FILE;
use std::path::Path;
use std::sync::Arc;

pub async fn run_export_links(
    user: &str,
    output_dir: &Path,
    use_db: bool,
    db_path: Option<&Path>,
) -> Result<()> {
    let user_dir = output_dir.join(user);
    let store: Arc<dyn LinkStore> = if use_db {
        let db = match db_path {
            Some(p) => ArchiveDb::open_at(p).await?,
            None => ArchiveDb::open_default().await?,
        };
        Arc::new(DbLinkStore::new(db, user))
    } else {
        Arc::new(FileLinkStore::new(&user_dir))
    };

    let ledger = LinkLedger::open(store).await?;
    if ledger.is_empty() {
        println!("No links recorded for {}.", user);
        return Ok(());
    }
    let path = user_dir.join(LINKS_EXPORT_FILE);
    write_export(&path, &ledger.export())?;
    println!("Wrote {} links to {}", ledger.len(), path.display());
    Ok(())
}
