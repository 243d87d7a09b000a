//! Connection handling and migrations. Row operations live in `records` and `links`.

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the archive database.
///
/// Default location: `~/.local/state/parc/archive.db`. The pool holds a single
/// connection, so every insert and upsert is serialized.
#[derive(Clone)]
pub struct ArchiveDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl ArchiveDb {
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("parc")?;
        Ok(xdg_dirs.get_state_home().join("parc").join("archive.db"))
    }

    /// Open (or create) the database at the default path.
    pub async fn open_default() -> Result<Self> {
        Self::open_at(Self::default_path()?).await
    }

    /// Open (or create) the database at `path`. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&uri)
            .await
            .with_context(|| format!("open archive database {}", path.display()))?;
        let db = ArchiveDb { pool };
        db.migrate().await?;
        tracing::debug!(path = %path.display(), "archive database ready");
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS downloads (
                post_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                idx INTEGER NOT NULL,
                filename TEXT NOT NULL,
                creator TEXT NOT NULL,
                path TEXT NOT NULL,
                size INTEGER NOT NULL,
                downloaded_at INTEGER NOT NULL,
                PRIMARY KEY (post_id, kind, idx, filename)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creator TEXT NOT NULL,
                post_id INTEGER NOT NULL,
                post_url TEXT NOT NULL,
                url TEXT NOT NULL,
                first_seen INTEGER NOT NULL,
                UNIQUE (post_id, url)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS links_by_creator ON links (creator, post_id, id);")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Current time as Unix seconds.
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<ArchiveDb> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = ArchiveDb { pool };
    db.migrate().await?;
    Ok(db)
}
