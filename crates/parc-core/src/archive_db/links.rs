//! Link ledger table. Insert-only with a `(post_id, url)` uniqueness constraint.

use anyhow::Result;
use sqlx::Row;

use super::db::{unix_timestamp, ArchiveDb};
use crate::ledger::LinkEntry;

impl ArchiveDb {
    /// Inserts `entry` for `creator`. Returns false if the pair was already present.
    pub async fn insert_link(&self, creator: &str, entry: &LinkEntry) -> Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO links (creator, post_id, post_url, url, first_seen)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (post_id, url) DO NOTHING
            "#,
        )
        .bind(creator)
        .bind(entry.post_id)
        .bind(&entry.post_url)
        .bind(&entry.url)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Every link recorded for `creator`, by post id then insertion order.
    pub async fn links_for(&self, creator: &str) -> Result<Vec<LinkEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT post_id, post_url, url FROM links
            WHERE creator = ?
            ORDER BY post_id ASC, id ASC
            "#,
        )
        .bind(creator)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LinkEntry {
                post_id: row.get("post_id"),
                post_url: row.get("post_url"),
                url: row.get("url"),
            })
            .collect())
    }
}
