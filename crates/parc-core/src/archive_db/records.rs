//! Download records: lookup and upsert.

use anyhow::Result;
use sqlx::Row;

use super::db::{unix_timestamp, ArchiveDb};
use super::types::{CreatorStats, DownloadRecord};
use crate::resolver::AssetIdentity;

impl ArchiveDb {
    pub async fn is_recorded(&self, id: &AssetIdentity) -> Result<bool> {
        Ok(self.recorded_size(id).await?.is_some())
    }

    /// Size stored with the record, or None when the asset was never recorded.
    pub async fn recorded_size(&self, id: &AssetIdentity) -> Result<Option<u64>> {
        let row = sqlx::query(
            r#"
            SELECT size FROM downloads
            WHERE post_id = ? AND kind = ? AND idx = ? AND filename = ?
            "#,
        )
        .bind(id.post_id)
        .bind(id.kind.as_str())
        .bind(id.index as i64)
        .bind(&id.filename)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get::<i64, _>("size").max(0) as u64))
    }

    /// Inserts the record, or overwrites path, size and timestamp of an existing one.
    pub async fn upsert_record(&self, rec: &DownloadRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO downloads (post_id, kind, idx, filename, creator, path, size, downloaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (post_id, kind, idx, filename) DO UPDATE SET
                creator = excluded.creator,
                path = excluded.path,
                size = excluded.size,
                downloaded_at = excluded.downloaded_at
            "#,
        )
        .bind(rec.identity.post_id)
        .bind(rec.identity.kind.as_str())
        .bind(rec.identity.index as i64)
        .bind(&rec.identity.filename)
        .bind(&rec.creator)
        .bind(rec.path.to_string_lossy().into_owned())
        .bind(rec.size as i64)
        .bind(unix_timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Download and link totals per creator, sorted by creator.
    pub async fn counts(&self) -> Result<Vec<CreatorStats>> {
        let rows = sqlx::query(
            r#"
            SELECT creator,
                   SUM(downloads) AS downloads,
                   SUM(bytes) AS bytes,
                   SUM(links) AS links
            FROM (
                SELECT creator, COUNT(*) AS downloads, COALESCE(SUM(size), 0) AS bytes, 0 AS links
                FROM downloads GROUP BY creator
                UNION ALL
                SELECT creator, 0, 0, COUNT(*) FROM links GROUP BY creator
            )
            GROUP BY creator
            ORDER BY creator
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CreatorStats {
                creator: row.get("creator"),
                downloads: row.get::<i64, _>("downloads").max(0) as u64,
                bytes: row.get::<i64, _>("bytes").max(0) as u64,
                links: row.get::<i64, _>("links").max(0) as u64,
            })
            .collect())
    }
}
