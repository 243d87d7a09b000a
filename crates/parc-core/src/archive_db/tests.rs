//! Tests for archive_db (use in-memory DB helper from db).

use std::path::PathBuf;

use crate::archive_db::db::open_memory;
use crate::archive_db::{ArchiveDb, CreatorStats, DownloadRecord};
use crate::ledger::LinkEntry;
use crate::resolver::{AssetIdentity, AssetKind};

fn identity(index: u32) -> AssetIdentity {
    AssetIdentity {
        post_id: 42,
        kind: AssetKind::Image,
        index,
        filename: "pic".to_string(),
    }
}

fn record(index: u32, size: u64) -> DownloadRecord {
    DownloadRecord {
        identity: identity(index),
        creator: "alice".to_string(),
        path: PathBuf::from(format!("/out/alice/42_Update_{}_pic.png", index)),
        size,
    }
}

fn link(post_id: i64, url: &str) -> LinkEntry {
    LinkEntry {
        post_id,
        post_url: format!("https://boosty.to/alice/posts/{}", post_id),
        url: url.to_string(),
    }
}

#[tokio::test]
async fn record_lookup_and_upsert() {
    let db = open_memory().await.unwrap();
    assert!(!db.is_recorded(&identity(0)).await.unwrap());

    db.upsert_record(&record(0, 500)).await.unwrap();
    assert!(db.is_recorded(&identity(0)).await.unwrap());
    assert_eq!(db.recorded_size(&identity(0)).await.unwrap(), Some(500));
    assert!(!db.is_recorded(&identity(1)).await.unwrap());

    db.upsert_record(&record(0, 1000)).await.unwrap();
    assert_eq!(db.recorded_size(&identity(0)).await.unwrap(), Some(1000));
}

#[tokio::test]
async fn identity_includes_kind_and_filename() {
    let db = open_memory().await.unwrap();
    db.upsert_record(&record(0, 1)).await.unwrap();
    let mut other = identity(0);
    other.kind = AssetKind::File;
    assert!(!db.is_recorded(&other).await.unwrap());
    let mut renamed = identity(0);
    renamed.filename = "pic2".to_string();
    assert!(!db.is_recorded(&renamed).await.unwrap());
}

#[tokio::test]
async fn link_insert_is_idempotent_and_ordered() {
    let db = open_memory().await.unwrap();
    assert!(db.insert_link("alice", &link(50, "https://b.example")).await.unwrap());
    assert!(db.insert_link("alice", &link(42, "https://a.example")).await.unwrap());
    assert!(db.insert_link("alice", &link(42, "https://c.example")).await.unwrap());
    assert!(!db.insert_link("alice", &link(42, "https://a.example")).await.unwrap());
    assert!(db.insert_link("bob", &link(7, "https://z.example")).await.unwrap());

    let urls: Vec<(i64, String)> = db
        .links_for("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|e| (e.post_id, e.url))
        .collect();
    assert_eq!(
        urls,
        vec![
            (42, "https://a.example".to_string()),
            (42, "https://c.example".to_string()),
            (50, "https://b.example".to_string()),
        ]
    );
}

#[tokio::test]
async fn counts_per_creator() {
    let db = open_memory().await.unwrap();
    db.upsert_record(&record(0, 100)).await.unwrap();
    db.upsert_record(&record(1, 50)).await.unwrap();
    db.insert_link("alice", &link(42, "https://a.example")).await.unwrap();
    db.insert_link("bob", &link(7, "https://z.example")).await.unwrap();

    let stats = db.counts().await.unwrap();
    assert_eq!(
        stats,
        vec![
            CreatorStats {
                creator: "alice".into(),
                downloads: 2,
                bytes: 150,
                links: 1,
            },
            CreatorStats {
                creator: "bob".into(),
                downloads: 0,
                bytes: 0,
                links: 1,
            },
        ]
    );
}

#[tokio::test]
async fn open_at_persists_across_handles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested dir").join("archive.db");
    {
        let db = ArchiveDb::open_at(&path).await.unwrap();
        db.upsert_record(&record(0, 10)).await.unwrap();
        db.pool.close().await;
    }
    let db = ArchiveDb::open_at(&path).await.unwrap();
    assert_eq!(db.recorded_size(&identity(0)).await.unwrap(), Some(10));
}
