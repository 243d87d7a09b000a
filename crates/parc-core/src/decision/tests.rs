use std::path::Path;
use std::sync::Arc;

use super::*;
use crate::archive_db::db::open_memory;
use crate::resolver::{AssetKind, AssetSource, ExtensionSource};

fn image(expected_size: Option<u64>) -> AssetDescriptor {
    AssetDescriptor {
        creator: "alice".into(),
        post_id: 42,
        post_title: "Update".into(),
        kind: AssetKind::Image,
        index: 0,
        filename: "pic".into(),
        extension: ExtensionSource::Sniffed { fallback: "png" },
        expected_size,
        source: AssetSource::Remote {
            url: "http://img/pic".into(),
            fallback_url: None,
        },
    }
}

fn put(root: &Path, name: &str, len: usize) -> PathBuf {
    let dir = root.join("alice");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, vec![0u8; len]).unwrap();
    path
}

#[tokio::test]
async fn filesystem_absent_then_matching() {
    let dir = tempfile::tempdir().unwrap();
    let fs = FilesystemBackend::new(dir.path());
    let asset = image(Some(1000));
    assert_eq!(
        fs.decide(&asset).await.unwrap(),
        Decision::Download(DownloadReason::Absent)
    );

    let path = put(dir.path(), "42_Update_0_pic.jpg", 1000);
    assert_eq!(
        fs.decide(&asset).await.unwrap(),
        Decision::Skip(SkipReason::PresentMatching { path })
    );
}

#[tokio::test]
async fn filesystem_short_file_is_redownloaded() {
    let dir = tempfile::tempdir().unwrap();
    let fs = FilesystemBackend::new(dir.path());
    put(dir.path(), "42_Update_0_pic.png", 500);
    assert_eq!(
        fs.decide(&image(Some(1000))).await.unwrap(),
        Decision::Download(DownloadReason::SizeMismatch {
            on_disk: 500,
            expected: 1000
        })
    );
}

#[tokio::test]
async fn filesystem_presence_is_enough_without_declared_size() {
    let dir = tempfile::tempdir().unwrap();
    let fs = FilesystemBackend::new(dir.path());
    put(dir.path(), "42_Update_0_pic.png", 3);
    assert!(fs.decide(&image(None)).await.unwrap().is_skip());
}

#[tokio::test]
async fn filesystem_ignores_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let fs = FilesystemBackend::new(dir.path());
    put(dir.path(), "42_Update_0_pic.part", 1000);
    assert_eq!(
        fs.decide(&image(Some(1000))).await.unwrap(),
        Decision::Download(DownloadReason::Absent)
    );
}

#[tokio::test]
async fn database_records_after_commit() {
    let db = open_memory().await.unwrap();
    let backend = DatabaseBackend::new(db.clone(), false);
    let asset = image(Some(1000));
    assert_eq!(
        backend.decide(&asset).await.unwrap(),
        Decision::Download(DownloadReason::NotRecorded)
    );

    let stored = StoredAsset {
        path: PathBuf::from("/out/alice/42_Update_0_pic.png"),
        size: 1000,
    };
    backend.commit(&asset, &stored).await.unwrap();
    assert_eq!(
        backend.decide(&asset).await.unwrap(),
        Decision::Skip(SkipReason::Recorded)
    );

    // Size is not re-verified unless asked to.
    assert!(backend.decide(&image(Some(2000))).await.unwrap().is_skip());
    let verifying = DatabaseBackend::new(db, true);
    assert_eq!(
        verifying.decide(&image(Some(2000))).await.unwrap(),
        Decision::Download(DownloadReason::RecordedSizeMismatch {
            recorded: 1000,
            expected: 2000
        })
    );
    assert!(verifying.decide(&image(None)).await.unwrap().is_skip());
}

#[tokio::test]
async fn force_overrides_skip_and_refreshes_record() {
    let db = open_memory().await.unwrap();
    let inner: Arc<dyn DownloadBackend> = Arc::new(DatabaseBackend::new(db.clone(), false));
    let asset = image(Some(1000));
    let first = StoredAsset {
        path: PathBuf::from("/a"),
        size: 900,
    };
    inner.commit(&asset, &first).await.unwrap();

    let forced = ForceRedownload::new(Arc::clone(&inner));
    assert_eq!(
        forced.decide(&asset).await.unwrap(),
        Decision::Download(DownloadReason::Forced)
    );
    let second = StoredAsset {
        path: PathBuf::from("/a"),
        size: 1000,
    };
    forced.commit(&asset, &second).await.unwrap();
    assert_eq!(db.recorded_size(&asset.identity()).await.unwrap(), Some(1000));
    assert_eq!(forced.name(), "database");
}
