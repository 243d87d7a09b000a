//! Blocking transfer into a temp file, then size report, sniff and rename.

use std::path::Path;

use crate::decision::StoredAsset;
use crate::resolver::{extension_for_mime, sniff_mime, AssetDescriptor, ExtensionSource};
use crate::retry::FetchError;
use crate::storage::{temp_path, StorageWriter};
use crate::transport::Transport;

pub(super) fn fetch_to_disk(
    transport: &dyn Transport,
    url: &str,
    headers: &[String],
    asset: &AssetDescriptor,
    dir: &Path,
) -> Result<StoredAsset, FetchError> {
    std::fs::create_dir_all(dir).map_err(FetchError::Storage)?;
    let temp = temp_path(&dir.join(asset.stem()));
    let mut writer = StorageWriter::create(&temp).map_err(FetchError::Storage)?;

    let result = transport.download(url, headers, &mut |chunk: &[u8]| writer.write_chunk(chunk));
    let received = match result {
        Ok(n) => n,
        Err(e) => {
            writer.discard();
            return Err(e);
        }
    };

    // The declared size is metadata, not a promise; truncation is the transport's call.
    if let Some(expected) = asset.expected_size {
        if received != expected {
            tracing::warn!(
                post_id = asset.post_id,
                kind = %asset.kind,
                index = asset.index,
                expected,
                received,
                "body size differs from declared size; keeping what the server sent"
            );
        }
    }
    if let Err(e) = writer.sync() {
        writer.discard();
        return Err(FetchError::Storage(e));
    }

    let sniffed = match &asset.extension {
        ExtensionSource::Sniffed { fallback } => Some(
            sniff_mime(writer.head())
                .and_then(extension_for_mime)
                .unwrap_or(*fallback),
        ),
        _ => None,
    };
    let path = asset.canonical_path(dir, sniffed);
    writer.finalize(&path).map_err(FetchError::Storage)?;
    tracing::info!(
        post_id = asset.post_id,
        kind = %asset.kind,
        index = asset.index,
        bytes = received,
        path = %path.display(),
        "asset stored"
    );
    Ok(StoredAsset {
        path,
        size: received,
    })
}
