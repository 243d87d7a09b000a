//! Asset descriptors: one downloadable unit of a post with a stable identity.

use std::fmt;
use std::path::{Path, PathBuf};

use super::sniff::KNOWN_EXTENSIONS;
use crate::naming::asset_file_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    Text,
    Image,
    File,
    Audio,
    Video,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Text => "text",
            AssetKind::Image => "image",
            AssetKind::File => "file",
            AssetKind::Audio => "audio",
            AssetKind::Video => "video",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Already in hand (rendered post text).
    Inline(String),
    /// Fetched over HTTP. `fallback_url` is tried once the primary is exhausted.
    Remote {
        url: String,
        fallback_url: Option<String>,
    },
}

/// How the final extension is chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSource {
    /// The filename already carries its extension (attachments, audio).
    Embedded,
    /// Always this extension.
    Fixed(&'static str),
    /// Decided from the first bytes of the body; `fallback` when unrecognised.
    Sniffed { fallback: &'static str },
}

/// Dedup identity: `(post_id, kind, index, filename)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetIdentity {
    pub post_id: i64,
    pub kind: AssetKind,
    pub index: u32,
    pub filename: String,
}

impl fmt::Display for AssetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}#{} {}",
            self.post_id, self.kind, self.index, self.filename
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub creator: String,
    pub post_id: i64,
    /// Sanitized post title.
    pub post_title: String,
    pub kind: AssetKind,
    /// Zero-based position among assets of the same kind in the post.
    pub index: u32,
    /// Sanitized original or synthesized name.
    pub filename: String,
    pub extension: ExtensionSource,
    /// Size declared by the API; untrusted, may be absent.
    pub expected_size: Option<u64>,
    pub source: AssetSource,
}

impl AssetDescriptor {
    pub fn identity(&self) -> AssetIdentity {
        AssetIdentity {
            post_id: self.post_id,
            kind: self.kind,
            index: self.index,
            filename: self.filename.clone(),
        }
    }

    /// Canonical name without a sniffed extension; temp files are named after it.
    pub fn stem(&self) -> String {
        self.file_name(None)
    }

    /// Canonical name. `sniffed` is the extension detected from the body and
    /// only matters for [`ExtensionSource::Sniffed`].
    pub fn file_name(&self, sniffed: Option<&str>) -> String {
        let ext = match (&self.extension, sniffed) {
            (ExtensionSource::Embedded, _) => None,
            (ExtensionSource::Fixed(ext), _) => Some(*ext),
            (ExtensionSource::Sniffed { .. }, s) => s,
        };
        asset_file_name(self.post_id, &self.post_title, self.index, &self.filename, ext)
    }

    pub fn canonical_path(&self, dir: &Path, sniffed: Option<&str>) -> PathBuf {
        dir.join(self.file_name(sniffed))
    }

    /// Every path a previous run could have written this asset to.
    /// The fallback extension comes first for sniffed kinds.
    pub fn candidate_paths(&self, dir: &Path) -> Vec<PathBuf> {
        match &self.extension {
            ExtensionSource::Sniffed { fallback } => {
                let mut exts = vec![*fallback];
                exts.extend(KNOWN_EXTENSIONS.iter().copied().filter(|e| e != fallback));
                exts.into_iter()
                    .map(|e| self.canonical_path(dir, Some(e)))
                    .collect()
            }
            _ => vec![self.canonical_path(dir, None)],
        }
    }

    pub fn primary_url(&self) -> Option<&str> {
        match &self.source {
            AssetSource::Remote { url, .. } => Some(url),
            AssetSource::Inline(_) => None,
        }
    }
}
