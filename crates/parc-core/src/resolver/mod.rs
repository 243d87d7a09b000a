//! Asset descriptor resolver: expands one post into typed assets and links.
//!
//! Output is a pure function of the post blocks in their original order.
//! One counter numbers every downloadable block of a post in block order, and
//! the text body takes the next index after them. Two assets of one post never
//! share an index, so they never share a file name, and identities stay stable
//! across runs as long as the platform keeps block order.

mod asset;
mod sniff;
mod text;
mod video;

pub use asset::{AssetDescriptor, AssetIdentity, AssetKind, AssetSource, ExtensionSource};
pub use sniff::{extension_for_mime, sniff_mime, KNOWN_EXTENSIONS};
pub use text::{decode_content, render_text, TextPiece};
pub use video::{best_video, swap_host, VIDEO_QUALITY_ORDER};

use std::collections::HashSet;

use crate::api::{AudioBlock, Block, FileBlock, ImageBlock, RawPost, VideoBlock};
use crate::naming::sanitize_filename;

/// Per-creator context needed to build URLs.
#[derive(Debug, Clone, Copy)]
pub struct PostContext<'a> {
    pub creator: &'a str,
    /// Public site base without trailing slash.
    pub site_base: &'a str,
    /// Signed query in effect; a post carrying its own overrides it.
    pub signed_query: &'a str,
}

/// A block that could not be turned into an asset. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("post {post_id}, block {position}: {reason}")]
pub struct BlockError {
    pub post_id: i64,
    /// Zero-based block position in the post.
    pub position: usize,
    pub reason: String,
}

/// An asset the platform still lists but whose content is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableAsset {
    pub kind: AssetKind,
    pub index: u32,
    pub reason: &'static str,
}

#[derive(Debug, Clone)]
pub struct ResolvedPost {
    pub post_id: i64,
    pub post_url: String,
    pub title: String,
    pub has_access: bool,
    pub assets: Vec<AssetDescriptor>,
    /// External links in post order, deduplicated.
    pub links: Vec<String>,
    pub unavailable: Vec<UnavailableAsset>,
    pub malformed: Vec<BlockError>,
    /// Block types this archiver does not handle (polls, smiles, ...).
    pub unsupported: Vec<String>,
}

/// Expands `post` into assets and links.
pub fn resolve_post(post: &RawPost, ctx: &PostContext<'_>) -> ResolvedPost {
    let signed_query = post.signed_query.as_deref().unwrap_or(ctx.signed_query);
    let mut r = Resolution {
        post,
        ctx,
        signed_query,
        title: sanitize_filename(&post.title),
        next_index: 0,
        out: ResolvedPost {
            post_id: post.int_id,
            post_url: format!("{}/{}/posts/{}", ctx.site_base, ctx.creator, post.id),
            title: String::new(),
            has_access: post.has_access,
            assets: Vec::new(),
            links: Vec::new(),
            unavailable: Vec::new(),
            malformed: Vec::new(),
            unsupported: Vec::new(),
        },
    };

    let blocks: Vec<(usize, Option<Block>)> = post
        .data
        .iter()
        .enumerate()
        .map(|(position, raw)| (position, r.parse_block(position, raw)))
        .collect();

    let mut pieces = Vec::new();
    let mut seen_links = HashSet::new();
    for (_, block) in &blocks {
        match block {
            Some(Block::Text(t)) => pieces.push(TextPiece::Text(t)),
            Some(Block::Link(l)) => {
                pieces.push(TextPiece::Link(l));
                if seen_links.insert(l.url.as_str()) {
                    r.out.links.push(l.url.clone());
                }
            }
            _ => {}
        }
    }

    for (position, block) in &blocks {
        match block {
            Some(Block::Image(b)) => r.image(b),
            Some(Block::File(b)) => r.file(*position, b),
            Some(Block::AudioFile(b)) => r.audio(b),
            Some(Block::OkVideo(b)) => r.video(*position, b),
            _ => {}
        }
    }

    let body = render_text(&pieces);
    if !body.is_empty() {
        let index = r.next_index();
        let asset = r.asset(
            AssetKind::Text,
            index,
            "post".to_string(),
            ExtensionSource::Fixed("txt"),
            Some(body.len() as u64),
            AssetSource::Inline(body),
        );
        r.out.assets.push(asset);
    }

    r.out.title = r.title;
    r.out
}

struct Resolution<'a> {
    post: &'a RawPost,
    ctx: &'a PostContext<'a>,
    signed_query: &'a str,
    title: String,
    next_index: u32,
    out: ResolvedPost,
}

impl Resolution<'_> {
    fn parse_block(&mut self, position: usize, raw: &serde_json::Value) -> Option<Block> {
        match serde_json::from_value::<Block>(raw.clone()) {
            Ok(Block::Unsupported) => {
                let kind = raw
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("<untyped>")
                    .to_string();
                tracing::debug!(post_id = self.post.int_id, position, kind = %kind, "unsupported block");
                self.out.unsupported.push(kind);
                None
            }
            Ok(block) => Some(block),
            Err(e) => {
                self.malformed(position, e.to_string());
                None
            }
        }
    }

    fn malformed(&mut self, position: usize, reason: String) {
        let err = BlockError {
            post_id: self.post.int_id,
            position,
            reason,
        };
        tracing::warn!(post_id = err.post_id, position, reason = %err.reason, "malformed block skipped");
        self.out.malformed.push(err);
    }

    /// Unavailable and rejected blocks still consume their index.
    fn next_index(&mut self) -> u32 {
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    fn asset(
        &self,
        kind: AssetKind,
        index: u32,
        filename: String,
        extension: ExtensionSource,
        expected_size: Option<u64>,
        source: AssetSource,
    ) -> AssetDescriptor {
        AssetDescriptor {
            creator: self.ctx.creator.to_string(),
            post_id: self.post.int_id,
            post_title: self.title.clone(),
            kind,
            index,
            filename,
            extension,
            expected_size,
            source,
        }
    }

    fn unavailable(&mut self, kind: AssetKind, index: u32, reason: &'static str) {
        tracing::info!(post_id = self.post.int_id, kind = %kind, index, reason, "asset unavailable");
        self.out.unavailable.push(UnavailableAsset {
            kind,
            index,
            reason,
        });
    }

    fn signed(&self, url: &str, is_migrated: bool) -> String {
        if self.signed_query.is_empty() {
            let sep = if url.contains('?') { '&' } else { '?' };
            format!("{}{}is_migrated={}", url, sep, is_migrated)
        } else {
            format!("{}{}&is_migrated={}", url, self.signed_query, is_migrated)
        }
    }

    fn image(&mut self, b: &ImageBlock) {
        let index = self.next_index();
        let size = match (b.width, b.height, b.size) {
            (Some(_), Some(_), Some(size)) => size,
            _ => return self.unavailable(AssetKind::Image, index, "deleted from CDN"),
        };
        let asset = self.asset(
            AssetKind::Image,
            index,
            sanitize_filename(&b.id),
            ExtensionSource::Sniffed { fallback: "png" },
            Some(size),
            AssetSource::Remote {
                url: b.url.clone(),
                fallback_url: None,
            },
        );
        self.out.assets.push(asset);
    }

    fn file(&mut self, position: usize, b: &FileBlock) {
        let index = self.next_index();
        let Some(size) = b.size else {
            return self.unavailable(AssetKind::File, index, "deleted from CDN");
        };
        let mut filename = sanitize_filename(&b.title);
        if filename.is_empty() {
            match b.id.as_deref().map(sanitize_filename).filter(|s| !s.is_empty()) {
                Some(id) => filename = id,
                None => return self.malformed(position, "file block without title or id".into()),
            }
        }
        let asset = self.asset(
            AssetKind::File,
            index,
            filename,
            ExtensionSource::Embedded,
            Some(size),
            AssetSource::Remote {
                url: self.signed(&b.url, b.is_migrated),
                fallback_url: None,
            },
        );
        self.out.assets.push(asset);
    }

    fn audio(&mut self, b: &AudioBlock) {
        let index = self.next_index();
        let Some(size) = b.size else {
            return self.unavailable(AssetKind::Audio, index, "deleted from CDN");
        };
        let title = b.title.as_deref().map(sanitize_filename).unwrap_or_default();
        let filename = if title.is_empty() {
            let ext = b
                .file_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("mp3")
                .to_ascii_lowercase();
            sanitize_filename(&format!("{}.{}", b.id, ext))
        } else {
            title
        };
        let asset = self.asset(
            AssetKind::Audio,
            index,
            filename,
            ExtensionSource::Embedded,
            Some(size),
            AssetSource::Remote {
                url: self.signed(&b.url, b.is_migrated),
                fallback_url: None,
            },
        );
        self.out.assets.push(asset);
    }

    fn video(&mut self, position: usize, b: &VideoBlock) {
        let index = self.next_index();
        if b.width.is_none() || b.height.is_none() {
            return self.unavailable(AssetKind::Video, index, "deleted from CDN");
        }
        let Some((quality, url)) = best_video(&b.player_urls) else {
            return self.malformed(position, "video without a downloadable quality".into());
        };
        let fallback_url = b
            .failover_host
            .as_deref()
            .filter(|h| !h.is_empty())
            .and_then(|h| swap_host(url, h))
            .filter(|u| u != url);
        let asset = self.asset(
            AssetKind::Video,
            index,
            sanitize_filename(&format!("{}.{}", b.id, quality)),
            ExtensionSource::Sniffed { fallback: "mp4" },
            None,
            AssetSource::Remote {
                url: url.to_string(),
                fallback_url,
            },
        );
        self.out.assets.push(asset);
    }
}
