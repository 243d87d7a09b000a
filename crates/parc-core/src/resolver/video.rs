//! Video rendition selection.

use crate::api::PlayerUrl;

/// Preference order, best first. Streaming manifests (hls, dash) are not
/// downloadable as a single file and never chosen.
pub const VIDEO_QUALITY_ORDER: &[&str] = &[
    "ultra_hd", "quad_hd", "full_hd", "high", "medium", "tiny", "low", "lowest",
];

/// Best available `(quality, url)`; renditions with an empty URL are ignored.
pub fn best_video(urls: &[PlayerUrl]) -> Option<(&str, &str)> {
    VIDEO_QUALITY_ORDER.iter().find_map(|q| {
        urls.iter()
            .find(|u| u.quality == *q && !u.url.is_empty())
            .map(|u| (u.quality.as_str(), u.url.as_str()))
    })
}

/// `url` with its host replaced by `host`.
pub fn swap_host(url: &str, host: &str) -> Option<String> {
    let mut parsed = url::Url::parse(url).ok()?;
    parsed.set_host(Some(host)).ok()?;
    Some(parsed.into())
}
