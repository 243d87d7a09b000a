//! On-disk naming convention.
//!
//! Every asset lands at `<output>/<creator>/PostIntID_Title_Index_Filename[.Extension]`.
//! Collisions within a post are disambiguated by the index alone, so the name
//! is a pure function of the asset identity and the resolved extension.

mod sanitize;

pub use sanitize::{sanitize_filename, truncate_to_boundary, NAME_MAX};

/// Export view of the link ledger, regenerated on every run.
pub const LINKS_EXPORT_FILE: &str = "_post_links.txt";

/// Append-only journal backing the link ledger in filesystem mode.
pub const LINKS_JOURNAL_FILE: &str = ".post_links.ledger";

/// Builds the canonical file name for an asset.
///
/// `title` and `filename` must already be sanitized. When the full name plus
/// the temp suffix would exceed [`NAME_MAX`], the title part is shortened
/// first; id, index and extension are always kept. A filename too long to fit
/// on its own is cut in its stem so its own extension survives.
pub fn asset_file_name(
    post_id: i64,
    title: &str,
    index: u32,
    filename: &str,
    extension: Option<&str>,
) -> String {
    let ext = match extension {
        Some(ext) if !ext.is_empty() => format!(".{}", ext),
        _ => String::new(),
    };
    let prefix = format!("{}_", post_id);
    let middle = format!("_{}_", index);
    let room = NAME_MAX
        .saturating_sub(crate::storage::TEMP_SUFFIX.len())
        .saturating_sub(prefix.len() + middle.len() + ext.len());
    let filename = shorten_keeping_extension(filename, room);
    let title = truncate_to_boundary(title, room - filename.len());
    format!("{}{}{}{}{}", prefix, title, middle, filename, ext)
}

/// Longest trailing `.xxx` treated as an extension worth preserving.
const MAX_KEPT_EXTENSION: usize = 16;

fn shorten_keeping_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    if let Some(dot) = name.rfind('.') {
        let tail = &name[dot..];
        if dot > 0 && tail.len() <= MAX_KEPT_EXTENSION && tail.len() < max {
            let stem = truncate_to_boundary(&name[..dot], max - tail.len());
            return format!("{}{}", stem, tail);
        }
    }
    truncate_to_boundary(name, max).to_string()
}
