//! Tab-separated link export: `PostIntID\tPostURL\tURL`, one entry per line.

use std::path::Path;

use anyhow::{Context, Result};

use super::LinkEntry;
use crate::storage::write_atomically;

/// Renders `entries` in the given order, newline-terminated.
pub fn format_export(entries: &[LinkEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        out.push_str(&e.post_id.to_string());
        out.push('\t');
        out.push_str(&escape(&e.post_url));
        out.push('\t');
        out.push_str(&escape(&e.url));
        out.push('\n');
    }
    out
}

/// Parses export lines. Blank and malformed lines are skipped.
pub fn parse_export(contents: &str) -> Vec<LinkEntry> {
    let mut out = Vec::new();
    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut cols = line.splitn(3, '\t');
        let parsed = match (cols.next(), cols.next(), cols.next()) {
            (Some(id), Some(post_url), Some(url)) => id.trim().parse::<i64>().ok().map(|post_id| LinkEntry {
                post_id,
                post_url: unescape(post_url),
                url: unescape(url),
            }),
            _ => None,
        };
        match parsed {
            Some(e) => out.push(e),
            None => tracing::warn!(line = lineno + 1, "skipping malformed link line"),
        }
    }
    out
}

/// Overwrites `path` with the export of `entries`.
pub fn write_export(path: &Path, entries: &[LinkEntry]) -> Result<()> {
    write_atomically(path, format_export(entries).as_bytes())
        .with_context(|| format!("write link export {}", path.display()))
}

/// Backslash-escapes characters that would break the line format.
pub(super) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

pub(super) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
