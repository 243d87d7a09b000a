//! Content-type sniffing from the first bytes of a body.

/// MIME type → file extension for every type the archiver recognises.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/x-ms-bmp", "bmp"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("video/webm", "webm"),
    ("video/mp4", "mp4"),
    ("video/x-matroska", "mkv"),
    ("video/x-msvideo", "avi"),
    ("video/quicktime", "mov"),
    ("audio/mpeg", "mp3"),
    ("audio/x-wav", "wav"),
    ("audio/x-flac", "flac"),
    ("audio/x-m4a", "m4a"),
    ("video/ogg", "ogv"),
    ("audio/ogg", "ogg"),
    ("audio/x-hx-aac-adts", "aac"),
];

/// Extensions a sniffed asset can end up with.
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "png", "jpg", "gif", "bmp", "webp", "svg", "webm", "mp4", "mkv", "avi", "mov", "mp3", "wav",
    "flac", "m4a", "ogv", "ogg", "aac",
];

pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    MIME_EXTENSIONS
        .iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(mime))
        .map(|(_, e)| *e)
}

/// MIME type detected from magic bytes, or None when unrecognised.
pub fn sniff_mime(head: &[u8]) -> Option<&'static str> {
    if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("image/png");
    }
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if head.len() >= 12 && head.starts_with(b"RIFF") {
        match &head[8..12] {
            b"WEBP" => return Some("image/webp"),
            b"AVI " => return Some("video/x-msvideo"),
            b"WAVE" => return Some("audio/x-wav"),
            _ => {}
        }
    }
    if head.starts_with(b"BM") && head.len() >= 14 {
        return Some("image/x-ms-bmp");
    }
    if head.len() >= 12 && &head[4..8] == b"ftyp" {
        return Some(match &head[8..12] {
            b"qt  " => "video/quicktime",
            b"M4A " | b"M4B " => "audio/x-m4a",
            _ => "video/mp4",
        });
    }
    if head.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(if contains(head, b"webm") {
            "video/webm"
        } else {
            "video/x-matroska"
        });
    }
    if head.starts_with(b"OggS") {
        return Some(if contains(head, b"theora") {
            "video/ogg"
        } else {
            "audio/ogg"
        });
    }
    if head.starts_with(b"fLaC") {
        return Some("audio/x-flac");
    }
    if head.starts_with(b"ID3") {
        return Some("audio/mpeg");
    }
    if head.len() >= 2 && head[0] == 0xFF {
        // ADTS: layer bits are zero; MPEG audio frames have a non-zero layer.
        if head[1] & 0xF6 == 0xF0 {
            return Some("audio/x-hx-aac-adts");
        }
        if head[1] & 0xE0 == 0xE0 && head[1] & 0x06 != 0 {
            return Some("audio/mpeg");
        }
    }
    if looks_like_svg(head) {
        return Some("image/svg+xml");
    }
    None
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn looks_like_svg(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
}
