//! Filesystem-safe name sanitization for post titles and asset filenames.

/// Longest file name most filesystems accept, in bytes.
pub const NAME_MAX: usize = 255;

/// Characters forbidden on common filesystems, mapped to look-alikes so the
/// title stays readable.
const REPLACEMENTS: [(char, char); 9] = [
    ('\\', '⧹'),
    ('/', '⧸'),
    (':', '：'),
    ('*', '✩'),
    ('?', '？'),
    ('"', '＂'),
    ('<', '⧼'),
    ('>', '⧽'),
    ('|', '｜'),
];

/// Sanitizes a post title or asset filename for use inside a file name.
///
/// - Trims surrounding whitespace and dots
/// - Replaces `\ / : * ? " < > |` with Unicode look-alikes
/// - Drops control characters
/// - Limits length to 255 bytes (on a char boundary)
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim_matches(|c: char| c.is_whitespace() || c == '.');

    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_control() {
            continue;
        }
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push(*to),
            None => out.push(c),
        }
    }

    truncate_to_boundary(&out, NAME_MAX).to_string()
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_forbidden_characters() {
        assert_eq!(sanitize_filename("a/b\\c"), "a⧸b⧹c");
        assert_eq!(sanitize_filename("what? <yes>|no"), "what？ ⧼yes⧽｜no");
        assert_eq!(sanitize_filename("Part 1: \"Intro\" *new*"), "Part 1： ＂Intro＂ ✩new✩");
    }

    #[test]
    fn trims_dots_and_spaces() {
        assert_eq!(sanitize_filename("  ..  Update ..  "), "Update");
        assert_eq!(sanitize_filename("file.txt."), "file.txt");
    }

    #[test]
    fn drops_control_chars() {
        assert_eq!(sanitize_filename("line\nbreak\x00\ttab"), "linebreaktab");
    }

    #[test]
    fn caps_length_on_char_boundary() {
        let long = "ж".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= NAME_MAX);
        assert_eq!(out.len(), 254);
        assert!(out.chars().all(|c| c == 'ж'));
    }
}
