//! Creator name resolution from CLI input.

/// Returns the creator name for `input`: a bare name, or a URL on the site
/// (`https://[www.]site/name[/posts/...]`). None if unsupported.
pub fn resolve_user(input: &str, site_base: &str) -> Option<String> {
    let input = input.trim();
    if is_valid_name(input) {
        return Some(input.to_string());
    }

    let parsed = url::Url::parse(input).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let site_host = url::Url::parse(site_base).ok()?.host_str()?.to_ascii_lowercase();
    let host = parsed.host_str()?.to_ascii_lowercase();
    if host.trim_start_matches("www.") != site_host.trim_start_matches("www.") {
        return None;
    }
    let name = parsed.path_segments()?.find(|s| !s.is_empty())?;
    is_valid_name(name).then(|| name.to_string())
}

fn is_valid_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://boosty.to";

    #[test]
    fn bare_names() {
        assert_eq!(resolve_user("alice", SITE).as_deref(), Some("alice"));
        assert_eq!(resolve_user(" a.b-c_1 ", SITE).as_deref(), Some("a.b-c_1"));
        assert!(resolve_user("bad name", SITE).is_none());
        assert!(resolve_user("", SITE).is_none());
    }

    #[test]
    fn site_urls() {
        assert_eq!(
            resolve_user("https://boosty.to/alice", SITE).as_deref(),
            Some("alice")
        );
        assert_eq!(
            resolve_user("http://www.boosty.to/alice/posts/1234-uuid", SITE).as_deref(),
            Some("alice")
        );
        assert!(resolve_user("https://other.example/alice", SITE).is_none());
        assert!(resolve_user("https://boosty.to/", SITE).is_none());
        assert!(resolve_user("ftp://boosty.to/alice", SITE).is_none());
    }
}
