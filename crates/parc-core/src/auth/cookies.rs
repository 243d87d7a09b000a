//! Netscape `cookies.txt` jar (the format browser export extensions write).

use std::time::{SystemTime, UNIX_EPOCH};

/// One cookie line: `domain  include_subdomains  path  secure  expires  name  value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; 0 = session cookie.
    pub expires: i64,
    pub name: String,
    pub value: String,
}

impl Cookie {
    fn matches(&self, scheme: &str, host: &str, path: &str, now: i64) -> bool {
        if self.secure && scheme != "https" {
            return false;
        }
        if self.expires != 0 && self.expires < now {
            return false;
        }
        if !path.starts_with(&self.path) {
            return false;
        }
        let domain = self.domain.trim_start_matches('.').to_ascii_lowercase();
        let host = host.to_ascii_lowercase();
        if host == domain {
            return true;
        }
        (self.include_subdomains || self.domain.starts_with('.'))
            && host.ends_with(&format!(".{}", domain))
    }
}

/// Parsed cookie jar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Parses Netscape cookie file contents. Comment lines are skipped except
    /// the `#HttpOnly_` prefix curl and browsers use; malformed lines are ignored.
    pub fn parse(contents: &str) -> Self {
        let mut cookies = Vec::new();
        for raw in contents.lines() {
            let line = raw.trim_end_matches(['\r', '\n']);
            let line = match line.strip_prefix("#HttpOnly_") {
                Some(rest) => rest,
                None if line.starts_with('#') || line.trim().is_empty() => continue,
                None => line,
            };
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                tracing::debug!(line = %line, "skipping malformed cookie line");
                continue;
            }
            let Ok(expires) = fields[4].trim().parse::<i64>() else {
                continue;
            };
            cookies.push(Cookie {
                domain: fields[0].trim().to_string(),
                include_subdomains: fields[1].eq_ignore_ascii_case("TRUE"),
                path: fields[2].trim().to_string(),
                secure: fields[3].eq_ignore_ascii_case("TRUE"),
                expires,
                name: fields[5].to_string(),
                value: fields[6].to_string(),
            });
        }
        CookieJar { cookies }
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `Cookie` header value for `url`, or None when nothing matches.
    pub fn header_for(&self, url: &str) -> Option<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.header_for_at(url, now)
    }

    pub fn header_for_at(&self, url: &str, now: i64) -> Option<String> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|c| c.matches(parsed.scheme(), host, parsed.path(), now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}
