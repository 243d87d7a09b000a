//! Credentials: bearer token plus the browser cookie jar.
//!
//! Both are required by the platform; a missing file or a 401 from the API is
//! an authentication failure that aborts the whole run.

mod cookies;

pub use cookies::{Cookie, CookieJar};

use std::fmt;
use std::path::{Path, PathBuf};

/// Authentication problems. Every variant carries a remediation hint in its message.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("bearer token not found at {path}; pass --token or save the \"Authorization: Bearer\" value there")]
    MissingToken { path: PathBuf },
    #[error("cookie jar not found at {path}; export the platform cookies in Netscape cookies.txt format")]
    MissingCookies { path: PathBuf },
    #[error("could not read {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials rejected (HTTP {status}) for {url}; refresh the token and cookies, then run again")]
    Rejected { status: u32, url: String },
}

/// Token and cookies attached to every request.
#[derive(Clone)]
pub struct Credentials {
    token: String,
    cookies: CookieJar,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("cookies", &self.cookies.len())
            .finish()
    }
}

impl Credentials {
    pub fn new(token: impl Into<String>, cookies: CookieJar) -> Self {
        Self {
            token: normalize_token(&token.into()),
            cookies,
        }
    }

    /// Loads credentials: `token` wins over `token_path`; the cookie jar must exist.
    pub fn load(
        token: Option<String>,
        token_path: &Path,
        cookies_path: &Path,
    ) -> Result<Self, AuthError> {
        let token = match token.map(|t| normalize_token(&t)).filter(|t| !t.is_empty()) {
            Some(t) => t,
            None => {
                if !token_path.exists() {
                    return Err(AuthError::MissingToken {
                        path: token_path.to_path_buf(),
                    });
                }
                let raw = read(token_path)?;
                let t = normalize_token(&raw);
                if t.is_empty() {
                    return Err(AuthError::MissingToken {
                        path: token_path.to_path_buf(),
                    });
                }
                t
            }
        };

        if !cookies_path.exists() {
            return Err(AuthError::MissingCookies {
                path: cookies_path.to_path_buf(),
            });
        }
        let cookies = CookieJar::parse(&read(cookies_path)?);
        if cookies.is_empty() {
            tracing::warn!(path = %cookies_path.display(), "cookie jar has no usable cookies");
        }

        Ok(Self { token, cookies })
    }

    /// Request headers (`Name: value`) for `url`.
    pub fn headers_for(&self, url: &str) -> Vec<String> {
        let mut headers = vec![format!("Authorization: Bearer {}", self.token)];
        if let Some(cookie) = self.cookies.header_for(url) {
            headers.push(format!("Cookie: {}", cookie));
        }
        headers
    }
}

fn read(path: &Path) -> Result<String, AuthError> {
    std::fs::read_to_string(path).map_err(|source| AuthError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Accepts a bare token or a pasted `Bearer <token>` value.
fn normalize_token(raw: &str) -> String {
    let t = raw.trim();
    t.strip_prefix("Bearer ").unwrap_or(t).trim().to_string()
}
