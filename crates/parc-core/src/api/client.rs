//! Authenticated JSON client for the creator and post listing endpoints.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::model::{Creator, PostsPage};
use crate::auth::Credentials;
use crate::config::RunConfig;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::transport::Transport;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("GET {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// URL and status when the platform rejected the credentials.
    pub fn unauthorized(&self) -> Option<(&str, u32)> {
        match self {
            ApiError::Fetch { url, source } if source.is_unauthorized() => Some((url, 401)),
            _ => None,
        }
    }
}

/// Client for `blog/{user}` and `blog/{user}/post/`.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Credentials,
    api_base: String,
    posts_per_page: u32,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, cfg: &RunConfig) -> Self {
        let mut api_base = cfg.api_base.clone();
        if !api_base.ends_with('/') {
            api_base.push('/');
        }
        Self {
            transport,
            credentials: cfg.credentials.clone(),
            api_base,
            posts_per_page: cfg.posts_per_page,
            retry: cfg.retry,
        }
    }

    pub async fn creator(&self, user: &str) -> Result<Creator, ApiError> {
        let url = format!("{}blog/{}", self.api_base, user);
        self.get_json(url).await
    }

    /// One page of posts; `offset` is the cursor from the previous page.
    pub async fn posts_page(&self, user: &str, offset: Option<&str>) -> Result<PostsPage, ApiError> {
        let mut url = format!(
            "{}blog/{}/post/?limit={}&comments_limit=0&reply_limit=0&is_only_allowed=false",
            self.api_base, user, self.posts_per_page
        );
        if let Some(offset) = offset {
            url.push_str("&offset=");
            url.push_str(&encode_query_value(offset));
        }
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        let headers = self.credentials.headers_for(&url);
        let body = run_with_retry(&self.retry, |attempt| {
            let transport = Arc::clone(&self.transport);
            let url = url.clone();
            let headers = headers.clone();
            async move {
                tracing::debug!(url = %url, attempt, "api request");
                tokio::task::spawn_blocking(move || transport.get(&url, &headers)).await?
            }
        })
        .await
        .map_err(|source| ApiError::Fetch {
            url: url.clone(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }
}

/// Percent-encodes the characters that would break a query value.
fn encode_query_value(v: &str) -> String {
    url::form_urlencoded::byte_serialize(v.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CookieJar;
    use crate::config::ParcConfig;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Serves canned bodies and remembers requested URLs.
    struct Canned {
        status: u32,
        body: &'static str,
        seen: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl Transport for Canned {
        fn get(&self, url: &str, headers: &[String]) -> Result<Vec<u8>, FetchError> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), headers.to_vec()));
            if self.status == 200 {
                Ok(self.body.as_bytes().to_vec())
            } else {
                Err(FetchError::Http(self.status))
            }
        }

        fn download(
            &self,
            _url: &str,
            _headers: &[String],
            _sink: &mut crate::transport::BodySink<'_>,
        ) -> Result<u64, FetchError> {
            unreachable!()
        }
    }

    fn client(t: Arc<Canned>) -> ApiClient {
        let mut cfg = ParcConfig::default();
        cfg.api_base = "http://api.test/v1".to_string();
        cfg.posts_per_page = 5;
        let run = RunConfig::new(
            &cfg,
            PathBuf::from("/out"),
            Credentials::new("tok", CookieJar::default()),
        );
        ApiClient::new(t, &run)
    }

    #[tokio::test]
    async fn posts_page_builds_cursor_url_and_sends_token() {
        let t = Arc::new(Canned {
            status: 200,
            body: r#"{"data":[],"extra":{"offset":"","isLast":true}}"#,
            seen: Mutex::new(Vec::new()),
        });
        let page = client(Arc::clone(&t))
            .posts_page("alice", Some("17:3"))
            .await
            .unwrap();
        assert!(page.extra.is_last);
        let seen = t.seen.lock().unwrap();
        assert_eq!(
            seen[0].0,
            "http://api.test/v1/blog/alice/post/?limit=5&comments_limit=0&reply_limit=0&is_only_allowed=false&offset=17%3A3"
        );
        assert_eq!(seen[0].1[0], "Authorization: Bearer tok");
    }

    #[tokio::test]
    async fn unauthorized_is_reported_without_retry() {
        let t = Arc::new(Canned {
            status: 401,
            body: "",
            seen: Mutex::new(Vec::new()),
        });
        let err = client(Arc::clone(&t)).creator("alice").await.unwrap_err();
        assert_eq!(
            err.unauthorized(),
            Some(("http://api.test/v1/blog/alice", 401))
        );
        assert_eq!(t.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_json_is_decode_error() {
        let t = Arc::new(Canned {
            status: 200,
            body: "<html>",
            seen: Mutex::new(Vec::new()),
        });
        let err = client(t).creator("alice").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
