//! In-process transport fake shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::retry::{FetchError, RetryPolicy};
use crate::transport::{BodySink, Transport};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Body(Vec<u8>),
    Status(u32),
    /// Delivers the bytes, then fails as a connection cut short of `announced`.
    Truncated(Vec<u8>, u64),
}

/// Answers by exact URL. One-shot replies are served before the standing one;
/// unknown URLs get 404.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    once: Mutex<HashMap<String, VecDeque<Reply>>>,
    standing: Mutex<HashMap<String, Reply>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, url: &str, reply: Reply) {
        self.standing.lock().unwrap().insert(url.to_string(), reply);
    }

    pub(crate) fn push_once(&self, url: &str, reply: Reply) {
        self.once
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    fn reply(&self, url: &str) -> Reply {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        if let Some(r) = self.once.lock().unwrap().get_mut(url).and_then(|q| q.pop_front()) {
            return r;
        }
        self.standing
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Reply::Status(404))
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str, _headers: &[String]) -> Result<Vec<u8>, FetchError> {
        match self.reply(url) {
            Reply::Body(b) => Ok(b),
            Reply::Status(code) => Err(FetchError::Http(code)),
            Reply::Truncated(b, announced) => Err(FetchError::PartialTransfer {
                expected: announced,
                received: b.len() as u64,
            }),
        }
    }

    fn download(
        &self,
        url: &str,
        _headers: &[String],
        sink: &mut BodySink<'_>,
    ) -> Result<u64, FetchError> {
        match self.reply(url) {
            Reply::Body(b) => {
                for chunk in b.chunks(7) {
                    sink(chunk).map_err(FetchError::Storage)?;
                }
                Ok(b.len() as u64)
            }
            Reply::Status(code) => Err(FetchError::Http(code)),
            Reply::Truncated(b, announced) => {
                for chunk in b.chunks(7) {
                    sink(chunk).map_err(FetchError::Storage)?;
                }
                Err(FetchError::PartialTransfer {
                    expected: announced,
                    received: b.len() as u64,
                })
            }
        }
    }
}

pub(crate) fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    }
}

/// Minimal PNG signature followed by `len - 8` filler bytes.
pub(crate) fn png_bytes(len: usize) -> Vec<u8> {
    let mut v = b"\x89PNG\r\n\x1a\n".to_vec();
    v.resize(len.max(8), 0);
    v
}
