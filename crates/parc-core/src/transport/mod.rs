//! Blocking HTTP transport used by the API client and the fetch executor.
//!
//! Implementations are synchronous (libcurl); async callers go through
//! `tokio::task::spawn_blocking`.

mod http;

pub use http::CurlTransport;

use std::io;
use std::time::Duration;

use crate::retry::FetchError;

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    /// Whole-request limit; large videos need a generous value.
    pub request_timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(3600),
        }
    }
}

/// Sink receiving body chunks in order.
pub type BodySink<'a> = dyn FnMut(&[u8]) -> io::Result<()> + 'a;

/// Single-request HTTP GET. Headers are complete `Name: value` lines.
pub trait Transport: Send + Sync {
    /// GET `url` and return the whole body (API responses).
    fn get(&self, url: &str, headers: &[String]) -> Result<Vec<u8>, FetchError>;

    /// GET `url`, streaming the 2xx body into `sink`. Returns bytes delivered.
    /// A sink error aborts the transfer and surfaces as `FetchError::Storage`.
    fn download(
        &self,
        url: &str,
        headers: &[String],
        sink: &mut BodySink<'_>,
    ) -> Result<u64, FetchError>;
}
