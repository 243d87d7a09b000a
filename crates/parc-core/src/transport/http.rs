//! libcurl-backed transport.

use std::cell::Cell;
use std::io;
use std::str;
use std::time::Duration;

use super::{BodySink, Transport, TransportOptions};
use crate::retry::FetchError;

/// Transport over the curl crate. Each request uses a fresh easy handle.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: TransportOptions,
}

impl CurlTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }

    fn easy(&self, url: &str, headers: &[String]) -> Result<curl::easy::Easy, FetchError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(self.options.request_timeout)?;

        if !headers.is_empty() {
            let mut list = curl::easy::List::new();
            for h in headers {
                list.append(h.trim())?;
            }
            easy.http_headers(list)?;
        }
        Ok(easy)
    }

    /// Runs the request, handing 2xx body bytes to `on_body`. Bodies of
    /// redirect and error responses are dropped.
    fn perform(
        &self,
        url: &str,
        headers: &[String],
        on_body: &mut BodySink<'_>,
    ) -> Result<u64, FetchError> {
        let mut easy = self.easy(url, headers)?;
        let status = Cell::new(0u32);
        let mut delivered = 0u64;
        let mut sink_error: Option<io::Error> = None;

        let result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Some(code) = str::from_utf8(data).ok().and_then(parse_status_line) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                if !(200..300).contains(&status.get()) {
                    return Ok(data.len());
                }
                match on_body(data) {
                    Ok(()) => {
                        delivered += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = sink_error {
            return Err(FetchError::Storage(e));
        }
        if let Err(e) = result {
            // Body ended before the announced Content-Length.
            if e.is_partial_file() {
                let expected = easy
                    .content_length_download()
                    .map(|n| n.max(0.0) as u64)
                    .unwrap_or(0);
                return Err(FetchError::PartialTransfer {
                    expected,
                    received: delivered,
                });
            }
            return Err(e.into());
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            tracing::debug!(url = %url, status = code, "non-success response");
            return Err(FetchError::Http(code));
        }
        Ok(delivered)
    }
}

impl Transport for CurlTransport {
    fn get(&self, url: &str, headers: &[String]) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        self.perform(url, headers, &mut |chunk: &[u8]| {
            body.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(body)
    }

    fn download(
        &self,
        url: &str,
        headers: &[String],
        sink: &mut BodySink<'_>,
    ) -> Result<u64, FetchError> {
        self.perform(url, headers, sink)
    }
}

/// Status code from an `HTTP/1.1 200 OK` or `HTTP/2 200` line.
fn parse_status_line(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
