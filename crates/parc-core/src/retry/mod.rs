//! Retry and backoff policy.
//!
//! Classifies transport failures (timeouts, throttling, connection errors,
//! short transfers) and decides exponential backoff, so the API client and the
//! asset executor share one consistent policy. Authentication failures are
//! never retried.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
