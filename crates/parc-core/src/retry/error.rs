//! Transfer error type for retry classification.

/// Error returned by a single HTTP request or asset transfer.
/// Kept separate from anyhow so callers can classify it and decide retries.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Connection ended before the announced Content-Length arrived.
    /// Retried instead of kept.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Disk/storage write failed (e.g. disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
    /// The blocking transfer task panicked or was cancelled.
    #[error("transfer task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl FetchError {
    /// True when the server rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Http(401))
    }
}
