//! Run-level errors. Anything else is recovered per asset, post or user.

use crate::auth::AuthError;

/// Errors that terminate the whole run.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Credentials missing or rejected; no further progress is possible.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The persistence backend failed. Never replaced by the other backend.
    #[error("persistence backend failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ArchiveError {
    pub(crate) fn backend(e: anyhow::Error) -> Self {
        ArchiveError::Backend(e.into())
    }

    pub(crate) fn rejected(url: &str) -> Self {
        ArchiveError::Auth(AuthError::Rejected {
            status: 401,
            url: url.to_string(),
        })
    }
}
