//! Unified error types for the outpost engine.
//!
//! Strategies never surface a cache miss as an error: absence is a normal
//! branch. The variants here cover the failures that can actually escape a
//! strategy, namely transport-level network errors and store operation
//! failures.

use tokio_rusqlite::rusqlite;

/// Unified error type for the caching engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level fetch failure (connectivity loss, DNS failure, abort).
    ///
    /// HTTP error statuses are NOT network errors; a resolved 404 or 500 is
    /// a successful fetch and may be cached.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Store operation failed (quota, unavailable, corrupt database).
    #[error("STORE_ERROR: {0}")]
    Store(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A client-view operation (focus/open) failed during click routing.
    #[error("VIEW_ERROR: {0}")]
    View(String),
}

impl Error {
    /// True for the failure class that the fallback strategies recover from.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Store(tokio_rusqlite::Error::Close(c)),
            _ => Error::Store(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Store(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(tokio_rusqlite::Error::Error(err))
    }
}
