//! Error types for graph engine operations.
//!
//! Every repository and engine call surfaces failures to its immediate
//! caller. Nothing is retried internally; transient store failures
//! (`StoreUnavailable`) are the caller's to retry.
//!
//! ## Error Categorization
//!
//! - **Store problems**: `StoreUnavailable`, `QueryFailure`
//! - **Data problems**: `ConstraintViolation`, `BatchAborted`, `NotFound`
//! - **Setup problems**: `Config`, `InvalidInput`, `Io`

use rusqlite::ErrorCode;
use thiserror::Error;

/// Result type for graph engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for graph engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend could not be opened or reached
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The backend rejected a row (duplicate natural key, failed check)
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    /// A read or write statement failed
    #[error("query failed: {0}")]
    QueryFailure(#[source] rusqlite::Error),

    /// One member of a batched insert failed; the whole batch was rolled back
    #[error("batch aborted at record {index}: {source}")]
    BatchAborted {
        /// Zero-based position of the failing record
        index: usize,
        /// Why that record failed
        #[source]
        source: Box<Error>,
    },

    /// A row the operation requires does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A source batch could not be decoded
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        let code = match &err {
            rusqlite::Error::SqliteFailure(e, _) => Some(e.code),
            _ => None,
        };

        match code {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(err),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly,
            ) => Self::StoreUnavailable(err.to_string()),
            _ => Self::QueryFailure(err),
        }
    }
}

impl Error {
    /// Wrap the failure of one batch member.
    pub(crate) fn batch_aborted(index: usize, source: Error) -> Self {
        Self::BatchAborted {
            index,
            source: Box::new(source),
        }
    }

    /// Returns `true` if retrying the same call later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StoreUnavailable(_) => true,
            Self::BatchAborted { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
