//! Storage-layer error taxonomy

use crate::engine::classifier::UnknownLabel;
use thiserror::Error;

/// Any failure of the conversation store. Surfaced to the caller as-is;
/// the store never retries or drops a write.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("session id must not be empty")]
    InvalidSessionId,
}

impl From<UnknownLabel> for StorageError {
    fn from(e: UnknownLabel) -> Self {
        StorageError::Corrupt(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
