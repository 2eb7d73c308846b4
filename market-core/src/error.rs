//! Error types for the marketplace

use thiserror::Error;

/// Result type for marketplace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Marketplace errors
///
/// `NotFound`, `BadRequest`, `Forbidden` and `Conflict` are domain outcomes
/// returned to callers as values; the remaining variants surface
/// infrastructure failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input, missing field, or insufficient funds
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authorization failure (non-owner delete, self-purchase)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Write-once record already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
