//! Error types shared across the crate.

use thiserror::Error;

/// Errors that can occur while locating, extracting or encoding an entry.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying data source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error from a remote data source.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote server rejected or cannot serve a Range request.
    #[error("HTTP range request failed: {0}")]
    HttpRange(String),

    /// The archive bytes do not form a valid ZIP structure.
    #[error("invalid ZIP archive: {0}")]
    InvalidArchive(&'static str),

    /// No entry with the requested name exists in the archive.
    ///
    /// Distinct from [`Error::Io`] so callers can treat a missing entry
    /// differently from a broken data source.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// A text field holds bytes that are not valid UTF-8 and cannot be
    /// encoded as a DER UTF8String.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    /// A numeric field does not fit the signed range of the output schema.
    #[error("{field} value {value} exceeds the encodable integer range")]
    IntegerOverflow { field: &'static str, value: u64 },
}

/// Result type for operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;
