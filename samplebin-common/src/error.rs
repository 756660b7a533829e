//! Shared error type for the samplebin crates
//!
//! Covers the failure surface of the common layer: database queries, disk
//! access for media and the database file, configuration resolution, and
//! lookups that come back empty. The web crate wraps this in its own
//! response-aware error type.

use thiserror::Error;

/// Result alias used throughout the samplebin crates
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query or connection failure from sqlx
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Disk failure while touching media files or the database path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable startup configuration (bad env value, unreadable file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A user or sample lookup came back empty
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failure with no actionable detail for the caller, e.g. hashing
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_context() {
        let err = Error::NotFound("Sample guid abc".to_string());
        assert_eq!(err.to_string(), "Not found: Sample guid abc");

        let err = Error::Config("Invalid PORT value \"x\"".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid PORT value \"x\"");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("IO error:"));
    }
}
