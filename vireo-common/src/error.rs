//! Common error types for Vireo

use thiserror::Error;

/// Common result type for Vireo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Vireo crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A caller broke a domain invariant (e.g. user/server mismatch)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Missing or rejected credential
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Remote server call failed (transport or protocol)
    #[error("Remote error: {0}")]
    Remote(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
