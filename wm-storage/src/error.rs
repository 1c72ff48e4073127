//! Error types for product storage
//!
//! Structural edits on the entity tree never fail with an error: rejected
//! operations return `None` or are no-ops, bound violations are reconciled.
//! This type covers the I/O and configuration boundaries only.

use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for document, configuration and loader operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested entity or parameter set not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document parsed but does not describe a product
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Internal error (channel closed, worker task failed)
    #[error("Internal error: {0}")]
    Internal(String),
}
