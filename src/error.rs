//! Error types for metacrawl
//!
//! This module defines all error types used throughout the crawler.

use thiserror::Error;

/// The main error type for metacrawl
#[derive(Error, Debug)]
pub enum Error {
    // ========== Capability Errors ==========
    #[error("Capability error: operation '{operation}' is not supported: {reason}")]
    UnsupportedCapability { operation: String, reason: String },

    #[error("Capability error: operation '{operation}' returned {found}, expected {expected}")]
    UnexpectedShape {
        operation: String,
        expected: String,
        found: String,
    },

    #[error("Capability error: cannot derive a property name from operation '{0}'")]
    InvalidOperationName(String),

    // ========== Row Errors ==========
    #[error("Row error: {0}")]
    MalformedRow(String),

    #[error("Resource error: failed to release {resource}: {reason}")]
    ResourceRelease { resource: String, reason: String },

    // ========== Interface Errors ==========
    #[error("Interface error: {0}")]
    FatalInterface(String),

    // ========== Configuration Errors ==========
    #[error("Configuration error: {0}")]
    Config(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create an UnsupportedCapability error
    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedCapability {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnexpectedShape error
    pub fn unexpected_shape(
        operation: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::UnexpectedShape {
            operation: operation.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Whether this error means the metadata interface itself is gone.
    ///
    /// Everything else is scoped to one operation or one row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::FatalInterface(_))
    }
}

/// Result type alias for metacrawl operations
pub type Result<T> = std::result::Result<T, Error>;
