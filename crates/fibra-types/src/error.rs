//! Error types for the fibra engine.
//!
//! All crates return `FibraResult<T>` from fallible operations.
//! Every error is a deterministic consequence of geometry and
//! configuration; none of them is worth retrying.

use thiserror::Error;

/// Unified error type for the fibra engine.
#[derive(Debug, Error)]
pub enum FibraError {
    /// Configuration value is invalid (bounds, pane index, width, stiffness).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Object geometry is malformed (e.g. a filament with fewer than two vertices).
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An engine invariant was violated (e.g. records inserted before a grid exists).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Convenience alias for `Result<T, FibraError>`.
pub type FibraResult<T> = Result<T, FibraError>;
