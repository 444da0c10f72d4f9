//! Error types for the Taxis library.
//!
//! Counting and scoring over already-trained profiles never fails, so errors
//! only surface at the edges: invalid fitting parameters, the external linear
//! solver, persisted model data and configuration parsing. All of them are
//! represented by the [`TaxisError`] enum.
//!
//! # Examples
//!
//! ```
//! use taxis::error::{TaxisError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(TaxisError::invalid_argument("k must be positive"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Taxis operations.
#[derive(Error, Debug)]
pub enum TaxisError {
    /// I/O errors while reading or writing persisted profiles.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed persisted model data.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Invalid parameter passed to a strategy, selector or divider.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by an external linear solver.
    #[error("Solver error: {0}")]
    Solver(String),

    /// Binary serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Errors raised by pluggable collaborators written against `anyhow`.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with TaxisError.
pub type Result<T> = std::result::Result<T, TaxisError>;

impl TaxisError {
    /// Create a new persistence error.
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        TaxisError::Persistence(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TaxisError::InvalidArgument(msg.into())
    }

    /// Create a new solver error.
    pub fn solver<S: Into<String>>(msg: S) -> Self {
        TaxisError::Solver(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TaxisError::InvalidArgument(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        TaxisError::Other(msg.into())
    }
}

impl From<bincode::Error> for TaxisError {
    fn from(err: bincode::Error) -> Self {
        TaxisError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = TaxisError::persistence("bad count");
        assert_eq!(error.to_string(), "Persistence error: bad count");

        let error = TaxisError::invalid_argument("k must be positive");
        assert_eq!(error.to_string(), "Invalid argument: k must be positive");

        let error = TaxisError::invalid_config("unknown algorithm");
        assert_eq!(
            error.to_string(),
            "Invalid argument: Invalid configuration: unknown algorithm"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let taxis_error = TaxisError::from(io_error);

        match taxis_error {
            TaxisError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: TaxisError = anyhow::anyhow!("solver diverged").into();
        assert!(matches!(err, TaxisError::Anyhow(_)));
        assert_eq!(err.to_string(), "Anyhow error: solver diverged");
    }
}
