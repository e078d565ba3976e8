//! Error types for the chatscore library.
//!
//! The scorers themselves are total over their typed inputs; errors surface
//! from configuration loading and validation, text analysis, model training
//! and the async task layer of the pipeline.
//!
//! # Examples
//!
//! ```
//! use chatscore::error::{ChatscoreError, Result};
//!
//! fn check_weight(weight: f64) -> Result<()> {
//!     if weight < 0.0 {
//!         return Err(ChatscoreError::invalid_config("weight must be non-negative"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_weight(-1.0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for chatscore operations.
#[derive(Error, Debug)]
pub enum ChatscoreError {
    /// I/O errors (reading configuration or input files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Model training failed (empty corpus, degenerate vocabulary)
    #[error("Training error: {0}")]
    Training(String),

    /// A scoring task could not be joined (panicked or was aborted)
    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with ChatscoreError.
pub type Result<T> = std::result::Result<T, ChatscoreError>;

impl ChatscoreError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ChatscoreError::Analysis(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ChatscoreError::InvalidConfig(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        ChatscoreError::Training(msg.into())
    }

    /// Create a new task join error.
    pub fn task_join<S: Into<String>>(msg: S) -> Self {
        ChatscoreError::TaskJoin(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ChatscoreError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = ChatscoreError::analysis("bad pattern");
        assert_eq!(error.to_string(), "Analysis error: bad pattern");

        let error = ChatscoreError::invalid_config("weights must sum to 1.0");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: weights must sum to 1.0"
        );

        let error = ChatscoreError::training("no samples");
        assert_eq!(error.to_string(), "Training error: no samples");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "config.json");
        let error = ChatscoreError::from(io_error);

        match error {
            ChatscoreError::Io(_) => {}
            other => panic!("Expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: ChatscoreError = json_error.into();
        assert!(error.to_string().starts_with("JSON error"));
    }
}
