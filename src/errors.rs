/*!
 * Error types for the scriptsync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while decoding or parsing a scene document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The document could not be turned into markup the structural parser accepts
    #[error("Invalid XLIFF content: {0}")]
    InvalidDocument(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from document decoding or scene extraction
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// The document parsed but contained no scene groups
    #[error("No scenes found in XLIFF")]
    NoScenes,

    /// Error from configuration loading or validation
    #[error("Configuration error: {0}")]
    Config(String),
}

// Utility functions for error conversion
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Config(error.to_string())
    }
}
