//! Error types for Trainforge.
//!
//! Library crates use [`TrainforgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Message shown when a generation request finds nothing to build from.
pub const EMPTY_RETRIEVAL_HINT: &str = "Please upload relevant documents first";

/// Top-level error type for all Trainforge operations.
#[derive(Debug, thiserror::Error)]
pub enum TrainforgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The document's file type has no text extractor.
    #[error("unsupported file type: {extension}")]
    UnsupportedFormat { extension: String },

    /// Retrieval returned no document groups for a generation request.
    #[error("no relevant content found in knowledge base. {EMPTY_RETRIEVAL_HINT}")]
    EmptyRetrieval,

    /// Text extraction failed for a document.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Malformed input (invalid duration, empty prompt, bad chunk sizes, ...).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON/TOML serialization of an output artifact failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TrainforgeError>;

impl TrainforgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an unsupported-format error for a file extension.
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller should be told to upload more content.
    pub fn is_empty_retrieval(&self) -> bool {
        matches!(self, Self::EmptyRetrieval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = TrainforgeError::config("missing store dir");
        assert_eq!(err.to_string(), "config error: missing store dir");

        let err = TrainforgeError::unsupported_format(".docx");
        assert_eq!(err.to_string(), "unsupported file type: .docx");
    }

    #[test]
    fn empty_retrieval_mentions_upload() {
        let err = TrainforgeError::EmptyRetrieval;
        assert!(err.is_empty_retrieval());
        assert!(err.to_string().contains("upload relevant documents"));
    }
}
