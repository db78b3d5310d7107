//! Error types for the magnetio pipeline
//!
//! Provides an error enum with human-readable messages. Note that most of
//! the pipeline swallows errors by design (a failed source contributes an
//! empty stream list); these variants travel only within a single source
//! lookup before being logged and discarded.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all magnetio operations
#[derive(Error, Debug)]
pub enum MagnetioError {
    /// HTTP request failed (timeout, connection failure, non-2xx)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse HTML content or a CSS selector
    #[error("Failed to parse HTML: {0}")]
    Parse(String),

    /// Metadata API reported no match for the requested id
    #[error("Metadata not found: {0}")]
    MetadataNotFound(String),

    /// Malformed stream lookup input (empty title, bad id)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl Serialize for MagnetioError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for magnetio operations
pub type Result<T> = std::result::Result<T, MagnetioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let error = MagnetioError::Parse("invalid selector".to_string());
        assert_eq!(error.to_string(), "Failed to parse HTML: invalid selector");
    }

    #[test]
    fn test_error_display_metadata_not_found() {
        let error = MagnetioError::MetadataNotFound("tt0000000".to_string());
        assert_eq!(error.to_string(), "Metadata not found: tt0000000");
    }

    #[test]
    fn test_error_display_invalid_query() {
        let error = MagnetioError::InvalidQuery("empty title".to_string());
        assert_eq!(error.to_string(), "Invalid query: empty title");
    }

    #[test]
    fn test_error_serialize() {
        let error = MagnetioError::MetadataNotFound("tt123".to_string());
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Metadata not found: tt123\"");
    }
}
