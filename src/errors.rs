//! Error types for CodeSensei
//!
//! The core (search, features, learner) is total and never returns these.
//! They surface only at the boundaries: loading catalogs, lexicons and
//! configuration, and talking to a key-value store.

use thiserror::Error;

/// Main error type for the CodeSensei crate
#[derive(Error, Debug)]
pub enum SenseiError {
    /// Knowledge catalog could not be loaded or is inconsistent
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Lexicon resource could not be parsed
    #[error("Lexicon error: {0}")]
    Lexicon(String),

    /// Key-value store failures
    #[error("Storage error for key '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("CodeSensei error: {0}")]
    Generic(String),
}

/// Result type alias for CodeSensei operations
pub type Result<T> = std::result::Result<T, SenseiError>;

/// Convert anyhow errors to SenseiError
impl From<anyhow::Error> for SenseiError {
    fn from(err: anyhow::Error) -> Self {
        SenseiError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = SenseiError::Storage {
            key: "codesensei-progress".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("codesensei-progress"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let err: SenseiError = parse.unwrap_err().into();
        assert!(matches!(err, SenseiError::Serialization(_)));
    }
}
