use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes.
///
/// Document-content problems are never errors; they come back as findings.
/// The only fatal conditions are the two parse failures, plus I/O and
/// configuration problems at the binary surface.
#[derive(Error, Debug)]
pub enum NitsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TXT_PARSING_FAILED: line {line}: {details}")]
    TxtParsingFailed { line: usize, details: String },

    #[error("XML_PARSING_FAILED: {details}")]
    XmlParsingFailed { details: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported document type: {path} (expected .txt or .xml)")]
    UnsupportedDocumentType { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NitsError {
    /// True for the fatal structural failures that abort the run before any
    /// rule executes.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            NitsError::TxtParsingFailed { .. } | NitsError::XmlParsingFailed { .. }
        )
    }
}

/// Configuration-specific error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration format: {details}")]
    InvalidFormat { details: String },

    #[error("Invalid configuration value: {field} = {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl From<ConfigError> for NitsError {
    fn from(err: ConfigError) -> Self {
        NitsError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, NitsError>;
