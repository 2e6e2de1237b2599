//! Error types for formatting operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Detector callback failed: {0}")]
    Detector(String),
}

pub type Result<T> = std::result::Result<T, FormatError>;
