//! DocSage error types.
//!
//! A single error enum for the whole workspace. Retrieval and composition
//! failures are normally absorbed into degraded answers before they reach
//! callers; the variants here surface construction-time configuration
//! problems and storage/transport faults.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocSageError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Document error: {0}")]
    Document(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocSageError>;
