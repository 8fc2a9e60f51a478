//! Error types for the CLI application.

use kinfolk_domain::CatalogError;
use kinfolk_inference::InferenceError;
use kinfolk_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Inference or confirmation error
    #[error("{0}")]
    Inference(#[from] InferenceError),

    /// Relationship catalog could not be loaded
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No person or edge matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// A name matched more than one person
    #[error("'{name}' matches {count} people; use an id instead")]
    Ambiguous {
        /// The name given
        name: String,
        /// How many people matched
        count: usize,
    },
}
