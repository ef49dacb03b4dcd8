//! Error types for the mart pipeline

use thiserror::Error;

/// Mart pipeline operation errors
#[derive(Error, Debug)]
pub enum MartError {
    /// Source relation name not in the registry
    #[error("Unknown source relation: {0}")]
    UnknownSource(String),

    /// Schema mismatch
    #[error("Schema mismatch: {0}")]
    SchemaError(String),

    /// Transformation error
    #[error("Transform error: {0}")]
    TransformError(String),

    /// Storage error (filesystem, parquet)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Every raw source was missing or unreadable; publishing an empty
    /// warehouse would silently wipe the marts, so the run aborts instead.
    #[error("no source relations could be read, aborting the run")]
    NoSourceData,
}

// Error conversions for Polars and filesystem operations

impl From<polars::prelude::PolarsError> for MartError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        MartError::TransformError(err.to_string())
    }
}

impl From<std::io::Error> for MartError {
    fn from(err: std::io::Error) -> Self {
        MartError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for MartError {
    fn from(err: serde_json::Error) -> Self {
        MartError::SerializationError(err.to_string())
    }
}

impl From<anyhow::Error> for MartError {
    fn from(err: anyhow::Error) -> Self {
        MartError::TransformError(err.to_string())
    }
}

impl From<std::env::VarError> for MartError {
    fn from(err: std::env::VarError) -> Self {
        MartError::ConfigError(err.to_string())
    }
}
