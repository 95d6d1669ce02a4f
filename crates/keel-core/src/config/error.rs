//! # Keel Configuration Errors
//!
//! Defines [`ConfigSystemError`], covering mutation of a frozen repository,
//! file I/O while loading or caching configuration, and (de)serialization of
//! configuration documents.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigSystemError {
    #[error("Configuration cannot be modified after boot (attempted '{operation}')")]
    Frozen { operation: String },

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization to '{format}' failed: {source}")]
    SerializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    DeserializationError {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format for path: {0}")]
    UnsupportedConfigFormat(PathBuf),

    #[error("Configuration document '{0}' is not a mapping")]
    NotAMapping(String),

    #[error("Invalid configuration key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}

impl ConfigSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        ConfigSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }

    pub fn frozen(operation: impl Into<String>) -> Self {
        ConfigSystemError::Frozen {
            operation: operation.into(),
        }
    }
}
