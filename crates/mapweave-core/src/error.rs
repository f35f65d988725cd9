//! Error types for the Mapweave core library
//!
//! Each concern of the mapping core owns a focused error enum (`PathError`,
//! `ActionError`, `ExpansionError`, `BuilderError`, `ConversionError`). They all
//! funnel into the crate-level [`Error`] so callers can use a single `Result`.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

pub use crate::action::ActionError;
pub use crate::builder::BuilderError;
pub use crate::conversion::ConversionError;
pub use crate::expand::ExpansionError;
pub use crate::path::PathError;

/// Main error type for Mapweave operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or otherwise unusable field paths
    #[error("Path error: {0}")]
    Path(#[from] PathError),

    /// Field action resolution or execution failures
    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    /// Collection mapping expansion failures
    #[error("Expansion error: {0}")]
    Expansion(#[from] ExpansionError),

    /// Target tree construction failures
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// Value conversion failures
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Reading a value out of a source document failed
    #[error("Source error at {path}: {message}")]
    Source { path: String, message: String },

    /// The session cannot start (missing or invalid mapping document)
    #[error("Precondition failed: {message}")]
    Precondition {
        message: String,
        diagnostics: usize,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a source read error
    pub fn source(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Source {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
