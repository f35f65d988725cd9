//! Field action pipeline
//!
//! Field actions are named, typed transformation steps (`Trim`, `SubString`,
//! `AbsoluteValue`, ...) applied in order to a field's value. Implementations
//! are registered once in an [`ActionRegistry`] as [`ActionDetail`]s carrying
//! a function pointer, and resolved by `(name, current type)` at execution time.
//! The [`FieldActionPipeline`] threads a value through the chain and inserts
//! implicit conversions at each type boundary.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod pipeline;
pub mod registry;


pub use pipeline::FieldActionPipeline;
pub use registry::{ActionDetail, ActionHandler, ActionParameter, ActionRegistry};

use crate::conversion::ConversionError;
use crate::types::FieldType;
use thiserror::Error;

/// Field action errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// No implementation registered under this name
    #[error("No action named '{name}' is registered")]
    UnresolvedAction { name: String },

    /// A conversion needed between two steps has no converter
    #[error("Conversion from {from} to {to} is unavailable ({context})")]
    ConversionUnavailable {
        from: FieldType,
        to: FieldType,
        context: String,
    },

    /// A converter exists but rejected the value
    #[error("Conversion failed ({context}): {message}")]
    ConversionFailed { context: String, message: String },

    /// Missing or unparseable action parameter
    #[error("Invalid parameter '{parameter}' for action '{action}': {message}")]
    InvalidParameter {
        action: String,
        parameter: String,
        message: String,
    },

    /// The action body failed
    #[error("Action '{action}' failed: {message}")]
    Failed { action: String, message: String },
}

impl ActionError {
    pub fn failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        ActionError::Failed {
            action: action.into(),
            message: message.into(),
        }
    }

    pub fn invalid_parameter(
        action: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ActionError::InvalidParameter {
            action: action.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Map a conversion error, naming the step that needed it
    pub fn from_conversion(err: ConversionError, context: impl Into<String>) -> Self {
        match err {
            ConversionError::NoConverter { from, to } => ActionError::ConversionUnavailable {
                from,
                to,
                context: context.into(),
            },
            failed @ ConversionError::Failed { .. } => ActionError::ConversionFailed {
                context: context.into(),
                message: failed.to_string(),
            },
        }
    }
}
