//! Value conversion contract
//!
//! The mapping core never hard-codes conversion rules; it asks a
//! [`ConversionService`] to convert values between declared field types and
//! to describe the concerns of a conversion for static validation.
//! [`DefaultConversionService`] is a reference implementation covering the
//! scalar types.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod default;

pub use default::DefaultConversionService;

use crate::types::{FieldType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What may go wrong when converting between two types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversionConcern {
    /// Lossless
    None,
    /// Value may not fit the target range
    Range,
    /// Value must have a particular textual format
    Format,
    /// Converter exists but cannot convert real values
    Unsupported,
}

impl fmt::Display for ConversionConcern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionConcern::None => write!(f, "NONE"),
            ConversionConcern::Range => write!(f, "RANGE"),
            ConversionConcern::Format => write!(f, "FORMAT"),
            ConversionConcern::Unsupported => write!(f, "UNSUPPORTED"),
        }
    }
}

/// Static description of an available converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterInfo {
    pub from: FieldType,
    pub to: FieldType,
    pub concerns: Vec<ConversionConcern>,
}

/// Conversion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// No converter exists between the two types
    #[error("No converter from {from} to {to}")]
    NoConverter { from: FieldType, to: FieldType },

    /// A converter exists but rejected the value
    #[error("Cannot convert '{value}' from {from} to {to}: {message}")]
    Failed {
        from: FieldType,
        to: FieldType,
        value: String,
        message: String,
    },
}

impl ConversionError {
    pub fn failed(value: &Value, to: FieldType, message: impl Into<String>) -> Self {
        ConversionError::Failed {
            from: value.field_type(),
            to,
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// Converts values between declared field types
pub trait ConversionService: Send + Sync {
    /// Convert `value` (declared as `from`) to `to`
    fn convert(&self, value: &Value, from: FieldType, to: FieldType) -> Result<Value, ConversionError>;

    /// Converter metadata for a type pair, `None` when no converter exists
    fn find_converter(&self, from: FieldType, to: FieldType) -> Option<ConverterInfo>;

    /// Runtime type of a value
    fn field_type_of(&self, value: &Value) -> FieldType {
        value.field_type()
    }
}
