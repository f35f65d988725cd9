//! Validation output types
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::audit::AuditStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One finding of the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Where in the document the finding applies, e.g. `mappings[2].source`
    pub field: String,
    pub message: String,
    pub status: AuditStatus,
    /// Offending value, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Diagnostic {
    pub fn new(field: impl Into<String>, message: impl Into<String>, status: AuditStatus) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            status,
            value: None,
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, AuditStatus::Error)
    }

    pub fn warn(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, AuditStatus::Warn)
    }

    pub fn info(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, AuditStatus::Info)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == AuditStatus::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.field, self.message)?;
        if let Some(value) = &self.value {
            write!(f, " ({})", value)?;
        }
        Ok(())
    }
}

/// Which findings the validator reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationMode {
    /// Every finding, including warnings and infos
    #[default]
    Strict,
    /// Errors only
    Lenient,
}
