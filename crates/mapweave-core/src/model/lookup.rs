//! Lookup tables
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::types::FieldType;
use serde::{Deserialize, Serialize};

/// One source-value to target-value translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub source_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<FieldType>,
    pub target_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<FieldType>,
}

impl LookupEntry {
    pub fn new(source_value: impl Into<String>, target_value: impl Into<String>) -> Self {
        Self {
            source_value: source_value.into(),
            source_type: None,
            target_value: target_value.into(),
            target_type: None,
        }
    }

    /// Declared type of the target value, `String` when undeclared
    pub fn target_type(&self) -> FieldType {
        self.target_type.unwrap_or(FieldType::String)
    }
}

/// Named static translation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<LookupEntry>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, source_value: &str, target_value: &str) -> Self {
        self.entries.push(LookupEntry::new(source_value, target_value));
        self
    }

    /// First entry whose source value equals `source_value` exactly
    pub fn lookup(&self, source_value: &str) -> Option<&LookupEntry> {
        self.entries.iter().find(|e| e.source_value == source_value)
    }
}
