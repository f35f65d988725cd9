//! Combine, separate and property-resolution strategies
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::types::Value;
use std::collections::BTreeMap;

/// Join `values` in index order
///
/// Indexes missing between 0 and the highest index contribute an empty
/// string, so `{0: "a", 2: "c"}` joined with `-` gives `a--c`.
pub fn combine(values: &BTreeMap<u32, String>, delimiter: &str) -> String {
    let Some(&max) = values.keys().next_back() else {
        return String::new();
    };

    let mut combined = String::new();
    for index in 0..=max {
        if index > 0 {
            combined.push_str(delimiter);
        }
        if let Some(value) = values.get(&index) {
            combined.push_str(value);
        }
    }
    combined
}

/// Split `value` into tokens
///
/// A whitespace-only delimiter splits on runs of whitespace; any other
/// delimiter splits literally and keeps empty tokens.
pub fn separate(value: &str, delimiter: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    if delimiter.is_empty() || delimiter.trim().is_empty() {
        return value.split_whitespace().map(str::to_string).collect();
    }
    value.split(delimiter).map(str::to_string).collect()
}

/// Where property fields get their values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyStrategy {
    /// Fall back to process environment variables
    pub environment: bool,
}

impl PropertyStrategy {
    pub fn new(environment: bool) -> Self {
        Self { environment }
    }

    /// Session properties first, then document properties, then (if enabled)
    /// environment variables
    pub fn resolve(
        &self,
        name: &str,
        session: &BTreeMap<String, Value>,
        document: &BTreeMap<String, Value>,
    ) -> Option<Value> {
        if let Some(value) = session.get(name).or_else(|| document.get(name)) {
            return Some(value.clone());
        }
        if self.environment {
            return std::env::var(name).ok().map(Value::String);
        }
        None
    }
}
