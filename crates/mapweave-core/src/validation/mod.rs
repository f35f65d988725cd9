//! Static validation of mapping documents
//!
//! The validator checks a [`MappingDocument`](crate::model::MappingDocument)
//! before execution for structural consistency and type compatibility. It is
//! pure: it only produces [`Diagnostic`]s and never touches sources or
//! targets.
//!
//! The validator is organized into focused modules:
//! - `types`: diagnostics and validation modes
//! - `core`: the `ValidationEngine` and mode filtering
//! - `rules`: document, mapping, field and lookup table rules
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod core;
pub mod rules;
pub mod types;

#[cfg(test)]
mod tests;

pub use self::core::ValidationEngine;
pub use types::{Diagnostic, ValidationMode};
