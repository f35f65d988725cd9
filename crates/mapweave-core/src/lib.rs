//! Mapweave Core - format-agnostic data mapping engine
//!
//! This crate maps data between structured documents according to a
//! declarative mapping document: for every target field, where its value is
//! read from, how it is transformed, and where it is written.
//!
//! # Main Components
//!
//! - **Paths**: field locations with collection membership and indexes
//!   (`/contact<3>/firstName`)
//! - **Expansion**: collection mappings turned into one mapping per source item
//! - **Field Actions**: typed transformation chains with implicit conversions
//! - **Tree Building**: incremental target construction through a `NodeProvider`
//! - **Validation**: static checks of mapping documents
//! - **Engine & Sessions**: execution of Map, Combine, Separate and Lookup
//!   mappings, with per-field failures recorded as audits
//!
//! # Example
//!
//! ```no_run
//! use mapweave_core::{EngineConfig, Field, FieldType, Mapping, MappingDocument, MappingEngine, Result};
//! use std::sync::Arc;
//!
//! fn example() -> Result<()> {
//!     let document = MappingDocument::new("people").with_mapping(Mapping::map(
//!         Field::simple("/contact/first", FieldType::String)?,
//!         Field::simple("/person/name", FieldType::String)?,
//!     ));
//!     let engine = MappingEngine::new(EngineConfig::default());
//!     let session = engine.execute_json(
//!         Arc::new(document),
//!         serde_json::json!({"contact": {"first": "Kari"}}),
//!     )?;
//!     println!("{}", session.audits().report());
//!     Ok(())
//! }
//! ```
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod action;
pub mod audit;
pub mod builder;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod expand;
pub mod json;
pub mod model;
pub mod path;
pub mod session;
pub mod strategy;
pub mod types;
pub mod validation;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use types::{CollectionKind, FieldType, Value};

pub use path::{PathError, PathExpression, Segment};

pub use model::{Action, Field, FieldKind, LookupEntry, LookupTable, Mapping, MappingDocument};

pub use action::{ActionDetail, ActionError, ActionRegistry, FieldActionPipeline};
pub use conversion::{
    ConversionConcern, ConversionError, ConversionService, ConverterInfo, DefaultConversionService,
};
pub use expand::{Expansion, ExpansionError, MappingExpander, SourceCollectionSizeOracle};
pub use builder::{BuilderError, NodeProvider, TreeBuilder};

pub use audit::{Audit, AuditStatus, Audits};
pub use config::EngineConfig;
pub use engine::MappingEngine;
pub use session::{
    MappingSession, SessionMetadata, SourceDocument, DEFAULT_SOURCE_ID, DEFAULT_TARGET_ID,
};
pub use validation::{Diagnostic, ValidationEngine, ValidationMode};

pub use json::{JsonNodeProvider, JsonSourceDocument, JsonTreeBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
