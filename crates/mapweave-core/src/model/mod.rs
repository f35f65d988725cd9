//! Mapping document model
//!
//! Fields, actions, mappings and lookup tables as parsed from a mapping
//! document. Everything here is immutable once loaded and may be shared
//! across concurrent sessions.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod document;
pub mod field;
pub mod lookup;
pub mod mapping;

pub use document::MappingDocument;
pub use field::{Action, Field, FieldKind};
pub use lookup::{LookupEntry, LookupTable};
pub use mapping::Mapping;
