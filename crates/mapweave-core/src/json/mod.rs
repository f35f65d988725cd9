//! Reference JSON adapter
//!
//! A [`SourceDocument`](crate::session::SourceDocument) over `serde_json::Value`
//! and a [`NodeProvider`](crate::builder::NodeProvider) that builds
//! `serde_json::Value` targets.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod provider;
pub mod source;

pub use provider::{JsonNodeProvider, NodeId};
pub use source::JsonSourceDocument;

use crate::builder::TreeBuilder;

/// Tree builder producing JSON
pub type JsonTreeBuilder = TreeBuilder<JsonNodeProvider>;

impl TreeBuilder<JsonNodeProvider> {
    /// Render the document built so far; `null` when nothing was written
    pub fn to_json(&self) -> serde_json::Value {
        match self.root() {
            Some(root) => self.provider().to_json(*root),
            None => serde_json::Value::Null,
        }
    }
}
