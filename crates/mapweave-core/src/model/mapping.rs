//! Mapping definitions
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::field::Field;
use crate::types::CollectionKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A declarative mapping between fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mapping {
    /// One source field to one target field
    Map { source: Field, target: Field },

    /// Several sources joined in `index` order into one target
    Combine {
        sources: Vec<Field>,
        target: Field,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delimiter: Option<String>,
    },

    /// One source split into tokens; each target takes the token at its `index`
    Separate {
        source: Field,
        targets: Vec<Field>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delimiter: Option<String>,
    },

    /// Source value translated through a named lookup table
    Lookup {
        source: Field,
        target: Field,
        lookup_table_name: String,
    },

    /// Template cloned once per source collection item
    Collection {
        kind: CollectionKind,
        children: Vec<Mapping>,
        /// Set once the children have been flattened into per-item mappings
        #[serde(skip)]
        expanded: bool,
    },
}

impl Mapping {
    pub fn map(source: Field, target: Field) -> Self {
        Mapping::Map { source, target }
    }

    pub fn collection(kind: CollectionKind, children: Vec<Mapping>) -> Self {
        Mapping::Collection {
            kind,
            children,
            expanded: false,
        }
    }

    /// Mapping type name as used in serialized documents
    pub fn type_name(&self) -> &'static str {
        match self {
            Mapping::Map { .. } => "MAP",
            Mapping::Combine { .. } => "COMBINE",
            Mapping::Separate { .. } => "SEPARATE",
            Mapping::Lookup { .. } => "LOOKUP",
            Mapping::Collection { .. } => "COLLECTION",
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Mapping::Collection { .. })
    }

    /// Source fields in declaration order
    pub fn sources(&self) -> Vec<&Field> {
        match self {
            Mapping::Map { source, .. }
            | Mapping::Separate { source, .. }
            | Mapping::Lookup { source, .. } => vec![source],
            Mapping::Combine { sources, .. } => sources.iter().collect(),
            Mapping::Collection { .. } => Vec::new(),
        }
    }

    pub fn sources_mut(&mut self) -> Vec<&mut Field> {
        match self {
            Mapping::Map { source, .. }
            | Mapping::Separate { source, .. }
            | Mapping::Lookup { source, .. } => vec![source],
            Mapping::Combine { sources, .. } => sources.iter_mut().collect(),
            Mapping::Collection { .. } => Vec::new(),
        }
    }

    /// Target fields in declaration order
    pub fn targets(&self) -> Vec<&Field> {
        match self {
            Mapping::Map { target, .. }
            | Mapping::Combine { target, .. }
            | Mapping::Lookup { target, .. } => vec![target],
            Mapping::Separate { targets, .. } => targets.iter().collect(),
            Mapping::Collection { .. } => Vec::new(),
        }
    }

    pub fn targets_mut(&mut self) -> Vec<&mut Field> {
        match self {
            Mapping::Map { target, .. }
            | Mapping::Combine { target, .. }
            | Mapping::Lookup { target, .. } => vec![target],
            Mapping::Separate { targets, .. } => targets.iter_mut().collect(),
            Mapping::Collection { .. } => Vec::new(),
        }
    }

    /// The source field that drives collection expansion
    ///
    /// For combines this is the first source with a collection path, falling
    /// back to the first source.
    pub fn primary_source_field(&self) -> Option<&Field> {
        match self {
            Mapping::Combine { sources, .. } => sources
                .iter()
                .find(|f| f.is_collection())
                .or_else(|| sources.first()),
            other => other.sources().into_iter().next(),
        }
    }

    /// Short description used in audits and log lines
    pub fn describe(&self) -> String {
        let sources: Vec<String> = self.sources().iter().map(|f| f.describe()).collect();
        let targets: Vec<String> = self.targets().iter().map(|f| f.describe()).collect();
        match self {
            Mapping::Collection { kind, children, .. } => {
                format!("COLLECTION({}) with {} children", kind, children.len())
            }
            other => format!(
                "{} [{}] -> [{}]",
                other.type_name(),
                sources.join(", "),
                targets.join(", ")
            ),
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
