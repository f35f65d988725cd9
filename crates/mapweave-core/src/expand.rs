//! Collection mapping expansion
//!
//! Turns a declarative [`Mapping::Collection`] into one concrete mapping per
//! source collection element. Sizes come from a [`SourceCollectionSizeOracle`]
//! supplied by the source document adapter.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::model::{Field, Mapping};
use thiserror::Error;

/// Expansion errors; each one aborts the expansion of a single child mapping
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpansionError {
    /// The collection could not be found in the source document
    #[error("Source collection not found at {path}")]
    SourceNotFound { path: String },

    /// The source value at the path is not a collection
    #[error("Source value at {path} is not a collection")]
    NotACollection { path: String },

    /// No source document is registered under the field's document id
    #[error("No source document registered for '{doc_id}'")]
    UnknownDocument { doc_id: String },

    /// The child mapping has no source field to drive expansion
    #[error("Mapping {mapping} has no source field")]
    MissingSource { mapping: String },

    /// The collection cannot be counted
    #[error("Cannot determine collection size at {path}: {message}")]
    SizeUnavailable { path: String, message: String },
}

/// Reports how many elements a source collection field has
pub trait SourceCollectionSizeOracle {
    fn size(&self, field: &Field) -> Result<u32, ExpansionError>;
}

impl<F> SourceCollectionSizeOracle for F
where
    F: Fn(&Field) -> Result<u32, ExpansionError>,
{
    fn size(&self, field: &Field) -> Result<u32, ExpansionError> {
        self(field)
    }
}

/// Flattened result of expanding one mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub mappings: Vec<Mapping>,
    pub errors: Vec<ExpansionError>,
}

/// Expands collection mappings into per-item mappings
pub struct MappingExpander;

impl MappingExpander {
    /// Expand `mapping` into the concrete mappings to execute
    ///
    /// Non-collection mappings come back unchanged. For an already expanded
    /// collection the flattened children are returned as-is.
    pub fn expand(mapping: &Mapping, oracle: &dyn SourceCollectionSizeOracle) -> Expansion {
        let mut expansion = Expansion::default();
        match mapping {
            Mapping::Collection {
                children,
                expanded: true,
                ..
            } => expansion.mappings.extend(children.iter().cloned()),
            Mapping::Collection { children, .. } => {
                for child in children {
                    Self::expand_child(child, oracle, &mut expansion);
                }
            }
            other => expansion.mappings.push(other.clone()),
        }
        expansion
    }

    /// Replace a collection mapping's children with their expansion
    ///
    /// Idempotent: an expanded collection is left alone. Returns the errors of
    /// children that could not be expanded.
    pub fn expand_in_place(
        mapping: &mut Mapping,
        oracle: &dyn SourceCollectionSizeOracle,
    ) -> Vec<ExpansionError> {
        if !matches!(mapping, Mapping::Collection { expanded: false, .. }) {
            return Vec::new();
        }

        let Expansion { mappings, errors } = Self::expand(mapping, oracle);
        if let Mapping::Collection {
            children, expanded, ..
        } = mapping
        {
            *children = mappings;
            *expanded = true;
        }
        errors
    }

    fn expand_child(
        child: &Mapping,
        oracle: &dyn SourceCollectionSizeOracle,
        expansion: &mut Expansion,
    ) {
        // Nested collections flatten into the same list.
        if child.is_collection() {
            let nested = Self::expand(child, oracle);
            expansion.mappings.extend(nested.mappings);
            expansion.errors.extend(nested.errors);
            return;
        }

        let Some(source) = child.primary_source_field() else {
            expansion.errors.push(ExpansionError::MissingSource {
                mapping: child.describe(),
            });
            return;
        };

        if !source.is_collection() {
            // Scalar source into a collection target: target element 0.
            let mut single = child.clone();
            for target in single.targets_mut() {
                if let Some(path) = target.path.as_mut() {
                    *path = path.with_collection_indexes(0);
                }
            }
            expansion.mappings.push(single);
            return;
        }

        let size = match oracle.size(source) {
            Ok(size) => size,
            Err(err) => {
                log::warn!("Skipping expansion of {}: {}", child.describe(), err);
                expansion.errors.push(err);
                return;
            }
        };

        log::debug!("Expanding {} into {} mappings", child.describe(), size);
        for i in 0..size {
            let mut item = child.clone();
            for field in item.sources_mut() {
                set_collection_index(field, i);
            }
            for field in item.targets_mut() {
                set_collection_index(field, i);
            }
            expansion.mappings.push(item);
        }
    }
}

/// Point every collection segment of a collection path at element `index`
fn set_collection_index(field: &mut Field, index: u32) {
    if let Some(path) = field.path.as_mut() {
        if path.has_collection() {
            *path = path.with_collection_indexes(index);
        }
    }
}
