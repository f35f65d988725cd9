//! Target tree builder
//!
//! The [`TreeBuilder`] turns a stream of `(path, value)` writes into a target
//! node graph. Intermediate complex nodes and collections are created lazily
//! and collections are grown to fit the indexes being written. All node
//! handling goes through a [`NodeProvider`], so the walk itself knows nothing
//! about the target format.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod provider;


pub use provider::NodeProvider;

use crate::model::Field;
use crate::path::{PathExpression, Segment};
use crate::types::{CollectionKind, FieldType, Value};
use thiserror::Error;

/// Tree building errors; each aborts a single write
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    /// The provider cannot build or grow this structure
    #[error("Unsupported structure at {path}: {message}")]
    UnsupportedStructure { path: String, message: String },

    /// The provider cannot tell which node type to create
    #[error("Cannot resolve node type at {path}: {message}")]
    UnresolvedNodeType { path: String, message: String },

    /// A collection segment without index was walked through
    #[error("Collection segment at {path} needs an index")]
    IndexRequired { path: String },

    /// The target field has no path
    #[error("Target field {field} has no path")]
    MissingPath { field: String },

    /// The value converter rejected the value
    #[error("Cannot convert value for {path}: {message}")]
    Conversion { path: String, message: String },
}

impl BuilderError {
    pub fn unsupported(path: &PathExpression, message: impl Into<String>) -> Self {
        BuilderError::UnsupportedStructure {
            path: path.to_string(),
            message: message.into(),
        }
    }

    pub fn unresolved(path: &PathExpression, message: impl Into<String>) -> Self {
        BuilderError::UnresolvedNodeType {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Incrementally builds one target document
#[derive(Debug)]
pub struct TreeBuilder<P: NodeProvider> {
    provider: P,
    root: Option<P::Node>,
    visited_paths: Vec<PathExpression>,
}

impl<P: NodeProvider> TreeBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            root: None,
            visited_paths: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<&P::Node> {
        self.root.as_ref()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Paths written so far, in write order
    pub fn visited_paths(&self) -> &[PathExpression] {
        &self.visited_paths
    }

    pub fn into_parts(self) -> (P, Option<P::Node>) {
        (self.provider, self.root)
    }

    /// Write the field's own value
    pub fn write_field(&mut self, field: &Field) -> Result<(), BuilderError> {
        self.write(field, |f| Ok(f.value.clone()))
    }

    /// Write `field` at its path; `converter` computes the stored value
    ///
    /// Non-last segments, and the last segment of a `Complex` field, are
    /// resolved to complex nodes (created when missing). The last segment of
    /// any other field receives a leaf built from the converter's output.
    pub fn write<F>(&mut self, field: &Field, converter: F) -> Result<(), BuilderError>
    where
        F: FnOnce(&Field) -> Result<Option<Value>, BuilderError>,
    {
        let path = field.path.as_ref().ok_or_else(|| BuilderError::MissingPath {
            field: field.describe(),
        })?;
        let complex_leaf = field.field_type == Some(FieldType::Complex);
        let segments = path.segments();
        let mut converter = Some(converter);
        let mut parent: Option<P::Node> = None;

        for (position, segment) in segments.iter().enumerate() {
            let is_last = position + 1 == segments.len();
            let current_path = path.prefix(position + 1);

            match segment {
                Segment::Root if is_last => {
                    // The whole path is the root: the value becomes the root.
                    let node = if complex_leaf {
                        match self.root.clone() {
                            Some(existing) => existing,
                            None => self.provider.instantiate_complex(&current_path)?,
                        }
                    } else {
                        let value = Self::convert(&mut converter, field)?;
                        self.provider.instantiate_value(&current_path, value)?
                    };
                    self.root = Some(node);
                }
                Segment::Root => {
                    let root = match self.root.clone() {
                        Some(root) => root,
                        None => {
                            let root = self.provider.instantiate_complex(&current_path)?;
                            self.root = Some(root.clone());
                            root
                        }
                    };
                    parent = Some(root);
                }
                _ => {
                    let Some(current) = parent.take() else {
                        return Err(BuilderError::unresolved(
                            &current_path,
                            "segment has no parent node",
                        ));
                    };
                    if !is_last || complex_leaf {
                        parent = Some(self.resolve_complex(&current, segment, &current_path, is_last)?);
                    } else {
                        let value = Self::convert(&mut converter, field)?;
                        self.write_leaf(&current, segment, &current_path, value)?;
                    }
                }
            }
        }

        log::trace!("Wrote {}", path);
        self.visited_paths.push(path.clone());
        Ok(())
    }

    fn convert<F>(converter: &mut Option<F>, field: &Field) -> Result<Option<Value>, BuilderError>
    where
        F: FnOnce(&Field) -> Result<Option<Value>, BuilderError>,
    {
        match converter.take() {
            Some(convert) => convert(field),
            None => Ok(field.value.clone()),
        }
    }

    /// Find or create the complex node addressed by `segment` under `parent`
    fn resolve_complex(
        &mut self,
        parent: &P::Node,
        segment: &Segment,
        path: &PathExpression,
        is_last: bool,
    ) -> Result<P::Node, BuilderError> {
        match segment {
            Segment::Collection {
                kind, index: Some(index), ..
            } => {
                let collection = self.resolve_collection(parent, segment, *kind, *index, path)?;
                if let Some(existing) = self.provider.get_element(&collection, *index) {
                    return Ok(existing);
                }
                let element = self.provider.instantiate_complex(path)?;
                self.provider.set_element(&collection, *index, element.clone())?;
                Ok(element)
            }
            Segment::Collection {
                kind, index: None, ..
            } if is_last => {
                // A complex write to the collection itself.
                if let Some(existing) = self.provider.get_child(parent, segment) {
                    return Ok(existing);
                }
                let collection = self.provider.instantiate_collection(path, *kind)?;
                self.provider.set_child(parent, segment, collection.clone())?;
                Ok(collection)
            }
            Segment::Collection { index: None, .. } => Err(BuilderError::IndexRequired {
                path: path.to_string(),
            }),
            _ => {
                if let Some(existing) = self.provider.get_child(parent, segment) {
                    return Ok(existing);
                }
                let child = self.provider.instantiate_complex(path)?;
                self.provider.set_child(parent, segment, child.clone())?;
                Ok(child)
            }
        }
    }

    /// Find or create the collection under `parent` and grow it past `index`
    fn resolve_collection(
        &mut self,
        parent: &P::Node,
        segment: &Segment,
        kind: CollectionKind,
        index: u32,
        path: &PathExpression,
    ) -> Result<P::Node, BuilderError> {
        let collection = match self.provider.get_child(parent, segment) {
            Some(existing) => existing,
            None => self
                .provider
                .instantiate_collection(&path.without_indexes(), kind)?,
        };
        let grown = self.provider.ensure_capacity(collection, kind, index)?;
        // Re-attach: growing may have produced a new node.
        self.provider.set_child(parent, segment, grown.clone())?;
        Ok(grown)
    }

    fn write_leaf(
        &mut self,
        parent: &P::Node,
        segment: &Segment,
        path: &PathExpression,
        value: Option<Value>,
    ) -> Result<(), BuilderError> {
        match segment {
            Segment::Collection {
                kind, index: Some(index), ..
            } => {
                let collection = self.resolve_collection(parent, segment, *kind, *index, path)?;
                let leaf = self.provider.instantiate_value(path, value)?;
                self.provider.set_element(&collection, *index, leaf)
            }
            Segment::Collection { index: None, .. } => Err(BuilderError::IndexRequired {
                path: path.to_string(),
            }),
            _ => {
                let leaf = self.provider.instantiate_value(path, value)?;
                self.provider.set_child(parent, segment, leaf)
            }
        }
    }
}
