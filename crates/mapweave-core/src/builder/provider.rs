//! Node provider capability set
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::BuilderError;
use crate::path::{PathExpression, Segment};
use crate::types::{CollectionKind, Value};
use std::fmt;

/// Format-specific node creation, inspection and mutation used by the
/// [`TreeBuilder`](super::TreeBuilder)
///
/// Nodes are handles; a provider is free to back them with an arena, shared
/// pointers or anything else that is cheap to clone.
pub trait NodeProvider {
    type Node: Clone + fmt::Debug;

    /// Create an empty complex (object) node for `path`
    fn instantiate_complex(&mut self, path: &PathExpression) -> Result<Self::Node, BuilderError>;

    /// Create an empty collection node of `kind` for `path`
    fn instantiate_collection(
        &mut self,
        path: &PathExpression,
        kind: CollectionKind,
    ) -> Result<Self::Node, BuilderError>;

    /// Create a leaf node holding `value` (`None` is a null leaf)
    fn instantiate_value(
        &mut self,
        path: &PathExpression,
        value: Option<Value>,
    ) -> Result<Self::Node, BuilderError>;

    /// Child of `parent` named by `segment`; for collection segments this is
    /// the collection itself
    fn get_child(&self, parent: &Self::Node, segment: &Segment) -> Option<Self::Node>;

    /// Attach or replace the child of `parent` named by `segment`
    fn set_child(
        &mut self,
        parent: &Self::Node,
        segment: &Segment,
        child: Self::Node,
    ) -> Result<(), BuilderError>;

    /// Number of elements in a collection node
    fn collection_len(&self, node: &Self::Node) -> usize;

    /// Make `collection_len(node) > index`, filling gaps with placeholders
    ///
    /// May return a different node (e.g. a reallocated fixed-size array);
    /// callers must use the returned node from then on.
    fn ensure_capacity(
        &mut self,
        node: Self::Node,
        kind: CollectionKind,
        index: u32,
    ) -> Result<Self::Node, BuilderError>;

    /// Element at `index`; `None` when absent or still a placeholder
    fn get_element(&self, node: &Self::Node, index: u32) -> Option<Self::Node>;

    /// Replace the element at `index`, which must be within capacity
    fn set_element(
        &mut self,
        node: &Self::Node,
        index: u32,
        child: Self::Node,
    ) -> Result<(), BuilderError>;
}
