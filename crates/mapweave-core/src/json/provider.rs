//! Arena-backed node provider producing `serde_json::Value` documents
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::builder::{BuilderError, NodeProvider};
use crate::path::{PathExpression, Segment};
use crate::types::{CollectionKind, Value};
use std::collections::BTreeMap;

/// Handle to a node in a [`JsonNodeProvider`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum JsonNode {
    /// Null leaf or gap placeholder
    Null,
    Scalar(serde_json::Value),
    Object(BTreeMap<String, NodeId>),
    /// Fixed-size store; growing allocates a new node
    Array(Vec<NodeId>),
    /// Growable in place
    List(Vec<NodeId>),
}

/// Builds JSON trees; arrays behave as fixed-size and lists grow in place
#[derive(Debug, Default)]
pub struct JsonNodeProvider {
    nodes: Vec<JsonNode>,
    reallocations: usize,
}

impl JsonNodeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times an array had to be reallocated to grow
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    fn alloc(&mut self, node: JsonNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn node(&self, id: NodeId) -> Option<&JsonNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut JsonNode> {
        self.nodes.get_mut(id.0)
    }

    fn is_placeholder(&self, id: NodeId) -> bool {
        matches!(self.node(id), Some(JsonNode::Null) | None)
    }

    fn placeholders(&mut self, count: usize) -> Vec<NodeId> {
        (0..count).map(|_| self.alloc(JsonNode::Null)).collect()
    }

    /// Render the tree below `id` as JSON
    pub fn to_json(&self, id: NodeId) -> serde_json::Value {
        match self.node(id) {
            None | Some(JsonNode::Null) => serde_json::Value::Null,
            Some(JsonNode::Scalar(value)) => value.clone(),
            Some(JsonNode::Object(children)) => serde_json::Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), self.to_json(*child)))
                    .collect(),
            ),
            Some(JsonNode::Array(items)) | Some(JsonNode::List(items)) => {
                serde_json::Value::Array(items.iter().map(|item| self.to_json(*item)).collect())
            }
        }
    }
}

fn segment_label(segment: &Segment) -> String {
    segment.to_string()
}

impl NodeProvider for JsonNodeProvider {
    type Node = NodeId;

    fn instantiate_complex(&mut self, _path: &PathExpression) -> Result<NodeId, BuilderError> {
        Ok(self.alloc(JsonNode::Object(BTreeMap::new())))
    }

    fn instantiate_collection(
        &mut self,
        path: &PathExpression,
        kind: CollectionKind,
    ) -> Result<NodeId, BuilderError> {
        match kind {
            CollectionKind::Array => Ok(self.alloc(JsonNode::Array(Vec::new()))),
            CollectionKind::List => Ok(self.alloc(JsonNode::List(Vec::new()))),
            CollectionKind::Map => Err(BuilderError::unsupported(path, "cannot yet handle maps")),
        }
    }

    fn instantiate_value(
        &mut self,
        _path: &PathExpression,
        value: Option<Value>,
    ) -> Result<NodeId, BuilderError> {
        Ok(match value {
            None => self.alloc(JsonNode::Null),
            Some(value) => self.alloc(JsonNode::Scalar(value.to_json())),
        })
    }

    fn get_child(&self, parent: &NodeId, segment: &Segment) -> Option<NodeId> {
        let name = segment.name()?;
        match self.node(*parent) {
            Some(JsonNode::Object(children)) => children
                .get(name)
                .copied()
                .filter(|child| !self.is_placeholder(*child)),
            _ => None,
        }
    }

    fn set_child(
        &mut self,
        parent: &NodeId,
        segment: &Segment,
        child: NodeId,
    ) -> Result<(), BuilderError> {
        let label = segment_label(segment);
        let Some(name) = segment.name() else {
            return Err(BuilderError::UnsupportedStructure {
                path: label,
                message: "the root cannot be a child".to_string(),
            });
        };
        match self.node_mut(*parent) {
            Some(JsonNode::Object(children)) => {
                children.insert(name.to_string(), child);
                Ok(())
            }
            _ => Err(BuilderError::UnsupportedStructure {
                path: label,
                message: "parent is not an object".to_string(),
            }),
        }
    }

    fn collection_len(&self, node: &NodeId) -> usize {
        match self.node(*node) {
            Some(JsonNode::Array(items)) | Some(JsonNode::List(items)) => items.len(),
            _ => 0,
        }
    }

    fn ensure_capacity(
        &mut self,
        node: NodeId,
        kind: CollectionKind,
        index: u32,
    ) -> Result<NodeId, BuilderError> {
        let required = index as usize + 1;
        let unsupported = |message: &str| BuilderError::UnsupportedStructure {
            path: format!("{} collection", kind),
            message: message.to_string(),
        };

        if kind == CollectionKind::Map {
            return Err(unsupported("cannot yet handle maps"));
        }

        match self.node(node).cloned() {
            Some(JsonNode::Array(items)) => {
                if items.len() >= required {
                    return Ok(node);
                }
                let mut grown = items;
                let gap = required - grown.len();
                grown.extend(self.placeholders(gap));
                self.reallocations += 1;
                Ok(self.alloc(JsonNode::Array(grown)))
            }
            Some(JsonNode::List(items)) => {
                let gap = required.saturating_sub(items.len());
                let fill = self.placeholders(gap);
                if let Some(JsonNode::List(items)) = self.node_mut(node) {
                    items.extend(fill);
                }
                Ok(node)
            }
            _ => Err(unsupported("node is not a collection")),
        }
    }

    fn get_element(&self, node: &NodeId, index: u32) -> Option<NodeId> {
        match self.node(*node) {
            Some(JsonNode::Array(items)) | Some(JsonNode::List(items)) => items
                .get(index as usize)
                .copied()
                .filter(|item| !self.is_placeholder(*item)),
            _ => None,
        }
    }

    fn set_element(&mut self, node: &NodeId, index: u32, child: NodeId) -> Result<(), BuilderError> {
        match self.node_mut(*node) {
            Some(JsonNode::Array(items)) | Some(JsonNode::List(items)) => {
                match items.get_mut(index as usize) {
                    Some(slot) => {
                        *slot = child;
                        Ok(())
                    }
                    None => Err(BuilderError::UnsupportedStructure {
                        path: format!("[{}]", index),
                        message: "index is beyond the collection capacity".to_string(),
                    }),
                }
            }
            _ => Err(BuilderError::UnsupportedStructure {
                path: format!("[{}]", index),
                message: "node is not a collection".to_string(),
            }),
        }
    }
}
