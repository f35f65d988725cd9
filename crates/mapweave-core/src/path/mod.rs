//! Field path algebra
//!
//! A [`PathExpression`] is an immutable, parsed field location such as
//! `/contact<3>/firstName`. It always starts with exactly one [`Segment::Root`]
//! followed by named and collection segments. Collection segments carry a
//! [`CollectionKind`] and an optional element index.
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod parser;


pub use error::PathError;
pub use parser::{Parser, SEPARATOR};

use crate::types::CollectionKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One component of a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Document root, always the first segment
    Root,
    /// Complex-object or leaf property access
    Named(String),
    /// Collection access; `index = None` addresses the collection itself
    Collection {
        name: String,
        kind: CollectionKind,
        index: Option<u32>,
    },
}

impl Segment {
    /// Segment name, `None` for the root
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Root => None,
            Segment::Named(name) | Segment::Collection { name, .. } => Some(name),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Segment::Root)
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Segment::Collection { .. })
    }

    pub fn collection_kind(&self) -> Option<CollectionKind> {
        match self {
            Segment::Collection { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Collection index, if this is an indexed collection segment
    pub fn index(&self) -> Option<u32> {
        match self {
            Segment::Collection { index, .. } => *index,
            _ => None,
        }
    }

    /// Copy of this segment with a new index; non-collection segments are returned as-is
    pub fn with_index(&self, new_index: Option<u32>) -> Segment {
        match self {
            Segment::Collection { name, kind, .. } => Segment::Collection {
                name: name.clone(),
                kind: *kind,
                index: new_index,
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Root => Ok(()),
            Segment::Named(name) => write!(f, "{}", name),
            Segment::Collection { name, kind, index } => {
                let (open, close) = kind.markers();
                match index {
                    Some(i) => write!(f, "{}{}{}{}", name, open, i, close),
                    None => write!(f, "{}{}{}", name, open, close),
                }
            }
        }
    }
}

/// Parsed, immutable field path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathExpression {
    segments: Vec<Segment>,
}

impl PathExpression {
    /// Parse a path string
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let segments = Parser::new(input)?.parse()?;
        Ok(Self { segments })
    }

    /// The root path `/`
    pub fn root() -> Self {
        Self {
            segments: vec![Segment::Root],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Last segment; the root for `/`
    pub fn last(&self) -> &Segment {
        // Construction guarantees the root segment is always present.
        self.segments.last().unwrap_or(&Segment::Root)
    }

    /// All segments except the last, `None` for the root path
    pub fn parent(&self) -> Option<PathExpression> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Path made of the first `len` segments
    pub fn prefix(&self, len: usize) -> PathExpression {
        let len = len.clamp(1, self.segments.len());
        Self {
            segments: self.segments[..len].to_vec(),
        }
    }

    /// Append a segment; a root segment is ignored
    pub fn child(&self, segment: Segment) -> PathExpression {
        let mut segments = self.segments.clone();
        if !segment.is_root() {
            segments.push(segment);
        }
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the bare root path
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Whether the segment at `at` is a collection segment
    pub fn is_collection(&self, at: usize) -> bool {
        self.segments.get(at).is_some_and(Segment::is_collection)
    }

    /// Index of the collection segment at `at`
    pub fn index_of(&self, at: usize) -> Option<u32> {
        self.segments.get(at).and_then(Segment::index)
    }

    /// Whether any segment is a collection, i.e. this is a collection path
    pub fn has_collection(&self) -> bool {
        self.segments.iter().any(Segment::is_collection)
    }

    /// Positions of all collection segments
    pub fn collection_positions(&self) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_collection())
            .map(|(i, _)| i)
            .collect()
    }

    /// Copy of this path with the collection index at `at_segment` replaced
    pub fn with_index_overwritten(
        &self,
        at_segment: usize,
        new_index: u32,
    ) -> Result<PathExpression, PathError> {
        let segment = self
            .segments
            .get(at_segment)
            .ok_or_else(|| PathError::SegmentOutOfRange {
                path: self.to_string(),
                segment: at_segment,
                len: self.segments.len(),
            })?;

        if !segment.is_collection() {
            return Err(PathError::NotACollection {
                path: self.to_string(),
                segment: at_segment,
            });
        }

        let mut segments = self.segments.clone();
        segments[at_segment] = segment.with_index(Some(new_index));
        Ok(Self { segments })
    }

    /// Copy of this path with every collection index replaced
    pub fn with_collection_indexes(&self, new_index: u32) -> PathExpression {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| s.with_index(Some(new_index)))
                .collect(),
        }
    }

    /// Copy of this path with every collection index cleared
    pub fn without_indexes(&self) -> PathExpression {
        Self {
            segments: self.segments.iter().map(|s| s.with_index(None)).collect(),
        }
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{}", SEPARATOR);
        }
        for segment in self.segments.iter().skip(1) {
            write!(f, "{}{}", SEPARATOR, segment)?;
        }
        Ok(())
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathExpression {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathExpression> for String {
    fn from(path: PathExpression) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_normalizes() {
        let path = PathExpression::parse("contact<3>/firstName/").unwrap();
        assert_eq!(path.to_string(), "/contact<3>/firstName");
        assert_eq!(PathExpression::root().to_string(), "/");
        assert_eq!(PathExpression::parse("/m{}").unwrap().to_string(), "/m{}");
    }

    #[test]
    fn test_parent_and_last() {
        let path = PathExpression::parse("/a/b[2]/c").unwrap();
        assert_eq!(path.last(), &Segment::Named("c".to_string()));
        assert_eq!(path.parent().unwrap().to_string(), "/a/b[2]");
        assert!(PathExpression::root().parent().is_none());
        assert_eq!(PathExpression::root().last(), &Segment::Root);
    }

    #[test]
    fn test_collection_queries() {
        let path = PathExpression::parse("/a/b[2]/c").unwrap();
        assert!(path.has_collection());
        assert!(path.is_collection(2));
        assert!(!path.is_collection(1));
        assert_eq!(path.index_of(2), Some(2));
        assert_eq!(path.index_of(7), None);
        assert_eq!(path.collection_positions(), vec![2]);
        assert!(!PathExpression::parse("/a/b").unwrap().has_collection());
    }

    #[test]
    fn test_with_index_overwritten() {
        let path = PathExpression::parse("/a/b[2]/c").unwrap();
        let moved = path.with_index_overwritten(2, 4).unwrap();
        assert_eq!(moved.to_string(), "/a/b[4]/c");
        // original is untouched
        assert_eq!(path.to_string(), "/a/b[2]/c");

        assert!(matches!(
            path.with_index_overwritten(1, 0),
            Err(PathError::NotACollection { segment: 1, .. })
        ));
        assert!(matches!(
            path.with_index_overwritten(9, 0),
            Err(PathError::SegmentOutOfRange { .. })
        ));
    }

    #[test]
    fn test_with_collection_indexes_and_without() {
        let path = PathExpression::parse("/orders<>/lines[1]/sku").unwrap();
        assert_eq!(
            path.with_collection_indexes(0).to_string(),
            "/orders<0>/lines[0]/sku"
        );
        assert_eq!(path.without_indexes().to_string(), "/orders<>/lines[]/sku");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let a = PathExpression::parse("/Name").unwrap();
        let b = PathExpression::parse("/name").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_as_string() {
        let path: PathExpression = serde_json::from_str("\"/x/y[2]\"").unwrap();
        assert_eq!(path.segments().len(), 3);
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/x/y[2]\"");
        assert!(serde_json::from_str::<PathExpression>("\"/x[\"").is_err());
    }

    #[test]
    fn test_child_and_prefix() {
        let path = PathExpression::parse("/a").unwrap();
        let child = path.child(Segment::Collection {
            name: "b".to_string(),
            kind: CollectionKind::List,
            index: Some(1),
        });
        assert_eq!(child.to_string(), "/a/b<1>");
        assert_eq!(child.prefix(2).to_string(), "/a");
        assert_eq!(child.prefix(0).to_string(), "/");
    }
}
