//! JSON source document reader and collection-size oracle
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::expand::ExpansionError;
use crate::path::{PathExpression, Segment};
use crate::session::SourceDocument;
use crate::types::{CollectionKind, Value};
use crate::{Error, Result};

/// Read-only view over a parsed JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSourceDocument {
    root: serde_json::Value,
}

impl JsonSourceDocument {
    pub fn new(root: serde_json::Value) -> Self {
        Self { root }
    }

    pub fn parse(input: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(input)?))
    }

    pub fn root(&self) -> &serde_json::Value {
        &self.root
    }

    /// Walk `segments`, using index 0 for unindexed collections when `lenient`
    fn walk<'a>(
        &'a self,
        path: &PathExpression,
        segments: &[Segment],
        lenient: bool,
    ) -> Result<Option<&'a serde_json::Value>> {
        let mut current = &self.root;
        for segment in segments.iter().skip(1) {
            match segment {
                Segment::Root => {}
                Segment::Named(name) => match current.get(name) {
                    Some(next) => current = next,
                    None => return Ok(None),
                },
                Segment::Collection { name, kind, index } => {
                    if *kind == CollectionKind::Map {
                        return Err(Error::source(path.to_string(), "map collections are not supported"));
                    }
                    let index = match (index, lenient) {
                        (Some(i), _) => *i as usize,
                        (None, true) => 0,
                        (None, false) => {
                            return Err(Error::source(
                                path.to_string(),
                                format!("collection segment '{}' needs an index", segment),
                            ))
                        }
                    };
                    match current.get(name) {
                        None | Some(serde_json::Value::Null) => return Ok(None),
                        Some(serde_json::Value::Array(items)) => match items.get(index) {
                            Some(next) => current = next,
                            None => return Ok(None),
                        },
                        Some(_) => {
                            return Err(Error::source(
                                path.to_string(),
                                format!("'{}' is not an array", name),
                            ))
                        }
                    }
                }
            }
        }
        Ok(Some(current))
    }
}

impl SourceDocument for JsonSourceDocument {
    fn read(&self, path: &PathExpression) -> Result<Option<Value>> {
        match self.walk(path, path.segments(), false)? {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => Err(
                Error::source(path.to_string(), "value is not a scalar"),
            ),
            Some(scalar) => Ok(Value::from_json(scalar)),
        }
    }

    /// Size of the innermost collection on `path`; outer collections use their
    /// index, or element 0 when unindexed
    fn collection_size(&self, path: &PathExpression) -> std::result::Result<u32, ExpansionError> {
        let not_found = || ExpansionError::SourceNotFound {
            path: path.to_string(),
        };
        let Some(&last) = path.collection_positions().last() else {
            return Err(ExpansionError::NotACollection {
                path: path.to_string(),
            });
        };

        let segments = path.segments();
        let parent = self
            .walk(path, &segments[..last], true)
            .map_err(|e| ExpansionError::SizeUnavailable {
                path: path.to_string(),
                message: e.to_string(),
            })?
            .ok_or_else(not_found)?;

        let name = segments[last].name().unwrap_or_default();
        if segments[last].collection_kind() == Some(CollectionKind::Map) {
            return Err(ExpansionError::SizeUnavailable {
                path: path.to_string(),
                message: "map collections are not supported".to_string(),
            });
        }

        match parent.get(name) {
            None => Err(not_found()),
            Some(serde_json::Value::Null) => Ok(0),
            Some(serde_json::Value::Array(items)) => {
                u32::try_from(items.len()).map_err(|_| ExpansionError::SizeUnavailable {
                    path: path.to_string(),
                    message: format!("{} elements exceed the supported size", items.len()),
                })
            }
            Some(_) => Err(ExpansionError::NotACollection {
                path: path.to_string(),
            }),
        }
    }
}
