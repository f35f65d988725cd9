//! Field and action definitions
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use crate::path::{PathError, PathExpression};
use crate::types::{FieldType, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named field action with its string parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Add a parameter (builder style)
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.parameters.insert(key.into(), value.to_string());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// What kind of field this is and where its value comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Read from (or written to) a document at `path`
    Simple,
    /// Literal value carried by the field itself
    Constant,
    /// Resolved against the session property bag
    Property { name: String },
    /// Format-typed field, opaque beyond path/type/value
    Format {
        format: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attributes: BTreeMap<String, String>,
    },
}

/// A source or target field of a mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Which source/target document this field belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Position within a combine/separate group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Field {
    fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            path: None,
            field_type: None,
            value: None,
            doc_id: None,
            index: None,
            actions: Vec::new(),
        }
    }

    /// Document field at `path`
    pub fn simple(path: &str, field_type: FieldType) -> Result<Self, PathError> {
        let mut field = Self::with_kind(FieldKind::Simple);
        field.path = Some(PathExpression::parse(path)?);
        field.field_type = Some(field_type);
        Ok(field)
    }

    /// Literal field; the declared type is taken from the value
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        let mut field = Self::with_kind(FieldKind::Constant);
        field.field_type = Some(value.field_type());
        field.value = Some(value);
        field
    }

    /// Property field resolved at execution time
    pub fn property(name: impl Into<String>) -> Self {
        Self::with_kind(FieldKind::Property { name: name.into() })
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_path(mut self, path: PathExpression) -> Self {
        self.path = Some(path);
        self
    }

    /// Whether the field path addresses a collection
    pub fn is_collection(&self) -> bool {
        self.path.as_ref().is_some_and(PathExpression::has_collection)
    }

    /// Whether the value comes from a document
    pub fn is_document_field(&self) -> bool {
        matches!(self.kind, FieldKind::Simple | FieldKind::Format { .. })
    }

    /// Declared type, or the wildcard when none is declared
    pub fn declared_type(&self) -> FieldType {
        self.field_type.unwrap_or(FieldType::All)
    }

    /// Short human-readable location used in audits and diagnostics
    pub fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (FieldKind::Property { name }, _) => format!("property:{}", name),
            (FieldKind::Constant, _) => match &self.value {
                Some(value) => format!("constant:{}", value),
                None => "constant".to_string(),
            },
            (_, Some(path)) => path.to_string(),
            (_, None) => "<no path>".to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_field_builder() {
        let field = Field::simple("/a/b[2]", FieldType::String)
            .unwrap()
            .with_index(1)
            .with_doc_id("orders")
            .with_action(Action::new("Trim"));
        assert!(field.is_collection());
        assert!(field.is_document_field());
        assert_eq!(field.index, Some(1));
        assert_eq!(field.describe(), "/a/b[2]");
    }

    #[test]
    fn test_constant_infers_type() {
        let field = Field::constant(42);
        assert_eq!(field.field_type, Some(FieldType::Integer));
        assert_eq!(field.describe(), "constant:42");
        assert!(!field.is_document_field());
    }

    #[test]
    fn test_field_deserialize_from_json() {
        let field: Field = serde_json::from_value(json!({
            "kind": "simple",
            "path": "/contact<3>/firstName",
            "field_type": "STRING",
            "actions": [{"name": "SubString", "parameters": {"startIndex": "1"}}]
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Simple);
        assert_eq!(field.actions[0].param("startIndex"), Some("1"));

        let property: Field = serde_json::from_value(json!({
            "kind": "property",
            "name": "region"
        }))
        .unwrap();
        assert_eq!(
            property.kind,
            FieldKind::Property {
                name: "region".to_string()
            }
        );
        assert_eq!(property.declared_type(), FieldType::All);
    }

    #[test]
    fn test_malformed_path_rejected_on_deserialize() {
        let result: Result<Field, _> = serde_json::from_value(json!({
            "kind": "simple",
            "path": "/a[1"
        }));
        assert!(result.is_err());
    }
}
