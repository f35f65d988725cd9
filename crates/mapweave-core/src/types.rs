//! Core value and type definitions shared by every mapping component
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Wildcard, matches any type
    All,
    Boolean,
    Byte,
    ByteArray,
    Char,
    /// Object-valued field; actions never apply to it
    Complex,
    Double,
    Float,
    Integer,
    Long,
    Short,
    String,
    /// No value present
    None,
    Unsupported,
}

impl FieldType {
    /// Scalar types that carry a concrete [`Value`]
    pub const SCALARS: [FieldType; 10] = [
        FieldType::Boolean,
        FieldType::Byte,
        FieldType::ByteArray,
        FieldType::Char,
        FieldType::Double,
        FieldType::Float,
        FieldType::Integer,
        FieldType::Long,
        FieldType::Short,
        FieldType::String,
    ];

    pub fn is_scalar(self) -> bool {
        Self::SCALARS.contains(&self)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            FieldType::Byte | FieldType::Short | FieldType::Integer | FieldType::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, FieldType::Float | FieldType::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating()
    }

    /// Type of an optional value, `None` when absent
    pub fn of(value: Option<&Value>) -> FieldType {
        value.map(Value::field_type).unwrap_or(FieldType::None)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::All => "ALL",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Byte => "BYTE",
            FieldType::ByteArray => "BYTE_ARRAY",
            FieldType::Char => "CHAR",
            FieldType::Complex => "COMPLEX",
            FieldType::Double => "DOUBLE",
            FieldType::Float => "FLOAT",
            FieldType::Integer => "INTEGER",
            FieldType::Long => "LONG",
            FieldType::Short => "SHORT",
            FieldType::String => "STRING",
            FieldType::None => "NONE",
            FieldType::Unsupported => "UNSUPPORTED",
        };
        write!(f, "{}", name)
    }
}

/// Kind of a collection segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionKind {
    /// Fixed-size backing store, `name[i]`
    Array,
    /// Growable sequence, `name<i>`
    List,
    /// Keyed collection, `name{i}`
    Map,
}

impl CollectionKind {
    /// Opening and closing markers used in the textual path syntax
    pub fn markers(self) -> (char, char) {
        match self {
            CollectionKind::Array => ('[', ']'),
            CollectionKind::List => ('<', '>'),
            CollectionKind::Map => ('{', '}'),
        }
    }

    pub fn from_open_marker(ch: char) -> Option<Self> {
        match ch {
            '[' => Some(CollectionKind::Array),
            '<' => Some(CollectionKind::List),
            '{' => Some(CollectionKind::Map),
            _ => None,
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Array => write!(f, "ARRAY"),
            CollectionKind::List => write!(f, "LIST"),
            CollectionKind::Map => write!(f, "MAP"),
        }
    }
}

/// A typed scalar value flowing through a mapping
///
/// Serialized as plain JSON: integers become `Integer` (or `Long` when they do
/// not fit), fractional numbers become `Double`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<u8>),
}

impl Value {
    /// Runtime type of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Boolean(_) => FieldType::Boolean,
            Value::Byte(_) => FieldType::Byte,
            Value::Char(_) => FieldType::Char,
            Value::Short(_) => FieldType::Short,
            Value::Integer(_) => FieldType::Integer,
            Value::Long(_) => FieldType::Long,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::String(_) => FieldType::String,
            Value::ByteArray(_) => FieldType::ByteArray,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integral view of the value, if it has one without loss
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Integer(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Convert a JSON scalar into a value; `null`, arrays and objects yield `None`
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(match i32::try_from(i) {
                        Ok(small) => Value::Integer(small),
                        Err(_) => Value::Long(i),
                    })
                } else {
                    n.as_f64().map(Value::Double)
                }
            }
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            _ => None,
        }
    }

    /// Render this value as JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Byte(v) => serde_json::Value::from(*v),
            Value::Char(c) => serde_json::Value::String(c.to_string()),
            Value::Short(v) => serde_json::Value::from(*v),
            Value::Integer(v) => serde_json::Value::from(*v),
            Value::Long(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Value::from(f64::from(*v)),
            Value::Double(v) => serde_json::Value::from(*v),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::ByteArray(bytes) => {
                serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Char(c) => write!(f, "{}", c),
            Value::Short(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{}", s),
            Value::ByteArray(bytes) => write!(f, "{}", String::from_utf8_lossy(bytes)),
        }
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = String;

    fn try_from(json: serde_json::Value) -> std::result::Result<Self, Self::Error> {
        Value::from_json(&json).ok_or_else(|| format!("expected a scalar value, found {}", json))
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}
