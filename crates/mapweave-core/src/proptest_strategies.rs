//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random
//! but valid paths, values and field types for property testing.

#![cfg(test)]

use crate::types::{CollectionKind, FieldType, Value};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy for generating segment names
pub fn segment_name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z_][a-zA-Z0-9_.-]{0,12}"
}

pub fn collection_kind_strategy() -> impl Strategy<Value = CollectionKind> {
    prop_oneof![
        Just(CollectionKind::Array),
        Just(CollectionKind::List),
        Just(CollectionKind::Map),
    ]
}

/// Strategy for generating one textual segment
pub fn segment_text_strategy() -> impl Strategy<Value = String> {
    (
        segment_name_strategy(),
        proptest::option::of(collection_kind_strategy()),
        proptest::option::of(0u32..1000),
    )
        .prop_map(|(name, kind, index)| match kind {
            None => name,
            Some(kind) => {
                let (open, close) = kind.markers();
                match index {
                    Some(i) => format!("{}{}{}{}", name, open, i, close),
                    None => format!("{}{}{}", name, open, close),
                }
            }
        })
}

/// Strategy for generating normalized path strings (leading `/`, no trailing `/`)
pub fn normalized_path_strategy() -> impl Strategy<Value = String> {
    vec(segment_text_strategy(), 0..6).prop_map(|segments| {
        if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", segments.join("/"))
        }
    })
}

/// Strategy for generating scalar values
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Boolean),
        any::<i8>().prop_map(Value::Byte),
        any::<i16>().prop_map(Value::Short),
        any::<i32>().prop_map(Value::Integer),
        any::<i64>().prop_map(Value::Long),
        (-1.0e6f64..1.0e6).prop_map(Value::Double),
        (-1.0e3f32..1.0e3).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,24}".prop_map(Value::String),
    ]
}

/// Strategy for scalar target types that every scalar can reach through String
pub fn textual_target_type_strategy() -> impl Strategy<Value = FieldType> {
    prop_oneof![Just(FieldType::String), Just(FieldType::All)]
}
