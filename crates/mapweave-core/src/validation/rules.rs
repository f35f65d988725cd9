//! Validation rules
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use super::core::ValidationEngine;
use super::Diagnostic;
use crate::conversion::ConversionConcern;
use crate::model::{Field, FieldKind, Mapping, MappingDocument};
use crate::types::FieldType;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

fn document_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("Valid regex pattern"))
}

/// Name and mapping list checks
pub fn validate_document_header(document: &MappingDocument) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if document.name.trim().is_empty() {
        diagnostics.push(Diagnostic::error(
            "name",
            "Mapping name must not be null nor empty",
        ));
    } else if !document_name_pattern().is_match(&document.name) {
        diagnostics.push(
            Diagnostic::error(
                "name",
                "Mapping name must not contain spaces nor special characters other than period (.) and underscore (_)",
            )
            .with_value(document.name.clone()),
        );
    }

    if document.mappings.is_empty() {
        diagnostics.push(Diagnostic::warn("mappings", "Field mappings should not be empty"));
    }

    diagnostics
}

/// Structural and type checks for one mapping; collections recurse
pub fn validate_mapping(
    engine: &ValidationEngine<'_>,
    mapping: &Mapping,
    at: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match mapping {
        Mapping::Map { source, target } => {
            validate_field(engine, source, &format!("{}.source", at), diagnostics);
            validate_field(engine, target, &format!("{}.target", at), diagnostics);
            validate_type_pair(engine, source, target, at, diagnostics);
        }
        Mapping::Lookup {
            source,
            target,
            lookup_table_name,
        } => {
            validate_field(engine, source, &format!("{}.source", at), diagnostics);
            validate_field(engine, target, &format!("{}.target", at), diagnostics);
            if lookup_table_name.trim().is_empty() {
                diagnostics.push(Diagnostic::error(
                    format!("{}.lookup_table_name", at),
                    "Lookup mapping must name a lookup table",
                ));
            }
            validate_type_pair(engine, source, target, at, diagnostics);
        }
        Mapping::Separate {
            source, targets, ..
        } => {
            let source_at = format!("{}.source", at);
            validate_field(engine, source, &source_at, diagnostics);
            if let Some(field_type) = source.field_type {
                if field_type != FieldType::String {
                    diagnostics.push(
                        Diagnostic::error(
                            source_at,
                            "Source field must be of type STRING for a Separate Mapping",
                        )
                        .with_value(field_type.to_string()),
                    );
                }
            }
            if targets.is_empty() {
                diagnostics.push(Diagnostic::warn(
                    format!("{}.targets", at),
                    "Target elements should not be empty",
                ));
            }
            for (i, target) in targets.iter().enumerate() {
                let target_at = format!("{}.targets[{}]", at, i);
                validate_field(engine, target, &target_at, diagnostics);
                require_index(target, &target_at, diagnostics);
                validate_type_pair(engine, source, target, &target_at, diagnostics);
            }
        }
        Mapping::Combine {
            sources, target, ..
        } => {
            if sources.is_empty() {
                diagnostics.push(Diagnostic::warn(
                    format!("{}.sources", at),
                    "Source elements should not be empty",
                ));
            }
            for (i, source) in sources.iter().enumerate() {
                let source_at = format!("{}.sources[{}]", at, i);
                validate_field(engine, source, &source_at, diagnostics);
                require_index(source, &source_at, diagnostics);
            }
            validate_field(engine, target, &format!("{}.target", at), diagnostics);
        }
        Mapping::Collection { children, .. } => {
            if children.is_empty() {
                diagnostics.push(Diagnostic::warn(
                    format!("{}.children", at),
                    "Collection mapping has no child mappings",
                ));
            }
            for (i, child) in children.iter().enumerate() {
                validate_mapping(engine, child, &format!("{}.children[{}]", at, i), diagnostics);
            }
        }
    }
}

/// Presence checks per field kind, plus action name resolution
fn validate_field(
    engine: &ValidationEngine<'_>,
    field: &Field,
    at: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match &field.kind {
        FieldKind::Simple | FieldKind::Format { .. } if field.path.is_none() => {
            diagnostics.push(Diagnostic::error(at, "Field path must not be null"));
        }
        FieldKind::Constant if field.value.is_none() => {
            diagnostics.push(Diagnostic::error(at, "Constant field must carry a value"));
        }
        FieldKind::Property { name } if name.trim().is_empty() => {
            diagnostics.push(Diagnostic::error(at, "Property field must have a name"));
        }
        _ => {}
    }

    for (i, action) in field.actions.iter().enumerate() {
        if !engine.actions.contains(&action.name) {
            diagnostics.push(
                Diagnostic::error(
                    format!("{}.actions[{}]", at, i),
                    "Field action is not registered",
                )
                .with_value(action.name.clone()),
            );
        }
    }
}

fn require_index(field: &Field, at: &str, diagnostics: &mut Vec<Diagnostic>) {
    if field.index.is_none() {
        diagnostics.push(Diagnostic::error(
            format!("{}.index", at),
            "Index must exist and be greater than or equal to zero (0)",
        ));
    }
}

/// Converter availability and concerns between declared source and target types
fn validate_type_pair(
    engine: &ValidationEngine<'_>,
    source: &Field,
    target: &Field,
    at: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (Some(from), Some(to)) = (source.field_type, target.field_type) else {
        return;
    };
    if from == to || !from.is_scalar() || !to.is_scalar() {
        return;
    }

    let field = format!("{}.conversion", at);
    let value = format!("{} --> {}", source.describe(), target.describe());
    let Some(info) = engine.conversions.find_converter(from, to) else {
        diagnostics.push(
            Diagnostic::warn(
                field,
                "A conversion between the source and target fields is required but unavailable",
            )
            .with_value(value),
        );
        return;
    };

    for concern in &info.concerns {
        let diagnostic = match concern {
            ConversionConcern::None => Diagnostic::info(&field, "Conversion has no concerns"),
            ConversionConcern::Range => Diagnostic::warn(
                &field,
                format!("Value may exceed the range of {}", to),
            ),
            ConversionConcern::Format => Diagnostic::warn(
                &field,
                format!("Value must be formatted as a valid {}", to),
            ),
            ConversionConcern::Unsupported => Diagnostic::error(
                &field,
                format!("Conversion from {} to {} is not supported", from, to),
            ),
        };
        diagnostics.push(diagnostic.with_value(value.clone()));
    }
}

/// Duplicate, missing and unreferenced lookup tables
pub fn validate_lookup_tables(document: &MappingDocument) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut seen = HashSet::new();
    for table in &document.lookup_tables {
        if !seen.insert(table.name.as_str()) {
            diagnostics.push(
                Diagnostic::error(
                    "lookup_tables",
                    "LookupTables contain duplicated LookupTable names",
                )
                .with_value(table.name.clone()),
            );
        }
    }

    let mut referenced = BTreeSet::new();
    collect_lookup_references(&document.mappings, &mut referenced);

    for name in &referenced {
        if !name.is_empty() && !seen.contains(name) {
            diagnostics.push(
                Diagnostic::error(
                    "lookup_tables",
                    "A lookup mapping references a non existent LookupTable name",
                )
                .with_value(name.to_string()),
            );
        }
    }

    for table in &document.lookup_tables {
        if !referenced.contains(table.name.as_str()) {
            diagnostics.push(
                Diagnostic::warn("lookup_tables", "LookupTable is defined but never used")
                    .with_value(table.name.clone()),
            );
        }
    }

    diagnostics
}

fn collect_lookup_references<'a>(mappings: &'a [Mapping], names: &mut BTreeSet<&'a str>) {
    for mapping in mappings {
        match mapping {
            Mapping::Lookup {
                lookup_table_name, ..
            } => {
                names.insert(lookup_table_name.as_str());
            }
            Mapping::Collection { children, .. } => collect_lookup_references(children, names),
            _ => {}
        }
    }
}
