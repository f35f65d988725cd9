//! Validation engine tests

use super::*;
use crate::action::ActionRegistry;
use crate::audit::AuditStatus;
use crate::conversion::{ConversionError, ConversionService, ConverterInfo, DefaultConversionService};
use crate::model::{Action, Field, LookupTable, Mapping, MappingDocument};
use crate::types::{CollectionKind, FieldType, Value};

fn field(path: &str, ty: FieldType) -> Field {
    Field::simple(path, ty).unwrap()
}

fn validate(document: &MappingDocument) -> Vec<Diagnostic> {
    let conversions = DefaultConversionService::new();
    let actions = ActionRegistry::with_builtins();
    ValidationEngine::new(&conversions, &actions).validate(document)
}

fn messages_with(diagnostics: &[Diagnostic], status: AuditStatus) -> Vec<&str> {
    diagnostics
        .iter()
        .filter(|d| d.status == status)
        .map(|d| d.message.as_str())
        .collect()
}

fn simple_document() -> MappingDocument {
    MappingDocument::new("contacts.v1").with_mapping(Mapping::map(
        field("/a", FieldType::String),
        field("/b", FieldType::String),
    ))
}

#[test]
fn test_clean_document_has_no_diagnostics() {
    assert!(validate(&simple_document()).is_empty());
}

#[test]
fn test_document_name_rules() {
    let mut document = simple_document();
    document.name = String::new();
    let diagnostics = validate(&document);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].field, "name");
    assert!(diagnostics[0].is_error());

    document.name = "has spaces!".to_string();
    let diagnostics = validate(&document);
    assert_eq!(diagnostics[0].value.as_deref(), Some("has spaces!"));
}

#[test]
fn test_empty_mappings_warn() {
    let diagnostics = validate(&MappingDocument::new("empty"));
    assert_eq!(
        messages_with(&diagnostics, AuditStatus::Warn),
        vec!["Field mappings should not be empty"]
    );
}

#[test]
fn test_missing_path_value_and_name() {
    let mut no_path = field("/a", FieldType::String);
    no_path.path = None;
    let mut no_value = Field::constant("x");
    no_value.value = None;

    let document = MappingDocument::new("doc")
        .with_mapping(Mapping::map(no_path, field("/b", FieldType::String)))
        .with_mapping(Mapping::map(no_value, field("/c", FieldType::String)))
        .with_mapping(Mapping::map(Field::property(""), field("/d", FieldType::String)));

    let diagnostics = validate(&document);
    let fields: Vec<&str> = diagnostics.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["mappings[0].source", "mappings[1].source", "mappings[2].source"]
    );
    assert!(diagnostics.iter().all(Diagnostic::is_error));
}

#[test]
fn test_separate_rules() {
    let document = MappingDocument::new("doc")
        .with_mapping(Mapping::Separate {
            source: field("/name", FieldType::Integer),
            targets: vec![field("/first", FieldType::String)],
            delimiter: None,
        })
        .with_mapping(Mapping::Separate {
            source: field("/name", FieldType::String),
            targets: vec![],
            delimiter: None,
        });

    let diagnostics = validate(&document);
    assert_eq!(
        messages_with(&diagnostics, AuditStatus::Error),
        vec![
            "Source field must be of type STRING for a Separate Mapping",
            "Index must exist and be greater than or equal to zero (0)",
        ]
    );
    assert_eq!(diagnostics[1].field, "mappings[0].targets[0].index");
    assert_eq!(
        messages_with(&diagnostics, AuditStatus::Warn),
        vec!["Target elements should not be empty"]
    );
}

#[test]
fn test_combine_rules() {
    let document = MappingDocument::new("doc")
        .with_mapping(Mapping::Combine {
            sources: vec![field("/a", FieldType::String).with_index(0), field("/b", FieldType::String)],
            target: field("/out", FieldType::String),
            delimiter: None,
        })
        .with_mapping(Mapping::Combine {
            sources: vec![],
            target: field("/out2", FieldType::String),
            delimiter: None,
        });

    let diagnostics = validate(&document);
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].field, "mappings[0].sources[1].index");
    assert_eq!(diagnostics[1].status, AuditStatus::Warn);
}

#[test]
fn test_conversion_concerns() {
    let document = MappingDocument::new("doc")
        .with_mapping(Mapping::map(field("/a", FieldType::Integer), field("/b", FieldType::Long)))
        .with_mapping(Mapping::map(field("/c", FieldType::Long), field("/d", FieldType::Integer)))
        .with_mapping(Mapping::map(field("/e", FieldType::Integer), field("/f", FieldType::ByteArray)));

    let diagnostics = validate(&document);
    let statuses: Vec<(&str, AuditStatus)> = diagnostics
        .iter()
        .map(|d| (d.field.as_str(), d.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("mappings[0].conversion", AuditStatus::Info),
            ("mappings[1].conversion", AuditStatus::Warn),
            ("mappings[2].conversion", AuditStatus::Error),
        ]
    );
    assert_eq!(diagnostics[1].value.as_deref(), Some("/c --> /d"));
}

#[test]
fn test_separate_targets_are_type_checked() {
    let document = MappingDocument::new("doc").with_mapping(Mapping::Separate {
        source: field("/name", FieldType::String),
        targets: vec![
            field("/first", FieldType::String).with_index(0),
            field("/count", FieldType::Integer).with_index(1),
        ],
        delimiter: None,
    });

    let diagnostics = validate(&document);
    let fields: Vec<&str> = diagnostics.iter().map(|d| d.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["mappings[0].targets[1].conversion", "mappings[0].targets[1].conversion"]
    );
    assert!(diagnostics.iter().all(|d| d.status == AuditStatus::Warn));
    assert_eq!(diagnostics[0].value.as_deref(), Some("/name --> /count"));
}

#[test]
fn test_fields_with_actions_are_type_checked() {
    let document = MappingDocument::new("doc")
        .with_mapping(Mapping::map(
            field("/a", FieldType::String).with_action(Action::new("Trim")),
            field("/b", FieldType::Integer),
        ))
        .with_mapping(Mapping::Lookup {
            source: field("/code", FieldType::String),
            target: field("/id", FieldType::Long),
            lookup_table_name: "codes".to_string(),
        })
        .with_lookup_table(LookupTable::new("codes"));

    let diagnostics = validate(&document);
    let summary: Vec<(&str, AuditStatus)> = diagnostics
        .iter()
        .map(|d| (d.field.as_str(), d.status))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("mappings[0].conversion", AuditStatus::Warn),
            ("mappings[0].conversion", AuditStatus::Warn),
            ("mappings[1].conversion", AuditStatus::Warn),
            ("mappings[1].conversion", AuditStatus::Warn),
        ]
    );
}

struct NoConversions;

impl ConversionService for NoConversions {
    fn convert(&self, value: &Value, _from: FieldType, to: FieldType) -> Result<Value, ConversionError> {
        Err(ConversionError::NoConverter {
            from: value.field_type(),
            to,
        })
    }

    fn find_converter(&self, _from: FieldType, _to: FieldType) -> Option<ConverterInfo> {
        None
    }
}

#[test]
fn test_missing_converter_warns() {
    let actions = ActionRegistry::new();
    let engine = ValidationEngine::new(&NoConversions, &actions);
    let document = MappingDocument::new("doc").with_mapping(Mapping::map(
        field("/a", FieldType::String),
        field("/b", FieldType::Double),
    ));

    let diagnostics = engine.validate(&document);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].status, AuditStatus::Warn);
    assert!(diagnostics[0].message.contains("required but unavailable"));
}

#[test]
fn test_unknown_action_is_error() {
    let document = MappingDocument::new("doc").with_mapping(Mapping::map(
        field("/a", FieldType::String).with_action(Action::new("Trim")),
        field("/b", FieldType::String).with_action(Action::new("Frobnicate")),
    ));

    let diagnostics = validate(&document);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].field, "mappings[0].target.actions[0]");
    assert_eq!(diagnostics[0].value.as_deref(), Some("Frobnicate"));
}

#[test]
fn test_lookup_table_rules() {
    let lookup = |table: &str| Mapping::Lookup {
        source: field("/code", FieldType::String),
        target: field("/name", FieldType::String),
        lookup_table_name: table.to_string(),
    };
    let document = MappingDocument::new("doc")
        .with_mapping(lookup("states"))
        .with_mapping(Mapping::collection(CollectionKind::Array, vec![lookup("missing")]))
        .with_lookup_table(LookupTable::new("states"))
        .with_lookup_table(LookupTable::new("states"))
        .with_lookup_table(LookupTable::new("orphan"));

    let diagnostics = validate(&document);
    let summary: Vec<(AuditStatus, Option<&str>)> = diagnostics
        .iter()
        .map(|d| (d.status, d.value.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (AuditStatus::Error, Some("states")),
            (AuditStatus::Error, Some("missing")),
            (AuditStatus::Warn, Some("orphan")),
        ]
    );
}

#[test]
fn test_collection_children_are_validated() {
    let document = MappingDocument::new("doc").with_mapping(Mapping::collection(
        CollectionKind::List,
        vec![Mapping::Separate {
            source: field("/items<>/name", FieldType::String),
            targets: vec![field("/out<>/first", FieldType::String)],
            delimiter: None,
        }],
    ));

    let diagnostics = validate(&document);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].field, "mappings[0].children[0].targets[0].index");
}

#[test]
fn test_lenient_mode_keeps_only_errors() {
    let conversions = DefaultConversionService::new();
    let actions = ActionRegistry::with_builtins();
    let engine = ValidationEngine::with_mode(&conversions, &actions, ValidationMode::Lenient);

    let document = MappingDocument::new("bad name")
        .with_lookup_table(LookupTable::new("orphan"));
    let diagnostics = engine.validate(&document);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].is_error());
}
