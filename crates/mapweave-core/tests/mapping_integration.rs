//! End-to-end mapping tests over the JSON adapter


use mapweave_core::{
    Action, AuditStatus, CollectionKind, EngineConfig, Error, Field, FieldType, JsonNodeProvider,
    JsonSourceDocument, LookupTable, Mapping, MappingDocument, MappingEngine, MappingSession,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_support::*;

#[test]
fn test_collection_map_expands_per_source_item() {
    let document = MappingDocument::new("collection_map").with_mapping(Mapping::collection(
        CollectionKind::Array,
        vec![Mapping::map(string_field("/a/b[2]"), string_field("/x/y[2]"))],
    ));
    let source = json!({"a": {"b": ["v0", "v1", "v2", "v3", "v4"]}});

    let session = run(&engine(), document, source);

    assert!(!session.has_errors(), "{}", session.audits().report());
    assert_eq!(
        target(&session),
        json!({"x": {"y": ["v0", "v1", "v2", "v3", "v4"]}})
    );
}

#[test]
fn test_separate_writes_tokens_and_audits_short_split() {
    let document = MappingDocument::new("separate").with_mapping(Mapping::Separate {
        source: string_field("/name"),
        targets: vec![
            string_field("/first").with_index(0),
            string_field("/last").with_index(2),
            string_field("/extra").with_index(5),
        ],
        delimiter: Some("-".to_string()),
    });

    let session = run(&engine(), document, json!({"name": "foo-bar-blah"}));

    assert_eq!(target(&session), json!({"first": "foo", "last": "blah"}));
    let errors = audits_with(&session, AuditStatus::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "Separate returned fewer segments count=3 when targetField.path=/extra requested index=5"
    );
    assert_eq!(errors[0].path.as_deref(), Some("/extra"));
}

#[test]
fn test_combine_joins_sources_by_index() {
    let document = MappingDocument::new("combine").with_mapping(Mapping::Combine {
        sources: vec![
            string_field("/parts/c").with_index(2),
            string_field("/parts/a").with_index(0),
            string_field("/parts/b").with_index(1),
        ],
        target: string_field("/joined"),
        delimiter: None,
    });
    let source = json!({"parts": {"a": "bar", "b": "blah", "c": "baz"}});

    let session = run(&engine(), document, source);

    assert!(!session.has_errors());
    assert_eq!(target(&session), json!({"joined": "bar blah baz"}));
}

#[test]
fn test_combine_without_index_is_skipped() {
    let document = MappingDocument::new("combine").with_mapping(Mapping::Combine {
        sources: vec![string_field("/a").with_index(0), string_field("/b")],
        target: string_field("/joined"),
        delimiter: Some(",".to_string()),
    });

    let session = run(&unvalidated_engine(), document, json!({"a": "x", "b": "y"}));

    assert_eq!(target(&session), serde_json::Value::Null);
    let errors = audits_with(&session, AuditStatus::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("Combine requires Index value"));
}

#[test]
fn test_lookup_translates_and_warns_on_miss() {
    let lookup = |path: &str, out: &str| Mapping::Lookup {
        source: string_field(path),
        target: string_field(out),
        lookup_table_name: "states".to_string(),
    };
    let document = MappingDocument::new("lookup")
        .with_mapping(lookup("/home", "/homeName"))
        .with_mapping(lookup("/work", "/workName"))
        .with_lookup_table(
            LookupTable::new("states")
                .with_entry("CA", "California")
                .with_entry("OR", "Oregon"),
        );

    let session = run(&engine(), document, json!({"home": "CA", "work": "NV"}));

    assert_eq!(target(&session), json!({"homeName": "California"}));
    let warnings = audits_with(&session, AuditStatus::Warn);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].value.as_deref(), Some("NV"));
    assert!(!session.has_errors());
}

#[test]
fn test_lookup_missing_table_is_error() {
    let document = MappingDocument::new("lookup").with_mapping(Mapping::Lookup {
        source: string_field("/home"),
        target: string_field("/homeName"),
        lookup_table_name: "nowhere".to_string(),
    });

    let session = run(&unvalidated_engine(), document, json!({"home": "CA"}));
    assert!(session.has_errors());
    assert_eq!(target(&session), serde_json::Value::Null);
}

#[test]
fn test_property_and_constant_fields() {
    let document = MappingDocument::new("props")
        .with_property("region", "document-region")
        .with_property("tier", "gold")
        .with_mapping(Mapping::map(Field::property("region"), string_field("/region")))
        .with_mapping(Mapping::map(Field::property("tier"), string_field("/tier")))
        .with_mapping(Mapping::map(Field::constant(42), field("/answer", FieldType::Integer)));

    let engine = engine();
    let mut session = MappingSession::json(Arc::new(document), json!({}));
    session.set_property("region", "session-region");
    engine.process(&mut session).unwrap();

    assert_eq!(
        target(&session),
        json!({"region": "session-region", "tier": "gold", "answer": 42})
    );
}

#[test]
fn test_actions_and_type_conversion() {
    let document = MappingDocument::new("actions")
        .with_mapping(Mapping::map(
            string_field("/name").with_action(Action::new("Trim")),
            string_field("/upper").with_action(Action::new("Uppercase")),
        ))
        .with_mapping(Mapping::map(
            string_field("/count"),
            field("/total", FieldType::Integer),
        ))
        .with_mapping(Mapping::map(
            string_field("/code").with_action(
                Action::new("SubString")
                    .with_param("startIndex", 0)
                    .with_param("endIndex", 3),
            ),
            string_field("/prefix"),
        ));
    let source = json!({"name": "  kari  ", "count": "42", "code": "NOR-0047"});

    let session = run(&engine(), document, source);

    assert!(!session.has_errors(), "{}", session.audits().report());
    assert_eq!(
        target(&session),
        json!({"upper": "KARI", "total": 42, "prefix": "NOR"})
    );
}

#[test]
fn test_failed_conversion_is_audited_and_session_continues() {
    let document = MappingDocument::new("conversion")
        .with_mapping(Mapping::map(
            string_field("/count"),
            field("/total", FieldType::Integer),
        ))
        .with_mapping(Mapping::map(string_field("/name"), string_field("/name")));

    let session = run(&engine(), document, json!({"count": "many", "name": "ok"}));

    assert_eq!(target(&session), json!({"name": "ok"}));
    let errors = audits_with(&session, AuditStatus::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.as_deref(), Some("/total"));
}

#[test]
fn test_nested_objects_in_list_collection() {
    let document = MappingDocument::new("orders").with_mapping(Mapping::collection(
        CollectionKind::Array,
        vec![
            Mapping::map(field("/orders[]/id", FieldType::Integer), field("/out<>/id", FieldType::Integer)),
            Mapping::map(string_field("/orders[]/sku"), string_field("/out<>/sku")),
        ],
    ));
    let source = json!({"orders": [{"id": 1, "sku": "A"}, {"id": 2, "sku": "B"}]});

    let session = run(&engine(), document, source);

    assert_eq!(
        target(&session),
        json!({"out": [{"id": 1, "sku": "A"}, {"id": 2, "sku": "B"}]})
    );
}

#[test]
fn test_scalar_source_into_collection_target() {
    let document = MappingDocument::new("scalar").with_mapping(Mapping::collection(
        CollectionKind::Array,
        vec![Mapping::map(string_field("/name"), string_field("/names[]"))],
    ));

    let session = run(&engine(), document, json!({"name": "solo"}));
    assert_eq!(target(&session), json!({"names": ["solo"]}));
}

#[test]
fn test_expansion_failure_does_not_stop_other_mappings() {
    let document = MappingDocument::new("partial")
        .with_mapping(Mapping::collection(
            CollectionKind::Array,
            vec![Mapping::map(string_field("/missing[]/v"), string_field("/out[]/v"))],
        ))
        .with_mapping(Mapping::map(field("/x", FieldType::Integer), field("/y", FieldType::Integer)));

    let session = run(&engine(), document, json!({"x": 1}));

    assert_eq!(target(&session), json!({"y": 1}));
    let errors = audits_with(&session, AuditStatus::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("/missing[]/v"));
}

#[test]
fn test_unsupported_target_structure_is_audited() {
    let document = MappingDocument::new("maps")
        .with_mapping(Mapping::map(string_field("/a"), string_field("/m{0}/v")))
        .with_mapping(Mapping::map(string_field("/a"), string_field("/ok")));

    let session = run(&engine(), document, json!({"a": "fine"}));

    assert_eq!(target(&session), json!({"ok": "fine"}));
    assert_eq!(session.audits().error_count(), 1);
}

#[test]
fn test_null_values_follow_configuration() {
    let document = || {
        MappingDocument::new("nulls").with_mapping(Mapping::map(string_field("/a"), string_field("/b")))
    };

    let session = run(&engine(), document(), json!({"a": null}));
    assert_eq!(target(&session), json!({"b": null}));

    let skipping = MappingEngine::new(EngineConfig {
        write_null_values: false,
        ..EngineConfig::default()
    });
    let session = run(&skipping, document(), json!({"a": null}));
    assert_eq!(target(&session), serde_json::Value::Null);
}

#[test]
fn test_multiple_documents_by_doc_id() {
    let document = MappingDocument::new("multi")
        .with_mapping(Mapping::map(
            string_field("/name").with_doc_id("people"),
            string_field("/customer").with_doc_id("invoice"),
        ))
        .with_mapping(Mapping::map(
            field("/total", FieldType::Double).with_doc_id("orders"),
            field("/amount", FieldType::Double).with_doc_id("invoice"),
        ));

    let engine = engine();
    let mut session: MappingSession<JsonNodeProvider> = engine.create_session(Arc::new(document));
    session.add_source("people", JsonSourceDocument::new(json!({"name": "Kari"})));
    session.add_source("orders", JsonSourceDocument::new(json!({"total": 12.5})));
    session.add_target("invoice", JsonNodeProvider::new());
    engine.process(&mut session).unwrap();

    assert!(!session.has_errors());
    assert_eq!(
        session.target_json("invoice").unwrap(),
        json!({"customer": "Kari", "amount": 12.5})
    );
}

#[test]
fn test_validation_errors_abort_when_configured() {
    let strict = MappingEngine::new(EngineConfig {
        fail_on_validation_errors: true,
        ..EngineConfig::default()
    });
    let document = MappingDocument::new("invalid").with_mapping(Mapping::Separate {
        source: field("/n", FieldType::Integer),
        targets: vec![string_field("/a").with_index(0)],
        delimiter: None,
    });

    let err = strict
        .execute_json(Arc::new(document.clone()), json!({"n": 1}))
        .unwrap_err();
    assert!(matches!(err, Error::Precondition { diagnostics: 1, .. }));

    // Without the flag the diagnostics are only attached to the session.
    let session = run(&engine(), document, json!({"n": 1}));
    let errors: Vec<_> = session.validations().iter().filter(|d| d.is_error()).collect();
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = engine();
    let document = Arc::new(
        MappingDocument::new("threads")
            .with_mapping(Mapping::map(field("/n", FieldType::Integer), field("/m", FieldType::Integer))),
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let engine = &engine;
                let document = Arc::clone(&document);
                scope.spawn(move || {
                    let session = engine.execute_json(document, json!({"n": n})).unwrap();
                    target(&session)
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), json!({"m": n}));
        }
    });
}

#[test]
fn test_session_metadata_and_report() {
    let document = MappingDocument::new("report").with_mapping(Mapping::Separate {
        source: string_field("/name"),
        targets: vec![string_field("/x").with_index(3)],
        delimiter: Some(" ".to_string()),
    });

    let session = run(&engine(), document, json!({"name": "one two"}));

    let metadata = session.metadata();
    assert!(metadata.started_at.is_some());
    assert!(metadata.finished_at >= metadata.started_at);
    let report = session.audits().report();
    assert!(report.contains("Errors: 1"));
    assert!(report.contains("/x"));
}
