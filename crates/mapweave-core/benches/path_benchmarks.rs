//! Benchmarks for path parsing, collection expansion and target building
//!
//! Copyright (c) 2025 Mapweave Team
//! Licensed under the Apache-2.0 license

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mapweave_core::{
    CollectionKind, EngineConfig, ExpansionError, Field, FieldType, JsonTreeBuilder,
    JsonNodeProvider, Mapping, MappingDocument, MappingEngine, MappingExpander, PathExpression,
    Value,
};
use serde_json::json;
use std::sync::Arc;

fn string_field(path: &str) -> Field {
    Field::simple(path, FieldType::String).expect("benchmark path")
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    let expressions = [
        "/name",
        "/contact/address/city",
        "/orders[]/lines<>/sku",
        "/contact<3>/phones[12]/number",
        "/a/b/c/d/e/f/g/h/i/j",
    ];

    for expr in expressions {
        group.bench_with_input(BenchmarkId::new("parse", expr), expr, |b, expr| {
            b.iter(|| PathExpression::parse(black_box(expr)))
        });
    }

    let nested = PathExpression::parse("/orders[]/lines<>/sku").expect("benchmark path");
    group.bench_function("overwrite_indexes", |b| {
        b.iter(|| black_box(&nested).with_collection_indexes(black_box(42)))
    });

    group.finish();
}

fn bench_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("expansion");

    let mapping = Mapping::collection(
        CollectionKind::Array,
        vec![
            Mapping::map(string_field("/items[]/name"), string_field("/out[]/name")),
            Mapping::map(string_field("/items[]/sku"), string_field("/out[]/sku")),
        ],
    );

    for size in [10u32, 100, 1000] {
        let oracle = move |_: &Field| -> Result<u32, ExpansionError> { Ok(size) };
        group.bench_with_input(BenchmarkId::new("collection", size), &size, |b, _| {
            b.iter(|| MappingExpander::expand(black_box(&mapping), &oracle))
        });
    }

    group.finish();
}

fn bench_tree_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_building");

    let fields: Vec<Field> = (0..500)
        .map(|i| {
            let mut field = string_field(&format!("/out[{}]/name", i));
            field.value = Some(Value::String(format!("item {}", i)));
            field
        })
        .collect();

    group.bench_function("write_500_list_items", |b| {
        b.iter(|| {
            let mut builder = JsonTreeBuilder::new(JsonNodeProvider::new());
            for field in &fields {
                builder.write_field(field).expect("benchmark write");
            }
            black_box(builder.to_json())
        })
    });

    group.finish();
}

fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");

    let document = Arc::new(MappingDocument::new("bench").with_mapping(Mapping::collection(
        CollectionKind::Array,
        vec![
            Mapping::map(
                Field::simple("/items[]/id", FieldType::Integer).expect("benchmark path"),
                Field::simple("/out<>/id", FieldType::Integer).expect("benchmark path"),
            ),
            Mapping::map(string_field("/items[]/name"), string_field("/out<>/label")),
        ],
    )));
    let items: Vec<_> = (0..1000)
        .map(|i| json!({"id": i, "name": format!("Item {}", i)}))
        .collect();
    let source = json!({ "items": items });
    let engine = MappingEngine::new(EngineConfig::default());

    group.bench_function("map_1000_items", |b| {
        b.iter(|| {
            engine
                .execute_json(Arc::clone(&document), black_box(source.clone()))
                .expect("benchmark session")
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_expansion,
    bench_tree_building,
    bench_session
);
criterion_main!(benches);
