//! Benchmarks for blockdoc reconstruction performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic analysis output: every page carries a
//! run of anchor lines, form fields between them and one small table.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

fn geometry(top: f64, left: f64) -> Value {
    json!({"BoundingBox": {"Top": top, "Left": left, "Width": 0.2, "Height": 0.01}})
}

fn word(id: String, text: &str, page: usize, top: f64, left: f64) -> Value {
    json!({
        "BlockType": "WORD", "Id": id, "Page": page, "Text": text,
        "Geometry": geometry(top, left),
    })
}

/// Creates a synthetic analysis response with the given number of pages.
fn create_test_response(page_count: usize, lines_per_page: usize) -> Vec<u8> {
    let mut blocks = Vec::new();

    for page in 1..=page_count {
        for i in 0..lines_per_page {
            let top = 0.05 + i as f64 * (0.8 / lines_per_page as f64);
            let id = |s: &str| format!("p{}-{}-{}", page, i, s);

            blocks.push(json!({
                "BlockType": "LINE", "Id": id("line"), "Page": page,
                "Text": format!("Section {} of page {}", i, page),
                "Geometry": geometry(top, 0.05),
            }));

            let field_top = top + 0.015;
            blocks.push(word(id("wk"), "Field", page, field_top, 0.05));
            blocks.push(word(id("wv"), "value", page, field_top, 0.4));
            blocks.push(json!({
                "BlockType": "KEY_VALUE_SET", "Id": id("key"), "Page": page,
                "EntityTypes": ["KEY"], "Geometry": geometry(field_top, 0.05),
                "Relationships": [
                    {"Type": "VALUE", "Ids": [id("val")]},
                    {"Type": "CHILD", "Ids": [id("wk")]},
                ],
            }));
            blocks.push(json!({
                "BlockType": "KEY_VALUE_SET", "Id": id("val"), "Page": page,
                "EntityTypes": ["VALUE"], "Geometry": geometry(field_top, 0.4),
                "Relationships": [{"Type": "CHILD", "Ids": [id("wv")]}],
            }));
        }

        let id = |s: &str| format!("p{}-t-{}", page, s);
        let mut cells = Vec::new();
        for row in 1..=3 {
            for col in 1..=3 {
                let cell = format!("{}-{}", row, col);
                let word_id = id(&format!("w{}", cell));
                let cell_id = id(&format!("c{}", cell));
                let left = 0.1 * col as f64;
                blocks.push(word(word_id.clone(), &cell, page, 0.9, left));
                blocks.push(json!({
                    "BlockType": "CELL", "Id": cell_id, "Page": page,
                    "RowIndex": row, "ColumnIndex": col, "Geometry": geometry(0.9, left),
                    "Relationships": [{"Type": "CHILD", "Ids": [word_id]}],
                }));
                cells.push(cell_id);
            }
        }
        blocks.push(json!({
            "BlockType": "TABLE", "Id": id("table"), "Page": page,
            "Geometry": {"BoundingBox": {"Top": 0.9, "Left": 0.05, "Width": 0.9, "Height": 0.05}},
            "Relationships": [{"Type": "CHILD", "Ids": cells}],
        }));
    }

    json!({"DocumentMetadata": {"Pages": page_count}, "Blocks": blocks})
        .to_string()
        .into_bytes()
}

/// Benchmark input format detection.
fn bench_format_detection(c: &mut Criterion) {
    let data = create_test_response(1, 10);
    let not_json = b"Not analysis output at all, just random text content";

    c.bench_function("detect_response", |b| {
        b.iter(|| blockdoc::detect_format_from_bytes(black_box(&data)).unwrap());
    });

    c.bench_function("detect_not_json", |b| {
        b.iter(|| blockdoc::detect_format_from_bytes(black_box(not_json)).is_err());
    });
}

/// Benchmark reconstruction at various sizes, sequential and parallel.
fn bench_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction");

    for page_count in [1, 10, 50].iter() {
        let data = create_test_response(*page_count, 40);
        let parser = blockdoc::AnalysisParser::from_bytes(&data).unwrap();

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            b.iter(|| black_box(parser.parse().unwrap()));
        });

        let sequential = blockdoc::AnalysisParser::from_bytes_with_options(
            &data,
            blockdoc::ParseOptions::new().sequential(),
        )
        .unwrap();
        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            b.iter(|| black_box(sequential.parse().unwrap()));
        });
    }

    group.finish();
}

/// Benchmark decoding plus reconstruction from raw bytes.
fn bench_parse_bytes(c: &mut Criterion) {
    let data = create_test_response(10, 40);

    c.bench_function("parse_bytes_10_pages", |b| {
        b.iter(|| {
            let options = blockdoc::ParseOptions::new().exclude_table_key_values();
            blockdoc::parse_bytes_with_options(black_box(&data), options).unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_reconstruction,
    bench_parse_bytes,
);
criterion_main!(benches);
