//! Integration tests for rendering reconstructed documents from files.

use std::fs;

use blockdoc::render::{to_markdown_with_stats, ExtractionStats};
use blockdoc::{
    extract_text, parse_file, to_json, to_markdown, to_text, Blockdoc, CleanupPreset, JsonFormat,
    PageSelection, RenderOptions,
};

const INPUT: &str = r#"[
  {
    "DocumentMetadata": {"Pages": 2},
    "AnalyzeDocumentModelVersion": "1.0",
    "NextToken": "t1",
    "Blocks": [
      {"BlockType": "LINE", "Id": "l1", "Page": 1, "Text": "ﬁnal   report",
       "Geometry": {"BoundingBox": {"Top": 0.125, "Left": 0.1, "Width": 0.5, "Height": 0.0625}}},
      {"BlockType": "TABLE", "Id": "t1", "Page": 1,
       "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.1, "Width": 0.8, "Height": 0.125}},
       "Relationships": [{"Type": "CHILD", "Ids": ["c1", "c2"]}]},
      {"BlockType": "CELL", "Id": "c1", "Page": 1, "RowIndex": 1, "ColumnIndex": 1,
       "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.1, "Width": 0.4, "Height": 0.0625}},
       "Relationships": [{"Type": "CHILD", "Ids": ["wq"]}]},
      {"BlockType": "CELL", "Id": "c2", "Page": 1, "RowIndex": 1, "ColumnIndex": 2,
       "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.5, "Width": 0.4, "Height": 0.0625}},
       "Relationships": [{"Type": "CHILD", "Ids": ["wi"]}]},
      {"BlockType": "WORD", "Id": "wq", "Page": 1, "Text": "Qty",
       "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.1, "Width": 0.1, "Height": 0.0625}}},
      {"BlockType": "WORD", "Id": "wi", "Page": 1, "Text": "Item",
       "Geometry": {"BoundingBox": {"Top": 0.25, "Left": 0.5, "Width": 0.1, "Height": 0.0625}}}
    ]
  },
  {
    "Blocks": [
      {"BlockType": "LINE", "Id": "l2", "Page": 2, "Text": "Appendix *draft*",
       "Geometry": {"BoundingBox": {"Top": 0.125, "Left": 0.1, "Width": 0.5, "Height": 0.0625}}}
    ]
  }
]"#;

fn write_input() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    fs::write(&path, INPUT).unwrap();
    (dir, path)
}

#[test]
fn test_paginated_file_merges_pages() {
    let (_dir, path) = write_input();
    let doc = parse_file(&path).unwrap();

    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.metadata.model_version.as_deref(), Some("1.0"));
    assert_eq!(doc.pages[0].table_count(), 1);
    assert_eq!(doc.pages[1].content[0].line_text, "Appendix *draft*");
}

#[test]
fn test_markdown_from_file() {
    let (_dir, path) = write_input();
    let markdown = to_markdown(&path).unwrap();

    assert!(markdown.contains("| Qty | Item |\n| --- | --- |"));
    assert!(markdown.ends_with("Appendix \\*draft\\*"));
}

#[test]
fn test_builder_frontmatter_names_source() {
    let (_dir, path) = write_input();
    let markdown = Blockdoc::new()
        .with_frontmatter()
        .parse(&path)
        .unwrap()
        .to_markdown()
        .unwrap();

    assert!(markdown.starts_with("---\nsource: \""));
    assert!(markdown.contains("report.json\"\npages: 2\n"));
    assert!(markdown.contains("model_version: \"1.0\""));
}

#[test]
fn test_text_with_cleanup() {
    let (_dir, path) = write_input();

    let raw = to_text(&path, &RenderOptions::new()).unwrap();
    assert!(raw.starts_with("ﬁnal   report\n"));

    let cleaned = to_text(
        &path,
        &RenderOptions::new().with_cleanup_preset(CleanupPreset::Standard),
    )
    .unwrap();
    assert_eq!(cleaned, "final report\nQty\tItem\n\nAppendix *draft*");
}

#[test]
fn test_builder_page_selection() {
    let (_dir, path) = write_input();
    let result = Blockdoc::new()
        .sequential()
        .with_pages(PageSelection::Pages(vec![2]))
        .parse(&path)
        .unwrap();

    assert_eq!(result.document().page_count(), 1);
    assert_eq!(result.plain_text(), "Appendix *draft*");
}

#[test]
fn test_json_from_file() {
    let (_dir, path) = write_input();
    let json = to_json(&path, JsonFormat::Compact).unwrap();

    let pages: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(pages.as_array().map(Vec::len), Some(2));
    assert_eq!(pages[0]["content"][0]["tables"][0][0][1], "Item ");
}

#[test]
fn test_extract_text() {
    let (_dir, path) = write_input();
    assert_eq!(
        extract_text(&path).unwrap(),
        "ﬁnal   report\n\nAppendix *draft*"
    );
}

#[test]
fn test_stats_match_page_counts() {
    let (_dir, path) = write_input();
    let doc = parse_file(&path).unwrap();

    let rendered = to_markdown_with_stats(&doc, &RenderOptions::new()).unwrap();
    assert_eq!(rendered.stats.page_count, 2);
    assert_eq!(rendered.stats.line_count, 2);
    assert_eq!(rendered.stats.table_count, 1);

    let mut totals = ExtractionStats::new();
    for page in &doc.pages {
        totals.merge(&ExtractionStats::from_page(page));
    }
    assert_eq!(totals.line_count, 2);
    assert_eq!(totals.table_count, 1);
}
