//! File round trips through the delimited reader and writer.

use std::io::Write;
use tempfile::NamedTempFile;

use tidyframe::io::{write_file, to_json};
use tidyframe::{DType, Parser, Value};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

#[test]
fn test_read_tsv_auto_detect() {
    let file = create_test_file("id\tgroup\tvalue\n1\ta\t0.5\n2\tb\tNA\n");
    let table = Parser::new().parse_file(file.path()).expect("parse failed");
    assert_eq!(table.column_names(), vec!["id", "group", "value"]);
    assert_eq!(table.column("value").unwrap().dtype(), DType::Float);
    assert_eq!(table.get(1, "value"), Some(&Value::Null));
}

#[test]
fn test_write_then_read_back() {
    let source = create_test_file("k,n,flag\nx,1,true\ny,,false\n");
    let table = Parser::new().parse_file(source.path()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tsv");
    write_file(&table, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("k\tn\tflag\n"));
    let reread = Parser::new().parse_file(&path).unwrap();
    assert_eq!(reread, table);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Parser::new().parse_file("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, tidyframe::TidyError::Io { .. }));
}

#[test]
fn test_json_records() {
    let file = create_test_file("a,b\n1,x\n");
    let table = Parser::new().parse_file(file.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&to_json(&table).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!([{"a": 1, "b": "x"}]));
}
