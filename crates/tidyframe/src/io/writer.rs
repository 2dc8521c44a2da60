//! Delimited text and JSON output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, TidyError};
use crate::table::{Table, Value};

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Write a table as delimited text with a header row.
///
/// Missing values become empty fields and nested tables are written as
/// `<table RxC>`.
pub fn write_delimited<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    out.write_record(table.column_names())?;
    for row in 0..table.nrows() {
        out.write_record(table.columns().map(|(_, column)| {
            column.get(row).map(cell).unwrap_or_default()
        }))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Render a table as delimited text.
pub fn to_delimited_string(table: &Table, delimiter: u8) -> Result<String> {
    let mut buffer = Vec::new();
    write_delimited(table, &mut buffer, delimiter)?;
    String::from_utf8(buffer).map_err(|e| TidyError::InvalidArgument(e.to_string()))
}

/// Write a table to a file, choosing tab for `.tsv` and comma otherwise.
pub fn write_file(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| TidyError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some("tsv") => b'\t',
        _ => b',',
    };
    write_delimited(table, file, delimiter)
}

/// Render a table as a JSON array of records.
pub fn to_json(table: &Table) -> Result<String> {
    Ok(serde_json::to_string_pretty(table)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_missing_and_nested_cells() {
        let inner = Table::from_columns(vec![("a", Column::from(vec![1, 2]))]).unwrap();
        let table = Table::from_columns(vec![
            ("x", Column::new(vec![Value::from(1), Value::Null])),
            ("t", Column::new(vec![Value::from(inner), Value::from("q")])),
        ])
        .unwrap();
        let text = to_delimited_string(&table, b',').unwrap();
        assert_eq!(text, "x,t\n1,<table 2x1>\n,q\n");
    }
}
