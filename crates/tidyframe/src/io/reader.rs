//! Delimited text reader: guesses the separator, recognises missing-value
//! tokens and infers one type per column.

use std::fs;
use std::path::Path;

use log::debug;

use crate::error::{Result, TidyError};
use crate::table::{Column, Table, Value};

/// Separators considered by [`detect_delimiter`], in tie-break order.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Lines inspected when guessing the separator.
const SAMPLE_LINES: usize = 10;

/// Cells read as missing, after trimming.
const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "<NA>", "#N/A", "NULL", "null", "NaN", "nan", "None",
];

/// How a delimited file is read into a [`Table`].
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field separator; guessed from the first lines when `None`.
    pub delimiter: Option<u8>,
    /// First record holds column names. Otherwise columns are `column_1`, ...
    pub header: bool,
    /// Stop after this many data rows.
    pub row_limit: Option<usize>,
    pub quote: u8,
    /// Columns read as categorical, with their sorted distinct values as levels.
    pub categorical: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            header: true,
            row_limit: None,
            quote: b'"',
            categorical: Vec::new(),
        }
    }
}

/// Reads delimited text into a [`Table`].
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read a file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| TidyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = self.parse_bytes(&contents)?;
        debug!(
            "read {} rows x {} columns from {}",
            table.nrows(),
            table.ncols(),
            path.display()
        );
        Ok(table)
    }

    /// Read from a string.
    pub fn parse_str(&self, text: &str) -> Result<Table> {
        self.parse_bytes(text.as_bytes())
    }

    /// Read from raw bytes.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();
        let first: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => return Err(TidyError::EmptyData("no records found".to_string())),
        };
        let mut rows: Vec<Vec<String>> = Vec::new();
        let headers: Vec<String> = if self.config.header {
            first.iter().map(|s| s.trim().to_string()).collect()
        } else {
            let names = (1..=first.len()).map(|i| format!("column_{}", i)).collect();
            rows.push(first);
            names
        };
        if headers.is_empty() {
            return Err(TidyError::EmptyData("no columns found".to_string()));
        }

        let limit = self.config.row_limit.unwrap_or(usize::MAX);
        let width = headers.len();
        for record in records {
            if rows.len() >= limit {
                break;
            }
            let mut row: Vec<String> = record?.iter().map(str::to_string).collect();
            // Short rows are padded with missing fields, long rows truncated.
            row.resize(width, String::new());
            rows.push(row);
        }
        rows.truncate(limit);

        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let cells: Vec<&str> = rows.iter().map(|r| r[i].as_str()).collect();
                let column = if self.config.categorical.contains(&name) {
                    Column::factor(cells.iter().map(|c| parse_text(c)).collect())?
                } else {
                    infer_column(&cells)
                };
                Ok((name, column))
            })
            .collect::<Result<Vec<_>>>()?;
        Table::from_columns(columns)
    }
}

/// Returns true for cells that denote a missing value.
pub fn is_null_token(cell: &str) -> bool {
    NULL_TOKENS.contains(&cell.trim())
}

fn parse_text(cell: &str) -> Value {
    if is_null_token(cell) {
        Value::Null
    } else {
        Value::Str(cell.to_string())
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Pick the narrowest type every non-missing cell parses as:
/// integer, then float, then boolean, falling back to text.
fn infer_column(cells: &[&str]) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !is_null_token(c))
        .collect();

    let convert = |parse: &dyn Fn(&str) -> Option<Value>| -> Option<Column> {
        if present.is_empty() || !present.iter().all(|c| parse(*c).is_some()) {
            return None;
        }
        let values = cells
            .iter()
            .map(|c| {
                let c = c.trim();
                if is_null_token(c) { Value::Null } else { parse(c).unwrap_or_default() }
            })
            .collect();
        Some(Column::new(values))
    };

    convert(&|c: &str| c.parse::<i64>().ok().map(Value::Int))
        .or_else(|| convert(&|c: &str| c.parse::<f64>().ok().map(Value::float)))
        .or_else(|| convert(&|c: &str| parse_bool(c).map(Value::Bool)))
        .unwrap_or_else(|| Column::new(cells.iter().map(|c| parse_text(c)).collect()))
}

/// Guess the separator from the first non-blank lines.
///
/// A candidate must split the first line into at least two fields. Among
/// those, one that gives every sampled line the same field count beats one
/// that does not, then more fields win, then [`DELIMITERS`] order.
pub fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let sample: Vec<&[u8]> = bytes
        .split(|&b| b == b'\n')
        .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
        .take(SAMPLE_LINES)
        .collect();
    if sample.is_empty() {
        return Err(TidyError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best: Option<(bool, usize, u8)> = None;
    for &delimiter in DELIMITERS {
        let widths: Vec<usize> = sample.iter().map(|line| field_count(line, delimiter)).collect();
        let fields = widths[0];
        if fields < 2 {
            continue;
        }
        let consistent = widths.iter().all(|&w| w == fields);
        if best.is_none_or(|(c, f, _)| (consistent, fields) > (c, f)) {
            best = Some((consistent, fields, delimiter));
        }
    }
    Ok(best.map_or(b',', |(_, _, delimiter)| delimiter))
}

/// Fields in one line, honouring quotes.
fn field_count(line: &[u8], delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_reader(line)
        .records()
        .next()
        .and_then(|record| record.ok())
        .map_or(0, |record| record.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DType;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_type_inference() {
        let table = Parser::new()
            .parse_str("name,age,score,ok\nAlice,30,1.5,true\nBob,NA,2,FALSE\n")
            .unwrap();
        assert_eq!(table.column_names(), vec!["name", "age", "score", "ok"]);
        assert_eq!(table.column("name").unwrap().dtype(), DType::String);
        assert_eq!(table.column("age").unwrap().dtype(), DType::Integer);
        assert_eq!(table.get(1, "age"), Some(&Value::Null));
        assert_eq!(table.column("score").unwrap().dtype(), DType::Float);
        assert_eq!(table.get(1, "ok"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_categorical_and_padding() {
        let config = ParserConfig {
            categorical: vec!["g".to_string()],
            ..ParserConfig::default()
        };
        let table = Parser::with_config(config).parse_str("g,x\nb,1\na\n").unwrap();
        let g = table.column("g").unwrap();
        assert_eq!(g.levels(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(table.get(1, "x"), Some(&Value::Null));
    }

    #[test]
    fn test_headerless_and_max_rows() {
        let config = ParserConfig {
            header: false,
            row_limit: Some(2),
            ..ParserConfig::default()
        };
        let table = Parser::with_config(config).parse_str("1,2\n3,4\n5,6\n").unwrap();
        assert_eq!(table.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(table.nrows(), 2);
    }

    #[test]
    fn test_null_tokens() {
        for token in ["", " ", "NA", "N/A", "null", "NULL", "NaN", "None", "<NA>"] {
            assert!(is_null_token(token), "{token:?}");
        }
        for token in ["0", "value", "-", "none"] {
            assert!(!is_null_token(token), "{token:?}");
        }
    }

    #[test]
    fn test_detect_delimiter_respects_quotes() {
        let data = b"name;note\n\"Smith, J\";x\n\"Doe, A\";y\n";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
        assert_eq!(detect_delimiter(b"single\ncolumn\n").unwrap(), b',');
        assert!(detect_delimiter(b"\n  \n").is_err());
    }
}
