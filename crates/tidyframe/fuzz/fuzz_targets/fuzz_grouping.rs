//! Fuzz target for group index construction.
//!
//! Every grouping option combination must partition the rows: no row in two
//! groups, and no row lost unless `dropna` removed it.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tidyframe::{Column, GroupIndex, GroupOptions, Table, Value};

#[derive(Debug, Arbitrary)]
struct Input {
    keys: Vec<(Option<u8>, bool)>,
    sort: bool,
    dropna: bool,
    drop: bool,
}

fuzz_target!(|input: Input| {
    if input.keys.len() > 10_000 {
        return;
    }
    let a: Vec<Value> = input.keys.iter().map(|k| Value::from(k.0.map(i64::from))).collect();
    let b: Vec<Value> = input.keys.iter().map(|k| Value::Bool(k.1)).collect();
    let Ok(table) = Table::from_columns(vec![("a", Column::new(a)), ("b", Column::new(b))]) else {
        return;
    };
    let options = GroupOptions {
        sort: input.sort,
        dropna: input.dropna,
        drop: input.drop,
    };
    let index = GroupIndex::build(&table, &["a", "b"], &options).expect("columns exist");

    let mut seen = vec![false; table.nrows()];
    for rows in index.rows() {
        for &row in rows {
            assert!(!seen[row], "row {row} in two groups");
            seen[row] = true;
        }
    }
    if !input.dropna {
        assert!(seen.iter().all(|&s| s), "row missing from every group");
    }
});
