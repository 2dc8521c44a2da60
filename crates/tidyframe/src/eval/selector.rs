//! Column-name selectors.
//!
//! Selectors resolve against column names only. [`Selector::AllOf`] and bare
//! names are strict and fail on unknown columns; the pattern matchers are
//! permissive and simply match nothing.

use std::fmt;
use std::ops::RangeInclusive;

use regex::RegexBuilder;

use crate::error::{Result, TidyError};
use crate::table::{Column, Table};

/// Predicate over a column, used by [`Selector::Where`].
pub type ColumnPredicate = fn(&Column) -> bool;

/// A column-name selector.
#[derive(Clone)]
pub enum Selector {
    /// Exactly these columns; unknown names are an error.
    AllOf(Vec<String>),
    /// Whichever of these columns exist.
    AnyOf(Vec<String>),
    StartsWith { prefixes: Vec<String>, ignore_case: bool },
    EndsWith { suffixes: Vec<String>, ignore_case: bool },
    Contains { needles: Vec<String>, ignore_case: bool },
    Matches { pattern: String, ignore_case: bool },
    Everything,
    /// The column `offset` positions from the end (0 is the last one).
    LastCol(usize),
    /// `prefix` followed by each number of `range`, zero-padded to `width`.
    NumRange {
        prefix: String,
        range: RangeInclusive<i64>,
        width: Option<usize>,
    },
    Where(ColumnPredicate),
    /// Every column not matched by the inner selector.
    Exclude(Box<Selector>),
    /// Explicit left/right name pairs, used to rename join keys.
    Pairs(Vec<(String, String)>),
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::AllOf(names) => f.debug_tuple("AllOf").field(names).finish(),
            Selector::AnyOf(names) => f.debug_tuple("AnyOf").field(names).finish(),
            Selector::StartsWith { prefixes, .. } => f.debug_tuple("StartsWith").field(prefixes).finish(),
            Selector::EndsWith { suffixes, .. } => f.debug_tuple("EndsWith").field(suffixes).finish(),
            Selector::Contains { needles, .. } => f.debug_tuple("Contains").field(needles).finish(),
            Selector::Matches { pattern, .. } => f.debug_tuple("Matches").field(pattern).finish(),
            Selector::Everything => write!(f, "Everything"),
            Selector::LastCol(offset) => f.debug_tuple("LastCol").field(offset).finish(),
            Selector::NumRange { prefix, range, .. } => {
                f.debug_tuple("NumRange").field(prefix).field(range).finish()
            }
            Selector::Where(_) => write!(f, "Where(<predicate>)"),
            Selector::Exclude(inner) => f.debug_tuple("Exclude").field(inner).finish(),
            Selector::Pairs(pairs) => f.debug_tuple("Pairs").field(pairs).finish(),
        }
    }
}

impl Selector {
    /// Names of the matching columns, in table order for pattern selectors
    /// and in the given order for explicit name lists.
    pub fn resolve(&self, table: &Table) -> Result<Vec<String>> {
        let names = table.column_names();
        let picked: Vec<String> = match self {
            Selector::AllOf(wanted) => {
                let missing: Vec<String> = wanted
                    .iter()
                    .filter(|w| !table.has_column(w))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(TidyError::UnknownColumn(missing));
                }
                wanted.clone()
            }
            Selector::AnyOf(wanted) => wanted
                .iter()
                .filter(|w| table.has_column(w))
                .cloned()
                .collect(),
            Selector::StartsWith { prefixes, ignore_case } => {
                filter_names(&names, prefixes, *ignore_case, |n, p| n.starts_with(p))
            }
            Selector::EndsWith { suffixes, ignore_case } => {
                filter_names(&names, suffixes, *ignore_case, |n, s| n.ends_with(s))
            }
            Selector::Contains { needles, ignore_case } => {
                filter_names(&names, needles, *ignore_case, |n, s| n.contains(s))
            }
            Selector::Matches { pattern, ignore_case } => {
                let re = RegexBuilder::new(pattern).case_insensitive(*ignore_case).build()?;
                names
                    .iter()
                    .filter(|n| re.is_match(n))
                    .map(|n| n.to_string())
                    .collect()
            }
            Selector::Everything => names.iter().map(|n| n.to_string()).collect(),
            Selector::LastCol(offset) => {
                let pos = names.len().checked_sub(offset + 1).ok_or_else(|| {
                    TidyError::UnknownColumn(vec![format!(
                        "last_col({}) of {} columns",
                        offset,
                        names.len()
                    )])
                })?;
                vec![names[pos].to_string()]
            }
            Selector::NumRange { prefix, range, width } => {
                // Scan existing columns; the range itself may be arbitrarily wide.
                let mut numbered: Vec<(i64, String)> = names
                    .iter()
                    .filter_map(|n| {
                        let suffix = n.strip_prefix(prefix.as_str())?;
                        let i: i64 = suffix.parse().ok()?;
                        let canonical = match width {
                            Some(w) => format!("{:0w$}", i, w = *w),
                            None => i.to_string(),
                        };
                        (range.contains(&i) && canonical == suffix).then(|| (i, n.to_string()))
                    })
                    .collect();
                numbered.sort_by_key(|(i, _)| *i);
                numbered.into_iter().map(|(_, n)| n).collect()
            }
            Selector::Where(predicate) => table
                .columns()
                .filter(|(_, c)| predicate(c))
                .map(|(n, _)| n.to_string())
                .collect(),
            Selector::Exclude(inner) => {
                let excluded = inner.resolve(table)?;
                names
                    .iter()
                    .filter(|n| !excluded.iter().any(|e| e == *n))
                    .map(|n| n.to_string())
                    .collect()
            }
            Selector::Pairs(pairs) => {
                let left: Vec<String> = pairs.iter().map(|(l, _)| l.clone()).collect();
                return Selector::AllOf(left).resolve(table);
            }
        };
        Ok(picked)
    }
}

fn filter_names(
    names: &[&str],
    patterns: &[String],
    ignore_case: bool,
    test: impl Fn(&str, &str) -> bool,
) -> Vec<String> {
    names
        .iter()
        .filter(|name| {
            patterns.iter().any(|p| {
                if ignore_case {
                    test(&name.to_lowercase(), &p.to_lowercase())
                } else {
                    test(name, p)
                }
            })
        })
        .map(|n| n.to_string())
        .collect()
}

fn strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|s| s.as_ref().to_string()).collect()
}

pub fn all_of<S: AsRef<str>>(names: &[S]) -> Selector {
    Selector::AllOf(strings(names))
}

pub fn any_of<S: AsRef<str>>(names: &[S]) -> Selector {
    Selector::AnyOf(strings(names))
}

pub fn starts_with<S: AsRef<str>>(prefixes: &[S]) -> Selector {
    Selector::StartsWith {
        prefixes: strings(prefixes),
        ignore_case: true,
    }
}

pub fn ends_with<S: AsRef<str>>(suffixes: &[S]) -> Selector {
    Selector::EndsWith {
        suffixes: strings(suffixes),
        ignore_case: true,
    }
}

pub fn contains<S: AsRef<str>>(needles: &[S]) -> Selector {
    Selector::Contains {
        needles: strings(needles),
        ignore_case: true,
    }
}

pub fn matches(pattern: &str) -> Selector {
    Selector::Matches {
        pattern: pattern.to_string(),
        ignore_case: true,
    }
}

pub fn everything() -> Selector {
    Selector::Everything
}

pub fn last_col(offset: usize) -> Selector {
    Selector::LastCol(offset)
}

pub fn num_range(prefix: &str, range: RangeInclusive<i64>, width: Option<usize>) -> Selector {
    Selector::NumRange {
        prefix: prefix.to_string(),
        range,
        width,
    }
}

pub fn where_(predicate: ColumnPredicate) -> Selector {
    Selector::Where(predicate)
}

pub fn exclude(selector: Selector) -> Selector {
    Selector::Exclude(Box::new(selector))
}

pub fn pairs<S: AsRef<str>>(pairs: &[(S, S)]) -> Selector {
    Selector::Pairs(
        pairs
            .iter()
            .map(|(l, r)| (l.as_ref().to_string(), r.as_ref().to_string()))
            .collect(),
    )
}

/// Column predicate matching numeric (and boolean) columns.
pub fn is_numeric(column: &Column) -> bool {
    column.dtype().is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Union of several selectors, in order of first appearance.
    fn select_names(selectors: &[Selector], table: &Table) -> Result<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        for selector in selectors {
            for name in selector.resolve(table)? {
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        Ok(out)
    }

    fn sample() -> Table {
        Table::from_columns(vec![
            ("id", Column::from(vec![1, 2])),
            ("Name", Column::from(vec!["a", "b"])),
            ("x1", Column::from(vec![1.0, 2.0])),
            ("x02", Column::from(vec![3, 4])),
        ])
        .unwrap()
    }

    #[test]
    fn test_strict_and_permissive() {
        let t = sample();
        assert!(matches!(
            all_of(&["id", "zz"]).resolve(&t),
            Err(TidyError::UnknownColumn(v)) if v == vec!["zz"]
        ));
        assert_eq!(any_of(&["zz", "id"]).resolve(&t).unwrap(), vec!["id"]);
        assert!(starts_with(&["q"]).resolve(&t).unwrap().is_empty());
    }

    #[test]
    fn test_patterns_ignore_case_by_default() {
        let t = sample();
        assert_eq!(starts_with(&["n"]).resolve(&t).unwrap(), vec!["Name"]);
        let strict = Selector::StartsWith {
            prefixes: vec!["n".into()],
            ignore_case: false,
        };
        assert!(strict.resolve(&t).unwrap().is_empty());
        assert_eq!(matches("^X\\d$").resolve(&t).unwrap(), vec!["x1"]);
    }

    #[test]
    fn test_last_col_and_num_range() {
        let t = sample();
        assert_eq!(last_col(0).resolve(&t).unwrap(), vec!["x02"]);
        assert_eq!(last_col(3).resolve(&t).unwrap(), vec!["id"]);
        assert!(matches!(last_col(4).resolve(&t), Err(TidyError::UnknownColumn(_))));
        assert_eq!(num_range("x", 1..=3, Some(2)).resolve(&t).unwrap(), vec!["x02"]);
        assert_eq!(num_range("x", 1..=3, None).resolve(&t).unwrap(), vec!["x1"]);
    }

    #[test]
    fn test_num_range_wide_range_follows_number_order() {
        let t = Table::from_columns(vec![
            ("v10", Column::from(vec![1])),
            ("v2", Column::from(vec![2])),
            ("v03", Column::from(vec![3])),
        ])
        .unwrap();
        assert_eq!(num_range("v", i64::MIN..=i64::MAX, None).resolve(&t).unwrap(), vec!["v2", "v10"]);
        assert_eq!(num_range("v", 0..=5, Some(2)).resolve(&t).unwrap(), vec!["v03"]);
    }

    #[test]
    fn test_where_and_exclude() {
        let t = sample();
        assert_eq!(where_(is_numeric).resolve(&t).unwrap(), vec!["id", "x1", "x02"]);
        assert_eq!(exclude(where_(is_numeric)).resolve(&t).unwrap(), vec!["Name"]);
    }

    #[test]
    fn test_union_keeps_first_appearance() {
        let t = sample();
        let names = select_names(&[all_of(&["x1"]), everything()], &t).unwrap();
        assert_eq!(names, vec!["x1", "id", "Name", "x02"]);
    }
}
