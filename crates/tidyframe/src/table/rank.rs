//! Sequence ranking primitive.

use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::error::{Result, TidyError};

/// How ties are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMethod {
    /// Tied values share the lowest rank of the tie (competition ranking).
    Min,
    /// Tied values share the highest rank of the tie.
    Max,
    /// Ties are broken by position.
    First,
    /// Tied values share the mean rank of the tie.
    Average,
    /// Like `Min`, but ranks have no gaps.
    Dense,
}

impl std::str::FromStr for RankMethod {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "min" => Ok(RankMethod::Min),
            "max" => Ok(RankMethod::Max),
            "first" => Ok(RankMethod::First),
            "average" => Ok(RankMethod::Average),
            "dense" => Ok(RankMethod::Dense),
            other => Err(TidyError::InvalidArgument(format!(
                "unknown rank method '{}'",
                other
            ))),
        }
    }
}

/// Where missing values go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NaOption {
    /// Missing values stay unranked.
    #[default]
    Keep,
    /// Missing values rank before everything else.
    Top,
    /// Missing values rank after everything else.
    Bottom,
}

impl NaOption {
    /// Translate R's `na.last` argument: `true` → bottom, `false` → top,
    /// `"keep"` (here `None`) → keep.
    pub fn from_na_last(na_last: Option<bool>) -> Self {
        match na_last {
            None => NaOption::Keep,
            Some(true) => NaOption::Bottom,
            Some(false) => NaOption::Top,
        }
    }
}

/// Rank a sequence of numeric values.
///
/// Output has one entry per input, in input order; `None` marks a value left
/// unranked by [`NaOption::Keep`]. Non-numeric values fail with
/// `TypeMismatch`.
pub fn rank(values: &[Value], method: RankMethod, na: NaOption) -> Result<Vec<Option<f64>>> {
    let keys = values
        .iter()
        .map(|v| v.numeric("rank"))
        .collect::<Result<Vec<_>>>()?;
    Ok(rank_keys(&keys, method, na))
}

/// Rank already-extracted numeric keys.
pub(crate) fn rank_keys(keys: &[Option<f64>], method: RankMethod, na: NaOption) -> Vec<Option<f64>> {
    let mut present: Vec<usize> = (0..keys.len()).filter(|&i| keys[i].is_some()).collect();
    let missing: Vec<usize> = (0..keys.len()).filter(|&i| keys[i].is_none()).collect();
    present.sort_by(|&a, &b| {
        let (ka, kb) = (keys[a].unwrap_or_default(), keys[b].unwrap_or_default());
        ka.total_cmp(&kb).then(a.cmp(&b))
    });

    let mut ranks = vec![None; keys.len()];
    let offset = if na == NaOption::Top { missing.len() } else { 0 };
    let dense_offset = if na == NaOption::Top && !missing.is_empty() { 1 } else { 0 };

    let mut start = 0;
    let mut dense = 0;
    while start < present.len() {
        let value = keys[present[start]];
        let mut end = start;
        while end + 1 < present.len() && keys[present[end + 1]] == value {
            end += 1;
        }
        dense += 1;
        for (k, &pos) in present[start..=end].iter().enumerate() {
            ranks[pos] = Some(tie_rank(method, offset + start, offset + end, k, dense_offset + dense));
        }
        start = end + 1;
    }

    let na_start = match na {
        NaOption::Keep => return ranks,
        NaOption::Top => 0,
        NaOption::Bottom => present.len(),
    };
    let na_dense = match na {
        NaOption::Top => 1,
        _ => dense + 1,
    };
    if !missing.is_empty() {
        let na_end = na_start + missing.len() - 1;
        for (k, &pos) in missing.iter().enumerate() {
            ranks[pos] = Some(tie_rank(method, na_start, na_end, k, na_dense));
        }
    }
    ranks
}

/// Rank of the `k`-th member of a tie occupying sorted slots `start..=end`.
fn tie_rank(method: RankMethod, start: usize, end: usize, k: usize, dense: usize) -> f64 {
    match method {
        RankMethod::Min => (start + 1) as f64,
        RankMethod::Max => (end + 1) as f64,
        RankMethod::First => (start + k + 1) as f64,
        RankMethod::Average => (start + end + 2) as f64 / 2.0,
        RankMethod::Dense => dense as f64,
    }
}
