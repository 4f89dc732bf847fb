// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row transforms: multi-key sorting and series stacking.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DataError, Record};

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

/// One sort key; `"field"` sorts ascending and `"-field"` descending.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortKey {
    /// Field to compare.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortKey {
    /// Ascending key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl FromStr for SortKey {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (order, field) = match s.strip_prefix('-') {
            Some(rest) => (SortOrder::Desc, rest),
            None => (SortOrder::Asc, s.strip_prefix('+').unwrap_or(s)),
        };
        if field.is_empty() {
            return Err(DataError::UnsupportedValue("empty sort key".to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            order,
        })
    }
}

impl TryFrom<String> for SortKey {
    type Error = DataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SortKey> for String {
    fn from(key: SortKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.order == SortOrder::Desc {
            f.write_str("-")?;
        }
        f.write_str(&self.field)
    }
}

#[derive(Debug, PartialEq)]
enum SortValue {
    Number(f64),
    Text(String),
    Missing,
}

impl SortValue {
    fn of(record: &Record, field: &str) -> Self {
        if let Some(n) = record.number(field) {
            return Self::Number(n);
        }
        match record.text(field) {
            Some(t) if !t.is_empty() => Self::Text(t),
            _ => Self::Missing,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Text(_) => 1,
            Self::Missing => 2,
        }
    }

    /// Compares under `order`; missing values always sort last.
    fn compare(&self, other: &Self, order: SortOrder) -> Ordering {
        let ord = match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Missing, Self::Missing) => Ordering::Equal,
            (Self::Missing, _) => return Ordering::Greater,
            (_, Self::Missing) => return Ordering::Less,
            _ => self.rank().cmp(&other.rank()),
        };
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Stable multi-key sort; later keys break ties of earlier ones.
///
/// Numbers (including numeric strings) compare numerically, other values as text. Sorting is
/// idempotent.
pub fn sort_records(rows: &mut [Record], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        keys.iter()
            .map(|k| SortValue::of(a, &k.field).compare(&SortValue::of(b, &k.field), k.order))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// How stacked values are offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOffset {
    /// Positive values stack up from zero, negative values down from zero.
    #[default]
    Zero,
    /// Like `Zero`, then scaled so each row's absolute total is `1`.
    Normalize,
}

/// One series' span within a stacked row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackSegment {
    /// Series index (position in the field list).
    pub series: usize,
    /// Raw value (`0` if missing).
    pub value: f64,
    /// Stack start.
    pub y0: f64,
    /// Stack end.
    pub y1: f64,
    /// Whether the value was missing or non-numeric.
    pub missing: bool,
}

/// Stacks `fields` of every row, in field order.
pub fn stack_rows(
    rows: &[Record],
    fields: &[String],
    offset: StackOffset,
) -> Vec<Vec<StackSegment>> {
    rows.iter()
        .map(|row| {
            let mut up = 0.0;
            let mut down = 0.0;
            let mut segments: Vec<StackSegment> = fields
                .iter()
                .enumerate()
                .map(|(series, field)| {
                    let raw = row.number(field);
                    let value = raw.unwrap_or(0.0);
                    let (y0, y1) = if value >= 0.0 {
                        let y0 = up;
                        up += value;
                        (y0, up)
                    } else {
                        let y0 = down;
                        down += value;
                        (y0, down)
                    };
                    StackSegment {
                        series,
                        value,
                        y0,
                        y1,
                        missing: raw.is_none(),
                    }
                })
                .collect();
            if offset == StackOffset::Normalize {
                let total = up - down;
                if total > 0.0 {
                    for s in &mut segments {
                        s.y0 /= total;
                        s.y1 /= total;
                    }
                }
            }
            segments
        })
        .collect()
}

/// Positive stack totals per row.
pub fn stack_totals(stacks: &[Vec<StackSegment>]) -> Vec<f64> {
    stacks
        .iter()
        .map(|row| row.iter().map(|s| s.y0.max(s.y1)).fold(0.0, f64::max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(v: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(v).unwrap()
    }

    fn labels(rows: &[Record]) -> Vec<String> {
        rows.iter().filter_map(|r| r.text("label")).collect()
    }

    #[test]
    fn parses_sort_keys() {
        assert_eq!("-value".parse::<SortKey>().unwrap(), SortKey::desc("value"));
        assert_eq!("value".parse::<SortKey>().unwrap(), SortKey::asc("value"));
        assert!("-".parse::<SortKey>().is_err());
        let keys: Vec<SortKey> = serde_json::from_value(json!(["a", "-b"])).unwrap();
        assert_eq!(keys, [SortKey::asc("a"), SortKey::desc("b")]);
        assert_eq!(serde_json::to_value(&keys).unwrap(), json!(["a", "-b"]));
    }

    #[test]
    fn multi_key_sort_is_stable_and_idempotent() {
        let mut r = rows(json!([
            {"label": "a", "g": 2, "v": 1},
            {"label": "b", "g": 1, "v": 5},
            {"label": "c", "g": 2, "v": 3},
            {"label": "d", "g": 1, "v": 5},
            {"label": "e", "v": 9},
        ]));
        let keys = [SortKey::asc("g"), SortKey::desc("v")];
        sort_records(&mut r, &keys);
        assert_eq!(labels(&r), ["b", "d", "c", "a", "e"]);
        let once = r.clone();
        sort_records(&mut r, &keys);
        assert_eq!(r, once, "sorting twice should equal sorting once");
    }

    #[test]
    fn numeric_strings_sort_numerically() {
        let mut r = rows(json!([
            {"label": "x", "v": "10"},
            {"label": "y", "v": "9"},
        ]));
        sort_records(&mut r, &[SortKey::asc("v")]);
        assert_eq!(labels(&r), ["y", "x"]);
    }

    #[test]
    fn stacks_diverge_around_zero() {
        let r = rows(json!([{"a": 90, "b": 10, "c": -5}, {"a": 80, "b": "x"}]));
        let fields = ["a".to_string(), "b".to_string(), "c".to_string()];
        let s = stack_rows(&r, &fields, StackOffset::Zero);
        assert_eq!((s[0][1].y0, s[0][1].y1), (90.0, 100.0));
        assert_eq!((s[0][2].y0, s[0][2].y1), (0.0, -5.0));
        assert!(s[1][1].missing);
        assert_eq!(stack_totals(&s), [100.0, 80.0]);

        let n = stack_rows(&r, &fields[..2], StackOffset::Normalize);
        assert_eq!(n[0][1].y1, 1.0);
        assert_eq!(n[1][0].y1, 1.0);
    }
}
