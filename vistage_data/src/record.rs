// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Records and datasets.

use core::slice;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DataError, lookup_path, value_key};

/// One data row: a JSON object.
///
/// Identity is positional; fields are accessed by name. Numeric access accepts JSON numbers
/// and numeric strings, so rows parsed from CSV behave like rows from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON object; returns `None` for non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Adds or replaces a field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Adds or replaces a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Returns a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a field by dot-notation path.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.0.get(head)?;
        match rest {
            Some(rest) => lookup_path(value, rest),
            None => Some(value),
        }
    }

    /// Returns a field as a number.
    ///
    /// Empty strings, `null`, and non-numeric strings are missing values.
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }

    /// Returns a field as display text (numbers normalized via [`value_key`]).
    pub fn text(&self, field: &str) -> Option<String> {
        value_key(self.get(field)?)
    }

    /// Whether the row carries `highlight: true` (or the string `"true"` from CSV).
    pub fn is_highlighted(&self) -> bool {
        match self.get("highlight") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Borrows the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Loaded data: an array of rows or a single record object.
#[derive(Clone, Debug, PartialEq)]
pub enum Dataset {
    /// An array of row objects.
    Rows(Vec<Record>),
    /// A single record object.
    Object(Record),
}

impl Default for Dataset {
    fn default() -> Self {
        Self::Rows(Vec::new())
    }
}

impl Dataset {
    /// Interprets a JSON value: arrays of objects become rows, objects a single record.
    pub fn from_value(value: Value) -> Result<Self, DataError> {
        match value {
            Value::Array(items) => {
                let rows = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        Record::from_value(item).ok_or_else(|| {
                            DataError::UnsupportedValue(format!("row {i} is not an object"))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Rows(rows))
            }
            Value::Object(map) => Ok(Self::Object(Record(map))),
            other => Err(DataError::UnsupportedValue(kind_name(&other).to_string())),
        }
    }

    /// Rows as a slice (a single record is a one-element slice).
    pub fn rows(&self) -> &[Record] {
        match self {
            Self::Rows(rows) => rows,
            Self::Object(record) => slice::from_ref(record),
        }
    }

    /// Mutable rows, for after-loaded hooks.
    pub fn rows_mut(&mut self) -> &mut [Record] {
        match self {
            Self::Rows(rows) => rows,
            Self::Object(record) => slice::from_mut(record),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows().len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_accept_numeric_strings() {
        let r = Record::from_value(json!({"a": 3, "b": "4.5", "c": "", "d": "n/a"})).unwrap();
        assert_eq!(r.number("a"), Some(3.0));
        assert_eq!(r.number("b"), Some(4.5));
        assert_eq!(r.number("c"), None);
        assert_eq!(r.number("d"), None);
        assert_eq!(r.number("missing"), None);
    }

    #[test]
    fn highlight_flag_from_json_or_csv() {
        let a = Record::new().with("highlight", true);
        let b = Record::new().with("highlight", "TRUE");
        let c = Record::new().with("highlight", 1);
        assert!(a.is_highlighted());
        assert!(b.is_highlighted());
        assert!(!c.is_highlighted());
    }

    #[test]
    fn object_dataset_is_one_row() {
        let d = Dataset::from_value(json!({"x": 1})).unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d.rows()[0].number("x"), Some(1.0));
        assert!(Dataset::from_value(json!([1, 2])).is_err());
        assert!(Dataset::from_value(json!("nope")).is_err());
    }

    #[test]
    fn nested_paths() {
        let r = Record::from_value(json!({"properties": {"iso": "FR"}})).unwrap();
        assert_eq!(r.get_path("properties.iso"), Some(&json!("FR")));
        assert_eq!(r.get_path("properties"), Some(&json!({"iso": "FR"})));
    }
}
