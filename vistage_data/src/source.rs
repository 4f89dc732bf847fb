// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data source descriptors.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DataError, Record};

/// Format of remote data (`dataUrlType`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// A JSON array of objects, or a single object.
    #[default]
    Json,
    /// Comma-separated values with a header row.
    Csv,
    /// Tab-separated values with a header row.
    Tsv,
}

impl DataFormat {
    /// The field delimiter for delimited formats.
    pub fn delimiter(self) -> Option<char> {
        match self {
            Self::Json => None,
            Self::Csv => Some(','),
            Self::Tsv => Some('\t'),
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

impl FromStr for DataFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            other => Err(DataError::UnsupportedValue(format!(
                "unknown data format `{other}`"
            ))),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where chart data comes from (the `data` prop).
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    /// Inline rows.
    Rows(Vec<Record>),
    /// A single inline record object.
    Object(Record),
    /// A URL or path to fetch.
    Url(String),
    /// Any other value; loading it fails with [`DataError::UnsupportedValue`].
    Inline(Value),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Rows(Vec::new())
    }
}

impl DataSource {
    /// Classifies a JSON value.
    ///
    /// Arrays of objects become [`DataSource::Rows`], objects [`DataSource::Object`], and
    /// strings that look like URLs or data file paths [`DataSource::Url`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => {
                if items.iter().all(Value::is_object) {
                    Self::Rows(items.into_iter().filter_map(Record::from_value).collect())
                } else {
                    Self::Inline(Value::Array(items))
                }
            }
            Value::Object(map) => Self::Object(Record::from(map)),
            Value::String(s) if looks_like_url(&s) => Self::Url(s),
            other => Self::Inline(other),
        }
    }

    /// Convenience for a URL source.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }
}

impl From<Vec<Record>> for DataSource {
    fn from(rows: Vec<Record>) -> Self {
        Self::Rows(rows)
    }
}

impl From<Value> for DataSource {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

fn looks_like_url(s: &str) -> bool {
    let s = s.trim();
    if s.is_empty() || s.contains(char::is_whitespace) {
        return false;
    }
    let lower = s.to_ascii_lowercase();
    ["http://", "https://", "/", "./", "../"]
        .iter()
        .any(|p| lower.starts_with(p))
        || [".json", ".csv", ".tsv", ".topojson"]
            .iter()
            .any(|ext| lower.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_values() {
        assert!(matches!(
            DataSource::from_value(json!([{"a": 1}])),
            DataSource::Rows(ref r) if r.len() == 1
        ));
        assert!(matches!(
            DataSource::from_value(json!({"a": 1})),
            DataSource::Object(_)
        ));
        assert_eq!(
            DataSource::from_value(json!("https://example.com/data.csv")),
            DataSource::url("https://example.com/data.csv")
        );
        assert_eq!(
            DataSource::from_value(json!("data/sales.tsv")),
            DataSource::url("data/sales.tsv")
        );
        assert!(matches!(
            DataSource::from_value(json!("just words")),
            DataSource::Inline(_)
        ));
        assert!(matches!(
            DataSource::from_value(json!(42)),
            DataSource::Inline(_)
        ));
    }

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!("CSV".parse::<DataFormat>().unwrap(), DataFormat::Csv);
        assert_eq!("tsv".parse::<DataFormat>().unwrap(), DataFormat::Tsv);
        assert!("xml".parse::<DataFormat>().is_err());
        let f: DataFormat = serde_json::from_value(json!("json")).unwrap();
        assert_eq!(f, DataFormat::Json);
    }
}
