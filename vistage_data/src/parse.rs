// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON and delimited-text parsing.

use serde_json::Value;

use crate::{DataError, DataFormat, Dataset, Record};

/// Parses text in the given format.
pub fn parse_dataset(text: &str, format: DataFormat) -> Result<Dataset, DataError> {
    match format.delimiter() {
        None => parse_json(text),
        Some(delimiter) => Ok(Dataset::Rows(parse_delimited(text, delimiter)?)),
    }
}

/// Parses a JSON array of objects or a single object.
pub fn parse_json(text: &str) -> Result<Dataset, DataError> {
    if text.trim().is_empty() {
        return Err(DataError::EmptyInput);
    }
    let value: Value = serde_json::from_str(text)?;
    Dataset::from_value(value)
}

/// Parses delimited text with a header row into records of string values.
///
/// Quoted fields may contain delimiters, newlines, and `""` escapes; `\r\n` and `\n` both
/// end a row. Short rows omit the missing fields and extra fields are ignored. Blank lines
/// are skipped.
pub fn parse_delimited(text: &str, delimiter: char) -> Result<Vec<Record>, DataError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text, delimiter)?.into_iter();
    let header = loop {
        match rows.next() {
            Some((_, fields)) if is_blank(&fields) => continue,
            Some((_, fields)) => break fields,
            None => return Err(DataError::EmptyInput),
        }
    };

    let mut out = Vec::new();
    for (_line, fields) in rows {
        if is_blank(&fields) {
            continue;
        }
        let mut record = Record::new();
        for (name, value) in header.iter().zip(fields) {
            record.insert(name.clone(), Value::String(value));
        }
        out.push(record);
    }
    Ok(out)
}

fn is_blank(fields: &[String]) -> bool {
    fields.len() == 1 && fields[0].is_empty()
}

/// Splits text into `(starting line, fields)` rows.
fn split_rows(text: &str, delimiter: char) -> Result<Vec<(usize, Vec<String>)>, DataError> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut line = 1;
    let mut row_line = 1;
    let mut in_quotes = false;
    let mut quote_line = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                fields.push(core::mem::take(&mut field));
                rows.push((row_line, core::mem::take(&mut fields)));
                line += 1;
                row_line = line;
            }
            c if c == delimiter => fields.push(core::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err(DataError::Csv {
            line: quote_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push((row_line, fields));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_simple_csv() {
        let rows = parse_delimited("date,foo,bar\n2006,90,10\n2007,80,10\n", ',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("date"), Some(&json!("2006")));
        assert_eq!(rows[1].number("foo"), Some(80.0));
    }

    #[test]
    fn quoted_fields_and_crlf() {
        let text = "name,note\r\n\"Doe, John\",\"A \"\"quoted\"\" value\"\r\n\"multi\nline\",x\r\n";
        let rows = parse_delimited(text, ',').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&json!("Doe, John")));
        assert_eq!(rows[0].get("note"), Some(&json!("A \"quoted\" value")));
        assert_eq!(rows[1].get("name"), Some(&json!("multi\nline")));
    }

    #[test]
    fn tsv_short_rows_and_blank_lines() {
        let rows = parse_delimited("a\tb\n1\n\n3\t4\n", '\t').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("b"), None);
        assert_eq!(rows[1].number("b"), Some(4.0));
    }

    #[test]
    fn errors_are_reported() {
        assert!(matches!(
            parse_delimited("a,b\n\"open,1\n", ','),
            Err(DataError::Csv { line: 2, .. })
        ));
        assert!(matches!(parse_delimited("", ','), Err(DataError::EmptyInput)));
        assert!(matches!(parse_json("  "), Err(DataError::EmptyInput)));
        assert!(matches!(parse_json("[1,"), Err(DataError::Json(_))));
    }

    #[test]
    fn json_object_or_rows() {
        let d = parse_dataset(r#"[{"a":1},{"a":2}]"#, DataFormat::Json).unwrap();
        assert_eq!(d.len(), 2);
        let d = parse_dataset(r#"{"a":1}"#, DataFormat::Json).unwrap();
        assert!(matches!(d, Dataset::Object(_)));
    }
}
