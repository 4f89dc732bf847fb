// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tooltip content.

use kurbo::Point;
use vistage_data::Record;

use crate::options::ChartOptions;

/// Text content of a tooltip, positioned at an anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    /// Heading (usually the row label).
    pub title: String,
    /// `(name, value)` lines.
    pub lines: Vec<(String, String)>,
    /// Where the tooltip points to, in chart coordinates.
    pub anchor: Point,
}

/// Builds tooltip content for a hovered row.
pub trait TooltipRenderer {
    /// Renders the tooltip for `row`, anchored at `anchor`.
    fn render(&self, row: &Record, options: &ChartOptions, anchor: Point) -> Tooltip;
}

/// The label plus each value field formatted with the configured formatter.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTooltip;

impl TooltipRenderer for DefaultTooltip {
    fn render(&self, row: &Record, options: &ChartOptions, anchor: Point) -> Tooltip {
        let lines = options
            .value_fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = row
                    .number(field)
                    .map(|v| options.value_format.format(v))
                    .unwrap_or_else(|| "n/a".to_string());
                (options.series_label(i).to_string(), value)
            })
            .collect();
        Tooltip {
            title: row.text(&options.label_field).unwrap_or_default(),
            lines,
            anchor,
        }
    }
}

impl<F> TooltipRenderer for F
where
    F: Fn(&Record, &ChartOptions, Point) -> Tooltip,
{
    fn render(&self, row: &Record, options: &ChartOptions, anchor: Point) -> Tooltip {
        self(row, options, anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueFormatter;
    use serde_json::json;

    #[test]
    fn default_tooltip_formats_values_and_marks_missing() {
        let row = Record::from_value(json!({"label": "2006", "a": 1234.4, "b": ""})).unwrap();
        let options = ChartOptions::default()
            .with_value_fields(["a", "b"])
            .with_value_format(ValueFormatter::parse(",.0f").unwrap());
        let t = DefaultTooltip.render(&row, &options, Point::ZERO);
        assert_eq!(t.title, "2006");
        assert_eq!(
            t.lines,
            [
                ("a".to_string(), "1,234".to_string()),
                ("b".to_string(), "n/a".to_string())
            ]
        );
    }

    #[test]
    fn closures_are_renderers() {
        let custom = |row: &Record, _: &ChartOptions, anchor: Point| Tooltip {
            title: format!("row {}", row.text("label").unwrap_or_default()),
            lines: Vec::new(),
            anchor,
        };
        let row = Record::new().with("label", "x");
        let t = custom.render(&row, &ChartOptions::default(), Point::new(1.0, 2.0));
        assert_eq!(t.title, "row x");
    }
}
