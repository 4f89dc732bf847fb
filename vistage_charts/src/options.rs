// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart options (component props).
//!
//! Options are plain data with `with_*` builders. They also deserialize from the camelCase
//! JSON prop objects hosts already have:
//!
//! ```
//! use vistage_charts::ChartOptions;
//!
//! let options = ChartOptions::from_json(r##"{
//!     "labelField": "date",
//!     "valueFields": ["foo", "bar"],
//!     "sortBy": "-foo",
//!     "highlightColor": "#ff0000"
//! }"##).unwrap();
//! assert_eq!(options.value_fields, ["foo", "bar"]);
//! assert_eq!(options.min_bar_size, 0.1);
//! ```

use peniko::Color;
use serde::{Deserialize, Deserializer};
use vistage_data::{DataFormat, SortKey};

use crate::color::{self, de_color, de_colors};
use crate::format::ValueFormatter;
use crate::highlight::HighlightConfig;
use crate::layout::Padding;

/// Props shared by the chart kinds.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartOptions {
    /// Field holding the row label and highlight key.
    pub label_field: String,
    /// Numeric fields; more than one makes a grouped or stacked chart.
    pub value_fields: Vec<String>,
    /// Display names for `value_fields` (legend, tooltips); falls back to field names.
    pub series_labels: Vec<String>,
    /// Upper end of the value domain; defaults to the data maximum.
    pub max_value: Option<f64>,
    /// Suppresses value labels on bars and end labels on lines.
    pub no_direct_labeling: bool,
    /// Sort keys (`"field"` ascending, `"-field"` descending).
    #[serde(deserialize_with = "de_sort_keys")]
    pub sort_by: Vec<SortKey>,
    /// Keys highlighted when nothing is hovered.
    pub highlight: Vec<String>,
    /// Milliseconds before a hover highlight applies.
    pub highlight_delay: u64,
    /// Milliseconds before leaving restores the default highlight.
    pub restore_delay: u64,
    /// Padding inside the measured box.
    pub padding: Padding,
    /// Smallest drawn bar extent, so zero values stay visible.
    pub min_bar_size: f64,
    /// Inner band padding.
    pub band_padding: f64,
    /// Series palette; empty uses the default palette.
    #[serde(deserialize_with = "de_colors")]
    pub colors: Vec<Color>,
    /// Fill of highlighted bars and series.
    #[serde(deserialize_with = "de_color")]
    pub highlight_color: Color,
    /// Formats values in labels, ticks and tooltips.
    pub value_format: ValueFormatter,
    /// Approximate value axis tick count.
    pub tick_count: usize,
    /// Shows a legend for multi-series charts.
    pub legend: bool,
    /// Label font size.
    pub font_size: f64,
    /// Format of URL data sources.
    pub data_url_type: DataFormat,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            label_field: "label".to_string(),
            value_fields: vec!["value".to_string()],
            series_labels: Vec::new(),
            max_value: None,
            no_direct_labeling: false,
            sort_by: Vec::new(),
            highlight: Vec::new(),
            highlight_delay: 100,
            restore_delay: 200,
            padding: Padding::default(),
            min_bar_size: 0.1,
            band_padding: 0.2,
            colors: Vec::new(),
            highlight_color: color::DEFAULT_HIGHLIGHT,
            value_format: ValueFormatter::Default,
            tick_count: 5,
            legend: true,
            font_size: 12.0,
            data_url_type: DataFormat::Json,
        }
    }
}

impl ChartOptions {
    /// Parses camelCase JSON props.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the label field.
    pub fn with_label_field(mut self, field: impl Into<String>) -> Self {
        self.label_field = field.into();
        self
    }

    /// Sets the value fields.
    pub fn with_value_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Sets series display names.
    pub fn with_series_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.series_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Fixes the top of the value domain.
    pub fn with_max_value(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Disables direct labels.
    pub fn with_no_direct_labeling(mut self, no_direct_labeling: bool) -> Self {
        self.no_direct_labeling = no_direct_labeling;
        self
    }

    /// Sets the sort keys.
    pub fn with_sort_by(mut self, keys: impl IntoIterator<Item = SortKey>) -> Self {
        self.sort_by = keys.into_iter().collect();
        self
    }

    /// Sets the default highlight keys.
    pub fn with_highlight<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets both hover delays in milliseconds.
    pub fn with_delays(mut self, highlight_delay: u64, restore_delay: u64) -> Self {
        self.highlight_delay = highlight_delay;
        self.restore_delay = restore_delay;
        self
    }

    /// Sets the padding.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the minimum drawn bar extent.
    pub fn with_min_bar_size(mut self, min_bar_size: f64) -> Self {
        self.min_bar_size = min_bar_size.max(0.0);
        self
    }

    /// Sets the series palette.
    pub fn with_colors(mut self, colors: impl IntoIterator<Item = Color>) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    /// Sets the highlight fill.
    pub fn with_highlight_color(mut self, color: Color) -> Self {
        self.highlight_color = color;
        self
    }

    /// Sets the value formatter.
    pub fn with_value_format(mut self, format: ValueFormatter) -> Self {
        self.value_format = format;
        self
    }

    /// Shows or hides the legend.
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Sets the data URL format.
    pub fn with_data_url_type(mut self, format: DataFormat) -> Self {
        self.data_url_type = format;
        self
    }

    /// Display name of series `i`.
    pub fn series_label(&self, i: usize) -> &str {
        self.series_labels
            .get(i)
            .or_else(|| self.value_fields.get(i))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Fill of series `i`.
    pub fn series_color(&self, i: usize) -> Color {
        color::palette_color(&self.colors, i)
    }

    /// Hover delays as a highlight machine config.
    pub fn highlight_config(&self) -> HighlightConfig {
        HighlightConfig::new(self.highlight_delay, self.restore_delay)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(SortKey),
    Many(Vec<SortKey>),
}

fn de_sort_keys<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<SortKey>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(d)? {
        None => Vec::new(),
        Some(OneOrMany::One(key)) => vec![key],
        Some(OneOrMany::Many(keys)) => keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_props() {
        let o = ChartOptions::from_json("{}").unwrap();
        assert_eq!(o.label_field, "label");
        assert_eq!(o.value_fields, ["value"]);
        assert_eq!(o.highlight_config(), HighlightConfig::new(100, 200));
        assert_eq!(o.highlight_color, color::DEFAULT_HIGHLIGHT);
    }

    #[test]
    fn parses_props() {
        let o = ChartOptions::from_json(
            r##"{
                "valueFields": ["a", "b"],
                "seriesLabels": ["Alpha"],
                "sortBy": ["-a", "label"],
                "maxValue": 50,
                "colors": ["#000000", "red"],
                "valueFormat": ".1%",
                "dataUrlType": "csv",
                "minBarSize": 2
            }"##,
        )
        .unwrap();
        assert_eq!(o.sort_by, [SortKey::desc("a"), SortKey::asc("label")]);
        assert_eq!(o.max_value, Some(50.0));
        assert_eq!(o.colors.len(), 2);
        assert_eq!(o.value_format.format(0.25), "25.0%");
        assert_eq!(o.data_url_type, DataFormat::Csv);
        assert_eq!(o.min_bar_size, 2.0);
        assert_eq!(o.series_label(0), "Alpha");
        assert_eq!(o.series_label(1), "b");
    }

    #[test]
    fn rejects_bad_colors_and_formats() {
        assert!(ChartOptions::from_json(r#"{"highlightColor": "nope"}"#).is_err());
        assert!(ChartOptions::from_json(r#"{"valueFormat": ".q"}"#).is_err());
    }
}
