// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless chart components for `vistage_core`.
//!
//! This crate turns rows of data into stable-identity marks:
//! - **Scales** map data values into screen coordinates; **formatting** turns values into
//!   label text.
//! - **Guides** (axes, legends) are generated as `vistage_core::Mark`s.
//! - **Charts** ([`ColumnChart`], [`BarChart`], [`LineChart`], [`StackedColumnChart`],
//!   [`StackedBarChart`]) are pure layouts from `(rows, size, options, highlights)` to a
//!   [`ChartFrame`], which keeps the geometry needed for hit testing.
//! - [`ChartComponent`] adds the state around a layout: loaded data, container size, the
//!   debounced hover highlight and the retained scene that diffs frame to frame.
//!
//! Text shaping is out of scope; text marks store unshaped strings and layout uses a
//! [`TextMeasurer`] to reserve room for them.
//!
//! ```
//! use vistage_charts::{Chart, ChartInput, ChartOptions, ColumnChart, Size};
//! use vistage_data::Record;
//!
//! let rows: Vec<Record> = serde_json::from_str(
//!     r#"[{"label": "a", "value": 1}, {"label": "b", "value": 2}]"#,
//! ).unwrap();
//! let options = ChartOptions::default();
//! let frame = ColumnChart.layout(&ChartInput::new(&rows, Size::new(400.0, 200.0), &options));
//! assert_eq!(frame.bars.len(), 2);
//! ```

mod axis;
mod bar_chart;
mod chart;
#[cfg(test)]
mod chart_tests;
pub mod color;
mod column_chart;
mod component;
mod event;
mod format;
mod highlight;
mod layout;
mod legend;
mod line_chart;
mod measure;
mod options;
mod resize;
mod rule_mark;
mod scale;
mod stacked_bar_chart;
mod stacked_column_chart;
mod text_mark;
mod tooltip;
mod z_order;

pub use axis::{AxisDomain, AxisOrient, AxisSpec, AxisStyle, abbreviate_year};
pub use bar_chart::BarChart;
pub use chart::{
    BarLayout, Chart, ChartFrame, ChartInput, ChartKind, Orientation, PointLayout, SeriesInfo,
};
pub use column_chart::ColumnChart;
pub use component::{AfterLoadedHook, ChartComponent, ChartRenderer};
pub use event::ChartEvent;
pub use format::{FormatError, Locale, NumberFormat, ValueFormatter};
pub use highlight::{HighlightConfig, HighlightMachine, HighlightPhase};
pub use layout::{ChartLayout, ChartLayoutSpec, Padding, Size};
pub use legend::{LegendEntry, LegendItem, LegendSwatchesSpec, legend_entry_at};
pub use line_chart::LineChart;
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use options::ChartOptions;
pub use resize::{NARROW_WIDTH_BREAKPOINT, ResizeState, ResizeTracker};
pub use rule_mark::RuleMarkSpec;
pub use scale::{
    ScaleBand, ScaleLinear, ScalePoint, ScaleSequential, ScaleSqrt, ScaleThreshold,
    equal_interval_thresholds, lerp_color, nice_step, nice_ticks,
};
pub use stacked_bar_chart::StackedBarChart;
pub use stacked_column_chart::StackedColumnChart;
pub use text_mark::TextMarkSpec;
pub use tooltip::{DefaultTooltip, Tooltip, TooltipRenderer};
pub use z_order::*;
