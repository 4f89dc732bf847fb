// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart layout: pure `(rows, size, options, highlights) -> ChartFrame` functions.
//!
//! Every chart kind shares the same skeleton: sort the rows, derive the value domain,
//! measure guides (category axis, value axis, legend), arrange the plot, then emit marks for
//! the series. The resulting [`ChartFrame`] keeps enough geometry for hit testing, so
//! components can turn pointer positions back into rows and series.

use core::fmt;

use kurbo::{Point, Rect};
use peniko::Color;
use serde::Deserialize;
use vistage_core::{Mark, MarkState};
use vistage_data::{Record, sort_records};

use crate::axis::{AxisDomain, AxisOrient, AxisSpec, AxisStyle};
use crate::bar_chart::BarChart;
use crate::color;
use crate::column_chart::ColumnChart;
use crate::layout::{ChartLayout, ChartLayoutSpec, Size};
use crate::legend::{LegendEntry, LegendSwatchesSpec, legend_entry_at};
use crate::line_chart::LineChart;
use crate::measure::{HeuristicTextMeasurer, TextMeasurer};
use crate::options::ChartOptions;
use crate::resize::NARROW_WIDTH_BREAKPOINT;
use crate::scale::{ScaleBand, ScaleLinear, ScalePoint};
use crate::stacked_bar_chart::StackedBarChart;
use crate::stacked_column_chart::StackedColumnChart;

const CATEGORY_AXIS_ID: u64 = 10_000;
const VALUE_AXIS_ID: u64 = 20_000;
pub(crate) const LEGEND_ID: u64 = 40_000;

pub(crate) const NS_BARS: u64 = 1;
pub(crate) const NS_LABELS: u64 = 2;
pub(crate) const NS_LINES: u64 = 3;
pub(crate) const NS_POINTS: u64 = 4;

/// Mark-id namespace for one series of one generator.
pub(crate) fn namespace(kind: u64, series: usize) -> u64 {
    (kind << 16) | series as u64
}

/// Everything a chart layout depends on.
#[derive(Clone, Copy)]
pub struct ChartInput<'a> {
    /// Data rows in input order.
    pub rows: &'a [Record],
    /// Measured container size.
    pub size: Size,
    /// Props.
    pub options: &'a ChartOptions,
    /// Active highlight keys (row keys or series keys, depending on the chart).
    pub highlights: &'a [String],
    /// Narrow container: abbreviated year labels.
    pub narrow: bool,
    /// Text measurement for guides and labels.
    pub measurer: &'a dyn TextMeasurer,
}

impl fmt::Debug for ChartInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartInput")
            .field("rows", &self.rows.len())
            .field("size", &self.size)
            .field("options", &self.options)
            .field("highlights", &self.highlights)
            .field("narrow", &self.narrow)
            .finish_non_exhaustive()
    }
}

impl<'a> ChartInput<'a> {
    /// Creates an input with no highlights and the heuristic measurer.
    pub fn new(rows: &'a [Record], size: Size, options: &'a ChartOptions) -> Self {
        Self {
            rows,
            size,
            options,
            highlights: &[],
            narrow: size.width < NARROW_WIDTH_BREAKPOINT,
            measurer: &HeuristicTextMeasurer,
        }
    }

    /// Sets the active highlight keys.
    pub fn with_highlights(mut self, highlights: &'a [String]) -> Self {
        self.highlights = highlights;
        self
    }

    /// Overrides the narrow flag.
    pub fn with_narrow(mut self, narrow: bool) -> Self {
        self.narrow = narrow;
        self
    }

    /// Sets the text measurer.
    pub fn with_measurer(mut self, measurer: &'a dyn TextMeasurer) -> Self {
        self.measurer = measurer;
        self
    }
}

/// Direction of the value axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Values grow upward (columns, lines).
    Vertical,
    /// Values grow rightward (bars).
    Horizontal,
}

/// A drawn series.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesInfo {
    /// Highlight key (the value field).
    pub key: String,
    /// Display name.
    pub label: String,
    /// Resolved paint, after highlight and dimming.
    pub color: Color,
    /// Interaction state.
    pub state: MarkState,
}

/// Geometry of one bar or stack segment.
#[derive(Clone, Debug, PartialEq)]
pub struct BarLayout {
    /// Row index in display order.
    pub row: usize,
    /// Series index.
    pub series: usize,
    /// Row key.
    pub key: String,
    /// Raw value; `None` when missing or non-numeric.
    pub value: Option<f64>,
    /// Bar rectangle.
    pub rect: Rect,
    /// Interaction state; `hidden` for missing values.
    pub state: MarkState,
}

/// A line vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLayout {
    /// Row index in display order.
    pub row: usize,
    /// Series index.
    pub series: usize,
    /// Raw value.
    pub value: f64,
    /// Position in chart coordinates.
    pub pos: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum CategoryScale {
    Band(ScaleBand),
    Point(ScalePoint),
}

/// A laid-out chart: marks plus the geometry needed to answer pointer queries.
#[derive(Clone, Debug)]
pub struct ChartFrame {
    /// Arranged boxes.
    pub layout: ChartLayout,
    /// Value axis direction.
    pub orientation: Orientation,
    /// Rows in display (sorted) order.
    pub rows: Vec<Record>,
    /// Row keys in display order.
    pub keys: Vec<String>,
    /// Series, in value field order.
    pub series: Vec<SeriesInfo>,
    /// Bars and stack segments.
    pub bars: Vec<BarLayout>,
    /// Line vertices.
    pub points: Vec<PointLayout>,
    /// Legend hit areas.
    pub legend: Vec<LegendEntry>,
    /// Maps values to pixels along the value axis.
    pub value_scale: ScaleLinear,
    /// Whether hover highlights series (line, stacked) rather than rows.
    pub highlights_series: bool,
    /// The marks for this frame.
    pub marks: Vec<Mark>,
    pub(crate) category: CategoryScale,
}

impl ChartFrame {
    /// Row under `point`, by category slot within the plot.
    pub fn row_at(&self, point: Point) -> Option<usize> {
        let plot = self.layout.plot;
        if point.x < plot.x0 || point.x > plot.x1 || point.y < plot.y0 || point.y > plot.y1 {
            return None;
        }
        match (self.category, self.orientation) {
            (CategoryScale::Band(b), Orientation::Vertical) => b.index_at(point.x),
            (CategoryScale::Band(b), Orientation::Horizontal) => b.index_at(point.y),
            (CategoryScale::Point(p), _) => p.nearest(point.x),
        }
    }

    /// Legend entry under `point`.
    pub fn legend_entry_at(&self, point: Point) -> Option<&LegendEntry> {
        legend_entry_at(&self.legend, point)
    }

    /// The highlight key a hover at `point` should activate.
    ///
    /// Legend entries win; then series charts hit-test their segments and vertices, and
    /// row charts use the category slot.
    pub fn highlight_key_at(&self, point: Point) -> Option<String> {
        if let Some(entry) = self.legend_entry_at(point) {
            return Some(entry.key.clone());
        }
        if !self.highlights_series {
            return self.row_at(point).and_then(|i| self.keys.get(i).cloned());
        }
        let series = self
            .bars
            .iter()
            .find(|b| !b.state.hidden && b.rect.contains(point))
            .map(|b| b.series)
            .or_else(|| {
                self.points
                    .iter()
                    .map(|p| (p.series, p.pos.distance(point)))
                    .filter(|(_, d)| *d <= 8.0)
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(s, _)| s)
            })?;
        self.series.get(series).map(|s| s.key.clone())
    }

    /// Where a tooltip for `row` points to.
    pub fn row_anchor(&self, row: usize) -> Option<Point> {
        let bounds = self
            .bars
            .iter()
            .filter(|b| b.row == row && !b.state.hidden)
            .map(|b| b.rect)
            .reduce(|a, b| a.union(b));
        if let Some(b) = bounds {
            return Some(match self.orientation {
                Orientation::Vertical => Point::new(b.center().x, b.y0),
                Orientation::Horizontal => Point::new(b.x1, b.center().y),
            });
        }
        self.points
            .iter()
            .filter(|p| p.row == row)
            .map(|p| p.pos)
            .reduce(|a, b| if b.y < a.y { b } else { a })
    }
}

/// A chart kind.
pub trait Chart {
    /// Lays out one frame.
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame;
}

/// The available chart kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    /// Vertical bars, grouped when there are several value fields.
    #[default]
    Column,
    /// Horizontal bars.
    Bar,
    /// One line per value field.
    Line,
    /// Vertical stacks of the value fields.
    StackedColumn,
    /// Horizontal stacks of the value fields.
    StackedBar,
}

impl Chart for ChartKind {
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame {
        match self {
            Self::Column => ColumnChart.layout(input),
            Self::Bar => BarChart.layout(input),
            Self::Line => LineChart.layout(input),
            Self::StackedColumn => StackedColumnChart.layout(input),
            Self::StackedBar => StackedBarChart.layout(input),
        }
    }
}

/// Rows in display order.
pub(crate) fn prepare_rows(input: &ChartInput<'_>) -> Vec<Record> {
    let mut rows = input.rows.to_vec();
    if !input.options.sort_by.is_empty() {
        sort_records(&mut rows, &input.options.sort_by);
    }
    rows
}

/// Row highlight keys: the label field, or the row index when it is missing.
pub(crate) fn row_keys(rows: &[Record], label_field: &str) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| r.text(label_field).unwrap_or_else(|| i.to_string()))
        .collect()
}

/// `[min(0, min), max_value or max]`, widened when degenerate.
pub(crate) fn value_domain(min: f64, max: f64, max_value: Option<f64>) -> (f64, f64) {
    let d0 = min.min(0.0);
    let d1 = max_value.unwrap_or(max.max(0.0));
    if d1 > d0 { (d0, d1) } else { (d0, d0 + 1.0) }
}

/// Highlighted if the key is active or the row is flagged; dimmed if something else is.
pub(crate) fn highlight_state(key: &str, flagged: bool, highlights: &[String]) -> MarkState {
    let highlighted = flagged || highlights.iter().any(|h| h == key);
    MarkState {
        highlighted,
        dimmed: !highlighted && !highlights.is_empty(),
        hidden: false,
    }
}

/// Final fill for a mark of series color `base` in `state`.
pub(crate) fn state_fill(base: Color, state: MarkState, options: &ChartOptions) -> Color {
    if state.highlighted {
        options.highlight_color
    } else if state.dimmed {
        color::dimmed(base)
    } else {
        base
    }
}

/// Series descriptors with their highlight state keyed by value field.
pub(crate) fn series_info(options: &ChartOptions, highlights: &[String]) -> Vec<SeriesInfo> {
    options
        .value_fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let state = highlight_state(field, false, highlights);
            SeriesInfo {
                key: field.clone(),
                label: options.series_label(i).to_string(),
                color: state_fill(options.series_color(i), state, options),
                state,
            }
        })
        .collect()
}

/// A bar between `v0` and `v1` along the value axis, at least `min_size` long.
pub(crate) fn bar_rect(
    orientation: Orientation,
    start: f64,
    width: f64,
    scale: &ScaleLinear,
    (v0, v1): (f64, f64),
    min_size: f64,
) -> Rect {
    let p0 = scale.map(v0);
    let mut p1 = scale.map(v1);
    if (p1 - p0).abs() < min_size {
        let up = (scale.map(1.0) - scale.map(0.0)).signum();
        let dir = if v1 < v0 { -up } else { up };
        p1 = p0 + dir * min_size;
    }
    let (a, b) = (p0.min(p1), p0.max(p1));
    match orientation {
        Orientation::Vertical => Rect::new(start, a, start + width, b),
        Orientation::Horizontal => Rect::new(a, start, b, start + width),
    }
}

/// Shared guides and geometry.
pub(crate) struct Scaffold {
    pub(crate) layout: ChartLayout,
    pub(crate) value: ScaleLinear,
    pub(crate) category: CategoryScale,
    pub(crate) legend: Vec<LegendEntry>,
    pub(crate) marks: Vec<Mark>,
}

impl Scaffold {
    /// Measures the guides and arranges the plot.
    ///
    /// `points` selects a point category scale (lines) instead of bands; `extra_right`
    /// reserves room for end-of-line labels.
    pub(crate) fn build(
        input: &ChartInput<'_>,
        keys: &[String],
        domain: (f64, f64),
        orientation: Orientation,
        points: bool,
        legend: Option<LegendSwatchesSpec>,
        extra_right: f64,
    ) -> Self {
        let o = input.options;
        let m = input.measurer;
        let inner = o.band_padding.clamp(0.0, 1.0);
        let outer = inner * 0.5;
        let category_domain = if points {
            AxisDomain::Point {
                labels: keys.to_vec(),
                padding: 0.5,
            }
        } else {
            AxisDomain::Band {
                labels: keys.to_vec(),
                inner,
                outer,
            }
        };
        let (category_orient, value_orient) = match orientation {
            Orientation::Vertical => (AxisOrient::Bottom, AxisOrient::Left),
            Orientation::Horizontal => (AxisOrient::Left, AxisOrient::Bottom),
        };
        let style = AxisStyle {
            font_size: o.font_size,
            ..AxisStyle::default()
        };
        let category_axis = AxisSpec::new(CATEGORY_AXIS_ID, category_orient, category_domain)
            .with_abbreviated_years(input.narrow)
            .with_style(style.clone());
        let value_domain = AxisDomain::Linear { domain };
        let value_axis = AxisSpec::new(VALUE_AXIS_ID, value_orient, value_domain)
            .with_grid(true)
            .with_tick_count(o.tick_count)
            .with_formatter(o.value_format.clone())
            .with_style(style);

        let mut padding = o.padding;
        padding.right += extra_right.max(0.0);
        let legend = legend.map(|l| {
            l.with_font_size(o.font_size)
                .with_max_width(input.size.width - padding.left - padding.right)
        });
        let (axis_left, axis_bottom) = match orientation {
            Orientation::Vertical => (value_axis.measure(m), category_axis.measure(m)),
            Orientation::Horizontal => (category_axis.measure(m), value_axis.measure(m)),
        };
        let layout = ChartLayout::arrange(&ChartLayoutSpec {
            view_size: input.size,
            padding,
            axis_left: Some(axis_left),
            axis_top: None,
            axis_bottom: Some(axis_bottom),
            legend: legend.as_ref().map(|l| l.measure(m)),
            legend_offset: 8.0,
        });
        let plot = layout.plot;

        let (value, category_range) = match orientation {
            Orientation::Vertical => (
                ScaleLinear::new(domain, (plot.y1, plot.y0)),
                (plot.x0, plot.x1),
            ),
            Orientation::Horizontal => (
                ScaleLinear::new(domain, (plot.x0, plot.x1)),
                (plot.y0, plot.y1),
            ),
        };
        let category = if points {
            CategoryScale::Point(ScalePoint::new(category_range, keys.len()).with_padding(0.5))
        } else {
            CategoryScale::Band(
                ScaleBand::new(category_range, keys.len()).with_padding(inner, outer),
            )
        };

        let mut marks = category_axis.marks(plot);
        marks.extend(value_axis.marks(plot));
        let mut entries = Vec::new();
        if let (Some(spec), Some(rect)) = (&legend, layout.legend) {
            marks.extend(spec.marks(m, rect.origin()));
            entries = spec.entries(m, rect.origin());
        }

        Self {
            layout,
            value,
            category,
            legend: entries,
            marks,
        }
    }

    /// The band scale of a band scaffold.
    pub(crate) fn band(&self) -> Option<ScaleBand> {
        match self.category {
            CategoryScale::Band(b) => Some(b),
            CategoryScale::Point(_) => None,
        }
    }

    /// The point scale of a point scaffold.
    pub(crate) fn point(&self) -> Option<ScalePoint> {
        match self.category {
            CategoryScale::Point(p) => Some(p),
            CategoryScale::Band(_) => None,
        }
    }
}

/// `(min, max)` of finite values, `(0, 0)` when there are none.
pub(crate) fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        })
        .unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_domain_includes_zero_and_honours_max() {
        assert_eq!(value_domain(2.0, 8.0, None), (0.0, 8.0));
        assert_eq!(value_domain(-3.0, 8.0, None), (-3.0, 8.0));
        assert_eq!(value_domain(2.0, 8.0, Some(20.0)), (0.0, 20.0));
        assert_eq!(value_domain(0.0, 0.0, None), (0.0, 1.0));
    }

    #[test]
    fn highlight_state_dims_only_with_active_keys() {
        let none: [String; 0] = [];
        let active = ["b".to_string()];
        assert!(!highlight_state("a", false, &none).dimmed);
        assert!(highlight_state("a", true, &none).highlighted);
        assert!(highlight_state("a", false, &active).dimmed);
        assert!(highlight_state("b", false, &active).highlighted);
    }

    #[test]
    fn bar_rect_enforces_minimum_size_in_value_direction() {
        let up = ScaleLinear::new((0.0, 10.0), (100.0, 0.0));
        let r = bar_rect(Orientation::Vertical, 0.0, 5.0, &up, (0.0, 0.0), 0.5);
        assert_eq!((r.y0, r.y1), (99.5, 100.0));
        let right = ScaleLinear::new((0.0, 10.0), (0.0, 100.0));
        let r = bar_rect(Orientation::Horizontal, 0.0, 5.0, &right, (0.0, 5.0), 0.5);
        assert_eq!((r.x0, r.x1), (0.0, 50.0));
    }
}
