// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis mark generation.
//!
//! A single [`AxisSpec`] with an [`AxisOrient`] covers both the category axis (band or
//! point labels) and the value axis (nice ticks plus optional gridlines). Axes are measured
//! before the plot is known and arranged once it is.

use kurbo::Rect;
use peniko::Brush;
use vistage_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::color;
use crate::format::ValueFormatter;
use crate::layout::ChartLayout;
use crate::measure::TextMeasurer;
use crate::rule_mark::RuleMarkSpec;
use crate::scale::{ScaleBand, ScaleLinear, ScalePoint};
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// Axis orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// A horizontal axis placed above the plot area.
    Top,
    /// A horizontal axis placed below the plot area.
    Bottom,
    /// A vertical axis placed to the left of the plot area.
    Left,
    /// A vertical axis placed to the right of the plot area.
    Right,
}

impl AxisOrient {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// What an axis labels.
#[derive(Clone, Debug, PartialEq)]
pub enum AxisDomain {
    /// One label per band, centered on the band.
    Band {
        /// Labels in band order.
        labels: Vec<String>,
        /// Inner padding in band units.
        inner: f64,
        /// Outer padding in band units.
        outer: f64,
    },
    /// One label per point.
    Point {
        /// Labels in point order.
        labels: Vec<String>,
        /// Outer padding in point steps.
        padding: f64,
    },
    /// Continuous values with nice ticks.
    Linear {
        /// Value domain.
        domain: (f64, f64),
    },
}

/// Axis styling.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisStyle {
    /// Domain line and tick paint.
    pub rule: Brush,
    /// Domain line and tick width.
    pub rule_width: f64,
    /// Tick label paint.
    pub label_fill: Brush,
    /// Tick label font size.
    pub font_size: f64,
    /// Gridline paint.
    pub grid: Brush,
}

impl Default for AxisStyle {
    fn default() -> Self {
        Self {
            rule: Brush::Solid(color::TEXT),
            rule_width: 1.0,
            label_fill: Brush::Solid(color::TEXT),
            font_size: 12.0,
            grid: Brush::Solid(color::RULE),
        }
    }
}

/// An axis: one orientation, one domain.
#[derive(Clone, Debug)]
pub struct AxisSpec {
    /// Stable-id base; each generated mark uses a deterministic offset from this base.
    pub id_base: u64,
    /// Placement relative to the plot.
    pub orient: AxisOrient,
    /// Labelled domain.
    pub domain: AxisDomain,
    /// Approximate number of ticks on a linear axis.
    pub tick_count: usize,
    /// Tick line length.
    pub tick_size: f64,
    /// Gap between tick end and label.
    pub tick_padding: f64,
    /// Whether to draw the domain line.
    pub show_domain: bool,
    /// Whether a linear axis draws gridlines across the plot.
    pub grid: bool,
    /// Formats linear tick values.
    pub formatter: ValueFormatter,
    /// Shortens four-digit year labels (`2006 -> '06`).
    pub abbreviate_years: bool,
    /// Styling.
    pub style: AxisStyle,
}

impl AxisSpec {
    /// Creates an axis with default styling.
    pub fn new(id_base: u64, orient: AxisOrient, domain: AxisDomain) -> Self {
        let band = !matches!(domain, AxisDomain::Linear { .. });
        Self {
            id_base,
            orient,
            domain,
            tick_count: 5,
            tick_size: if band { 0.0 } else { 5.0 },
            tick_padding: 6.0,
            show_domain: band,
            grid: false,
            formatter: ValueFormatter::Default,
            abbreviate_years: false,
            style: AxisStyle::default(),
        }
    }

    /// Sets the approximate tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count.max(1);
        self
    }

    /// Sets the tick line length.
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Enables or disables gridlines.
    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    /// Enables or disables the domain line.
    pub fn with_domain_line(mut self, show: bool) -> Self {
        self.show_domain = show;
        self
    }

    /// Sets the tick value formatter.
    pub fn with_formatter(mut self, formatter: ValueFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Enables year abbreviation (used at narrow widths).
    pub fn with_abbreviated_years(mut self, abbreviate: bool) -> Self {
        self.abbreviate_years = abbreviate;
        self
    }

    /// Sets the style.
    pub fn with_style(mut self, style: AxisStyle) -> Self {
        self.style = style;
        self
    }

    fn label(&self, raw: &str) -> String {
        if self.abbreviate_years
            && let Some(short) = abbreviate_year(raw)
        {
            return short;
        }
        raw.to_string()
    }

    /// Tick values (linear) or indices (band/point) with their labels.
    fn ticks(&self) -> Vec<(f64, String)> {
        match &self.domain {
            AxisDomain::Band { labels, .. } | AxisDomain::Point { labels, .. } => labels
                .iter()
                .enumerate()
                .map(|(i, l)| (i as f64, self.label(l)))
                .collect(),
            AxisDomain::Linear { domain } => ScaleLinear::new(*domain, (0.0, 1.0))
                .ticks(self.tick_count)
                .into_iter()
                .map(|v| (v, self.formatter.format(v)))
                .collect(),
        }
    }

    /// Thickness needed along the axis normal.
    pub fn measure(&self, measurer: &dyn TextMeasurer) -> f64 {
        if self.orient.is_horizontal() {
            ChartLayout::measure_axis_horizontal(
                measurer,
                self.tick_size,
                self.tick_padding,
                self.style.font_size,
            )
        } else {
            let labels: Vec<String> = self.ticks().into_iter().map(|(_, l)| l).collect();
            ChartLayout::measure_axis_left(
                measurer,
                &labels,
                self.tick_size,
                self.tick_padding,
                self.style.font_size,
            )
        }
    }

    fn position(&self, plot: Rect) -> impl Fn(f64) -> f64 + '_ {
        let horizontal = self.orient.is_horizontal();
        let (r0, r1) = if horizontal {
            (plot.x0, plot.x1)
        } else {
            (plot.y0, plot.y1)
        };
        let band = match &self.domain {
            AxisDomain::Band {
                labels,
                inner,
                outer,
            } => Some(ScaleBand::new((r0, r1), labels.len()).with_padding(*inner, *outer)),
            _ => None,
        };
        let point = match &self.domain {
            AxisDomain::Point { labels, padding } => {
                Some(ScalePoint::new((r0, r1), labels.len()).with_padding(*padding))
            }
            _ => None,
        };
        let linear = match &self.domain {
            AxisDomain::Linear { domain } => Some(if horizontal {
                ScaleLinear::new(*domain, (r0, r1))
            } else {
                ScaleLinear::new(*domain, (r1, r0))
            }),
            _ => None,
        };
        move |v: f64| {
            #[allow(clippy::cast_possible_truncation, reason = "band indices are small")]
            let index = v.max(0.0) as usize;
            if let Some(b) = band {
                b.center(index)
            } else if let Some(p) = point {
                p.x(index)
            } else if let Some(l) = linear {
                l.map(v)
            } else {
                0.0
            }
        }
    }

    /// Generates axis marks for the arranged plot rectangle.
    pub fn marks(&self, plot: Rect) -> Vec<Mark> {
        let pos = self.position(plot);
        let ticks = self.ticks();
        let tick = self.tick_size.abs();
        let gap = tick + self.tick_padding.max(0.0);
        let linear = matches!(self.domain, AxisDomain::Linear { .. });
        let mut out = Vec::new();

        let (edge, outward) = match self.orient {
            AxisOrient::Top => (plot.y0, -1.0),
            AxisOrient::Bottom => (plot.y1, 1.0),
            AxisOrient::Left => (plot.x0, -1.0),
            AxisOrient::Right => (plot.x1, 1.0),
        };

        if self.show_domain {
            let id = MarkId::from_raw(self.id_base + 9999);
            let rule = if self.orient.is_horizontal() {
                RuleMarkSpec::horizontal(id, edge, plot.x0, plot.x1)
            } else {
                RuleMarkSpec::vertical(id, edge, plot.y0, plot.y1)
            };
            out.push(
                rule.with_stroke(self.style.rule.clone(), self.style.rule_width)
                    .mark(),
            );
        }

        for (i, (v, label)) in ticks.into_iter().enumerate() {
            let p = pos(v);
            let i = i as u64;
            if linear && self.grid {
                let id = MarkId::from_raw(self.id_base + 2000 + i);
                let rule = if self.orient.is_horizontal() {
                    RuleMarkSpec::vertical(id, p, plot.y0, plot.y1)
                } else {
                    RuleMarkSpec::horizontal(id, p, plot.x0, plot.x1)
                };
                out.push(
                    rule.with_stroke(self.style.grid.clone(), 1.0)
                        .with_z_index(z_order::GRID_LINES)
                        .mark(),
                );
            }
            if tick > 0.0 {
                let id = MarkId::from_raw(self.id_base + i);
                let rule = if self.orient.is_horizontal() {
                    RuleMarkSpec::vertical(id, p, edge, edge + outward * tick)
                } else {
                    RuleMarkSpec::horizontal(id, p, edge, edge + outward * tick)
                };
                out.push(
                    rule.with_stroke(self.style.rule.clone(), self.style.rule_width)
                        .mark(),
                );
            }
            let (at, anchor, baseline) = match self.orient {
                AxisOrient::Bottom => ((p, edge + gap), TextAnchor::Middle, TextBaseline::Hanging),
                AxisOrient::Top => (
                    (p, edge - gap),
                    TextAnchor::Middle,
                    TextBaseline::Alphabetic,
                ),
                AxisOrient::Left => ((edge - gap, p), TextAnchor::End, TextBaseline::Middle),
                AxisOrient::Right => ((edge + gap, p), TextAnchor::Start, TextBaseline::Middle),
            };
            out.push(
                TextMarkSpec::new(MarkId::from_raw(self.id_base + 1000 + i), at.into(), label)
                    .with_font_size(self.style.font_size)
                    .with_fill(self.style.label_fill.clone())
                    .with_anchor(anchor)
                    .with_baseline(baseline)
                    .with_z_index(z_order::AXIS_LABELS)
                    .mark(),
            );
        }
        out
    }
}

/// Shortens a four-digit year label: `"2006" -> "'06"`.
///
/// Returns `None` for anything that is not exactly four ASCII digits.
pub fn abbreviate_year(label: &str) -> Option<String> {
    let label = label.trim();
    (label.len() == 4 && label.bytes().all(|b| b.is_ascii_digit()))
        .then(|| format!("'{}", &label[2..]))
}
