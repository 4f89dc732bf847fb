// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column chart: one vertical bar per row, grouped side by side when there are several
//! value fields.
//!
//! The grouped-bar layout here is shared with [`crate::BarChart`], which only flips the
//! orientation.

use kurbo::{Point, Rect};
use vistage_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::chart::{
    BarLayout, Chart, ChartFrame, ChartInput, LEGEND_ID, NS_BARS, NS_LABELS, Orientation,
    Scaffold, bar_rect, extent, highlight_state, namespace, prepare_rows, row_keys, series_info,
    state_fill, value_domain,
};
use crate::legend::{LegendItem, LegendSwatchesSpec};
use crate::scale::ScaleBand;
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// Vertical bars.
#[derive(Clone, Copy, Debug, Default)]
pub struct ColumnChart;

impl Chart for ColumnChart {
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame {
        grouped_layout(input, Orientation::Vertical)
    }
}

/// Legend for multi-series charts, when enabled.
pub(crate) fn series_legend(input: &ChartInput<'_>) -> Option<LegendSwatchesSpec> {
    let o = input.options;
    if !o.legend || o.value_fields.len() < 2 {
        return None;
    }
    let items = series_info(o, input.highlights)
        .into_iter()
        .map(|s| {
            LegendItem::solid(s.label, s.color)
                .with_key(s.key)
                .with_state(s.state)
        })
        .collect();
    Some(LegendSwatchesSpec::new(LEGEND_ID, items))
}

pub(crate) fn grouped_layout(input: &ChartInput<'_>, orientation: Orientation) -> ChartFrame {
    let o = input.options;
    let rows = prepare_rows(input);
    let keys = row_keys(&rows, &o.label_field);
    let values: Vec<Vec<Option<f64>>> = rows
        .iter()
        .map(|r| o.value_fields.iter().map(|f| r.number(f)).collect())
        .collect();
    let (min, max) = extent(values.iter().flatten().flatten().copied());
    let domain = value_domain(min, max, o.max_value);

    let scaffold = Scaffold::build(
        input,
        &keys,
        domain,
        orientation,
        false,
        series_legend(input),
        0.0,
    );
    let band = scaffold
        .band()
        .unwrap_or_else(|| ScaleBand::new((0.0, 0.0), 0));
    let series_count = o.value_fields.len();
    let group = ScaleBand::new((0.0, band.band_width()), series_count).with_padding(0.05, 0.0);
    let baseline = 0.0_f64.clamp(domain.0, domain.1);

    let mut marks = scaffold.marks;
    let mut bars = Vec::with_capacity(rows.len() * series_count);
    for (i, row) in rows.iter().enumerate() {
        let row_state = highlight_state(&keys[i], row.is_highlighted(), input.highlights);
        for (s, value) in values[i].iter().copied().enumerate() {
            let start = band.x(i) + group.x(s);
            let width = group.band_width();
            let mut state = row_state;
            let rect = match value {
                Some(v) => bar_rect(
                    orientation,
                    start,
                    width,
                    &scaffold.value,
                    (baseline, v),
                    o.min_bar_size,
                ),
                None => {
                    state.hidden = true;
                    bar_rect(
                        orientation,
                        start,
                        width,
                        &scaffold.value,
                        (baseline, baseline),
                        0.0,
                    )
                }
            };
            let fill = state_fill(o.series_color(s), state, o);
            marks.push(
                Mark::builder(MarkId::for_row(namespace(NS_BARS, s), i as u64))
                    .z_index(z_order::SERIES_FILL)
                    .state(state)
                    .rect(rect)
                    .fill(fill)
                    .build(),
            );
            if let Some(v) = value
                && !o.no_direct_labeling
            {
                let (pos, anchor, text_baseline) = value_label_position(orientation, rect, v);
                marks.push(
                    TextMarkSpec::new(
                        MarkId::for_row(namespace(NS_LABELS, s), i as u64),
                        pos,
                        o.value_format.format(v),
                    )
                    .with_font_size(o.font_size)
                    .with_font_weight(if state.highlighted { 700 } else { 400 })
                    .with_anchor(anchor)
                    .with_baseline(text_baseline)
                    .with_state(state)
                    .mark(),
                );
            }
            bars.push(BarLayout {
                row: i,
                series: s,
                key: keys[i].clone(),
                value,
                rect,
                state,
            });
        }
    }

    ChartFrame {
        layout: scaffold.layout,
        orientation,
        series: series_info(o, input.highlights),
        keys,
        rows,
        bars,
        points: Vec::new(),
        legend: scaffold.legend,
        value_scale: scaffold.value,
        highlights_series: false,
        marks,
        category: scaffold.category,
    }
}

/// Value label just past the bar end, on the side the value points to.
fn value_label_position(
    orientation: Orientation,
    rect: Rect,
    value: f64,
) -> (Point, TextAnchor, TextBaseline) {
    const GAP: f64 = 4.0;
    let c = rect.center();
    match (orientation, value < 0.0) {
        (Orientation::Vertical, false) => (
            Point::new(c.x, rect.y0 - GAP),
            TextAnchor::Middle,
            TextBaseline::Alphabetic,
        ),
        (Orientation::Vertical, true) => (
            Point::new(c.x, rect.y1 + GAP),
            TextAnchor::Middle,
            TextBaseline::Hanging,
        ),
        (Orientation::Horizontal, false) => (
            Point::new(rect.x1 + GAP, c.y),
            TextAnchor::Start,
            TextBaseline::Middle,
        ),
        (Orientation::Horizontal, true) => (
            Point::new(rect.x0 - GAP, c.y),
            TextAnchor::End,
            TextBaseline::Middle,
        ),
    }
}
