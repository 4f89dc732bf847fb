// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked column chart: each row stacks its value fields; negative values stack downward
//! from the baseline.
//!
//! Hover highlights a series (value field) across every stack. Direct labels are drawn
//! inside a segment only when the formatted value fits.

use peniko::color::palette::css;
use vistage_core::{Mark, MarkId, TextAnchor, TextBaseline};
use vistage_data::{StackOffset, stack_rows, stack_totals};

use crate::chart::{
    BarLayout, Chart, ChartFrame, ChartInput, NS_BARS, NS_LABELS, Orientation, Scaffold,
    bar_rect, highlight_state, namespace, prepare_rows, row_keys, series_info, state_fill,
    value_domain,
};
use crate::color;
use crate::column_chart::series_legend;
use crate::measure::text_bounds;
use crate::scale::ScaleBand;
use crate::text_mark::TextMarkSpec;
use crate::z_order;

/// Vertical stacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackedColumnChart;

impl Chart for StackedColumnChart {
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame {
        stacked_layout(input, Orientation::Vertical)
    }
}

pub(crate) fn stacked_layout(input: &ChartInput<'_>, orientation: Orientation) -> ChartFrame {
    let o = input.options;
    let rows = prepare_rows(input);
    let keys = row_keys(&rows, &o.label_field);
    let stacks = stack_rows(&rows, &o.value_fields, StackOffset::Zero);
    let max = stack_totals(&stacks).into_iter().fold(0.0, f64::max);
    let min = stacks
        .iter()
        .flatten()
        .map(|s| s.y0.min(s.y1))
        .fold(0.0, f64::min);
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
    let series = series_info(o, input.highlights);

    let mut marks = scaffold.marks;
    let mut bars = Vec::new();
    for (i, (row, stack)) in rows.iter().zip(&stacks).enumerate() {
        for segment in stack {
            let s = segment.series;
            let mut state = highlight_state(
                &o.value_fields[s],
                row.is_highlighted(),
                input.highlights,
            );
            state.hidden = segment.missing;
            let rect = bar_rect(
                orientation,
                band.x(i),
                band.band_width(),
                &scaffold.value,
                (segment.y0, segment.y1),
                0.0,
            );
            marks.push(
                Mark::builder(MarkId::for_row(namespace(NS_BARS, s), i as u64))
                    .z_index(z_order::SERIES_FILL)
                    .state(state)
                    .rect(rect)
                    .fill(state_fill(o.series_color(s), state, o))
                    .stroke(color::dimmed(css::WHITE), 0.5)
                    .build(),
            );
            if !o.no_direct_labeling && !state.hidden && segment.value != 0.0 {
                let text = o.value_format.format(segment.value);
                let c = rect.center();
                let size = input.measurer.measure(&text, o.font_size);
                let bounds =
                    text_bounds(c.x, c.y, size, TextAnchor::Middle, TextBaseline::Middle)
                        .inflate(2.0, 1.0);
                if rect.intersect(bounds) == bounds {
                    marks.push(
                        TextMarkSpec::new(
                            MarkId::for_row(namespace(NS_LABELS, s), i as u64),
                            c,
                            text,
                        )
                        .with_font_size(o.font_size)
                        .with_fill(css::WHITE)
                        .with_anchor(TextAnchor::Middle)
                        .with_baseline(TextBaseline::Middle)
                        .with_state(state)
                        .mark(),
                    );
                }
            }
            bars.push(BarLayout {
                row: i,
                series: s,
                key: keys[i].clone(),
                value: (!segment.missing).then_some(segment.value),
                rect,
                state,
            });
        }
    }

    ChartFrame {
        layout: scaffold.layout,
        orientation,
        series,
        keys,
        rows,
        bars,
        points: Vec::new(),
        legend: scaffold.legend,
        value_scale: scaffold.value,
        highlights_series: true,
        marks,
        category: scaffold.category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartOptions, Size};
    use serde_json::json;
    use vistage_data::Record;

    #[test]
    fn missing_segments_are_hidden_but_keep_their_slot() {
        let data: Vec<Record> = serde_json::from_value(json!([
            {"label": "a", "x": 1, "y": null},
            {"label": "b", "x": 2, "y": 2},
        ]))
        .unwrap();
        let options = ChartOptions::default().with_value_fields(["x", "y"]);
        let frame =
            StackedColumnChart.layout(&ChartInput::new(&data, Size::new(600.0, 300.0), &options));
        assert_eq!(frame.bars.len(), 4);
        assert!(frame.bars[1].state.hidden);
        assert_eq!(frame.bars[1].value, None);
        assert!(!frame.bars[3].state.hidden);
    }

    #[test]
    fn hover_highlights_a_series_across_stacks() {
        let data: Vec<Record> = serde_json::from_value(json!([
            {"label": "a", "x": 1, "y": 3},
            {"label": "b", "x": 2, "y": 2},
        ]))
        .unwrap();
        let options = ChartOptions::default().with_value_fields(["x", "y"]);
        let active = ["y".to_string()];
        let input =
            ChartInput::new(&data, Size::new(600.0, 300.0), &options).with_highlights(&active);
        let frame = StackedColumnChart.layout(&input);
        for bar in &frame.bars {
            assert_eq!(bar.state.highlighted, bar.series == 1);
            assert_eq!(bar.state.dimmed, bar.series == 0);
        }
        let y_segment = frame.bars[1].rect.center();
        assert_eq!(frame.highlight_key_at(y_segment).as_deref(), Some("y"));
    }
}
