// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line chart: one line per value field over point-spaced categories.
//!
//! Lines break at missing values. With direct labelling on, each series is named at its last
//! defined point and room is reserved on the right; otherwise a legend names the series.

use kurbo::{BezPath, Circle, Point, Shape};
use peniko::Color;
use vistage_core::{Mark, MarkId, MarkState, TextAnchor, TextBaseline};

use crate::chart::{
    Chart, ChartFrame, ChartInput, NS_LABELS, NS_LINES, NS_POINTS, Orientation, PointLayout,
    Scaffold, extent, namespace, prepare_rows, row_keys, series_info, value_domain,
};
use crate::column_chart::series_legend;
use crate::scale::ScalePoint;
use crate::text_mark::TextMarkSpec;
use crate::z_order;

const POINT_RADIUS: f64 = 3.0;
const END_LABEL_GAP: f64 = 6.0;

/// Lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineChart;

impl Chart for LineChart {
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame {
        let o = input.options;
        let rows = prepare_rows(input);
        let keys = row_keys(&rows, &o.label_field);
        let values: Vec<Vec<Option<f64>>> = o
            .value_fields
            .iter()
            .map(|f| rows.iter().map(|r| r.number(f)).collect())
            .collect();
        let (min, max) = extent(values.iter().flatten().flatten().copied());
        let domain = value_domain(min, max, o.max_value);
        let series = series_info(o, input.highlights);

        let direct = !o.no_direct_labeling;
        let extra_right = if direct {
            series
                .iter()
                .map(|s| input.measurer.measure(&s.label, o.font_size).0)
                .fold(0.0, f64::max)
                + END_LABEL_GAP
                + 2.0
        } else {
            0.0
        };
        let legend = if direct { None } else { series_legend(input) };
        let scaffold = Scaffold::build(
            input,
            &keys,
            domain,
            Orientation::Vertical,
            true,
            legend,
            extra_right,
        );
        let xs = scaffold
            .point()
            .unwrap_or_else(|| ScalePoint::new((0.0, 0.0), 0));

        let mut marks = scaffold.marks;
        let mut points = Vec::new();
        for (s, info) in series.iter().enumerate() {
            let vertices: Vec<Option<PointLayout>> = values[s]
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    v.map(|value| PointLayout {
                        row,
                        series: s,
                        value,
                        pos: Point::new(xs.x(row), scaffold.value.map(value)),
                    })
                })
                .collect();
            marks.push(line_mark(s, info.color, info.state, &vertices));
            for p in vertices.iter().flatten() {
                marks.push(
                    Mark::builder(MarkId::for_row(namespace(NS_POINTS, s), p.row as u64))
                        .z_index(z_order::SERIES_POINTS)
                        .state(info.state)
                        .path(Circle::new(p.pos, POINT_RADIUS).to_path(0.1))
                        .fill(info.color)
                        .build(),
                );
            }
            if direct && let Some(last) = vertices.iter().flatten().last() {
                marks.push(
                    TextMarkSpec::new(
                        MarkId::for_row(namespace(NS_LABELS, 0), s as u64),
                        Point::new(last.pos.x + END_LABEL_GAP, last.pos.y),
                        info.label.clone(),
                    )
                    .with_font_size(o.font_size)
                    .with_font_weight(if info.state.highlighted { 700 } else { 400 })
                    .with_fill(info.color)
                    .with_anchor(TextAnchor::Start)
                    .with_baseline(TextBaseline::Middle)
                    .with_state(info.state)
                    .mark(),
                );
            }
            points.extend(vertices.into_iter().flatten());
        }

        ChartFrame {
            layout: scaffold.layout,
            orientation: Orientation::Vertical,
            rows,
            keys,
            series,
            bars: Vec::new(),
            points,
            legend: scaffold.legend,
            value_scale: scaffold.value,
            highlights_series: true,
            marks,
            category: scaffold.category,
        }
    }
}

/// A stroked path that starts a new subpath after every gap.
fn line_mark(
    series: usize,
    color: Color,
    state: MarkState,
    vertices: &[Option<PointLayout>],
) -> Mark {
    let mut path = BezPath::new();
    let mut pen_down = false;
    for v in vertices {
        match v {
            Some(p) if pen_down => path.line_to(p.pos),
            Some(p) => {
                path.move_to(p.pos);
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
    Mark::builder(MarkId::for_row(namespace(NS_LINES, 0), series as u64))
        .z_index(z_order::SERIES_STROKE)
        .state(state)
        .path(path)
        .fill(Color::TRANSPARENT)
        .stroke(color, if state.highlighted { 3.0 } else { 2.0 })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartOptions, Size};
    use kurbo::PathEl;
    use serde_json::json;
    use vistage_core::MarkPayload;
    use vistage_data::Record;

    fn data() -> Vec<Record> {
        serde_json::from_value(json!([
            {"label": "2001", "a": 1, "b": 4},
            {"label": "2002", "a": null, "b": 3},
            {"label": "2003", "a": 3, "b": 2},
            {"label": "2004", "a": 4, "b": 1},
        ]))
        .unwrap()
    }

    fn path_of(frame: &ChartFrame, series: u64) -> &BezPath {
        let id = MarkId::for_row(namespace(NS_LINES, 0), series);
        match &frame.marks.iter().find(|m| m.id == id).unwrap().payload {
            MarkPayload::Path(p) => &p.path,
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn lines_break_at_missing_values() {
        let data = data();
        let options = ChartOptions::default().with_value_fields(["a", "b"]);
        let frame = LineChart.layout(&ChartInput::new(&data, Size::new(600.0, 300.0), &options));
        let moves = |p: &BezPath| {
            p.elements()
                .iter()
                .filter(|e| matches!(e, PathEl::MoveTo(_)))
                .count()
        };
        assert_eq!(moves(path_of(&frame, 0)), 2);
        assert_eq!(moves(path_of(&frame, 1)), 1);
        assert_eq!(frame.points.len(), 7);
    }

    #[test]
    fn end_labels_reserve_room_and_replace_the_legend() {
        let data = data();
        let labelled = ChartOptions::default().with_value_fields(["a", "b"]);
        let plain = labelled.clone().with_no_direct_labeling(true);
        let size = Size::new(600.0, 300.0);
        let with = LineChart.layout(&ChartInput::new(&data, size, &labelled));
        let without = LineChart.layout(&ChartInput::new(&data, size, &plain));
        assert!(with.layout.plot.x1 < without.layout.plot.x1);
        assert!(with.legend.is_empty());
        assert_eq!(without.legend.len(), 2);
        let label = MarkId::for_row(namespace(NS_LABELS, 0), 1);
        assert!(with.marks.iter().any(|m| m.id == label));
        assert!(!without.marks.iter().any(|m| m.id == label));
    }

    #[test]
    fn hover_near_a_vertex_selects_its_series() {
        let data = data();
        let options = ChartOptions::default().with_value_fields(["a", "b"]);
        let frame = LineChart.layout(&ChartInput::new(&data, Size::new(600.0, 300.0), &options));
        let b0 = frame
            .points
            .iter()
            .find(|p| p.series == 1 && p.row == 0)
            .unwrap()
            .pos;
        let near = Point::new(b0.x + 2.0, b0.y + 2.0);
        assert_eq!(frame.highlight_key_at(near).as_deref(), Some("b"));
        assert_eq!(frame.row_at(near), Some(0));
    }
}
