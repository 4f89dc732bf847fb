// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar chart: horizontal bars, categories top to bottom.

use crate::chart::{Chart, ChartFrame, ChartInput, Orientation};
use crate::column_chart::grouped_layout;

/// Horizontal bars.
#[derive(Clone, Copy, Debug, Default)]
pub struct BarChart;

impl Chart for BarChart {
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame {
        grouped_layout(input, Orientation::Horizontal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChartOptions, Size};
    use kurbo::Point;
    use serde_json::json;
    use vistage_data::Record;

    #[test]
    fn bars_grow_rightward_from_the_left_edge() {
        let data: Vec<Record> = serde_json::from_value(json!([
            {"label": "Wales", "value": 2},
            {"label": "Scotland", "value": 4},
        ]))
        .unwrap();
        let options = ChartOptions::default();
        let frame = BarChart.layout(&ChartInput::new(&data, Size::new(600.0, 300.0), &options));
        let plot = frame.layout.plot;
        let (a, b) = (&frame.bars[0], &frame.bars[1]);
        assert!((a.rect.x0 - plot.x0).abs() < 1e-9);
        assert!((b.rect.x1 - plot.x1).abs() < 1e-9, "the max value spans the plot");
        assert!((a.rect.width() - plot.width() / 2.0).abs() < 1e-9);
        assert!(a.rect.y1 <= b.rect.y0, "first row is on top");

        let hit = Point::new(plot.x0 + 1.0, b.rect.center().y);
        assert_eq!(frame.row_at(hit), Some(1));
        assert_eq!(frame.highlight_key_at(hit).as_deref(), Some("Scotland"));
    }
}
