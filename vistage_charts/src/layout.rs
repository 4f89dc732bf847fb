// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measure/arrange layout for a chart box.
//!
//! - **Measure**: guides (axes, legend) report the margin they need.
//! - **Arrange**: [`ChartLayout::arrange`] carves the measured container into a plot
//!   rectangle plus guide rectangles around it.

use kurbo::Rect;
use serde::Deserialize;

use crate::measure::TextMeasurer;

/// A width/height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Size {
    /// Width in chart coordinate units.
    pub width: f64,
    /// Height in chart coordinate units.
    pub height: f64,
}

impl Size {
    /// Creates a size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Per-side padding subtracted from the measured box.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Padding {
    /// Top padding.
    pub top: f64,
    /// Right padding.
    pub right: f64,
    /// Bottom padding.
    pub bottom: f64,
    /// Left padding.
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(4.0)
    }
}

impl Padding {
    /// The same padding on every side.
    pub const fn uniform(p: f64) -> Self {
        Self {
            top: p,
            right: p,
            bottom: p,
            left: p,
        }
    }

    /// No padding.
    pub const ZERO: Self = Self::uniform(0.0);
}

/// Layout inputs for a single chart.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChartLayoutSpec {
    /// Measured container size.
    pub view_size: Size,
    /// Padding inside the container.
    pub padding: Padding,
    /// Left axis thickness, if any.
    pub axis_left: Option<f64>,
    /// Top axis thickness, if any.
    pub axis_top: Option<f64>,
    /// Bottom axis thickness, if any.
    pub axis_bottom: Option<f64>,
    /// Legend size, placed above the plot.
    pub legend: Option<Size>,
    /// Gap between the legend and the plot block.
    pub legend_offset: f64,
}

/// Output of the arrange pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    /// Container bounds.
    pub view: Rect,
    /// The plot (data) rectangle.
    pub plot: Rect,
    /// Reserved rectangle for the left axis.
    pub axis_left: Option<Rect>,
    /// Reserved rectangle for the top axis.
    pub axis_top: Option<Rect>,
    /// Reserved rectangle for the bottom axis.
    pub axis_bottom: Option<Rect>,
    /// Legend rectangle.
    pub legend: Option<Rect>,
}

impl ChartLayout {
    /// Computes a layout from the provided specification.
    ///
    /// Degenerate boxes collapse to an empty plot rather than inverting.
    pub fn arrange(spec: &ChartLayoutSpec) -> Self {
        let pad = spec.padding;
        let axis_left_w = spec.axis_left.unwrap_or(0.0).max(0.0);
        let axis_top_h = spec.axis_top.unwrap_or(0.0).max(0.0);
        let axis_bottom_h = spec.axis_bottom.unwrap_or(0.0).max(0.0);
        let legend_h = spec
            .legend
            .map(|s| s.height.max(0.0) + spec.legend_offset.max(0.0))
            .unwrap_or(0.0);

        let margin_left = pad.left.max(0.0) + axis_left_w;
        let margin_right = pad.right.max(0.0);
        let margin_top = pad.top.max(0.0) + legend_h + axis_top_h;
        let margin_bottom = pad.bottom.max(0.0) + axis_bottom_h;

        let view = Rect::new(
            0.0,
            0.0,
            spec.view_size.width.max(0.0),
            spec.view_size.height.max(0.0),
        );
        let plot_w = (view.width() - margin_left - margin_right).max(0.0);
        let plot_h = (view.height() - margin_top - margin_bottom).max(0.0);
        let plot = Rect::new(
            margin_left,
            margin_top,
            margin_left + plot_w,
            margin_top + plot_h,
        );

        let axis_left = (axis_left_w > 0.0)
            .then(|| Rect::new(plot.x0 - axis_left_w, plot.y0, plot.x0, plot.y1));
        let axis_top =
            (axis_top_h > 0.0).then(|| Rect::new(plot.x0, plot.y0 - axis_top_h, plot.x1, plot.y0));
        let axis_bottom = (axis_bottom_h > 0.0)
            .then(|| Rect::new(plot.x0, plot.y1, plot.x1, plot.y1 + axis_bottom_h));
        let legend = spec.legend.map(|s| {
            let y0 = pad.top.max(0.0);
            Rect::new(pad.left.max(0.0), y0, pad.left.max(0.0) + s.width, y0 + s.height)
        });

        Self {
            view,
            plot,
            axis_left,
            axis_top,
            axis_bottom,
            legend,
        }
    }

    /// Left-axis thickness for the given tick labels.
    pub fn measure_axis_left(
        measurer: &dyn TextMeasurer,
        tick_labels: &[String],
        tick_size: f64,
        tick_padding: f64,
        font_size: f64,
    ) -> f64 {
        let max_w = tick_labels
            .iter()
            .map(|s| measurer.measure(s, font_size).0)
            .fold(0.0, f64::max);
        tick_size.abs() + tick_padding.max(0.0) + max_w
    }

    /// Horizontal-axis thickness (one label row).
    pub fn measure_axis_horizontal(
        measurer: &dyn TextMeasurer,
        tick_size: f64,
        tick_padding: f64,
        font_size: f64,
    ) -> f64 {
        let (_w, h) = measurer.measure("Mg", font_size);
        tick_size.abs() + tick_padding.max(0.0) + h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_is_box_minus_padding_and_guides() {
        let spec = ChartLayoutSpec {
            view_size: Size::new(400.0, 300.0),
            padding: Padding::uniform(10.0),
            axis_left: Some(30.0),
            axis_top: None,
            axis_bottom: Some(20.0),
            legend: Some(Size::new(100.0, 12.0)),
            legend_offset: 8.0,
        };
        let layout = ChartLayout::arrange(&spec);
        assert_eq!(layout.plot, Rect::new(40.0, 30.0, 390.0, 270.0));
        assert_eq!(layout.axis_bottom, Some(Rect::new(40.0, 270.0, 390.0, 290.0)));
        assert_eq!(layout.legend, Some(Rect::new(10.0, 10.0, 110.0, 22.0)));
    }

    #[test]
    fn tiny_boxes_do_not_invert() {
        let spec = ChartLayoutSpec {
            view_size: Size::new(5.0, 5.0),
            padding: Padding::uniform(10.0),
            ..ChartLayoutSpec::default()
        };
        let layout = ChartLayout::arrange(&spec);
        assert_eq!(layout.plot.width(), 0.0);
        assert_eq!(layout.plot.height(), 0.0);
    }
}
