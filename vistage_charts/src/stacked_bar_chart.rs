// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stacked bar chart: horizontal stacks, categories top to bottom.

use crate::chart::{Chart, ChartFrame, ChartInput, Orientation};
use crate::stacked_column_chart::stacked_layout;

/// Horizontal stacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct StackedBarChart;

impl Chart for StackedBarChart {
    fn layout(&self, input: &ChartInput<'_>) -> ChartFrame {
        stacked_layout(input, Orientation::Horizontal)
    }
}
