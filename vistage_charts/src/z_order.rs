// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart- and map-generated marks.
//!
//! Renderers sort by `(z_index, MarkId)`, so these values only need to be coarse.

/// Plot background fills.
pub const PLOT_BACKGROUND: i32 = -100;
/// Gridlines drawn behind series.
pub const GRID_LINES: i32 = -50;

/// Map feature fills.
pub const MAP_FEATURES: i32 = -10;
/// Map feature borders.
pub const MAP_BORDERS: i32 = -5;

/// Filled series marks (bars, columns, symbols).
pub const SERIES_FILL: i32 = 0;
/// Stroked series marks (lines, rules).
pub const SERIES_STROKE: i32 = 10;
/// Point series marks drawn above lines.
pub const SERIES_POINTS: i32 = 20;
/// Direct value labels.
pub const DIRECT_LABELS: i32 = 25;

/// Axis domain line and tick marks.
pub const AXIS_RULES: i32 = 30;
/// Axis tick labels.
pub const AXIS_LABELS: i32 = 40;

/// Legend swatches.
pub const LEGEND_SWATCHES: i32 = 60;
/// Legend labels.
pub const LEGEND_LABELS: i32 = 70;
/// Map annotations.
pub const ANNOTATIONS: i32 = 80;
