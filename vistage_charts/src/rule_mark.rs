// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule mark generation.
//!
//! A "rule" is a straight stroked segment: axis domain lines, ticks, gridlines and map
//! annotation leaders.

use kurbo::BezPath;
use peniko::Brush;
use peniko::color::palette::css;
use vistage_core::{Mark, MarkId, MarkState};

use crate::z_order;

/// A rule mark spec (a stroked line segment).
#[derive(Clone, Debug)]
pub struct RuleMarkSpec {
    /// Stable mark id.
    pub id: MarkId,
    /// Start point x in scene coordinates.
    pub x0: f64,
    /// Start point y in scene coordinates.
    pub y0: f64,
    /// End point x in scene coordinates.
    pub x1: f64,
    /// End point y in scene coordinates.
    pub y1: f64,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
    /// Rendering order hint.
    pub z_index: i32,
    /// Interaction state.
    pub state: MarkState,
}

impl RuleMarkSpec {
    /// Creates a new rule between two points.
    pub fn new(id: MarkId, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            id,
            x0,
            y0,
            x1,
            y1,
            stroke: Brush::Solid(css::BLACK),
            stroke_width: 1.0,
            z_index: z_order::AXIS_RULES,
            state: MarkState::default(),
        }
    }

    /// Creates a horizontal rule.
    pub fn horizontal(id: MarkId, y: f64, x0: f64, x1: f64) -> Self {
        Self::new(id, x0, y, x1, y)
    }

    /// Creates a vertical rule.
    pub fn vertical(id: MarkId, x: f64, y0: f64, y1: f64) -> Self {
        Self::new(id, x, y0, x, y1)
    }

    /// Sets stroke paint and width.
    pub fn with_stroke(mut self, stroke: impl Into<Brush>, stroke_width: f64) -> Self {
        self.stroke = stroke.into();
        self.stroke_width = stroke_width;
        self
    }

    /// Sets the z-index used for render ordering.
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the interaction state.
    pub fn with_state(mut self, state: MarkState) -> Self {
        self.state = state;
        self
    }

    /// Generates the rule mark.
    pub fn mark(&self) -> Mark {
        let mut p = BezPath::new();
        p.move_to((self.x0, self.y0));
        p.line_to((self.x1, self.y1));
        Mark::builder(self.id)
            .z_index(self.z_index)
            .state(self.state)
            .path(p)
            .fill(css::TRANSPARENT)
            .stroke(self.stroke.clone(), self.stroke_width)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistage_core::MarkPayload;

    #[test]
    fn vertical_rule_is_a_stroked_two_point_path() {
        let m = RuleMarkSpec::vertical(MarkId(1), 5.0, 0.0, 10.0)
            .with_stroke(css::RED, 2.0)
            .mark();
        let MarkPayload::Path(p) = &m.payload else {
            panic!("expected a path payload");
        };
        assert_eq!(p.stroke_width, 2.0);
        assert_eq!(p.path.elements().len(), 2);
        assert_eq!(m.bounds().map(|b| (b.x0, b.y1)), Some((5.0, 10.0)));
    }
}
