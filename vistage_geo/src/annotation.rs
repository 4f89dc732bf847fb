// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map annotations: a labelled dot at a geographic position.
//!
//! Annotations never look up their map. The map hands each one a read-only [`MapContext`]
//! holding the view rectangle, the zoom transform and the projection.

use kurbo::{Circle, Point, Rect, Shape, Vec2};
use peniko::Color;
use serde::Deserialize;
use vistage_charts::{HeuristicTextMeasurer, TextMarkSpec, TextMeasurer, color};
use vistage_core::{Mark, MarkId, TextAnchor, TextBaseline};

use crate::projection::{Projection, ProjectionKind, angular_distance};
use crate::topojson::LonLat;
use crate::zoom::ZoomTransform;

const ANNOTATION_ID_BASE: u64 = 200_000;

/// Where the label sits relative to the dot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
#[expect(missing_docs, reason = "compass placements")]
pub enum Placement {
    Center,
    #[default]
    Top,
    TopLeft,
    TopRight,
    Left,
    Right,
    Bottom,
    BottomLeft,
    BottomRight,
}

impl Placement {
    /// Unit offset direction, text anchor and baseline.
    fn layout(self) -> (Vec2, TextAnchor, TextBaseline) {
        use TextAnchor::{End, Middle as Mid, Start};
        use TextBaseline::{Alphabetic, Hanging, Middle};
        match self {
            Self::Center => (Vec2::ZERO, Mid, Middle),
            Self::Top => (Vec2::new(0.0, -1.0), Mid, Alphabetic),
            Self::TopLeft => (Vec2::new(-1.0, -1.0), End, Alphabetic),
            Self::TopRight => (Vec2::new(1.0, -1.0), Start, Alphabetic),
            Self::Left => (Vec2::new(-1.0, 0.0), End, Middle),
            Self::Right => (Vec2::new(1.0, 0.0), Start, Middle),
            Self::Bottom => (Vec2::new(0.0, 1.0), Mid, Hanging),
            Self::BottomLeft => (Vec2::new(-1.0, 1.0), End, Hanging),
            Self::BottomRight => (Vec2::new(1.0, 1.0), Start, Hanging),
        }
    }
}

/// What a map exposes to its annotations.
#[derive(Clone, Copy, Debug)]
pub struct MapContext<'a> {
    /// The map's view rectangle.
    pub rect: Rect,
    /// Current zoom transform.
    pub transform: ZoomTransform,
    /// Current projection, rotation included.
    pub projection: &'a Projection,
}

impl MapContext<'_> {
    /// Projects and zooms a position to the screen.
    pub fn project(&self, p: LonLat) -> Option<Point> {
        self.projection.project(p).map(|q| self.transform.apply(q))
    }
}

/// A positioned annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationLayout {
    /// Screen position of the dot.
    pub anchor: Point,
    /// Screen position of the label anchor.
    pub label: Point,
    /// Horizontal text alignment.
    pub text_anchor: TextAnchor,
    /// Vertical text alignment.
    pub baseline: TextBaseline,
    /// Multiplier applied to font size, dot radius and offset.
    pub scale: f64,
    /// Approximate label bounds.
    pub bounds: Rect,
}

/// A labelled point on a map.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    /// Stable id, unique among a map's annotations.
    pub id: u64,
    /// Geographic position.
    pub position: LonLat,
    /// Label text.
    pub text: String,
    /// Label placement.
    pub placement: Placement,
    /// Gap between dot and label.
    pub offset: f64,
    /// Keeps the on-screen size constant while zooming.
    pub scale: bool,
    /// Hidden past this angular distance (degrees) from the projection center.
    ///
    /// `None` means 90 degrees for orthographic projections and no limit otherwise.
    pub max_angle: Option<f64>,
    /// Label font size.
    pub font_size: f64,
    /// Dot radius; 0 draws no dot.
    pub radius: f64,
    /// Dot and label color.
    pub fill: Color,
}

impl Annotation {
    /// A top-placed annotation with default styling.
    pub fn new(id: u64, position: LonLat, text: impl Into<String>) -> Self {
        Self {
            id,
            position,
            text: text.into(),
            placement: Placement::default(),
            offset: 6.0,
            scale: true,
            max_angle: None,
            font_size: 12.0,
            radius: 3.0,
            fill: color::TEXT,
        }
    }

    /// Sets the placement.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the dot/label gap.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Enables or disables zoom counter-scaling.
    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the visibility angle in degrees.
    pub fn with_max_angle(mut self, max_angle: f64) -> Self {
        self.max_angle = Some(max_angle);
        self
    }

    /// Sets the font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the dot radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the color.
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = fill;
        self
    }

    fn visible_angle(&self, projection: &Projection) -> Option<f64> {
        self.max_angle
            .or((projection.kind == ProjectionKind::Orthographic).then_some(90.0))
    }

    /// Lays the annotation out, or `None` when it is hidden.
    pub fn position(&self, ctx: &MapContext<'_>) -> Option<AnnotationLayout> {
        if let Some(max) = self.visible_angle(ctx.projection)
            && angular_distance(ctx.projection.center(), self.position) > max
        {
            return None;
        }
        let anchor = ctx.project(self.position)?;
        let k = ctx.transform.k;
        let scale = if self.scale { 1.0 } else { k };
        let (dir, text_anchor, baseline) = self.placement.layout();
        let label = anchor + dir * (self.offset * scale);
        let (w, h) = HeuristicTextMeasurer.measure(&self.text, self.font_size * scale);
        let x0 = match text_anchor {
            TextAnchor::Start => label.x,
            TextAnchor::Middle => label.x - w / 2.0,
            TextAnchor::End => label.x - w,
        };
        let y0 = match baseline {
            TextBaseline::Hanging => label.y,
            TextBaseline::Middle => label.y - h / 2.0,
            TextBaseline::Alphabetic | TextBaseline::Ideographic => label.y - h,
        };
        Some(AnnotationLayout {
            anchor,
            label,
            text_anchor,
            baseline,
            scale,
            bounds: Rect::new(x0, y0, x0 + w, y0 + h),
        })
    }

    /// The dot and label marks, empty when hidden.
    pub fn marks(&self, ctx: &MapContext<'_>) -> Vec<Mark> {
        let Some(layout) = self.position(ctx) else {
            return Vec::new();
        };
        let base = ANNOTATION_ID_BASE + self.id * 2;
        let mut marks = Vec::with_capacity(2);
        if self.radius > 0.0 {
            marks.push(
                Mark::builder(MarkId::from_raw(base))
                    .z_index(vistage_charts::ANNOTATIONS)
                    .path(Circle::new(layout.anchor, self.radius * layout.scale).to_path(0.1))
                    .fill(self.fill)
                    .build(),
            );
        }
        marks.push(
            TextMarkSpec::new(MarkId::from_raw(base + 1), layout.label, self.text.clone())
                .with_font_size(self.font_size * layout.scale)
                .with_fill(self.fill)
                .with_anchor(layout.text_anchor)
                .with_baseline(layout.baseline)
                .with_z_index(vistage_charts::ANNOTATIONS)
                .mark(),
        );
        marks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistage_core::MarkPayload;

    fn plate() -> Projection {
        Projection::new(ProjectionKind::Equirectangular).with_scale(180.0 / core::f64::consts::PI)
    }

    fn ctx(projection: &Projection, k: f64) -> MapContext<'_> {
        MapContext {
            rect: Rect::new(0.0, 0.0, 400.0, 200.0),
            transform: ZoomTransform { k, x: 0.0, y: 0.0 },
            projection,
        }
    }

    #[test]
    fn placement_offsets_the_label() {
        let p = plate();
        let a = Annotation::new(0, LonLat::new(10.0, 0.0), "Here")
            .with_placement(Placement::BottomRight)
            .with_offset(4.0);
        let l = a.position(&ctx(&p, 1.0)).unwrap();
        assert_eq!(l.anchor, Point::new(10.0, 0.0));
        assert_eq!(l.label, Point::new(14.0, 4.0));
        assert_eq!(l.text_anchor, TextAnchor::Start);
        assert_eq!(l.baseline, TextBaseline::Hanging);
        assert!(l.bounds.x0 == 14.0 && l.bounds.y0 == 4.0);
    }

    #[test]
    fn counter_scaling_keeps_screen_size() {
        let p = plate();
        let fixed = Annotation::new(0, LonLat::new(10.0, 0.0), "x");
        let growing = fixed.clone().with_scale(false);
        let zoomed = ctx(&p, 4.0);
        let font = |marks: Vec<Mark>| match &marks[1].payload {
            MarkPayload::Text(t) => t.font_size,
            other => panic!("expected text, got {other:?}"),
        };
        assert_eq!(font(fixed.marks(&zoomed)), 12.0);
        assert_eq!(font(growing.marks(&zoomed)), 48.0);
        assert_eq!(fixed.position(&zoomed).unwrap().anchor, Point::new(40.0, 0.0));
    }

    #[test]
    fn far_side_annotations_hide_on_globes() {
        let globe = Projection::new(ProjectionKind::Orthographic).with_scale(100.0);
        let back = Annotation::new(1, LonLat::new(120.0, 0.0), "Back");
        let front = Annotation::new(2, LonLat::new(60.0, 0.0), "Front");
        assert!(back.marks(&ctx(&globe, 1.0)).is_empty());
        assert_eq!(front.marks(&ctx(&globe, 1.0)).len(), 2);
        let tight = front.clone().with_max_angle(45.0);
        assert!(tight.position(&ctx(&globe, 1.0)).is_none());
        let flat = plate();
        assert!(back.position(&ctx(&flat, 1.0)).is_some());
    }

    #[test]
    fn placements_parse_lowercase() {
        let p: Placement = serde_json::from_str("\"bottomleft\"").unwrap();
        assert_eq!(p, Placement::BottomLeft);
    }
}
