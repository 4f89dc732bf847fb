// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Marks: stable-identity geometry with paint.

use alloc::string::String;

use kurbo::{BezPath, Point, Rect, Shape};
use peniko::Brush;
use peniko::color::palette::css;

/// A stable identifier for a mark.
///
/// Identity is what lets a [`crate::Scene`] turn two frames into updates instead of a full
/// exit/enter churn, so generators derive ids deterministically from their inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Wraps a raw id.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Derives an id for a data row from a generator namespace and a row key.
    ///
    /// The mix is a `SplitMix64` finalizer, so nearby namespaces and keys do not collide in
    /// practice.
    pub fn for_row(namespace: u64, row_key: u64) -> Self {
        let mut z = namespace
            .rotate_left(32)
            .wrapping_add(row_key)
            .wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self(z ^ (z >> 31))
    }
}

/// Horizontal text anchor, matching SVG `text-anchor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Text starts at the anchor point.
    Start,
    /// Text is centered on the anchor point.
    Middle,
    /// Text ends at the anchor point.
    End,
}

/// Vertical text baseline, matching SVG `dominant-baseline`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// The anchor is the vertical middle of the text.
    Middle,
    /// The anchor is the alphabetic baseline.
    Alphabetic,
    /// The anchor is the top of the text.
    Hanging,
    /// The anchor is the ideographic (bottom) baseline.
    Ideographic,
}

/// Interaction state carried by a mark.
///
/// Renderers use this for styling hooks (e.g. SVG classes); components already bake the
/// resulting colors into the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MarkState {
    /// The mark belongs to a highlighted row or series.
    pub highlighted: bool,
    /// Another row or series is highlighted and this mark is de-emphasized.
    pub dimmed: bool,
    /// The mark is a placeholder (e.g. a missing value) and should not be painted.
    pub hidden: bool,
}

/// Rectangle payload.
#[derive(Clone, Debug, PartialEq)]
pub struct RectPayload {
    /// Geometry in scene coordinates.
    pub rect: Rect,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width; `0` disables stroking.
    pub stroke_width: f64,
}

/// Text payload (unshaped).
#[derive(Clone, Debug, PartialEq)]
pub struct TextPayload {
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content.
    pub text: String,
    /// Font size in scene coordinates.
    pub font_size: f64,
    /// Font weight (`400` normal, `700` bold).
    pub font_weight: u16,
    /// Rotation around `pos`, in degrees.
    pub angle: f64,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical baseline.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
}

/// Path payload.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPayload {
    /// Geometry in scene coordinates.
    pub path: BezPath,
    /// Fill paint.
    pub fill: Brush,
    /// Stroke paint.
    pub stroke: Brush,
    /// Stroke width; `0` disables stroking.
    pub stroke_width: f64,
}

/// The geometry + paint of a mark.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkPayload {
    /// A filled rectangle.
    Rect(RectPayload),
    /// A text run.
    Text(TextPayload),
    /// An arbitrary path.
    Path(PathPayload),
}

impl MarkPayload {
    /// Returns geometric bounds, if cheaply known.
    ///
    /// Text has no bounds at this level (no shaping); callers that need them measure text
    /// themselves.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            Self::Path(p) => {
                if p.path.elements().is_empty() {
                    None
                } else {
                    Some(p.path.bounding_box())
                }
            }
            Self::Text(_) => None,
        }
    }
}

/// A single renderable item with stable identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable id.
    pub id: MarkId,
    /// Paint order; renderers sort by `(z_index, id)`.
    pub z_index: i32,
    /// Interaction state.
    pub state: MarkState,
    /// Geometry + paint.
    pub payload: MarkPayload,
}

impl Mark {
    /// Starts building a mark with the given id.
    pub fn builder(id: MarkId) -> MarkBuilder {
        MarkBuilder {
            id,
            z_index: 0,
            state: MarkState::default(),
        }
    }

    /// Returns the payload bounds, if known.
    pub fn bounds(&self) -> Option<Rect> {
        self.payload.bounds()
    }
}

/// Shared builder state (id, z-index, interaction state).
#[derive(Clone, Copy, Debug)]
pub struct MarkBuilder {
    id: MarkId,
    z_index: i32,
    state: MarkState,
}

impl MarkBuilder {
    /// Sets the paint order.
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the full interaction state.
    pub fn state(mut self, state: MarkState) -> Self {
        self.state = state;
        self
    }

    /// Marks the mark as highlighted.
    pub fn highlighted(mut self, highlighted: bool) -> Self {
        self.state.highlighted = highlighted;
        self
    }

    /// Marks the mark as dimmed.
    pub fn dimmed(mut self, dimmed: bool) -> Self {
        self.state.dimmed = dimmed;
        self
    }

    /// Marks the mark as hidden.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.state.hidden = hidden;
        self
    }

    /// Continues as a rectangle mark.
    pub fn rect(self, rect: Rect) -> RectMarkBuilder {
        RectMarkBuilder {
            base: self,
            payload: RectPayload {
                rect,
                fill: Brush::Solid(css::BLACK),
                stroke: Brush::Solid(css::TRANSPARENT),
                stroke_width: 0.0,
            },
        }
    }

    /// Continues as a text mark.
    pub fn text(self, pos: impl Into<Point>, text: impl Into<String>) -> TextMarkBuilder {
        TextMarkBuilder {
            base: self,
            payload: TextPayload {
                pos: pos.into(),
                text: text.into(),
                font_size: 12.0,
                font_weight: 400,
                angle: 0.0,
                anchor: TextAnchor::Start,
                baseline: TextBaseline::Alphabetic,
                fill: Brush::Solid(css::BLACK),
            },
        }
    }

    /// Continues as a path mark.
    pub fn path(self, path: BezPath) -> PathMarkBuilder {
        PathMarkBuilder {
            base: self,
            payload: PathPayload {
                path,
                fill: Brush::Solid(css::TRANSPARENT),
                stroke: Brush::Solid(css::BLACK),
                stroke_width: 0.0,
            },
        }
    }

    fn finish(self, payload: MarkPayload) -> Mark {
        Mark {
            id: self.id,
            z_index: self.z_index,
            state: self.state,
            payload,
        }
    }
}

/// Builder for [`RectPayload`] marks.
#[derive(Clone, Debug)]
pub struct RectMarkBuilder {
    base: MarkBuilder,
    payload: RectPayload,
}

impl RectMarkBuilder {
    /// Sets the fill paint.
    pub fn fill(mut self, fill: impl Into<Brush>) -> Self {
        self.payload.fill = fill.into();
        self
    }

    /// Sets stroke paint and width.
    pub fn stroke(mut self, stroke: impl Into<Brush>, stroke_width: f64) -> Self {
        self.payload.stroke = stroke.into();
        self.payload.stroke_width = stroke_width;
        self
    }

    /// Finishes the mark.
    pub fn build(self) -> Mark {
        self.base.finish(MarkPayload::Rect(self.payload))
    }
}

/// Builder for [`TextPayload`] marks.
#[derive(Clone, Debug)]
pub struct TextMarkBuilder {
    base: MarkBuilder,
    payload: TextPayload,
}

impl TextMarkBuilder {
    /// Sets the font size.
    pub fn font_size(mut self, font_size: f64) -> Self {
        self.payload.font_size = font_size;
        self
    }

    /// Sets the font weight.
    pub fn font_weight(mut self, font_weight: u16) -> Self {
        self.payload.font_weight = font_weight;
        self
    }

    /// Sets the rotation angle in degrees.
    pub fn angle(mut self, angle: f64) -> Self {
        self.payload.angle = angle;
        self
    }

    /// Sets the horizontal anchor.
    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.payload.anchor = anchor;
        self
    }

    /// Sets the vertical baseline.
    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.payload.baseline = baseline;
        self
    }

    /// Sets the fill paint.
    pub fn fill(mut self, fill: impl Into<Brush>) -> Self {
        self.payload.fill = fill.into();
        self
    }

    /// Finishes the mark.
    pub fn build(self) -> Mark {
        self.base.finish(MarkPayload::Text(self.payload))
    }
}

/// Builder for [`PathPayload`] marks.
#[derive(Clone, Debug)]
pub struct PathMarkBuilder {
    base: MarkBuilder,
    payload: PathPayload,
}

impl PathMarkBuilder {
    /// Sets the fill paint.
    pub fn fill(mut self, fill: impl Into<Brush>) -> Self {
        self.payload.fill = fill.into();
        self
    }

    /// Sets stroke paint and width.
    pub fn stroke(mut self, stroke: impl Into<Brush>, stroke_width: f64) -> Self {
        self.payload.stroke = stroke.into();
        self.payload.stroke_width = stroke_width;
        self
    }

    /// Finishes the mark.
    pub fn build(self) -> Mark {
        self.base.finish(MarkPayload::Path(self.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_ids_are_distinct_across_namespaces_and_keys() {
        let a = MarkId::for_row(1, 0);
        let b = MarkId::for_row(1, 1);
        let c = MarkId::for_row(2, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, MarkId::for_row(1, 0));
    }

    #[test]
    fn builder_carries_state_and_bounds() {
        let m = Mark::builder(MarkId::from_raw(7))
            .z_index(3)
            .highlighted(true)
            .rect(Rect::new(0.0, 0.0, 10.0, 5.0))
            .fill(css::RED)
            .build();
        assert_eq!(m.z_index, 3);
        assert!(m.state.highlighted);
        assert!(!m.state.dimmed);
        assert_eq!(m.bounds(), Some(Rect::new(0.0, 0.0, 10.0, 5.0)));
    }
}
