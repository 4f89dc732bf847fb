// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom and pan state for maps.

use kurbo::{Affine, Point, Rect};
use tracing::debug;

/// Wheel delta units to zoom exponent.
const WHEEL_FACTOR: f64 = 0.002;
/// Degrees of globe rotation per dragged pixel at `k = 1`.
const DRAG_DEGREES_PER_PX: f64 = 0.25;
/// Share of the view a clicked feature fills.
const FEATURE_FILL: f64 = 0.9;

/// A uniform scale followed by a translation: `p * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    /// Scale factor.
    pub k: f64,
    /// Horizontal translation.
    pub x: f64,
    /// Vertical translation.
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    /// No zoom.
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    /// Maps a projected point to the screen.
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    /// Maps a screen point back to projected space.
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// The transform as an affine, for transforming paths.
    pub fn affine(&self) -> Affine {
        Affine::translate((self.x, self.y)) * Affine::scale(self.k)
    }
}

/// Zoom/pan state of one map.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomState {
    /// Current transform.
    pub transform: ZoomTransform,
    /// Upper end of the scale extent; the lower end is 1.
    pub max_zoom: f64,
    /// Key of the feature zoomed to by a click.
    pub zoomed_feature: Option<String>,
    /// Extra globe rotation in degrees, added to the configured rotation.
    pub rotate_x: f64,
    /// Extra globe tilt in degrees, clamped to `[-90, 90]`.
    pub rotate_y: f64,
}

impl ZoomState {
    /// Identity state with the given scale extent.
    pub fn new(max_zoom: f64) -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            max_zoom: max_zoom.max(1.0),
            zoomed_feature: None,
            rotate_x: 0.0,
            rotate_y: 0.0,
        }
    }

    /// Zooms around `anchor` by `2^(-delta_y * 0.002)`. Returns whether anything changed.
    pub fn wheel(&mut self, anchor: Point, delta_y: f64) -> bool {
        let t = self.transform;
        let k = (t.k * (-delta_y * WHEEL_FACTOR).exp2()).clamp(1.0, self.max_zoom);
        if k == t.k {
            return false;
        }
        let p = t.invert(anchor);
        self.set(ZoomTransform {
            k,
            x: anchor.x - p.x * k,
            y: anchor.y - p.y * k,
        });
        self.zoomed_feature = None;
        true
    }

    /// Pans by a pointer drag, or rotates the globe when `globe` is set.
    pub fn drag(&mut self, dx: f64, dy: f64, globe: bool) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        if globe {
            let step = DRAG_DEGREES_PER_PX / self.transform.k;
            self.rotate_x += dx * step;
            self.rotate_y = (self.rotate_y - dy * step).clamp(-90.0, 90.0);
            debug!(
                rotate_x = self.rotate_x,
                rotate_y = self.rotate_y,
                "globe rotated"
            );
        } else {
            let t = self.transform;
            self.set(ZoomTransform {
                x: t.x + dx,
                y: t.y + dy,
                ..t
            });
        }
        self.zoomed_feature = None;
        true
    }

    /// Zooms to fit `bounds` (in projected space) into `view`; clicking the same feature
    /// again resets.
    pub fn click_feature(&mut self, key: &str, bounds: Rect, view: Rect) {
        if self.zoomed_feature.as_deref() == Some(key) {
            self.reset();
            return;
        }
        let (dx, dy) = (bounds.width(), bounds.height());
        let fill = (dx / view.width()).max(dy / view.height());
        let k = if fill > 0.0 {
            (FEATURE_FILL / fill).clamp(1.0, self.max_zoom)
        } else {
            self.max_zoom
        };
        let (c, target) = (bounds.center(), view.center());
        self.set(ZoomTransform {
            k,
            x: target.x - k * c.x,
            y: target.y - k * c.y,
        });
        self.zoomed_feature = Some(key.to_string());
    }

    /// Back to the identity transform and no extra rotation.
    pub fn reset(&mut self) {
        self.set(ZoomTransform::IDENTITY);
        self.zoomed_feature = None;
        self.rotate_x = 0.0;
        self.rotate_y = 0.0;
    }

    fn set(&mut self, transform: ZoomTransform) {
        self.transform = transform;
        debug!(k = transform.k, x = transform.x, y = transform.y, "zoom changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_keeps_the_anchor_fixed_and_clamps() {
        let mut z = ZoomState::new(4.0);
        let anchor = Point::new(100.0, 50.0);
        let before = z.transform.invert(anchor);
        assert!(z.wheel(anchor, -500.0));
        assert!((z.transform.k - 2.0).abs() < 1e-9);
        let after = z.transform.invert(anchor);
        assert!((before - after).hypot() < 1e-9);

        z.wheel(anchor, -10_000.0);
        assert_eq!(z.transform.k, 4.0);
        assert!(!z.wheel(anchor, -100.0), "already at max");
        z.wheel(anchor, 10_000.0);
        assert_eq!(z.transform.k, 1.0);
    }

    #[test]
    fn second_click_on_a_feature_resets() {
        let mut z = ZoomState::new(8.0);
        let size = Rect::new(0.0, 0.0, 400.0, 200.0);
        let bounds = Rect::new(100.0, 50.0, 180.0, 70.0);
        z.click_feature("FR", bounds, size);
        let t = z.transform;
        assert!((t.k - 4.5).abs() < 1e-9, "{t:?}");
        let center = t.apply(bounds.center());
        assert!((center - Point::new(200.0, 100.0)).hypot() < 1e-9);
        assert_eq!(z.zoomed_feature.as_deref(), Some("FR"));

        z.click_feature("FR", bounds, size);
        assert_eq!(z.transform, ZoomTransform::IDENTITY);
        assert_eq!(z.zoomed_feature, None);
    }

    #[test]
    fn drag_pans_or_rotates() {
        let mut z = ZoomState::new(8.0);
        z.drag(10.0, -5.0, false);
        assert_eq!((z.transform.x, z.transform.y), (10.0, -5.0));
        z.drag(40.0, -1_000.0, true);
        assert_eq!(z.rotate_x, 10.0);
        assert_eq!(z.rotate_y, 90.0);
        assert!(!z.drag(0.0, 0.0, true));
    }

    #[test]
    fn affine_matches_apply() {
        let t = ZoomTransform {
            k: 2.0,
            x: 5.0,
            y: -3.0,
        };
        let p = Point::new(7.0, 11.0);
        assert!((t.affine() * p - t.apply(p)).hypot() < 1e-12);
        assert!((t.invert(t.apply(p)) - p).hypot() < 1e-12);
    }
}
