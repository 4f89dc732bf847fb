// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map projections.
//!
//! A [`Projection`] rotates the sphere, applies a raw projection to unit coordinates, then
//! scales and translates into screen space with y pointing down. Orthographic projections
//! clip the far hemisphere: [`Projection::project`] returns `None` for positions on it.

use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use kurbo::{Point, Rect};
use serde::Deserialize;
use tracing::debug;

use crate::topojson::{Feature, LonLat};

/// Web Mercator latitude limit, where the map becomes square.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// The supported projections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectionKind {
    /// Conformal cylindrical; latitudes clamp to [`MERCATOR_MAX_LAT`].
    Mercator,
    /// Plate carrée.
    Equirectangular,
    /// A globe seen from infinitely far away.
    Orthographic,
    /// Pseudo-cylindrical world projection.
    #[default]
    NaturalEarth1,
}

impl ProjectionKind {
    /// Projects rotated radians to unit coordinates (y up).
    fn raw(self, lambda: f64, phi: f64) -> (f64, f64) {
        match self {
            Self::Mercator => {
                let phi = phi.clamp(-MERCATOR_MAX_LAT.to_radians(), MERCATOR_MAX_LAT.to_radians());
                (lambda, (FRAC_PI_4 + phi / 2.0).tan().ln())
            }
            Self::Equirectangular => (lambda, phi),
            Self::Orthographic => (phi.cos() * lambda.sin(), phi.sin()),
            Self::NaturalEarth1 => {
                let phi2 = phi * phi;
                let phi4 = phi2 * phi2;
                (
                    lambda
                        * (0.8707 - 0.131_979 * phi2
                            + phi4 * (-0.013_791 + phi4 * (0.003_971 * phi2 - 0.001_529 * phi4))),
                    phi * (1.007_226
                        + phi2 * (0.015_085 + phi4 * (-0.044_475 + 0.028_874 * phi2 - 0.005_916 * phi4))),
                )
            }
        }
    }

    /// Whether rotated radians are on the drawn side of the sphere.
    fn visible(self, lambda: f64, phi: f64) -> bool {
        match self {
            Self::Orthographic => phi.cos() * lambda.cos() >= 0.0,
            _ => true,
        }
    }
}

/// A configured projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Raw projection.
    pub kind: ProjectionKind,
    /// Pixels per unit.
    pub scale: f64,
    /// Screen position of the projection origin.
    pub translate: Point,
    /// Rotation in degrees: `(lambda, phi)`, applied before projecting.
    pub rotate: (f64, f64),
}

impl Projection {
    /// A projection with unit scale, no translation and no rotation.
    pub fn new(kind: ProjectionKind) -> Self {
        Self {
            kind,
            scale: 1.0,
            translate: Point::ZERO,
            rotate: (0.0, 0.0),
        }
    }

    /// Sets the rotation in degrees.
    pub fn with_rotation(mut self, lambda: f64, phi: f64) -> Self {
        self.rotate = (lambda, phi);
        self
    }

    /// Sets the scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the translation.
    pub fn with_translate(mut self, translate: Point) -> Self {
        self.translate = translate;
        self
    }

    /// The position currently at the center of the projection.
    pub fn center(&self) -> LonLat {
        LonLat::new(-self.rotate.0, -self.rotate.1)
    }

    /// Rotates a position and converts it to radians.
    fn rotated(&self, p: LonLat) -> (f64, f64) {
        let (d_lambda, d_phi) = (self.rotate.0.to_radians(), self.rotate.1.to_radians());
        let mut lambda = p.lon.to_radians() + d_lambda;
        if lambda > PI {
            lambda -= 2.0 * PI;
        } else if lambda < -PI {
            lambda += 2.0 * PI;
        }
        let phi = p.lat.to_radians();
        if d_phi == 0.0 {
            return (lambda, phi);
        }
        let (sin_d, cos_d) = d_phi.sin_cos();
        let cos_phi = phi.cos();
        let x = lambda.cos() * cos_phi;
        let y = lambda.sin() * cos_phi;
        let z = phi.sin();
        let k = z * cos_d + x * sin_d;
        (y.atan2(x * cos_d - z * sin_d), k.clamp(-1.0, 1.0).asin())
    }

    /// Projects `p` to screen coordinates; `None` when it is clipped.
    pub fn project(&self, p: LonLat) -> Option<Point> {
        let (lambda, phi) = self.rotated(p);
        if !self.kind.visible(lambda, phi) {
            return None;
        }
        let (x, y) = self.kind.raw(lambda, phi);
        Some(Point::new(
            self.translate.x + x * self.scale,
            self.translate.y - y * self.scale,
        ))
    }

    /// Screen bounds of the whole sphere (the globe disc for orthographic).
    pub fn sphere_bounds(&self) -> Rect {
        let (w, h) = match self.kind {
            ProjectionKind::Orthographic => (1.0, 1.0),
            ProjectionKind::Equirectangular => (PI, FRAC_PI_2),
            ProjectionKind::Mercator => (PI, self.kind.raw(0.0, FRAC_PI_2).1),
            ProjectionKind::NaturalEarth1 => (
                self.kind.raw(PI, 0.0).0,
                self.kind.raw(0.0, FRAC_PI_2).1,
            ),
        };
        Rect::new(
            self.translate.x - w * self.scale,
            self.translate.y - h * self.scale,
            self.translate.x + w * self.scale,
            self.translate.y + h * self.scale,
        )
    }

    /// Scales and translates so `features` fill `extent`, keeping the aspect ratio.
    ///
    /// With no projectable positions the projection is fitted to the whole sphere.
    pub fn fit_extent(mut self, extent: Rect, features: &[Feature]) -> Self {
        self.scale = 1.0;
        self.translate = Point::ZERO;
        let mut bounds: Option<Rect> = None;
        for feature in features {
            feature.geometry.for_each_position(&mut |p| {
                if let Some(q) = self.project(p) {
                    bounds = Some(match bounds {
                        None => Rect::from_points(q, q),
                        Some(b) => b.union_pt(q),
                    });
                }
            });
        }
        let b = match (self.kind, bounds) {
            (ProjectionKind::Orthographic, _) | (_, None) => self.sphere_bounds(),
            (_, Some(b)) => b,
        };
        let (bw, bh) = (b.width(), b.height());
        if !(bw > 0.0 || bh > 0.0) {
            self.translate = extent.center();
            return self;
        }
        let k = match (bw > 0.0, bh > 0.0) {
            (true, true) => (extent.width() / bw).min(extent.height() / bh),
            (true, false) => extent.width() / bw,
            _ => extent.height() / bh,
        };
        self.scale = k;
        self.translate = Point::new(
            extent.x0 + (extent.width() - k * (b.x0 + b.x1)) / 2.0,
            extent.y0 + (extent.height() - k * (b.y0 + b.y1)) / 2.0,
        );
        debug!(kind = ?self.kind, scale = k, "projection fitted");
        self
    }
}

/// Great-circle distance between two positions, in degrees.
pub fn angular_distance(a: LonLat, b: LonLat) -> f64 {
    let (phi1, phi2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_phi = phi2 - phi1;
    let d_lambda = (b.lon - a.lon).to_radians();
    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    (2.0 * h.sqrt().clamp(0.0, 1.0).asin()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topojson::Geometry;
    use serde_json::Value;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    #[test]
    fn equirectangular_maps_degrees_linearly() {
        let p = Projection::new(ProjectionKind::Equirectangular)
            .with_scale(2.0)
            .with_translate(Point::new(100.0, 50.0));
        let q = p.project(LonLat::new(90.0, 45.0)).unwrap();
        assert!(close(q, Point::new(100.0 + PI, 50.0 - FRAC_PI_4 * 2.0)));
    }

    #[test]
    fn mercator_clamps_the_poles() {
        let p = Projection::new(ProjectionKind::Mercator);
        let pole = p.project(LonLat::new(0.0, 90.0)).unwrap();
        let limit = p.project(LonLat::new(0.0, MERCATOR_MAX_LAT)).unwrap();
        assert!(close(pole, limit));
        assert!((limit.y + PI).abs() < 1e-6, "square at the limit: {limit:?}");
    }

    #[test]
    fn orthographic_hides_the_far_side_and_follows_rotation() {
        let p = Projection::new(ProjectionKind::Orthographic);
        assert!(p.project(LonLat::new(0.0, 0.0)).is_some());
        assert!(p.project(LonLat::new(180.0, 0.0)).is_none());
        let turned = p.with_rotation(-180.0, 0.0);
        assert!(close(turned.project(LonLat::new(180.0, 0.0)).unwrap(), Point::ZERO));
        assert_eq!(turned.center(), LonLat::new(180.0, 0.0));
        let tilted = p.with_rotation(0.0, -45.0);
        let c = tilted.project(LonLat::new(0.0, 45.0)).unwrap();
        assert!(close(c, Point::ZERO), "tilted center {c:?}");
    }

    #[test]
    fn natural_earth_is_symmetric() {
        let p = Projection::new(ProjectionKind::NaturalEarth1);
        let a = p.project(LonLat::new(30.0, 20.0)).unwrap();
        let b = p.project(LonLat::new(-30.0, -20.0)).unwrap();
        assert!(close(a, Point::new(-b.x, -b.y)));
        assert!(a.x > 0.0 && a.y < 0.0);
    }

    #[test]
    fn fit_extent_centers_and_fills() {
        let square = Feature {
            id: None,
            properties: Value::Null,
            geometry: Geometry::Polygon(vec![vec![
                LonLat::new(-10.0, -10.0),
                LonLat::new(10.0, -10.0),
                LonLat::new(10.0, 10.0),
                LonLat::new(-10.0, 10.0),
                LonLat::new(-10.0, -10.0),
            ]]),
        };
        let extent = Rect::new(0.0, 0.0, 400.0, 200.0);
        let p = Projection::new(ProjectionKind::Equirectangular).fit_extent(extent, &[square]);
        let a = p.project(LonLat::new(-10.0, 10.0)).unwrap();
        let b = p.project(LonLat::new(10.0, -10.0)).unwrap();
        assert!(close(a, Point::new(100.0, 0.0)), "{a:?}");
        assert!(close(b, Point::new(300.0, 200.0)), "{b:?}");
    }

    #[test]
    fn angular_distance_is_great_circle() {
        let d = angular_distance(LonLat::new(0.0, 0.0), LonLat::new(90.0, 0.0));
        assert!((d - 90.0).abs() < 1e-9);
        let d = angular_distance(LonLat::new(10.0, 90.0), LonLat::new(-120.0, 90.0));
        assert!(d.abs() < 1e-6);
    }
}
