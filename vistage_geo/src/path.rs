// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry to screen paths.

use kurbo::{BezPath, Circle, Point, Rect, Shape};

use crate::projection::{Projection, ProjectionKind};
use crate::topojson::{Geometry, LonLat};

/// Projects `geometry` into a path.
///
/// Points become small circles. Positions the projection rejects (the far side of a globe)
/// are culled, not clipped: rings with fewer than three visible vertices are dropped, and
/// lines restart after a culled run.
pub fn geometry_path(geometry: &Geometry, projection: &Projection) -> BezPath {
    let mut path = BezPath::new();
    append(&mut path, geometry, projection);
    path
}

/// Projects a list of lines (a border mesh) into one path.
pub fn lines_path(lines: &[Vec<LonLat>], projection: &Projection) -> BezPath {
    let mut path = BezPath::new();
    for line in lines {
        append_line(&mut path, line, projection);
    }
    path
}

fn append(path: &mut BezPath, geometry: &Geometry, projection: &Projection) {
    match geometry {
        Geometry::Point(p) => append_point(path, *p, projection),
        Geometry::MultiPoint(ps) => {
            for p in ps {
                append_point(path, *p, projection);
            }
        }
        Geometry::LineString(line) => append_line(path, line, projection),
        Geometry::MultiLineString(lines) => {
            for line in lines {
                append_line(path, line, projection);
            }
        }
        Geometry::Polygon(rings) => {
            for ring in rings {
                append_ring(path, ring, projection);
            }
        }
        Geometry::MultiPolygon(polygons) => {
            for ring in polygons.iter().flatten() {
                append_ring(path, ring, projection);
            }
        }
        Geometry::Collection(geometries) => {
            for g in geometries {
                append(path, g, projection);
            }
        }
    }
}

const POINT_RADIUS: f64 = 4.5;

fn append_point(path: &mut BezPath, p: LonLat, projection: &Projection) {
    if let Some(q) = projection.project(p) {
        path.extend(Circle::new(q, POINT_RADIUS).path_elements(0.1));
    }
}

fn append_line(path: &mut BezPath, line: &[LonLat], projection: &Projection) {
    let mut pen_down = false;
    for p in line {
        match projection.project(*p) {
            Some(q) if pen_down => path.line_to(q),
            Some(q) => {
                path.move_to(q);
                pen_down = true;
            }
            None => pen_down = false,
        }
    }
}

/// Joins the visible vertices of `ring` with straight segments. A ring crossing the horizon
/// is not cut at the horizon circle; its remaining vertices are joined by a chord.
fn append_ring(path: &mut BezPath, ring: &[LonLat], projection: &Projection) {
    let visible: Vec<Point> = ring.iter().filter_map(|p| projection.project(*p)).collect();
    if visible.len() < 3 {
        return;
    }
    path.move_to(visible[0]);
    for q in &visible[1..] {
        path.line_to(*q);
    }
    path.close_path();
}

/// Screen bounds of the visible parts of `geometry`.
pub fn projected_bounds(geometry: &Geometry, projection: &Projection) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    geometry.for_each_position(&mut |p| {
        if let Some(q) = projection.project(p) {
            bounds = Some(bounds.map_or(Rect::from_points(q, q), |b| b.union_pt(q)));
        }
    });
    bounds
}

/// Visual center of `geometry` in screen space.
///
/// Polygons use the area centroid of their largest visible ring; everything else, and
/// degenerate rings, the mean of the visible vertices.
pub fn centroid(geometry: &Geometry, projection: &Projection) -> Option<Point> {
    let mut best: Option<(f64, Point)> = None;
    let mut rings = Vec::new();
    collect_outer_rings(geometry, &mut rings);
    for ring in rings {
        let pts: Vec<Point> = ring.iter().filter_map(|p| projection.project(*p)).collect();
        if let Some((area, c)) = ring_centroid(&pts)
            && best.is_none_or(|(a, _)| area > a)
        {
            best = Some((area, c));
        }
    }
    if let Some((_, c)) = best {
        return Some(c);
    }
    let (mut sum, mut n) = (Point::ZERO, 0_usize);
    geometry.for_each_position(&mut |p| {
        if let Some(q) = projection.project(p) {
            sum = Point::new(sum.x + q.x, sum.y + q.y);
            n += 1;
        }
    });
    (n > 0).then(|| Point::new(sum.x / n as f64, sum.y / n as f64))
}

fn collect_outer_rings<'a>(geometry: &'a Geometry, out: &mut Vec<&'a [LonLat]>) {
    match geometry {
        Geometry::Polygon(rings) => out.extend(rings.first().map(Vec::as_slice)),
        Geometry::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|p| p.first().map(Vec::as_slice)));
        }
        Geometry::Collection(geometries) => {
            for g in geometries {
                collect_outer_rings(g, out);
            }
        }
        _ => {}
    }
}

/// `(|area|, centroid)` of a closed polygon, or `None` when it has no area.
fn ring_centroid(pts: &[Point]) -> Option<(f64, Point)> {
    if pts.len() < 3 {
        return None;
    }
    let (mut a, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for (i, p) in pts.iter().enumerate() {
        let q = pts[(i + 1) % pts.len()];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    if a.abs() < 1e-12 {
        return None;
    }
    Some((a.abs() / 2.0, Point::new(cx / (3.0 * a), cy / (3.0 * a))))
}

/// The outline of the globe, for orthographic projections.
pub fn sphere_outline(projection: &Projection) -> Option<BezPath> {
    (projection.kind == ProjectionKind::Orthographic)
        .then(|| Circle::new(projection.translate, projection.scale).to_path(0.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;

    fn square(x: f64, y: f64, d: f64) -> Geometry {
        Geometry::Polygon(vec![vec![
            LonLat::new(x, y),
            LonLat::new(x + d, y),
            LonLat::new(x + d, y + d),
            LonLat::new(x, y + d),
            LonLat::new(x, y),
        ]])
    }

    fn plate() -> Projection {
        Projection::new(ProjectionKind::Equirectangular).with_scale(180.0 / core::f64::consts::PI)
    }

    #[test]
    fn rings_close_and_contain_their_interior() {
        let path = geometry_path(&square(0.0, 0.0, 10.0), &plate());
        assert!(matches!(path.elements().last(), Some(PathEl::ClosePath)));
        assert!(path.contains(Point::new(5.0, -5.0)));
        assert!(!path.contains(Point::new(15.0, -5.0)));
    }

    #[test]
    fn centroid_uses_the_largest_polygon() {
        let multi = Geometry::MultiPolygon(vec![
            match square(0.0, 0.0, 2.0) {
                Geometry::Polygon(r) => r,
                _ => unreachable!(),
            },
            match square(20.0, 0.0, 10.0) {
                Geometry::Polygon(r) => r,
                _ => unreachable!(),
            },
        ]);
        let c = centroid(&multi, &plate()).unwrap();
        assert!((c.x - 25.0).abs() < 1e-9 && (c.y + 5.0).abs() < 1e-9, "{c:?}");
        let b = projected_bounds(&multi, &plate()).unwrap();
        assert!((b.width() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn back_face_rings_are_dropped() {
        let globe = Projection::new(ProjectionKind::Orthographic).with_scale(100.0);
        assert!(geometry_path(&square(170.0, 0.0, 5.0), &globe).is_empty());
        assert!(!geometry_path(&square(0.0, 0.0, 5.0), &globe).is_empty());
        assert!(sphere_outline(&globe).is_some());
        assert!(sphere_outline(&plate()).is_none());
    }

    #[test]
    fn lines_restart_after_clipping() {
        let globe = Projection::new(ProjectionKind::Orthographic);
        let line = [
            LonLat::new(0.0, 0.0),
            LonLat::new(10.0, 0.0),
            LonLat::new(179.0, 0.0),
            LonLat::new(20.0, 0.0),
            LonLat::new(30.0, 0.0),
        ];
        let path = lines_path(&[line.to_vec()], &globe);
        let moves = path
            .elements()
            .iter()
            .filter(|e| matches!(e, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn rings_crossing_the_horizon_keep_only_their_visible_vertices() {
        let globe = Projection::new(ProjectionKind::Orthographic).with_scale(100.0);
        let ring = Geometry::Polygon(vec![vec![
            LonLat::new(70.0, 0.0),
            LonLat::new(85.0, 0.0),
            LonLat::new(100.0, 0.0),
            LonLat::new(100.0, 10.0),
            LonLat::new(85.0, 10.0),
            LonLat::new(70.0, 10.0),
            LonLat::new(70.0, 0.0),
        ]]);
        let path = geometry_path(&ring, &globe);
        let segments = path
            .elements()
            .iter()
            .filter(|e| matches!(e, PathEl::LineTo(_)))
            .count();
        assert_eq!(segments, 4, "the two far-side vertices are culled");
        let bounds = path.bounding_box();
        let center = globe.translate;
        assert!(bounds.x1 <= center.x + globe.scale + 1e-9);
    }
}
