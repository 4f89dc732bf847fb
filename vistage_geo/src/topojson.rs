// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! TopoJSON decoding.
//!
//! A [`Topology`] stores shared, optionally quantized and delta-encoded arcs; geometries
//! reference arcs by index, with `~i` (that is, `-i - 1`) meaning arc `i` reversed. Decoding
//! stitches the arcs back into lon/lat coordinates and turns the objects into [`Feature`]s.
//! [`Topology::mesh`] extracts the arcs themselves, for example to stroke only the borders
//! shared between neighbouring features.

use hashbrown::HashMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vistage_data::{lookup_path, value_key};

use crate::GeoError;

/// A longitude/latitude pair in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LonLat {
    /// Longitude, east positive.
    pub lon: f64,
    /// Latitude, north positive.
    pub lat: f64,
}

impl LonLat {
    /// Creates a position.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Quantization transform of a topology.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TopoTransform {
    /// Multiplier per axis.
    pub scale: [f64; 2],
    /// Offset per axis.
    pub translate: [f64; 2],
}

impl TopoTransform {
    fn apply(&self, x: f64, y: f64) -> LonLat {
        LonLat::new(
            x * self.scale[0] + self.translate[0],
            y * self.scale[1] + self.translate[1],
        )
    }
}

/// Geometry body of a TopoJSON object, by `type`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
#[expect(missing_docs, reason = "field names follow the TopoJSON format")]
pub enum TopoKind {
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { arcs: Vec<i64> },
    MultiLineString { arcs: Vec<Vec<i64>> },
    Polygon { arcs: Vec<Vec<i64>> },
    MultiPolygon { arcs: Vec<Vec<Vec<i64>>> },
    GeometryCollection { geometries: Vec<TopoGeometry> },
}

/// A TopoJSON geometry object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TopoGeometry {
    /// Body.
    #[serde(flatten)]
    pub kind: TopoKind,
    /// Optional identifier.
    #[serde(default)]
    pub id: Option<Value>,
    /// Optional properties object.
    #[serde(default)]
    pub properties: Option<Value>,
}

/// A parsed TopoJSON document.
#[derive(Clone, Debug, Deserialize)]
pub struct Topology {
    /// Quantization transform; absent for unquantized topologies.
    #[serde(default)]
    pub transform: Option<TopoTransform>,
    /// Arc positions, delta-encoded when quantized.
    #[serde(default)]
    pub arcs: Vec<Vec<Vec<f64>>>,
    /// Named objects.
    pub objects: HashMap<String, TopoGeometry>,
}

/// Decoded geometry in lon/lat.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(LonLat),
    /// Several positions.
    MultiPoint(Vec<LonLat>),
    /// A polyline.
    LineString(Vec<LonLat>),
    /// Several polylines.
    MultiLineString(Vec<Vec<LonLat>>),
    /// Closed rings; the first is the exterior.
    Polygon(Vec<Vec<LonLat>>),
    /// Several polygons.
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
    /// Nested geometries.
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Calls `f` for every position, in order.
    pub fn for_each_position(&self, f: &mut impl FnMut(LonLat)) {
        match self {
            Self::Point(p) => f(*p),
            Self::MultiPoint(ps) | Self::LineString(ps) => ps.iter().copied().for_each(f),
            Self::MultiLineString(lines) | Self::Polygon(lines) => {
                lines.iter().flatten().copied().for_each(f);
            }
            Self::MultiPolygon(polys) => polys.iter().flatten().flatten().copied().for_each(f),
            Self::Collection(gs) => gs.iter().for_each(|g| g.for_each_position(f)),
        }
    }
}

/// A decoded feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// Identifier, if the geometry had one.
    pub id: Option<Value>,
    /// Properties object (`Value::Null` when absent).
    pub properties: Value,
    /// Geometry in lon/lat.
    pub geometry: Geometry,
}

impl Feature {
    /// Matching key at a dot-notation `path`.
    ///
    /// `id` is the feature id, `properties.x.y` a nested property; any other path is looked
    /// up inside the properties.
    pub fn key(&self, path: &str) -> Option<String> {
        let value = match path.split_once('.') {
            None if path == "id" => self.id.as_ref()?,
            Some(("properties", rest)) => lookup_path(&self.properties, rest)?,
            None if path == "properties" => &self.properties,
            _ => lookup_path(&self.properties, path)?,
        };
        value_key(value)
    }
}

/// Which arcs [`Topology::mesh`] keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshFilter {
    /// Every referenced arc.
    #[default]
    All,
    /// Arcs shared by two different geometries (internal borders).
    Interior,
    /// Arcs used by a single geometry (the outline).
    Exterior,
}

impl Topology {
    /// Parses a TopoJSON document.
    pub fn from_json(json: &str) -> Result<Self, GeoError> {
        let topology: Self = serde_json::from_str(json)?;
        debug!(
            objects = topology.objects.len(),
            arcs = topology.arcs.len(),
            quantized = topology.transform.is_some(),
            "topology decoded"
        );
        Ok(topology)
    }

    /// The alphabetically first object name, used when no object is configured.
    pub fn default_object(&self) -> Option<&str> {
        self.objects.keys().map(String::as_str).min()
    }

    /// Decodes `object` into features; a geometry collection yields one per member.
    pub fn features(&self, object: &str) -> Result<Vec<Feature>, GeoError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| GeoError::MissingObject(object.to_string()))?;
        let arcs = self.decode_arcs();
        let members = match &root.kind {
            TopoKind::GeometryCollection { geometries } => geometries.iter().collect(),
            _ => vec![root],
        };
        members
            .into_iter()
            .map(|g| {
                Ok(Feature {
                    id: g.id.clone(),
                    properties: g.properties.clone().unwrap_or(Value::Null),
                    geometry: self.geometry(&g.kind, &arcs)?,
                })
            })
            .collect()
    }

    /// Arcs of `object` as polylines, filtered by how many geometries share them.
    pub fn mesh(&self, object: &str, filter: MeshFilter) -> Result<Vec<Vec<LonLat>>, GeoError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| GeoError::MissingObject(object.to_string()))?;
        // First and last geometry referencing each arc.
        let mut users: Vec<Option<(usize, usize)>> = vec![None; self.arcs.len()];
        let members: Vec<&TopoKind> = match &root.kind {
            TopoKind::GeometryCollection { geometries } => {
                geometries.iter().map(|g| &g.kind).collect()
            }
            kind => vec![kind],
        };
        for (g, kind) in members.into_iter().enumerate() {
            let mut refs = Vec::new();
            collect_arc_refs(kind, &mut refs);
            for i in refs {
                let slot = users
                    .get_mut(arc_slot(i)?)
                    .ok_or(GeoError::ArcIndex(i))?;
                *slot = Some(match *slot {
                    None => (g, g),
                    Some((first, _)) => (first, g),
                });
            }
        }
        let arcs = self.decode_arcs();
        Ok(users
            .iter()
            .zip(arcs)
            .filter_map(|(u, arc)| {
                let (first, last) = (*u)?;
                let keep = match filter {
                    MeshFilter::All => true,
                    MeshFilter::Interior => first != last,
                    MeshFilter::Exterior => first == last,
                };
                keep.then_some(arc)
            })
            .collect())
    }

    fn decode_arcs(&self) -> Vec<Vec<LonLat>> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .map(|p| {
                        let (px, py) = position(p);
                        match &self.transform {
                            Some(t) => {
                                x += px;
                                y += py;
                                t.apply(x, y)
                            }
                            None => LonLat::new(px, py),
                        }
                    })
                    .collect()
            })
            .collect()
    }

    fn point(&self, p: &[f64]) -> LonLat {
        let (x, y) = position(p);
        match &self.transform {
            Some(t) => t.apply(x, y),
            None => LonLat::new(x, y),
        }
    }

    fn geometry(&self, kind: &TopoKind, arcs: &[Vec<LonLat>]) -> Result<Geometry, GeoError> {
        Ok(match kind {
            TopoKind::Point { coordinates } => Geometry::Point(self.point(coordinates)),
            TopoKind::MultiPoint { coordinates } => {
                Geometry::MultiPoint(coordinates.iter().map(|p| self.point(p)).collect())
            }
            TopoKind::LineString { arcs: refs } => Geometry::LineString(line(refs, arcs)?),
            TopoKind::MultiLineString { arcs: lines } => Geometry::MultiLineString(
                lines
                    .iter()
                    .map(|refs| line(refs, arcs))
                    .collect::<Result<_, _>>()?,
            ),
            TopoKind::Polygon { arcs: rings } => Geometry::Polygon(polygon(rings, arcs)?),
            TopoKind::MultiPolygon { arcs: polys } => Geometry::MultiPolygon(
                polys
                    .iter()
                    .map(|rings| polygon(rings, arcs))
                    .collect::<Result<_, _>>()?,
            ),
            TopoKind::GeometryCollection { geometries } => Geometry::Collection(
                geometries
                    .iter()
                    .map(|g| self.geometry(&g.kind, arcs))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn position(p: &[f64]) -> (f64, f64) {
    (
        p.first().copied().unwrap_or_default(),
        p.get(1).copied().unwrap_or_default(),
    )
}

fn arc_slot(i: i64) -> Result<usize, GeoError> {
    usize::try_from(if i < 0 { !i } else { i }).map_err(|_| GeoError::ArcIndex(i))
}

/// Stitches arcs end to end, dropping the duplicated joint.
fn line(refs: &[i64], arcs: &[Vec<LonLat>]) -> Result<Vec<LonLat>, GeoError> {
    let mut out: Vec<LonLat> = Vec::new();
    for &i in refs {
        let arc = arcs.get(arc_slot(i)?).ok_or(GeoError::ArcIndex(i))?;
        out.pop();
        if i < 0 {
            out.extend(arc.iter().rev());
        } else {
            out.extend(arc);
        }
    }
    if out.len() == 1 {
        out.push(out[0]);
    }
    Ok(out)
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<LonLat>]) -> Result<Vec<Vec<LonLat>>, GeoError> {
    rings
        .iter()
        .map(|refs| {
            let mut ring = line(refs, arcs)?;
            if let Some(&first) = ring.first() {
                while ring.len() < 4 {
                    ring.push(first);
                }
            }
            Ok(ring)
        })
        .collect()
}

fn collect_arc_refs(kind: &TopoKind, out: &mut Vec<i64>) {
    match kind {
        TopoKind::Point { .. } | TopoKind::MultiPoint { .. } => {}
        TopoKind::LineString { arcs } => out.extend(arcs),
        TopoKind::MultiLineString { arcs } | TopoKind::Polygon { arcs } => {
            out.extend(arcs.iter().flatten());
        }
        TopoKind::MultiPolygon { arcs } => out.extend(arcs.iter().flatten().flatten()),
        TopoKind::GeometryCollection { geometries } => {
            for g in geometries {
                collect_arc_refs(&g.kind, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Two unit squares sharing the edge x = 0.
    fn squares() -> Topology {
        Topology::from_json(
            &json!({
                "type": "Topology",
                "arcs": [
                    [[0, 0], [0, 1]],
                    [[0, 1], [-1, 1], [-1, 0], [0, 0]],
                    [[0, 0], [1, 0], [1, 1], [0, 1]]
                ],
                "objects": {
                    "regions": {
                        "type": "GeometryCollection",
                        "geometries": [
                            {"type": "Polygon", "arcs": [[0, 1]], "id": 1,
                             "properties": {"name": "West", "iso": {"a2": "WW"}}},
                            {"type": "Polygon", "arcs": [[2, -1]], "id": "E",
                             "properties": {"name": "East"}}
                        ]
                    }
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn stitches_rings_and_reverses_negative_arcs() {
        let features = squares().features("regions").unwrap();
        assert_eq!(features.len(), 2);
        let Geometry::Polygon(rings) = &features[1].geometry else {
            panic!("expected a polygon");
        };
        let ring: Vec<(f64, f64)> = rings[0].iter().map(|p| (p.lon, p.lat)).collect();
        assert_eq!(
            ring,
            [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn keys_follow_dot_paths() {
        let features = squares().features("regions").unwrap();
        assert_eq!(features[0].key("id").as_deref(), Some("1"));
        assert_eq!(features[1].key("id").as_deref(), Some("E"));
        assert_eq!(features[0].key("properties.iso.a2").as_deref(), Some("WW"));
        assert_eq!(features[1].key("name").as_deref(), Some("East"));
        assert_eq!(features[1].key("properties.iso.a2"), None);
    }

    #[test]
    fn decodes_quantized_delta_arcs() {
        let topology = Topology::from_json(
            &json!({
                "type": "Topology",
                "transform": {"scale": [0.5, 0.5], "translate": [10, 20]},
                "arcs": [[[0, 0], [2, 0], [0, 2]]],
                "objects": {
                    "road": {"type": "LineString", "arcs": [0]},
                    "back": {"type": "LineString", "arcs": [-1]},
                    "town": {"type": "Point", "coordinates": [4, 4]}
                }
            })
            .to_string(),
        )
        .unwrap();
        let road = &topology.features("road").unwrap()[0].geometry;
        assert_eq!(
            *road,
            Geometry::LineString(vec![
                LonLat::new(10.0, 20.0),
                LonLat::new(11.0, 20.0),
                LonLat::new(11.0, 21.0),
            ])
        );
        let Geometry::LineString(back) = &topology.features("back").unwrap()[0].geometry else {
            panic!("expected a line");
        };
        assert_eq!(back[0], LonLat::new(11.0, 21.0));
        let town = &topology.features("town").unwrap()[0].geometry;
        assert_eq!(*town, Geometry::Point(LonLat::new(12.0, 22.0)));
        assert_eq!(topology.default_object(), Some("back"));
    }

    #[test]
    fn mesh_separates_shared_and_outer_arcs() {
        let t = squares();
        assert_eq!(t.mesh("regions", MeshFilter::All).unwrap().len(), 3);
        let interior = t.mesh("regions", MeshFilter::Interior).unwrap();
        assert_eq!(interior, [vec![LonLat::new(0.0, 0.0), LonLat::new(0.0, 1.0)]]);
        assert_eq!(t.mesh("regions", MeshFilter::Exterior).unwrap().len(), 2);
    }

    #[test]
    fn reports_missing_objects_and_bad_arcs() {
        let t = squares();
        assert!(matches!(
            t.features("nope"),
            Err(GeoError::MissingObject(name)) if name == "nope"
        ));
        let broken = Topology::from_json(
            r#"{"type":"Topology","arcs":[],"objects":{"x":{"type":"LineString","arcs":[3]}}}"#,
        )
        .unwrap();
        assert!(matches!(broken.features("x"), Err(GeoError::ArcIndex(3))));
    }
}
