// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless thematic maps for `vistage_core`.
//!
//! - [`Topology`] decodes TopoJSON into [`Feature`]s and border meshes.
//! - [`Projection`] maps lon/lat to the screen; [`ZoomState`] layers wheel zoom, drag pan,
//!   globe rotation and click-to-zoom on top.
//! - [`ChoroplethMap`] and [`SymbolMap`] lay a [`MapInput`] out into a [`MapFrame`] of marks
//!   with hit-testable features and symbols.
//! - [`Annotation`]s are placed through the read-only [`MapContext`] a frame exposes.
//! - [`MapComponent`] holds the state around a map kind, like the chart component does for
//!   charts.
//!
//! ```
//! use vistage_charts::Size;
//! use vistage_data::Record;
//! use vistage_geo::{ChoroplethMap, ChoroplethOptions, MapGeometry, MapInput, Topology};
//!
//! let topology = Topology::from_json(r#"{
//!     "type": "Topology",
//!     "arcs": [[[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]]],
//!     "objects": {"land": {"type": "GeometryCollection", "geometries": [
//!         {"type": "Polygon", "arcs": [[0]], "id": "A"}
//!     ]}}
//! }"#).unwrap();
//! let geometry = MapGeometry::from_topology(&topology, None).unwrap();
//! let rows: Vec<Record> = serde_json::from_str(r#"[{"id": "A", "value": 3}]"#).unwrap();
//! let map = ChoroplethMap::new(ChoroplethOptions::default());
//! let frame = map.layout(&MapInput::new(&geometry, &rows, Size::new(300.0, 200.0)));
//! assert_eq!(frame.features[0].value, Some(3.0));
//! ```

mod annotation;
mod choropleth;
mod component;
mod error;
mod map;
#[cfg(test)]
mod map_tests;
mod path;
mod projection;
mod symbol_map;
mod topojson;
mod zoom;

pub use annotation::{Annotation, AnnotationLayout, MapContext, Placement};
pub use choropleth::{
    ChoroplethMap, ChoroplethOptions, ColorScaleKind, Colorer, CustomColor, DEFAULT_SCHEME,
};
pub use component::{MapComponent, MapKind};
pub use error::GeoError;
pub use map::{FeatureLayout, MapFrame, MapGeometry, MapInput, MapOptions, SymbolLayout};
pub use path::{centroid, geometry_path, lines_path, projected_bounds, sphere_outline};
pub use projection::{MERCATOR_MAX_LAT, Projection, ProjectionKind, angular_distance};
pub use symbol_map::{SymbolMap, SymbolMapOptions};
pub use topojson::{
    Feature, Geometry, LonLat, MeshFilter, TopoGeometry, TopoKind, TopoTransform, Topology,
};
pub use zoom::{ZoomState, ZoomTransform};
