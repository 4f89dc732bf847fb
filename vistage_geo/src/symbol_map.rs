// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Symbol maps: proportional circles over a neutral base map.
//!
//! A circle sits at the row's longitude/latitude fields when present, otherwise at the
//! centroid of the feature its key matches. Radii follow a sqrt scale so circle areas are
//! proportional to values.

use hashbrown::HashMap;
use peniko::Color;
use serde::Deserialize;
use vistage_charts::ScaleSqrt;
use vistage_charts::color::{self, de_color};
use vistage_data::value_key;

use crate::map::{MapFrame, MapInput, MapOptions, MapScaffold, SymbolLayout, highlight_state};
use crate::topojson::LonLat;

/// Symbol map props.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SymbolMapOptions {
    /// Shared map props.
    #[serde(flatten)]
    pub map: MapOptions,
    /// Longitude field of data rows.
    pub lon_field: String,
    /// Latitude field of data rows.
    pub lat_field: String,
    /// Radius of the largest value.
    pub max_radius: f64,
    /// Top of the radius domain; defaults to the data maximum.
    pub max_value: Option<f64>,
    /// Circle fill.
    #[serde(deserialize_with = "de_color")]
    pub symbol_color: Color,
}

impl Default for SymbolMapOptions {
    fn default() -> Self {
        Self {
            map: MapOptions::default(),
            lon_field: "lon".to_string(),
            lat_field: "lat".to_string(),
            max_radius: 20.0,
            max_value: None,
            symbol_color: color::DEFAULT_PALETTE[0],
        }
    }
}

impl SymbolMapOptions {
    /// Parses camelCase JSON props.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the shared map props.
    pub fn with_map(mut self, map: MapOptions) -> Self {
        self.map = map;
        self
    }

    /// Sets the coordinate fields.
    pub fn with_position_fields(
        mut self,
        lon_field: impl Into<String>,
        lat_field: impl Into<String>,
    ) -> Self {
        self.lon_field = lon_field.into();
        self.lat_field = lat_field.into();
        self
    }

    /// Sets the largest radius.
    pub fn with_max_radius(mut self, max_radius: f64) -> Self {
        self.max_radius = max_radius;
        self
    }

    /// Fixes the top of the radius domain.
    pub fn with_max_value(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Sets the circle fill.
    pub fn with_symbol_color(mut self, color: Color) -> Self {
        self.symbol_color = color;
        self
    }
}

/// A symbol map.
#[derive(Clone, Debug, Default)]
pub struct SymbolMap {
    /// Props.
    pub options: SymbolMapOptions,
}

impl SymbolMap {
    /// A symbol map with `options`.
    pub fn new(options: SymbolMapOptions) -> Self {
        Self { options }
    }

    /// Places one circle per positive value, largest first.
    ///
    /// Rows with neither coordinates nor a matching feature are skipped.
    pub fn layout(&self, input: &MapInput<'_>) -> MapFrame {
        let o = &self.options;
        let scaffold = MapScaffold::build(input, &o.map, Vec::new());
        let centroids: HashMap<&str, kurbo::Point> = scaffold
            .features
            .iter()
            .filter_map(|f| Some((f.key.as_deref()?, f.centroid?)))
            .collect();

        let max = o.max_value.unwrap_or_else(|| {
            input
                .rows
                .iter()
                .filter_map(|r| r.number(&o.map.value_field))
                .fold(0.0, f64::max)
        });
        let radius = ScaleSqrt::new((0.0, max), (0.0, o.max_radius));
        let transform = input.zoom.transform;

        let mut symbols: Vec<SymbolLayout> = input
            .rows
            .iter()
            .enumerate()
            .filter_map(|(row, record)| {
                let value = record.number(&o.map.value_field).filter(|v| *v > 0.0)?;
                let key = record
                    .get_path(&o.map.data_key_field)
                    .and_then(value_key)
                    .unwrap_or_else(|| row.to_string());
                let center = match (record.number(&o.lon_field), record.number(&o.lat_field)) {
                    (Some(lon), Some(lat)) => transform
                        .apply(scaffold.projection.project(LonLat::new(lon, lat))?),
                    _ => *centroids.get(key.as_str())?,
                };
                Some(SymbolLayout {
                    state: highlight_state(Some(&key), record.is_highlighted(), input.highlights),
                    key,
                    row,
                    value,
                    center,
                    radius: radius.map(value),
                })
            })
            .collect();
        symbols.sort_by(|a, b| b.radius.total_cmp(&a.radius));
        drop(centroids);

        scaffold.finish(input, &o.map, symbols, o.symbol_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapGeometry;
    use crate::topojson::{Feature, Geometry};
    use serde_json::json;
    use vistage_charts::Size;
    use vistage_data::Record;

    fn world() -> MapGeometry {
        let square = |id: &str, x: f64| Feature {
            id: Some(json!(id)),
            properties: json!({}),
            geometry: Geometry::Polygon(vec![vec![
                LonLat::new(x, 0.0),
                LonLat::new(x + 10.0, 0.0),
                LonLat::new(x + 10.0, 10.0),
                LonLat::new(x, 10.0),
                LonLat::new(x, 0.0),
            ]]),
        };
        MapGeometry {
            features: vec![square("A", 0.0), square("B", 20.0)],
            borders: Vec::new(),
        }
    }

    fn rows() -> Vec<Record> {
        serde_json::from_value(json!([
            {"id": "A", "value": 25},
            {"id": "B", "value": 100},
            {"id": "P", "value": 50, "lon": 15, "lat": 5},
            {"id": "Z", "value": 0},
            {"id": "nowhere", "value": 10},
        ]))
        .unwrap()
    }

    #[test]
    fn radii_are_area_proportional_and_drawn_largest_first() {
        let geometry = world();
        let data = rows();
        let map = SymbolMap::new(SymbolMapOptions::default().with_max_radius(20.0));
        let frame = map.layout(&MapInput::new(&geometry, &data, Size::new(300.0, 100.0)));
        let keys: Vec<_> = frame.symbols.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["B", "P", "A"]);
        assert!((frame.symbols[0].radius - 20.0).abs() < 1e-9);
        assert!((frame.symbols[2].radius - 10.0).abs() < 1e-9);
    }

    #[test]
    fn symbols_sit_on_centroids_or_coordinates() {
        let geometry = world();
        let data = rows();
        let frame = SymbolMap::default().layout(&MapInput::new(
            &geometry,
            &data,
            Size::new(300.0, 100.0),
        ));
        let a = frame.features[0].centroid.unwrap();
        let sym = |k: &str| frame.symbols.iter().find(|s| s.key == k).unwrap();
        assert!((sym("A").center - a).hypot() < 1e-9);
        let p = frame
            .projection
            .project(LonLat::new(15.0, 5.0))
            .unwrap();
        assert!((sym("P").center - p).hypot() < 1e-9);
    }

    #[test]
    fn the_smallest_overlapping_symbol_is_hit_first() {
        let geometry = world();
        let data: Vec<Record> = serde_json::from_value(json!([
            {"id": "big", "value": 100, "lon": 10, "lat": 5},
            {"id": "small", "value": 1, "lon": 10, "lat": 5},
        ]))
        .unwrap();
        let frame = SymbolMap::default().layout(&MapInput::new(
            &geometry,
            &data,
            Size::new(300.0, 100.0),
        ));
        let center = frame.symbols[0].center;
        assert_eq!(frame.symbol_at(center).map(|s| s.key.as_str()), Some("small"));
        assert_eq!(frame.highlight_key_at(center).as_deref(), Some("small"));
    }
}
