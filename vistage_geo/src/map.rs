// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared map layout: options, decoded geometry, the projected feature layer and hit testing.
//!
//! Map kinds build on [`MapScaffold`] the way chart kinds build on their axis scaffold: the
//! scaffold fits the projection, projects and zooms every feature and matches it to a data
//! row; the kind then colors features, adds symbols and a legend, and calls
//! [`MapScaffold::finish`].

use hashbrown::HashMap;
use kurbo::{BezPath, Point, Rect, Shape};
use peniko::Color;
use serde::Deserialize;
use tracing::debug;
use vistage_charts::color::{self, de_color};
use vistage_charts::{
    HeuristicTextMeasurer, HighlightConfig, LegendEntry, LegendItem, LegendSwatchesSpec, Padding,
    Size, ValueFormatter, legend_entry_at,
};
use vistage_core::{Mark, MarkId, MarkState};
use vistage_data::{DataFormat, Record, value_key};

use crate::annotation::{Annotation, MapContext};
use crate::error::GeoError;
use crate::path::{centroid, geometry_path, lines_path, projected_bounds, sphere_outline};
use crate::projection::{Projection, ProjectionKind};
use crate::topojson::{Feature, LonLat, MeshFilter, Topology};
use crate::zoom::ZoomState;

const NS_FEATURES: u64 = 101;
const NS_BORDERS: u64 = 102;
const NS_SPHERE: u64 = 103;
const SYMBOL_ID_BASE: u64 = 100_000;
const LEGEND_ID_BASE: u64 = 150_000;

const LEGEND_GAP: f64 = 8.0;

/// Props shared by the map kinds.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapOptions {
    /// Projection.
    pub projection: ProjectionKind,
    /// Projection rotation in degrees, `[lambda, phi]`.
    pub rotate: (f64, f64),
    /// TopoJSON URL, fetched on mount.
    pub topojson: Option<String>,
    /// Topology object to draw; defaults to the first by name.
    pub object: Option<String>,
    /// Dot path of the feature key (`id`, `properties.iso`).
    pub feature_id_path: String,
    /// Dot path of the matching key in data rows.
    pub data_key_field: String,
    /// Numeric field coloring features or sizing symbols.
    pub value_field: String,
    /// Clicking a feature zooms to it.
    pub clickable: bool,
    /// Wheel and drag change the zoom transform.
    pub zoomable: bool,
    /// Upper end of the zoom extent.
    pub max_zoom: f64,
    /// Fill of features without matching data.
    #[serde(deserialize_with = "de_color")]
    pub missing_color: Color,
    /// Border stroke.
    #[serde(deserialize_with = "de_color")]
    pub border_color: Color,
    /// Border stroke width.
    pub border_width: f64,
    /// Outline of highlighted features and symbols.
    #[serde(deserialize_with = "de_color")]
    pub highlight_color: Color,
    /// Keys highlighted when nothing is hovered.
    pub highlight: Vec<String>,
    /// Milliseconds before a hover highlight applies.
    pub highlight_delay: u64,
    /// Milliseconds before leaving restores the default highlight.
    pub restore_delay: u64,
    /// Padding inside the measured box.
    pub padding: Padding,
    /// Format of URL data sources.
    pub data_url_type: DataFormat,
    /// Formats values in legends and tooltips.
    pub value_format: ValueFormatter,
    /// Shows a legend.
    pub legend: bool,
    /// Legend font size.
    pub font_size: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::default(),
            rotate: (0.0, 0.0),
            topojson: None,
            object: None,
            feature_id_path: "id".to_string(),
            data_key_field: "id".to_string(),
            value_field: "value".to_string(),
            clickable: false,
            zoomable: true,
            max_zoom: 8.0,
            missing_color: Color::from_rgb8(0xe0, 0xe0, 0xe0),
            border_color: Color::WHITE,
            border_width: 0.5,
            highlight_color: color::TEXT,
            highlight: Vec::new(),
            highlight_delay: 100,
            restore_delay: 200,
            padding: Padding::ZERO,
            data_url_type: DataFormat::Json,
            value_format: ValueFormatter::Default,
            legend: true,
            font_size: 12.0,
        }
    }
}

impl MapOptions {
    /// Sets the projection.
    pub fn with_projection(mut self, projection: ProjectionKind) -> Self {
        self.projection = projection;
        self
    }

    /// Sets the rotation in degrees.
    pub fn with_rotate(mut self, lambda: f64, phi: f64) -> Self {
        self.rotate = (lambda, phi);
        self
    }

    /// Sets the TopoJSON URL.
    pub fn with_topojson(mut self, url: impl Into<String>) -> Self {
        self.topojson = Some(url.into());
        self
    }

    /// Sets the topology object.
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Sets the feature key path.
    pub fn with_feature_id_path(mut self, path: impl Into<String>) -> Self {
        self.feature_id_path = path.into();
        self
    }

    /// Sets the data key path.
    pub fn with_data_key_field(mut self, field: impl Into<String>) -> Self {
        self.data_key_field = field.into();
        self
    }

    /// Sets the value field.
    pub fn with_value_field(mut self, field: impl Into<String>) -> Self {
        self.value_field = field.into();
        self
    }

    /// Enables click-to-zoom.
    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self
    }

    /// Enables wheel and drag zooming.
    pub fn with_zoomable(mut self, zoomable: bool) -> Self {
        self.zoomable = zoomable;
        self
    }

    /// Sets the maximum zoom.
    pub fn with_max_zoom(mut self, max_zoom: f64) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Sets the fill of unmatched features.
    pub fn with_missing_color(mut self, color: Color) -> Self {
        self.missing_color = color;
        self
    }

    /// Sets the default highlight keys.
    pub fn with_highlight<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets both hover delays in milliseconds.
    pub fn with_delays(mut self, highlight_delay: u64, restore_delay: u64) -> Self {
        self.highlight_delay = highlight_delay;
        self.restore_delay = restore_delay;
        self
    }

    /// Sets the padding.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the data URL format.
    pub fn with_data_url_type(mut self, format: DataFormat) -> Self {
        self.data_url_type = format;
        self
    }

    /// Sets the value formatter.
    pub fn with_value_format(mut self, format: ValueFormatter) -> Self {
        self.value_format = format;
        self
    }

    /// Shows or hides the legend.
    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    /// Hover delays as a highlight machine config.
    pub fn highlight_config(&self) -> HighlightConfig {
        HighlightConfig::new(self.highlight_delay, self.restore_delay)
    }

    /// Whether drags rotate the globe instead of panning.
    pub fn is_globe(&self) -> bool {
        self.projection == ProjectionKind::Orthographic
    }
}

/// Features and border mesh decoded from one topology object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapGeometry {
    /// Decoded features in document order.
    pub features: Vec<Feature>,
    /// Border lines, each shared arc once.
    pub borders: Vec<Vec<LonLat>>,
}

impl MapGeometry {
    /// Decodes `object`, or the topology's default object.
    pub fn from_topology(topology: &Topology, object: Option<&str>) -> Result<Self, GeoError> {
        let name = match object {
            Some(name) => name,
            None => topology
                .default_object()
                .ok_or_else(|| GeoError::MissingObject("<none>".to_string()))?,
        };
        Ok(Self {
            features: topology.features(name)?,
            borders: topology.mesh(name, MeshFilter::All)?,
        })
    }
}

/// Everything a map layout depends on.
#[derive(Clone, Copy, Debug)]
pub struct MapInput<'a> {
    /// Decoded geometry.
    pub geometry: &'a MapGeometry,
    /// Data rows.
    pub rows: &'a [Record],
    /// Measured container size.
    pub size: Size,
    /// Zoom and extra rotation.
    pub zoom: &'a ZoomState,
    /// Active highlight keys.
    pub highlights: &'a [String],
    /// Annotations drawn above the map.
    pub annotations: &'a [Annotation],
}

impl<'a> MapInput<'a> {
    /// Input with no zoom, highlights or annotations.
    pub fn new(geometry: &'a MapGeometry, rows: &'a [Record], size: Size) -> Self {
        const IDENTITY: &ZoomState = &ZoomState {
            transform: crate::zoom::ZoomTransform::IDENTITY,
            max_zoom: 1.0,
            zoomed_feature: None,
            rotate_x: 0.0,
            rotate_y: 0.0,
        };
        Self {
            geometry,
            rows,
            size,
            zoom: IDENTITY,
            highlights: &[],
            annotations: &[],
        }
    }

    /// Sets the zoom state.
    pub fn with_zoom(mut self, zoom: &'a ZoomState) -> Self {
        self.zoom = zoom;
        self
    }

    /// Sets the active highlight keys.
    pub fn with_highlights(mut self, highlights: &'a [String]) -> Self {
        self.highlights = highlights;
        self
    }

    /// Sets the annotations.
    pub fn with_annotations(mut self, annotations: &'a [Annotation]) -> Self {
        self.annotations = annotations;
        self
    }
}

/// A projected feature.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureLayout {
    /// Index into [`MapGeometry::features`].
    pub index: usize,
    /// Match key, if the feature has one.
    pub key: Option<String>,
    /// Matched data row.
    pub row: Option<usize>,
    /// Matched value.
    pub value: Option<f64>,
    /// Screen path, zoom applied.
    pub path: BezPath,
    /// Projected bounds before zoom.
    pub bounds: Option<Rect>,
    /// Screen centroid, zoom applied.
    pub centroid: Option<Point>,
    /// Fill.
    pub fill: Color,
    /// Interaction state.
    pub state: MarkState,
}

/// A proportional symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolLayout {
    /// Row key.
    pub key: String,
    /// Data row.
    pub row: usize,
    /// Value sizing the symbol.
    pub value: f64,
    /// Screen center.
    pub center: Point,
    /// Screen radius.
    pub radius: f64,
    /// Interaction state.
    pub state: MarkState,
}

impl SymbolLayout {
    /// Whether `point` is inside the circle.
    pub fn contains(&self, point: Point) -> bool {
        (point - self.center).hypot() <= self.radius
    }
}

/// A laid-out map.
#[derive(Clone, Debug)]
pub struct MapFrame {
    /// Map area inside padding and above the legend.
    pub rect: Rect,
    /// Fitted projection.
    pub projection: Projection,
    /// Zoom applied on top of the projection.
    pub zoom: ZoomState,
    /// Features in document order.
    pub features: Vec<FeatureLayout>,
    /// Symbols, largest first.
    pub symbols: Vec<SymbolLayout>,
    /// Hit-testable legend entries.
    pub legend: Vec<LegendEntry>,
    /// Marks to render.
    pub marks: Vec<Mark>,
}

impl MapFrame {
    /// The context annotations are laid out with.
    pub fn context(&self) -> MapContext<'_> {
        MapContext {
            rect: self.rect,
            transform: self.zoom.transform,
            projection: &self.projection,
        }
    }

    /// Topmost feature under `point`.
    pub fn feature_at(&self, point: Point) -> Option<&FeatureLayout> {
        self.features.iter().rev().find(|f| f.path.contains(point))
    }

    /// Topmost symbol under `point`; smaller symbols are drawn above larger ones.
    pub fn symbol_at(&self, point: Point) -> Option<&SymbolLayout> {
        self.symbols.iter().rev().find(|s| s.contains(point))
    }

    /// Legend entry under `point`.
    pub fn legend_entry_at(&self, point: Point) -> Option<&LegendEntry> {
        legend_entry_at(&self.legend, point)
    }

    /// Key to highlight for a pointer at `point`: a symbol, else a matched feature.
    pub fn highlight_key_at(&self, point: Point) -> Option<String> {
        if let Some(s) = self.symbol_at(point) {
            return Some(s.key.clone());
        }
        self.feature_at(point).and_then(|f| f.key.clone())
    }

    /// Data row under `point`, if any.
    pub fn row_at(&self, point: Point) -> Option<usize> {
        if let Some(s) = self.symbol_at(point) {
            return Some(s.row);
        }
        self.feature_at(point).and_then(|f| f.row)
    }
}

/// Interaction state of an item keyed `key`.
pub(crate) fn highlight_state(key: Option<&str>, flagged: bool, highlights: &[String]) -> MarkState {
    let highlighted = flagged || key.is_some_and(|k| highlights.iter().any(|h| h == k));
    MarkState {
        highlighted,
        dimmed: !highlights.is_empty() && !highlighted,
        hidden: false,
    }
}

/// Rows indexed by their normalized key.
pub(crate) fn index_rows(rows: &[Record], key_field: &str) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if let Some(key) = row.get_path(key_field).and_then(value_key) {
            index.entry(key).or_insert(i);
        }
    }
    index
}

/// Projection, matched features and legend room.
pub(crate) struct MapScaffold {
    pub(crate) rect: Rect,
    pub(crate) projection: Projection,
    pub(crate) features: Vec<FeatureLayout>,
    legend: Option<LegendSwatchesSpec>,
    legend_origin: Point,
}

impl MapScaffold {
    /// Fits the projection into the box left over by `legend` and projects every feature.
    pub(crate) fn build(
        input: &MapInput<'_>,
        options: &MapOptions,
        legend: Vec<LegendItem>,
    ) -> Self {
        let pad = options.padding;
        let outer = Rect::new(
            pad.left,
            pad.top,
            (input.size.width - pad.right).max(pad.left),
            (input.size.height - pad.bottom).max(pad.top),
        );
        let measurer = HeuristicTextMeasurer;
        let legend = (options.legend && !legend.is_empty()).then(|| {
            LegendSwatchesSpec::new(LEGEND_ID_BASE, legend)
                .with_font_size(options.font_size)
                .with_max_width(outer.width())
        });
        let legend_height = legend
            .as_ref()
            .map_or(0.0, |l| l.measure(&measurer).height + LEGEND_GAP);
        let rect = Rect::new(
            outer.x0,
            outer.y0,
            outer.x1,
            (outer.y1 - legend_height).max(outer.y0),
        );
        let legend_origin = Point::new(outer.x0, rect.y1 + LEGEND_GAP);

        let zoom = input.zoom;
        let projection = Projection::new(options.projection)
            .with_rotation(
                options.rotate.0 + zoom.rotate_x,
                options.rotate.1 + zoom.rotate_y,
            )
            .fit_extent(rect, &input.geometry.features);
        let affine = zoom.transform.affine();

        let rows = index_rows(input.rows, &options.data_key_field);
        let mut unmatched = 0_usize;
        let features = input
            .geometry
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| {
                let key = feature.key(&options.feature_id_path);
                let row = key.as_ref().and_then(|k| rows.get(k).copied());
                if row.is_none() {
                    unmatched += 1;
                }
                let record = row.and_then(|r| input.rows.get(r));
                let flagged = record.is_some_and(Record::is_highlighted);
                FeatureLayout {
                    index,
                    value: record.and_then(|r| r.number(&options.value_field)),
                    state: highlight_state(key.as_deref(), flagged, input.highlights),
                    key,
                    row,
                    path: affine * geometry_path(&feature.geometry, &projection),
                    bounds: projected_bounds(&feature.geometry, &projection),
                    centroid: centroid(&feature.geometry, &projection)
                        .map(|c| zoom.transform.apply(c)),
                    fill: options.missing_color,
                }
            })
            .collect::<Vec<_>>();
        if unmatched > 0 {
            debug!(
                unmatched,
                features = features.len(),
                "map features without matching data"
            );
        }
        Self {
            rect,
            projection,
            features,
            legend,
            legend_origin,
        }
    }

    /// Emits marks for the colored features, borders, symbols, legend and annotations.
    pub(crate) fn finish(
        self,
        input: &MapInput<'_>,
        options: &MapOptions,
        symbols: Vec<SymbolLayout>,
        symbol_fill: Color,
    ) -> MapFrame {
        let zoom = input.zoom;
        let affine = zoom.transform.affine();
        let mut marks = Vec::new();

        if let Some(sphere) = sphere_outline(&self.projection) {
            marks.push(
                Mark::builder(MarkId::for_row(NS_SPHERE, 0))
                    .z_index(vistage_charts::PLOT_BACKGROUND)
                    .path(affine * sphere)
                    .fill(Color::from_rgb8(0xf5, 0xf8, 0xfa))
                    .stroke(color::RULE, 1.0)
                    .build(),
            );
        }
        for f in &self.features {
            let (stroke, width) = if f.state.highlighted {
                (options.highlight_color, 1.5)
            } else {
                (Color::TRANSPARENT, 0.0)
            };
            let fill = if f.state.dimmed {
                color::dimmed(f.fill)
            } else {
                f.fill
            };
            marks.push(
                Mark::builder(MarkId::for_row(NS_FEATURES, f.index as u64))
                    .z_index(vistage_charts::MAP_FEATURES)
                    .state(f.state)
                    .path(f.path.clone())
                    .fill(fill)
                    .stroke(stroke, width)
                    .build(),
            );
        }
        if !input.geometry.borders.is_empty() && options.border_width > 0.0 {
            marks.push(
                Mark::builder(MarkId::for_row(NS_BORDERS, 0))
                    .z_index(vistage_charts::MAP_BORDERS)
                    .path(affine * lines_path(&input.geometry.borders, &self.projection))
                    .fill(Color::TRANSPARENT)
                    .stroke(options.border_color, options.border_width)
                    .build(),
            );
        }
        for (rank, s) in symbols.iter().enumerate() {
            let fill = if s.state.dimmed {
                color::dimmed(symbol_fill)
            } else {
                symbol_fill
            };
            let (stroke, width) = if s.state.highlighted {
                (options.highlight_color, 1.5)
            } else {
                (Color::WHITE, 0.5)
            };
            marks.push(
                Mark::builder(MarkId::from_raw(SYMBOL_ID_BASE + rank as u64))
                    .z_index(vistage_charts::SERIES_FILL)
                    .state(s.state)
                    .path(kurbo::Circle::new(s.center, s.radius).to_path(0.1))
                    .fill(fill)
                    .stroke(stroke, width)
                    .build(),
            );
        }

        let measurer = HeuristicTextMeasurer;
        let legend = match &self.legend {
            Some(spec) => {
                marks.extend(spec.marks(&measurer, self.legend_origin));
                spec.entries(&measurer, self.legend_origin)
            }
            None => Vec::new(),
        };

        let ctx = MapContext {
            rect: self.rect,
            transform: zoom.transform,
            projection: &self.projection,
        };
        for a in input.annotations {
            marks.extend(a.marks(&ctx));
        }

        MapFrame {
            rect: self.rect,
            projection: self.projection,
            zoom: zoom.clone(),
            features: self.features,
            symbols,
            legend,
            marks,
        }
    }
}

