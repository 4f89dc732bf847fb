// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mounted map: topology, data, container size, hover and zoom state, and the scene.
//!
//! [`MapComponent`] mirrors the chart component: the host feeds it events and every change
//! re-lays out the map and hands scene diffs to a [`ChartRenderer`].

use core::fmt;
use core::mem;
use std::sync::Arc;

use kurbo::Point;
use tracing::{debug, warn};
use vistage_charts::{
    ChartEvent, ChartRenderer, HighlightMachine, ResizeState, ResizeTracker, Size, Tooltip,
};
use vistage_core::{Mark, Scene};
use vistage_data::{DataLoader, DataSource, Fetcher, LoadEvent, LoadState};

use crate::annotation::Annotation;
use crate::choropleth::ChoroplethMap;
use crate::error::GeoError;
use crate::map::{MapFrame, MapGeometry, MapInput, MapOptions};
use crate::symbol_map::SymbolMap;
use crate::topojson::Topology;
use crate::zoom::ZoomState;

/// The map kinds.
#[derive(Clone, Debug)]
pub enum MapKind {
    /// Filled features.
    Choropleth(ChoroplethMap),
    /// Proportional circles.
    Symbol(SymbolMap),
}

impl MapKind {
    /// Shared props.
    pub fn options(&self) -> &MapOptions {
        match self {
            Self::Choropleth(m) => &m.options.map,
            Self::Symbol(m) => &m.options.map,
        }
    }

    /// Lays the map out.
    pub fn layout(&self, input: &MapInput<'_>) -> MapFrame {
        match self {
            Self::Choropleth(m) => m.layout(input),
            Self::Symbol(m) => m.layout(input),
        }
    }
}

impl From<ChoroplethMap> for MapKind {
    fn from(map: ChoroplethMap) -> Self {
        Self::Choropleth(map)
    }
}

impl From<SymbolMap> for MapKind {
    fn from(map: SymbolMap) -> Self {
        Self::Symbol(map)
    }
}

/// A map bound to its topology, data, container and renderer.
pub struct MapComponent<R> {
    kind: MapKind,
    fetcher: Arc<dyn Fetcher>,
    topology: Option<Topology>,
    topology_url: Option<String>,
    geometry: Option<MapGeometry>,
    loader: DataLoader,
    source: DataSource,
    resize: ResizeTracker,
    highlight: HighlightMachine<String>,
    zoom: ZoomState,
    annotations: Vec<Annotation>,
    scene: Scene,
    renderer: R,
    frame: Option<MapFrame>,
    events: Vec<ChartEvent>,
    unmounted: bool,
}

impl<R: fmt::Debug> fmt::Debug for MapComponent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapComponent")
            .field("kind", &self.kind)
            .field("topology_url", &self.topology_url)
            .field("features", &self.geometry.as_ref().map(|g| g.features.len()))
            .field("source", &self.source)
            .field("state", self.loader.state())
            .field("size", &self.resize.state())
            .field("zoom", &self.zoom)
            .field("renderer", &self.renderer)
            .field("events", &self.events)
            .field("unmounted", &self.unmounted)
            .finish_non_exhaustive()
    }
}

impl<R: ChartRenderer> MapComponent<R> {
    /// Creates an unmounted map with no geometry or data.
    pub fn new(kind: impl Into<MapKind>, fetcher: Arc<dyn Fetcher>, renderer: R) -> Self {
        let kind = kind.into();
        let options = kind.options();
        let highlight = HighlightMachine::new(options.highlight_config())
            .with_default(options.highlight.iter().cloned());
        let zoom = ZoomState::new(options.max_zoom);
        Self {
            kind,
            fetcher,
            topology: None,
            topology_url: None,
            geometry: None,
            loader: DataLoader::new(),
            source: DataSource::default(),
            resize: ResizeTracker::new(),
            highlight,
            zoom,
            annotations: Vec::new(),
            scene: Scene::new(),
            renderer,
            frame: None,
            events: Vec::new(),
            unmounted: false,
        }
    }

    /// Adds annotations drawn above the map.
    pub fn with_annotations(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.annotations.extend(annotations);
        self
    }

    /// Takes the initial container measurement, fetches the topology and draws.
    pub fn mount(&mut self, size: Size) -> Vec<Mark> {
        if self.unmounted {
            return Vec::new();
        }
        let state = self.resize.mount(size);
        self.events.push(ChartEvent::Resized(state));
        self.load_topology();
        self.load();
        self.render()
    }

    /// Uses an already decoded topology instead of the configured URL.
    pub fn set_topology(&mut self, topology: Topology) {
        if self.unmounted {
            return;
        }
        self.topology_url = None;
        self.topology = Some(topology);
        self.decode();
        self.rerender();
    }

    /// Replaces the data source; loads it if it differs from the last one.
    pub fn set_source(&mut self, source: DataSource) {
        if self.unmounted {
            return;
        }
        self.source = source;
        self.load();
        self.rerender();
    }

    /// Replaces the map kind and props.
    ///
    /// A new TopoJSON URL is fetched, a new object is re-decoded and a changed data format
    /// reloads the data.
    pub fn set_kind(&mut self, kind: impl Into<MapKind>) {
        if self.unmounted {
            return;
        }
        let kind = kind.into();
        let object_changed = kind.options().object != self.kind.options().object;
        let options = kind.options();
        self.highlight.set_config(options.highlight_config());
        self.highlight.set_default(options.highlight.iter().cloned());
        self.zoom.max_zoom = options.max_zoom.max(1.0);
        self.kind = kind;
        if self.resize.is_mounted() {
            self.load_topology();
        }
        if object_changed {
            self.decode();
        }
        self.load();
        self.rerender();
    }

    /// Adds an annotation.
    pub fn add_annotation(&mut self, annotation: Annotation) {
        if self.unmounted {
            return;
        }
        self.annotations.push(annotation);
        self.rerender();
    }

    /// Removes every annotation.
    pub fn clear_annotations(&mut self) {
        if self.unmounted {
            return;
        }
        self.annotations.clear();
        self.rerender();
    }

    /// Reports a container observation. Returns the new state if the box changed.
    pub fn resize(&mut self, size: Size) -> Option<ResizeState> {
        if self.unmounted {
            return None;
        }
        let state = self.resize.observe(size)?;
        self.events.push(ChartEvent::Resized(state));
        self.rerender();
        Some(state)
    }

    /// Pointer entered the feature or symbol with `key`.
    pub fn pointer_enter(&mut self, key: impl Into<String>, now: u64) {
        if self.highlight.on_enter(key.into(), now) {
            self.rerender();
        }
    }

    /// Pointer moved to `point`; hit-tests symbols, then features.
    pub fn pointer_move(&mut self, point: Point, now: u64) {
        match self.frame.as_ref().and_then(|f| f.highlight_key_at(point)) {
            Some(key) => self.pointer_enter(key, now),
            None => self.pointer_leave(now),
        }
    }

    /// Pointer left the map or the hovered item.
    pub fn pointer_leave(&mut self, now: u64) {
        if self.highlight.on_leave(now) {
            self.rerender();
        }
    }

    /// Fires due highlight timers.
    pub fn tick(&mut self, now: u64) {
        if self.highlight.tick(now) {
            self.rerender();
        }
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.highlight.next_deadline()
    }

    /// Clicks at `point`: emits `click` for the symbol or feature hit and, when the map is
    /// clickable, zooms to the feature (or back out on a second click).
    pub fn click(&mut self, point: Point) -> Option<ChartEvent> {
        let frame = self.frame.as_ref()?;
        if let Some(symbol) = frame.symbol_at(point) {
            let event = ChartEvent::Click {
                key: symbol.key.clone(),
            };
            self.events.push(event.clone());
            return Some(event);
        }
        let feature = frame.feature_at(point)?;
        let key = feature.key.clone()?;
        let zoom_to = feature.bounds.filter(|_| self.kind.options().clickable);
        let view = frame.rect;
        let event = ChartEvent::Click { key: key.clone() };
        self.events.push(event.clone());
        if let Some(bounds) = zoom_to {
            self.zoom.click_feature(&key, bounds, view);
            self.zoomed();
        }
        Some(event)
    }

    /// Wheel zoom around `anchor`. No-op unless the map is zoomable and mounted.
    pub fn wheel(&mut self, anchor: Point, delta_y: f64) {
        if self.unmounted {
            return;
        }
        if self.kind.options().zoomable && self.zoom.wheel(anchor, delta_y) {
            self.zoomed();
        }
    }

    /// Drag by `(dx, dy)`: pans flat maps, rotates globes.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        if self.unmounted {
            return;
        }
        let options = self.kind.options();
        if options.zoomable && self.zoom.drag(dx, dy, options.is_globe()) {
            self.zoomed();
        }
    }

    /// Back to the initial view.
    pub fn reset_zoom(&mut self) {
        if self.unmounted {
            return;
        }
        self.zoom.reset();
        self.zoomed();
    }

    /// Tooltip for the item under `point`: its key or name, and its formatted value.
    pub fn tooltip_at(&self, point: Point) -> Option<Tooltip> {
        let frame = self.frame.as_ref()?;
        let options = self.kind.options();
        let value_line = |v: Option<f64>| {
            let text = v.map_or_else(|| "n/a".to_string(), |v| options.value_format.format(v));
            (options.value_field.clone(), text)
        };
        if let Some(s) = frame.symbol_at(point) {
            return Some(Tooltip {
                title: s.key.clone(),
                lines: vec![value_line(Some(s.value))],
                anchor: s.center,
            });
        }
        let f = frame.feature_at(point)?;
        let name = self
            .geometry
            .as_ref()
            .and_then(|g| g.features.get(f.index))
            .and_then(|feature| feature.key("properties.name"));
        Some(Tooltip {
            title: name.or_else(|| f.key.clone()).unwrap_or_default(),
            lines: vec![value_line(f.value)],
            anchor: f.centroid.unwrap_or(point),
        })
    }

    /// Lays out the current state, applies the diff to the renderer and returns the marks.
    ///
    /// Draws nothing before mount, after unmount, or without geometry.
    pub fn render(&mut self) -> Vec<Mark> {
        if self.unmounted {
            return Vec::new();
        }
        let frame = match (self.resize.state(), &self.geometry) {
            (Some(state), Some(geometry)) => {
                let rows = self.loader.dataset().map(|d| d.rows()).unwrap_or_default();
                let input = MapInput::new(geometry, rows, state.size())
                    .with_zoom(&self.zoom)
                    .with_highlights(self.highlight.active())
                    .with_annotations(&self.annotations);
                Some(self.kind.layout(&input))
            }
            _ => None,
        };
        let marks = frame.as_ref().map(|f| f.marks.clone()).unwrap_or_default();
        let diffs = self.scene.tick(marks.clone());
        if !diffs.is_empty() {
            debug!(diffs = diffs.len(), "map frame");
        }
        self.renderer.apply(&diffs);
        self.frame = frame;
        marks
    }

    /// Tears the map down: cancels timers and removes every mark. Later data, props and zoom
    /// changes are ignored.
    pub fn unmount(&mut self) {
        self.highlight.cancel();
        let diffs = self.scene.clear();
        self.renderer.apply(&diffs);
        self.frame = None;
        self.unmounted = true;
    }

    /// Takes the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ChartEvent> {
        mem::take(&mut self.events)
    }

    /// The last laid-out frame.
    pub fn frame(&self) -> Option<&MapFrame> {
        self.frame.as_ref()
    }

    /// Decoded geometry, once a topology is available.
    pub fn geometry(&self) -> Option<&MapGeometry> {
        self.geometry.as_ref()
    }

    /// Data state.
    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Zoom state.
    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    /// Active highlight keys.
    pub fn highlights(&self) -> &[String] {
        self.highlight.active()
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Current kind and props.
    pub fn kind(&self) -> &MapKind {
        &self.kind
    }

    fn zoomed(&mut self) {
        let t = self.zoom.transform;
        self.events.push(ChartEvent::Zoomed {
            k: t.k,
            x: t.x,
            y: t.y,
            feature: self.zoom.zoomed_feature.clone(),
        });
        self.rerender();
    }

    fn load_topology(&mut self) {
        let Some(url) = self.kind.options().topojson.clone() else {
            return;
        };
        if self.topology_url.as_deref() == Some(url.as_str()) {
            return;
        }
        self.topology_url = Some(url.clone());
        debug!(%url, "fetching topology");
        let fetched = self
            .fetcher
            .fetch(&url)
            .map_err(GeoError::from)
            .and_then(|text| Topology::from_json(&text));
        match fetched {
            Ok(topology) => {
                self.topology = Some(topology);
                self.decode();
            }
            Err(err) => self.geometry_failed(&err),
        }
    }

    fn decode(&mut self) {
        let Some(topology) = &self.topology else {
            return;
        };
        match MapGeometry::from_topology(topology, self.kind.options().object.as_deref()) {
            Ok(geometry) => {
                debug!(features = geometry.features.len(), "topology decoded");
                self.geometry = Some(geometry);
            }
            Err(err) => self.geometry_failed(&err),
        }
    }

    fn geometry_failed(&mut self, err: &GeoError) {
        warn!(%err, "map geometry unavailable");
        self.geometry = None;
        self.events.push(ChartEvent::LoadFailed {
            message: err.to_string(),
        });
    }

    fn load(&mut self) {
        let format = self.kind.options().data_url_type;
        match self
            .loader
            .load(&self.source, format, self.fetcher.as_ref(), None)
        {
            Some(LoadEvent::Loaded { rows }) => self.events.push(ChartEvent::Loaded { rows }),
            Some(LoadEvent::Failed(err)) => self.events.push(ChartEvent::LoadFailed {
                message: err.to_string(),
            }),
            None => {}
        }
    }

    fn rerender(&mut self) {
        if self.resize.is_mounted() {
            self.render();
        }
    }
}
