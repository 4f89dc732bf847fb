// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A mounted chart: data loading, container size, hover state and the retained scene.
//!
//! [`ChartComponent`] is the stateful shell around the pure chart layouts. The host feeds it
//! events (mount, resize, pointer, timer ticks, clicks); every call that can change the
//! picture re-runs the layout, diffs the new marks against the retained [`Scene`] and hands
//! the diffs to a [`ChartRenderer`].
//!
//! Timers are host-driven: poll [`ChartComponent::next_deadline`] and call
//! [`ChartComponent::tick`] with a millisecond timestamp once it has passed.

use core::fmt;
use core::mem;
use std::sync::Arc;

use kurbo::Point;
use tracing::debug;
use vistage_core::{Mark, MarkDiff, Scene, SvgScene};
use vistage_data::{DataError, DataLoader, DataSource, Dataset, Fetcher, LoadEvent, LoadState};

use crate::chart::{Chart, ChartFrame, ChartInput, ChartKind};
use crate::event::ChartEvent;
use crate::highlight::HighlightMachine;
use crate::layout::Size;
use crate::options::ChartOptions;
use crate::resize::{ResizeState, ResizeTracker};
use crate::tooltip::{DefaultTooltip, Tooltip, TooltipRenderer};

/// Consumes per-frame mark diffs.
pub trait ChartRenderer {
    /// Applies one frame of diffs.
    fn apply(&mut self, diffs: &[MarkDiff]);
}

impl ChartRenderer for SvgScene {
    fn apply(&mut self, diffs: &[MarkDiff]) {
        self.apply_diffs(diffs);
    }
}

/// Records every diff, for tests and hosts that batch.
impl ChartRenderer for Vec<MarkDiff> {
    fn apply(&mut self, diffs: &[MarkDiff]) {
        self.extend_from_slice(diffs);
    }
}

/// Hook run on freshly loaded data before it is shown.
pub type AfterLoadedHook = Box<dyn FnMut(&mut Dataset) -> Result<(), DataError>>;

/// A chart bound to its data, container and renderer.
pub struct ChartComponent<R> {
    kind: ChartKind,
    options: ChartOptions,
    fetcher: Arc<dyn Fetcher>,
    loader: DataLoader,
    source: DataSource,
    after_loaded: Option<AfterLoadedHook>,
    resize: ResizeTracker,
    highlight: HighlightMachine<String>,
    tooltip: Arc<dyn TooltipRenderer>,
    scene: Scene,
    renderer: R,
    frame: Option<ChartFrame>,
    events: Vec<ChartEvent>,
    unmounted: bool,
}

impl<R: fmt::Debug> fmt::Debug for ChartComponent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartComponent")
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("source", &self.source)
            .field("state", self.loader.state())
            .field("size", &self.resize.state())
            .field("highlight", &self.highlight)
            .field("renderer", &self.renderer)
            .field("events", &self.events)
            .field("unmounted", &self.unmounted)
            .finish_non_exhaustive()
    }
}

impl<R: ChartRenderer> ChartComponent<R> {
    /// Creates an unmounted component with no data.
    pub fn new(
        kind: ChartKind,
        options: ChartOptions,
        fetcher: Arc<dyn Fetcher>,
        renderer: R,
    ) -> Self {
        let highlight = HighlightMachine::new(options.highlight_config())
            .with_default(options.highlight.iter().cloned());
        Self {
            kind,
            options,
            fetcher,
            loader: DataLoader::new(),
            source: DataSource::default(),
            after_loaded: None,
            resize: ResizeTracker::new(),
            highlight,
            tooltip: Arc::new(DefaultTooltip),
            scene: Scene::new(),
            renderer,
            frame: None,
            events: Vec::new(),
            unmounted: false,
        }
    }

    /// Overrides the tooltip content.
    pub fn with_tooltip(mut self, tooltip: Arc<dyn TooltipRenderer>) -> Self {
        self.tooltip = tooltip;
        self
    }

    /// Runs `hook` on every newly loaded dataset before it is shown.
    pub fn with_after_loaded(
        mut self,
        hook: impl FnMut(&mut Dataset) -> Result<(), DataError> + 'static,
    ) -> Self {
        self.after_loaded = Some(Box::new(hook));
        self
    }

    /// Takes the initial container measurement and draws the first frame.
    pub fn mount(&mut self, size: Size) -> Vec<Mark> {
        if self.unmounted {
            return Vec::new();
        }
        let state = self.resize.mount(size);
        self.events.push(ChartEvent::Resized(state));
        self.load();
        self.render()
    }

    /// Replaces the data source; loads it if it differs from the last one.
    ///
    /// Ignored after unmount.
    pub fn set_source(&mut self, source: DataSource) {
        if self.unmounted {
            return;
        }
        self.source = source;
        self.load();
        self.rerender();
    }

    /// Replaces the options. A changed data URL format reloads.
    pub fn set_options(&mut self, options: ChartOptions) {
        if self.unmounted {
            return;
        }
        self.highlight.set_config(options.highlight_config());
        self.highlight.set_default(options.highlight.iter().cloned());
        self.options = options;
        self.load();
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

    /// Pointer entered the item or series with `key`.
    pub fn pointer_enter(&mut self, key: impl Into<String>, now: u64) {
        if self.highlight.on_enter(key.into(), now) {
            self.rerender();
        }
    }

    /// Pointer moved to `point`; hit-tests the current frame.
    pub fn pointer_move(&mut self, point: Point, now: u64) {
        match self.frame.as_ref().and_then(|f| f.highlight_key_at(point)) {
            Some(key) => self.pointer_enter(key, now),
            None => self.pointer_leave(now),
        }
    }

    /// Pointer left the chart or the hovered item.
    pub fn pointer_leave(&mut self, now: u64) {
        if self.highlight.on_leave(now) {
            self.rerender();
        }
    }

    /// Fires due highlight timers. No-op after unmount.
    pub fn tick(&mut self, now: u64) {
        if self.highlight.tick(now) {
            self.rerender();
        }
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.highlight.next_deadline()
    }

    /// Activates the row under `point`, emitting `select`.
    pub fn click(&mut self, point: Point) -> Option<ChartEvent> {
        let frame = self.frame.as_ref()?;
        let index = frame.row_at(point)?;
        let event = ChartEvent::Select {
            index,
            key: frame.keys.get(index)?.clone(),
        };
        self.events.push(event.clone());
        Some(event)
    }

    /// Tooltip content for the row under `point`.
    pub fn tooltip_at(&self, point: Point) -> Option<Tooltip> {
        let frame = self.frame.as_ref()?;
        let index = frame.row_at(point)?;
        let row = frame.rows.get(index)?;
        let anchor = frame.row_anchor(index).unwrap_or(point);
        Some(self.tooltip.render(row, &self.options, anchor))
    }

    /// Lays out the current state, applies the diff to the renderer and returns the marks.
    ///
    /// Draws nothing before mount, after unmount, or while there is no loaded data.
    pub fn render(&mut self) -> Vec<Mark> {
        if self.unmounted {
            return Vec::new();
        }
        let frame = match (self.resize.state(), self.loader.dataset()) {
            (Some(state), Some(dataset)) => {
                let input = ChartInput::new(dataset.rows(), state.size(), &self.options)
                    .with_highlights(self.highlight.active())
                    .with_narrow(state.narrow_width);
                Some(self.kind.layout(&input))
            }
            _ => None,
        };
        let marks = frame.as_ref().map(|f| f.marks.clone()).unwrap_or_default();
        let diffs = self.scene.tick(marks.clone());
        if !diffs.is_empty() {
            debug!(kind = ?self.kind, diffs = diffs.len(), "chart frame");
        }
        self.renderer.apply(&diffs);
        self.frame = frame;
        marks
    }

    /// Tears the chart down: cancels timers and removes every mark.
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
    pub fn frame(&self) -> Option<&ChartFrame> {
        self.frame.as_ref()
    }

    /// Data state.
    pub fn load_state(&self) -> &LoadState {
        self.loader.state()
    }

    /// Active highlight keys.
    pub fn highlights(&self) -> &[String] {
        self.highlight.active()
    }

    /// Last observed container state.
    pub fn resize_state(&self) -> Option<ResizeState> {
        self.resize.state()
    }

    /// The renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Current options.
    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    fn load(&mut self) {
        let hook: Option<vistage_data::AfterLoaded<'_>> = match self.after_loaded.as_mut() {
            Some(h) => Some(&mut **h),
            None => None,
        };
        let event = self.loader.load(
            &self.source,
            self.options.data_url_type,
            self.fetcher.as_ref(),
            hook,
        );
        match event {
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
