// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Container size tracking.

use tracing::trace;

use crate::Size;

/// Container widths below this are "narrow".
pub const NARROW_WIDTH_BREAKPOINT: f64 = 540.0;

/// Observed container box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeState {
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// `width < NARROW_WIDTH_BREAKPOINT`.
    pub narrow_width: bool,
}

impl ResizeState {
    /// Derives the state for a box size.
    pub fn from_size(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            narrow_width: size.width < NARROW_WIDTH_BREAKPOINT,
        }
    }

    /// The box as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Tracks a container's box across observations.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResizeTracker {
    state: Option<ResizeState>,
}

impl ResizeTracker {
    /// Creates an unmounted tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the initial measurement. Always reports the state.
    pub fn mount(&mut self, initial: Size) -> ResizeState {
        let state = ResizeState::from_size(initial);
        trace!(width = state.width, height = state.height, "resize mount");
        self.state = Some(state);
        state
    }

    /// Records an observation; `None` when the box did not change.
    pub fn observe(&mut self, size: Size) -> Option<ResizeState> {
        let next = ResizeState::from_size(size);
        if self.state == Some(next) {
            return None;
        }
        trace!(
            width = next.width,
            height = next.height,
            narrow = next.narrow_width,
            "resize observed"
        );
        self.state = Some(next);
        Some(next)
    }

    /// Last known state.
    pub fn state(&self) -> Option<ResizeState> {
        self.state
    }

    /// Whether the tracker has a measurement.
    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }
}
