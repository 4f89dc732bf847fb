// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events emitted by components to the host.

use crate::resize::ResizeState;

/// Something the host may want to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartEvent {
    /// Data finished loading.
    Loaded {
        /// Number of rows.
        rows: usize,
    },
    /// Data failed to load; the component shows its error state.
    LoadFailed {
        /// Display form of the error.
        message: String,
    },
    /// The observed container box changed.
    Resized(ResizeState),
    /// A row was clicked.
    Select {
        /// Row index in display order.
        index: usize,
        /// Row key.
        key: String,
    },
    /// A map zoom transform changed.
    Zoomed {
        /// Scale factor.
        k: f64,
        /// Horizontal translation.
        x: f64,
        /// Vertical translation.
        y: f64,
        /// Feature zoomed to, if any.
        feature: Option<String>,
    },
    /// A map feature or symbol was clicked.
    Click {
        /// Matched key of the clicked item.
        key: String,
    },
}

impl ChartEvent {
    /// Event name as hosts know it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::LoadFailed { .. } => "load_failed",
            Self::Resized(_) => "resized",
            Self::Select { .. } => "select",
            Self::Zoomed { .. } => "zoomed",
            Self::Click { .. } => "click",
        }
    }
}
