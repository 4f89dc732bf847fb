// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark model for `vistage` components.
//!
//! Components (charts, maps, annotations) never talk to a renderer directly. Instead they
//! produce a flat list of [`Mark`]s with stable [`MarkId`]s every frame:
//! - a [`Scene`] retains the last frame and diffs new frames into enter/update/exit records,
//! - renderers apply those diffs (or paint [`Scene::marks_sorted`] directly).
//!
//! Marks are immutable geometry + paint; there is no retained dataflow here. Layout is done
//! upstream by pure functions, so a mark list is a complete description of one frame.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod mark;
mod scene;
#[cfg(feature = "std")]
pub mod svg;

pub use mark::{
    Mark, MarkBuilder, MarkId, MarkPayload, MarkState, PathMarkBuilder, PathPayload,
    RectMarkBuilder, RectPayload, TextAnchor, TextBaseline, TextMarkBuilder, TextPayload,
};
pub use scene::{MarkDiff, Scene};
#[cfg(feature = "std")]
pub use svg::{SvgScene, escape_xml, marks_to_svg};
