// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-to-frame diffing of mark lists.

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Rect;

use crate::{Mark, MarkId, MarkPayload, MarkState};

/// A change between two consecutive frames.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkDiff {
    /// A mark appeared.
    Enter {
        /// Mark id.
        id: MarkId,
        /// Paint order.
        z_index: i32,
        /// Interaction state.
        state: MarkState,
        /// Payload bounds, if known.
        bounds: Option<Rect>,
        /// New payload.
        new: Box<MarkPayload>,
    },
    /// A mark kept its id but changed paint order, state, or payload.
    Update {
        /// Mark id.
        id: MarkId,
        /// Previous paint order.
        old_z_index: i32,
        /// New paint order.
        new_z_index: i32,
        /// New interaction state.
        state: MarkState,
        /// Previous bounds, if known.
        old_bounds: Option<Rect>,
        /// New bounds, if known.
        new_bounds: Option<Rect>,
        /// Previous payload.
        old: Box<MarkPayload>,
        /// New payload.
        new: Box<MarkPayload>,
    },
    /// A mark disappeared.
    Exit {
        /// Mark id.
        id: MarkId,
        /// Previous bounds, if known.
        bounds: Option<Rect>,
    },
}

impl MarkDiff {
    /// Returns the id this diff refers to.
    pub fn id(&self) -> MarkId {
        match self {
            Self::Enter { id, .. } | Self::Update { id, .. } | Self::Exit { id, .. } => *id,
        }
    }
}

/// Retained state of the last frame.
#[derive(Debug, Default)]
pub struct Scene {
    marks: HashMap<MarkId, Mark>,
    frame: u64,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retained marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Returns `true` if no marks are retained.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Number of frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Returns a retained mark.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.marks.get(&id)
    }

    /// Replaces the retained frame with `marks` and returns what changed.
    ///
    /// Enter/update diffs follow the order of `marks`; exits follow id order. If `marks`
    /// contains a duplicate id, the later mark wins.
    pub fn tick(&mut self, marks: Vec<Mark>) -> Vec<MarkDiff> {
        self.frame += 1;
        let mut next: HashMap<MarkId, Mark> = HashMap::with_capacity(marks.len());
        let mut order: Vec<MarkId> = Vec::with_capacity(marks.len());
        for mark in marks {
            if next.insert(mark.id, mark.clone()).is_none() {
                order.push(mark.id);
            }
        }

        let mut diffs = Vec::new();
        for id in &order {
            let Some(new) = next.get(id) else {
                continue;
            };
            match self.marks.get(id) {
                None => diffs.push(MarkDiff::Enter {
                    id: *id,
                    z_index: new.z_index,
                    state: new.state,
                    bounds: new.bounds(),
                    new: Box::new(new.payload.clone()),
                }),
                Some(old) if old != new => diffs.push(MarkDiff::Update {
                    id: *id,
                    old_z_index: old.z_index,
                    new_z_index: new.z_index,
                    state: new.state,
                    old_bounds: old.bounds(),
                    new_bounds: new.bounds(),
                    old: Box::new(old.payload.clone()),
                    new: Box::new(new.payload.clone()),
                }),
                Some(_) => {}
            }
        }

        let mut exits: Vec<&Mark> = self
            .marks
            .values()
            .filter(|m| !next.contains_key(&m.id))
            .collect();
        exits.sort_by_key(|m| m.id);
        diffs.extend(exits.into_iter().map(|m| MarkDiff::Exit {
            id: m.id,
            bounds: m.bounds(),
        }));

        self.marks = next;
        diffs
    }

    /// Removes every mark, returning exit diffs (unmount).
    pub fn clear(&mut self) -> Vec<MarkDiff> {
        self.tick(Vec::new())
    }

    /// Returns retained marks in paint order `(z_index, id)`.
    pub fn marks_sorted(&self) -> Vec<&Mark> {
        let mut out: Vec<&Mark> = self.marks.values().collect();
        out.sort_by_key(|m| (m.z_index, m.id));
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use kurbo::Rect;
    use peniko::color::palette::css;

    fn rect_mark(id: u64, x: f64) -> Mark {
        Mark::builder(MarkId::from_raw(id))
            .rect(Rect::new(x, 0.0, x + 10.0, 10.0))
            .fill(css::BLACK)
            .build()
    }

    #[test]
    fn first_tick_enters_everything() {
        let mut scene = Scene::new();
        let diffs = scene.tick(alloc::vec![rect_mark(1, 0.0), rect_mark(2, 20.0)]);
        assert_eq!(diffs.len(), 2);
        assert!(matches!(diffs[0], MarkDiff::Enter { id, .. } if id == MarkId(1)));
        assert!(matches!(diffs[1], MarkDiff::Enter { id, .. } if id == MarkId(2)));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn unchanged_marks_produce_no_diffs() {
        let mut scene = Scene::new();
        scene.tick(alloc::vec![rect_mark(1, 0.0)]);
        let diffs = scene.tick(alloc::vec![rect_mark(1, 0.0)]);
        assert!(diffs.is_empty(), "identical frame should not diff");
    }

    #[test]
    fn moved_and_removed_marks_update_and_exit() {
        let mut scene = Scene::new();
        scene.tick(alloc::vec![rect_mark(1, 0.0), rect_mark(2, 20.0)]);
        let diffs = scene.tick(alloc::vec![rect_mark(1, 5.0)]);
        assert_eq!(diffs.len(), 2);
        match &diffs[0] {
            MarkDiff::Update {
                id,
                old_bounds,
                new_bounds,
                ..
            } => {
                assert_eq!(*id, MarkId(1));
                assert_eq!(old_bounds.map(|b| b.x0), Some(0.0));
                assert_eq!(new_bounds.map(|b| b.x0), Some(5.0));
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert!(matches!(diffs[1], MarkDiff::Exit { id, .. } if id == MarkId(2)));
    }

    #[test]
    fn state_change_is_an_update() {
        let mut scene = Scene::new();
        scene.tick(alloc::vec![rect_mark(1, 0.0)]);
        let mut m = rect_mark(1, 0.0);
        m.state.highlighted = true;
        let diffs = scene.tick(alloc::vec![m]);
        assert!(
            matches!(&diffs[0], MarkDiff::Update { state, .. } if state.highlighted),
            "highlight flag should be part of identity comparison"
        );
    }

    #[test]
    fn clear_exits_all_and_sorted_respects_z() {
        let mut scene = Scene::new();
        let mut back = rect_mark(9, 0.0);
        back.z_index = -1;
        scene.tick(alloc::vec![rect_mark(1, 0.0), back]);
        let ids: alloc::vec::Vec<_> = scene.marks_sorted().iter().map(|m| m.id).collect();
        assert_eq!(ids, alloc::vec![MarkId(9), MarkId(1)]);
        let diffs = scene.clear();
        assert_eq!(diffs.len(), 2);
        assert!(scene.is_empty());
    }
}
