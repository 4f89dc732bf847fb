// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debounced hover highlighting.
//!
//! Pointer enter/leave on a legend entry or row does not change the highlight set
//! immediately. Instead it schedules a transition that fires after a configurable delay:
//!
//! ```text
//! Idle --enter--> HoverPending --apply delay--> Highlighted
//!   ^                                               |
//!   +------ restore delay ------ RestorePending <---leave
//! ```
//!
//! Timers are deadlines in host-supplied milliseconds; the host polls
//! [`HighlightMachine::next_deadline`] and calls [`HighlightMachine::tick`]. A new hover
//! before a pending timer fires replaces it, so the last hover always wins.
//!
//! ```
//! use vistage_charts::{HighlightConfig, HighlightMachine};
//!
//! let mut m = HighlightMachine::new(HighlightConfig::new(100, 200));
//! m.on_enter("a", 0);
//! m.on_enter("b", 50);
//! assert!(!m.tick(120));
//! assert!(m.tick(150));
//! assert_eq!(m.active(), ["b"]);
//! ```

use smallvec::SmallVec;
use tracing::trace;

/// Delays for the two debounced transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Milliseconds between pointer enter and the highlight applying.
    pub apply_delay_ms: u64,
    /// Milliseconds between pointer leave and the default set returning.
    pub restore_delay_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            apply_delay_ms: 100,
            restore_delay_ms: 200,
        }
    }
}

impl HighlightConfig {
    /// Creates a config.
    pub const fn new(apply_delay_ms: u64, restore_delay_ms: u64) -> Self {
        Self {
            apply_delay_ms,
            restore_delay_ms,
        }
    }
}

/// Observable phase of a [`HighlightMachine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightPhase {
    /// The default set is active and nothing is scheduled.
    Idle,
    /// A hover is waiting for the apply delay.
    HoverPending,
    /// A hovered key is active.
    Highlighted,
    /// A leave is waiting for the restore delay.
    RestorePending,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Pending<K> {
    Apply { key: K, deadline: u64 },
    Restore { deadline: u64 },
}

/// Highlight set with timer-driven transitions.
#[derive(Clone, Debug)]
pub struct HighlightMachine<K> {
    config: HighlightConfig,
    default: SmallVec<[K; 4]>,
    active: SmallVec<[K; 4]>,
    hovered: Option<K>,
    pending: Option<Pending<K>>,
    cancelled: bool,
}

impl<K: Clone + PartialEq + core::fmt::Debug> HighlightMachine<K> {
    /// Creates a machine with an empty default set.
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            config,
            default: SmallVec::new(),
            active: SmallVec::new(),
            hovered: None,
            pending: None,
            cancelled: false,
        }
    }

    /// Sets the default set, which is active whenever nothing is hovered.
    pub fn with_default(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.set_default(keys);
        self
    }

    /// Replaces the default set; if idle, it becomes active immediately.
    pub fn set_default(&mut self, keys: impl IntoIterator<Item = K>) {
        self.default = keys.into_iter().collect();
        if self.phase() == HighlightPhase::Idle {
            self.active = self.default.clone();
        }
    }

    /// Replaces the delays; already scheduled deadlines are kept.
    pub fn set_config(&mut self, config: HighlightConfig) {
        self.config = config;
    }

    /// Currently active keys.
    pub fn active(&self) -> &[K] {
        &self.active
    }

    /// Whether `key` is active.
    pub fn is_active(&self, key: &K) -> bool {
        self.active.contains(key)
    }

    /// Current phase.
    pub fn phase(&self) -> HighlightPhase {
        match &self.pending {
            Some(Pending::Apply { .. }) => HighlightPhase::HoverPending,
            Some(Pending::Restore { .. }) => HighlightPhase::RestorePending,
            None if self.hovered.is_some() => HighlightPhase::Highlighted,
            None => HighlightPhase::Idle,
        }
    }

    /// Earliest scheduled deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        match &self.pending {
            Some(Pending::Apply { deadline, .. } | Pending::Restore { deadline }) => {
                Some(*deadline)
            }
            None => None,
        }
    }

    /// Pointer entered `key` at `now`. Returns `true` if the active set changed.
    pub fn on_enter(&mut self, key: K, now: u64) -> bool {
        if self.cancelled {
            return false;
        }
        if self.hovered.as_ref() == Some(&key) {
            // Re-entering the highlighted key drops whatever was pending: a restore, or a
            // hover elsewhere that has not applied yet.
            if self.pending.take().is_some() {
                trace!(?key, "pending transition cancelled by re-enter");
            }
            return false;
        }
        if self.config.apply_delay_ms == 0 {
            self.pending = None;
            return self.apply(key);
        }
        let deadline = now.saturating_add(self.config.apply_delay_ms);
        trace!(?key, deadline, "highlight pending");
        self.pending = Some(Pending::Apply { key, deadline });
        false
    }

    /// Pointer left at `now`. Returns `true` if the active set changed.
    pub fn on_leave(&mut self, now: u64) -> bool {
        if self.cancelled {
            return false;
        }
        if matches!(self.pending, Some(Pending::Apply { .. })) {
            self.pending = None;
        }
        if self.hovered.is_none() || self.pending.is_some() {
            return false;
        }
        if self.config.restore_delay_ms == 0 {
            return self.restore();
        }
        let deadline = now.saturating_add(self.config.restore_delay_ms);
        trace!(deadline, "restore pending");
        self.pending = Some(Pending::Restore { deadline });
        false
    }

    /// Fires a due transition. Returns `true` if the active set changed.
    pub fn tick(&mut self, now: u64) -> bool {
        if self.cancelled {
            return false;
        }
        let due = self.next_deadline().is_some_and(|d| d <= now);
        if !due {
            return false;
        }
        match self.pending.take() {
            Some(Pending::Apply { key, .. }) => self.apply(key),
            Some(Pending::Restore { .. }) => self.restore(),
            None => false,
        }
    }

    /// Drops pending timers permanently (unmount); later calls are no-ops.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.cancelled = true;
    }

    /// Whether [`HighlightMachine::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn apply(&mut self, key: K) -> bool {
        trace!(?key, "highlight applied");
        let next: SmallVec<[K; 4]> = SmallVec::from_elem(key.clone(), 1);
        self.hovered = Some(key);
        let changed = self.active != next;
        self.active = next;
        changed
    }

    fn restore(&mut self) -> bool {
        trace!("highlight restored");
        self.hovered = None;
        let changed = self.active != self.default;
        self.active = self.default.clone();
        changed
    }
}
