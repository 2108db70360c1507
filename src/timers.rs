//! Pending delayed callbacks for the session controller.
//!
//! Every timer carries the session generation it was armed in. Removing a
//! timer from the queue is only half of cancellation: the controller also
//! compares a fired timer's generation with its own before acting, so a
//! timer that escaped a `clear()` still cannot touch a newer session.

use itertools::Itertools;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// one-second countdown step
    ClockTick,
    /// settle delay over; build the round for `index`
    PrepareRound { index: usize },
    /// reveal delay over; moles for `index` pop up
    RevealRound { index: usize },
    ClearFeedback,
    ExpirePopup { id: u64 },
}

impl TimerKind {
    /// Presentation-only timers outlive finalization so the last cue can fade.
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, TimerKind::ClearFeedback | TimerKind::ExpirePopup { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub id: u64,
    pub due: Instant,
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, kind: TimerKind, generation: u64) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            due,
            kind,
            generation,
        });
        TimerHandle(id)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != handle.0);
        self.pending.len() != before
    }

    pub fn retain<F: FnMut(&Timer) -> bool>(&mut self, keep: F) {
        self.pending.retain(keep);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Removes and returns the earliest timer due at or before `now`.
    /// Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        let idx = self
            .pending
            .iter()
            .positions(|t| t.due <= now)
            .min_by_key(|&i| (self.pending[i].due, self.pending[i].id))?;
        Some(self.pending.swap_remove(idx))
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|t| t.due).min()
    }

    pub fn contains(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
