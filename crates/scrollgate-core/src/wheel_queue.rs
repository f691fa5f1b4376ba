#![forbid(unsafe_code)]

//! Coalescing buffer for not-yet-dispatched wheel events.
//!
//! Wheel devices can deliver samples far faster than a consumer acknowledges
//! them. While one event is in flight, later samples wait here, and adjacent
//! compatible samples are merged so the consumer sees one event carrying the
//! summed delta instead of a backlog.
//!
//! This module provides [`WheelEventQueue`] which:
//! - Merges an incoming event into the last pending entry when compatible
//! - Starts a new entry at modifier, rail-mode, device, or phase boundaries
//! - Drops zero-delta events that carry no phase information
//!
//! # Design
//!
//! The queue only ever holds events that have *not* been dispatched. The
//! dispatcher pops the front entry as soon as its in-flight slot frees up, so
//! whenever the queue is non-empty an event is in flight and coalescing into
//! the back entry never touches a dispatched event.
//!
//! # Usage
//!
//! ```
//! use scrollgate_core::event::{Modifiers, WheelEvent};
//! use scrollgate_core::wheel_queue::{Enqueued, WheelEventQueue};
//!
//! let mut queue = WheelEventQueue::new();
//!
//! assert_eq!(queue.enqueue(WheelEvent::new(0.0, -10.0)), Enqueued::Appended);
//! assert_eq!(queue.enqueue(WheelEvent::new(8.0, -6.0)), Enqueued::Coalesced);
//!
//! // Different modifiers start a new entry.
//! let shifted = WheelEvent::new(9.0, -7.0).with_modifiers(Modifiers::SHIFT);
//! assert_eq!(queue.enqueue(shifted), Enqueued::Appended);
//!
//! let first = queue.pop_front().unwrap();
//! assert_eq!((first.event.delta_x, first.event.delta_y), (8.0, -16.0));
//! assert_eq!(first.coalesced_count, 2);
//! ```

use std::collections::VecDeque;

use crate::event::{WheelEvent, WheelPhase};

/// A pending wheel event plus coalescing metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedWheelEvent {
    /// The event as it will be dispatched; deltas hold the accumulated sum.
    pub event: WheelEvent,
    /// Number of raw samples merged into this entry (at least 1).
    pub coalesced_count: u32,
}

impl QueuedWheelEvent {
    /// Wrap a single raw sample.
    #[must_use]
    pub const fn new(event: WheelEvent) -> Self {
        Self {
            event,
            coalesced_count: 1,
        }
    }

    /// Whether `next` may be merged into this entry.
    ///
    /// Both events must agree on every attribute that changes how the
    /// consumer interprets a delta, and neither may carry a phase that marks
    /// a sequence boundary.
    #[must_use]
    pub fn can_coalesce_with(&self, next: &WheelEvent) -> bool {
        let ev = &self.event;
        ev.modifiers == next.modifiers
            && ev.rail_mode == next.rail_mode
            && ev.precise_deltas == next.precise_deltas
            && ev.scroll_by_page == next.scroll_by_page
            && ev.device == next.device
            && ev.resend_marker == next.resend_marker
            && !ev.phase.is_boundary()
            && !ev.momentum_phase.is_boundary()
            && !next.phase.is_boundary()
            && !next.momentum_phase.is_boundary()
    }

    /// Merge `next` into this entry.
    ///
    /// Deltas are summed component-wise, saturating at `±f32::MAX`; position
    /// and the newest non-empty phase and momentum phase are adopted from
    /// `next`.
    pub fn coalesce(&mut self, next: WheelEvent) {
        let ev = &mut self.event;
        ev.delta_x = saturating_sum(ev.delta_x, next.delta_x);
        ev.delta_y = saturating_sum(ev.delta_y, next.delta_y);
        ev.position = next.position;
        ev.global_position = next.global_position;
        if next.phase != WheelPhase::None {
            ev.phase = next.phase;
        }
        if next.momentum_phase != WheelPhase::None {
            ev.momentum_phase = next.momentum_phase;
        }
        self.coalesced_count = self.coalesced_count.saturating_add(1);
    }
}

/// Finite inputs whose sum overflows clamp to the largest finite value.
#[inline]
fn saturating_sum(a: f32, b: f32) -> f32 {
    (a + b).clamp(-f32::MAX, f32::MAX)
}

/// What [`WheelEventQueue::enqueue`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Zero delta and no phase information; nothing to deliver.
    Dropped,
    /// Merged into the last pending entry.
    Coalesced,
    /// Added as a new pending entry.
    Appended,
}

/// FIFO of pending wheel events with tail coalescing.
///
/// # Thread Safety
///
/// `WheelEventQueue` is not thread-safe. It should be used from a single
/// event processing thread.
///
/// # Performance
///
/// `enqueue` and `pop_front` are O(1) amortized.
#[derive(Debug, Clone, Default)]
pub struct WheelEventQueue {
    pending: VecDeque<QueuedWheelEvent>,
}

impl WheelEventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event, merging it into the last pending entry when compatible.
    ///
    /// Non-finite deltas are clamped to zero before anything else happens.
    pub fn enqueue(&mut self, event: WheelEvent) -> Enqueued {
        let event = event.sanitized();
        if event.is_zero_delta() && !event.has_phase_info() {
            return Enqueued::Dropped;
        }

        if let Some(last) = self.pending.back_mut()
            && last.can_coalesce_with(&event)
        {
            last.coalesce(event);
            return Enqueued::Coalesced;
        }

        self.pending.push_back(QueuedWheelEvent::new(event));
        Enqueued::Appended
    }

    /// Remove and return the oldest pending entry.
    pub fn pop_front(&mut self) -> Option<QueuedWheelEvent> {
        self.pending.pop_front()
    }

    /// Peek at the oldest pending entry.
    #[must_use]
    pub fn front(&self) -> Option<&QueuedWheelEvent> {
        self.pending.front()
    }

    /// Number of pending entries (not raw samples).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Iterate pending entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedWheelEvent> {
        self.pending.iter()
    }

    /// Sum of all pending deltas.
    #[must_use]
    pub fn pending_delta(&self) -> (f32, f32) {
        self.pending.iter().fold((0.0, 0.0), |(x, y), q| {
            (x + q.event.delta_x, y + q.event.delta_y)
        })
    }

    /// Discard all pending entries without dispatching them.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
