#![forbid(unsafe_code)]

//! Ack-gated wheel dispatch.
//!
//! At most one wheel event is in flight to the consumer. Everything else
//! waits in a [`WheelEventQueue`], coalescing into its tail. The in-flight
//! slot is filled only by [`dispatch_next`](AckGatedDispatcher::dispatch_next)
//! and cleared only by [`on_ack`](AckGatedDispatcher::on_ack).
//!
//! # Invariants
//!
//! 1. `in_flight.is_some()` at most once at a time; events leave the queue in
//!    FIFO order.
//! 2. Coalescing never touches the in-flight event.
//! 3. Whatever an ack triggers runs before the next event is dispatched.
//!
//! # Failure Modes
//!
//! - An ack with nothing in flight returns
//!   [`ProtocolViolation::AckWithoutInFlight`] and leaves all state untouched.
//! - A consumer that never acks stalls the queue. This is not recovered.

use scrollgate_core::{AckResult, Enqueued, WheelEvent, WheelEventQueue};
use web_time::{Duration, Instant};

use crate::consumer::ScrollConsumer;
use crate::error::ProtocolViolation;

/// The event currently awaiting an ack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InFlight {
    pub event: WheelEvent,
    /// Raw samples merged into `event`.
    pub coalesced_count: u32,
    pub sent_at: Instant,
}

/// An acknowledged wheel event, handed to the ack callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AckedWheelEvent {
    pub event: WheelEvent,
    pub coalesced_count: u32,
    pub result: AckResult,
    /// Time between dispatch and ack.
    pub latency: Duration,
}

/// Single-slot dispatcher in front of a coalescing queue.
#[derive(Debug, Clone, Default)]
pub struct AckGatedDispatcher {
    queue: WheelEventQueue,
    in_flight: Option<InFlight>,
    last_ack: Option<AckResult>,
    dispatched: u64,
}

impl AckGatedDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `event` and dispatch it straight away if nothing is in flight.
    pub fn enqueue<C>(&mut self, event: WheelEvent, consumer: &mut C, now: Instant) -> Enqueued
    where
        C: ScrollConsumer + ?Sized,
    {
        let outcome = self.queue.enqueue(event);
        tracing::trace!(
            target: "scrollgate.queue",
            outcome = ?outcome,
            pending = self.queue.len(),
            in_flight = self.in_flight.is_some(),
            "wheel event enqueued"
        );
        self.dispatch_next(consumer, now);
        outcome
    }

    /// Move the front of the queue into the in-flight slot and send it.
    ///
    /// Returns `true` if an event was sent.
    pub fn dispatch_next<C>(&mut self, consumer: &mut C, now: Instant) -> bool
    where
        C: ScrollConsumer + ?Sized,
    {
        if self.in_flight.is_some() {
            return false;
        }
        let Some(next) = self.queue.pop_front() else {
            return false;
        };
        tracing::trace!(
            target: "scrollgate.dispatch",
            dx = next.event.delta_x,
            dy = next.event.delta_y,
            coalesced = next.coalesced_count,
            "dispatching wheel event"
        );
        self.in_flight = Some(InFlight {
            event: next.event,
            coalesced_count: next.coalesced_count,
            sent_at: now,
        });
        self.dispatched += 1;
        consumer.send_wheel_event(&next.event);
        true
    }

    /// Handle the consumer's ack for the in-flight event.
    ///
    /// Clears the slot, records the result, runs `on_acked` (which may send
    /// derived gestures through `consumer`), then dispatches the next
    /// pending event.
    pub fn on_ack<C, F>(
        &mut self,
        result: AckResult,
        now: Instant,
        consumer: &mut C,
        on_acked: F,
    ) -> Result<AckedWheelEvent, ProtocolViolation>
    where
        C: ScrollConsumer + ?Sized,
        F: FnOnce(&AckedWheelEvent, &mut C),
    {
        let in_flight = self
            .in_flight
            .take()
            .ok_or(ProtocolViolation::AckWithoutInFlight)?;
        self.last_ack = Some(result);

        let acked = AckedWheelEvent {
            event: in_flight.event,
            coalesced_count: in_flight.coalesced_count,
            result,
            latency: now.saturating_duration_since(in_flight.sent_at),
        };
        on_acked(&acked, consumer);
        self.dispatch_next(consumer, now);
        Ok(acked)
    }

    #[inline]
    #[must_use]
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &WheelEventQueue {
        &self.queue
    }

    /// Events sent since creation.
    #[inline]
    #[must_use]
    pub fn dispatched_total(&self) -> u64 {
        self.dispatched
    }

    /// Result of the most recent ack.
    #[inline]
    #[must_use]
    pub fn last_ack(&self) -> Option<AckResult> {
        self.last_ack
    }
}
