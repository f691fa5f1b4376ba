#![forbid(unsafe_code)]

//! Scroll router: the wiring of dispatch, synthesis, arbitration, and
//! overscroll.
//!
//! [`ScrollRouter`] is the single entry point for the input side. It owns
//! the consumer and the overscroll delegate, so every side effect of an
//! input call (wheel sends, gesture sends, delegate callbacks) has happened
//! by the time the call returns.
//!
//! # Data flow
//!
//! ```text
//! enqueue ─▶ queue ─▶ in-flight ─▶ consumer
//!                                     │ on_wheel_ack
//!                                     ▼
//!                          GestureSynthesizer ─▶ consumer
//!                                                  │ on_gesture_ack (Update)
//!                                                  ▼
//!                                        OverscrollController ─▶ delegate
//! ```
//!
//! # Protocol
//!
//! - Every wheel event sent is answered by exactly one `on_wheel_ack`.
//! - Every gesture sent is answered, in order, by one `on_gesture_ack`.
//!   Updates intercepted by an active overscroll are never sent and never
//!   acked.
//! - [`tick`](ScrollRouter::tick) must be called at or after
//!   [`next_deadline`](ScrollRouter::next_deadline) for phaseless wheel
//!   sessions to end.
//!
//! Violations are logged, counted in [`RouterStats`], and otherwise ignored.

use std::collections::VecDeque;

use ahash::AHashSet;
use scrollgate_core::{
    AckResult, Enqueued, GestureScrollEvent, GestureScrollKind, GestureSynthesizer, ScrollDevice,
    SessionState, TimerDirective, WheelEvent,
};
use web_time::{Duration, Instant};

use crate::arbitration::{ScrollArbitrator, Takeover};
use crate::config::RouterConfig;
use crate::consumer::ScrollConsumer;
use crate::dispatcher::{AckGatedDispatcher, AckedWheelEvent, InFlight};
use crate::error::ProtocolViolation;
use crate::overscroll::{
    FlingDisposition, OverscrollController, OverscrollDelegate, OverscrollState, ResetOutcome,
    ResetTrigger,
};
use crate::session_timer::SessionTimer;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Counters for the router's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Wheel events handed to `enqueue`.
    pub wheel_events_enqueued: u64,
    /// Dropped at enqueue (no delta, no phase).
    pub wheel_events_dropped: u64,
    /// Merged into a pending entry.
    pub wheel_events_coalesced: u64,
    /// Sent to the consumer.
    pub wheel_events_sent: u64,
    pub wheel_acks: u64,
    pub gestures_sent: u64,
    /// Updates kept from the consumer by an active overscroll.
    pub gestures_intercepted: u64,
    pub protocol_violations: u64,
    /// Dispatch-to-ack time of the most recent wheel ack.
    pub last_ack_latency: Option<Duration>,
}

// ---------------------------------------------------------------------------
// Gesture pipeline
// ---------------------------------------------------------------------------

/// A gesture sent to the consumer and not yet acked.
#[derive(Debug, Clone, Copy)]
struct PendingGesture {
    gesture: GestureScrollEvent,
    /// Value of the session generation when the gesture was sent.
    session: u64,
}

/// Everything downstream of the wheel ack. Kept apart from the dispatcher so
/// the ack callback can borrow it alongside the consumer.
#[derive(Debug)]
struct GesturePipeline<D> {
    send_gestures: bool,
    quiescence_timeout: Duration,
    synthesizer: GestureSynthesizer,
    timer: SessionTimer,
    arbitrator: ScrollArbitrator,
    overscroll: OverscrollController<D>,
    awaiting_ack: VecDeque<PendingGesture>,
    /// Bumped after every `End` sent; acks for older sessions no longer
    /// drive overscroll.
    session_generation: u64,
    external_sessions: AHashSet<ScrollDevice>,
    stats: RouterStats,
}

impl<D: OverscrollDelegate> GesturePipeline<D> {
    fn on_wheel_acked<C>(&mut self, acked: &AckedWheelEvent, now: Instant, consumer: &mut C)
    where
        C: ScrollConsumer + ?Sized,
    {
        if !self.send_gestures {
            return;
        }
        let device = acked.event.device;
        let blocked = self.arbitrator.blocks(device);
        let synthesis = self
            .synthesizer
            .on_wheel_ack(&acked.event, acked.result, blocked);

        // A session opening on one device closes any other open session.
        if synthesis.gestures.iter().any(GestureScrollEvent::is_begin) {
            let others: Vec<_> = self
                .synthesizer
                .active_devices()
                .filter(|d| *d != device)
                .collect();
            for other in others {
                tracing::debug!(
                    target: "scrollgate.gesture",
                    ended = ?other,
                    by = ?device,
                    "session preempted by another device"
                );
                self.terminate(other, consumer);
            }
        }

        for gesture in synthesis.gestures {
            self.emit(gesture, consumer);
        }

        match synthesis.timer {
            TimerDirective::Keep => {}
            TimerDirective::Restart(device) => {
                self.timer
                    .start_or_reset(now, self.quiescence_timeout, device);
            }
            TimerDirective::Stop => self.timer.stop_for(device),
        }
    }

    /// Close `device`'s session, if open, and forward its `End`.
    fn terminate<C>(&mut self, device: ScrollDevice, consumer: &mut C)
    where
        C: ScrollConsumer + ?Sized,
    {
        self.timer.stop_for(device);
        if let Some(end) = self.synthesizer.end_session(device) {
            self.emit(end, consumer);
        }
    }

    fn on_timer<C>(&mut self, now: Instant, consumer: &mut C)
    where
        C: ScrollConsumer + ?Sized,
    {
        let Some(fire) = self.timer.poll(now) else {
            return;
        };
        match self.synthesizer.end_session(fire.device) {
            Some(end) => {
                tracing::debug!(
                    target: "scrollgate.gesture",
                    device = ?fire.device,
                    generation = fire.generation,
                    "session ended after quiescence"
                );
                self.emit(end, consumer);
            }
            None => self.record_violation(ProtocolViolation::StaleTimerFire(fire.device)),
        }
    }

    fn preempt_wheel_sessions<C>(&mut self, consumer: &mut C)
    where
        C: ScrollConsumer + ?Sized,
    {
        let wheel: Vec<_> = self
            .synthesizer
            .active_devices()
            .filter(|d| d.is_wheel_family())
            .collect();
        for device in wheel {
            self.terminate(device, consumer);
        }
    }

    /// Route one gesture through the overscroll controller to the consumer.
    fn emit<C>(&mut self, gesture: GestureScrollEvent, consumer: &mut C)
    where
        C: ScrollConsumer + ?Sized,
    {
        match gesture.kind {
            GestureScrollKind::Begin => self.overscroll.on_scroll_begin(gesture.device),
            GestureScrollKind::Update if self.overscroll.should_intercept() => {
                self.overscroll
                    .process_unconsumed(gesture.delta_x, gesture.delta_y);
                self.stats.gestures_intercepted += 1;
                return;
            }
            GestureScrollKind::Update => {}
            GestureScrollKind::End => {
                self.overscroll.reset(ResetTrigger::ScrollEnd);
            }
        }

        tracing::trace!(
            target: "scrollgate.gesture",
            kind = ?gesture.kind,
            device = ?gesture.device,
            dx = gesture.delta_x,
            dy = gesture.delta_y,
            synthetic = gesture.synthetic,
            "gesture sent"
        );
        consumer.send_gesture_event(&gesture);
        self.awaiting_ack.push_back(PendingGesture {
            gesture,
            session: self.session_generation,
        });
        self.stats.gestures_sent += 1;
        if gesture.is_end() {
            self.session_generation = self.session_generation.wrapping_add(1);
        }
    }

    fn record_violation(&mut self, violation: ProtocolViolation) {
        self.stats.protocol_violations += 1;
        match violation {
            ProtocolViolation::AckWithoutInFlight => tracing::warn!(
                target: "scrollgate.dispatch",
                violation = violation.as_str(),
                "protocol violation ignored: {violation}"
            ),
            _ if violation.is_benign() => tracing::debug!(
                target: "scrollgate.gesture",
                violation = violation.as_str(),
                "protocol violation ignored: {violation}"
            ),
            _ => tracing::warn!(
                target: "scrollgate.gesture",
                violation = violation.as_str(),
                "protocol violation ignored: {violation}"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// ScrollRouter
// ---------------------------------------------------------------------------

/// Ack-gated wheel router with gesture synthesis and overscroll.
///
/// Single-threaded: every method runs to completion, synchronously invoking
/// the consumer and delegate.
#[derive(Debug)]
pub struct ScrollRouter<C, D> {
    config: RouterConfig,
    consumer: C,
    dispatcher: AckGatedDispatcher,
    pipeline: GesturePipeline<D>,
}

impl<C: ScrollConsumer, D: OverscrollDelegate> ScrollRouter<C, D> {
    /// Create a router. The config is used as given; call
    /// [`RouterConfig::validated`] first to reject bad values.
    #[must_use]
    pub fn new(config: RouterConfig, consumer: C, delegate: D) -> Self {
        let pipeline = GesturePipeline {
            send_gestures: config.send_gestures,
            quiescence_timeout: config.quiescence_timeout(),
            synthesizer: GestureSynthesizer::new(),
            timer: SessionTimer::new(),
            arbitrator: ScrollArbitrator::new(),
            overscroll: OverscrollController::new(config.overscroll, delegate),
            awaiting_ack: VecDeque::new(),
            session_generation: 0,
            external_sessions: AHashSet::new(),
            stats: RouterStats::default(),
        };
        Self {
            config,
            consumer,
            dispatcher: AckGatedDispatcher::new(),
            pipeline,
        }
    }

    // --- Wheel input ---

    /// Accept a raw wheel event. It is sent immediately if nothing is in
    /// flight, otherwise queued (and possibly coalesced).
    pub fn enqueue(&mut self, event: WheelEvent, now: Instant) -> Enqueued {
        let stats = &mut self.pipeline.stats;
        stats.wheel_events_enqueued += 1;

        let outcome = self.dispatcher.enqueue(event, &mut self.consumer, now);
        match outcome {
            Enqueued::Dropped => stats.wheel_events_dropped += 1,
            Enqueued::Coalesced => stats.wheel_events_coalesced += 1,
            Enqueued::Appended => {}
        }
        stats.wheel_events_sent = self.dispatcher.dispatched_total();
        outcome
    }

    /// The consumer acked the in-flight wheel event.
    ///
    /// Derived gestures are sent before the next wheel event. Returns the
    /// acked event, or `None` if nothing was in flight.
    pub fn on_wheel_ack(&mut self, result: AckResult, now: Instant) -> Option<AckedWheelEvent> {
        let _span = tracing::debug_span!(
            "wheel.ack",
            result = ?result,
            pending = self.dispatcher.queue().len(),
        )
        .entered();

        let pipeline = &mut self.pipeline;
        let acked = self
            .dispatcher
            .on_ack(result, now, &mut self.consumer, |acked, consumer| {
                pipeline.on_wheel_acked(acked, now, consumer);
            });

        match acked {
            Ok(acked) => {
                let stats = &mut self.pipeline.stats;
                stats.wheel_acks += 1;
                stats.last_ack_latency = Some(acked.latency);
                stats.wheel_events_sent = self.dispatcher.dispatched_total();
                tracing::debug!(
                    target: "scrollgate.dispatch",
                    latency_us = acked.latency.as_micros() as u64,
                    coalesced = acked.coalesced_count,
                    "wheel event acked"
                );
                Some(acked)
            }
            Err(violation) => {
                self.pipeline.record_violation(violation);
                None
            }
        }
    }

    /// Fire the quiescence timer if its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        self.pipeline.on_timer(now, &mut self.consumer);
    }

    // --- Gesture acks ---

    /// The consumer acked the oldest outstanding gesture.
    ///
    /// Only `Update` acks feed the overscroll state machine, and only while
    /// the session they belong to is still open.
    pub fn on_gesture_ack(&mut self, kind: GestureScrollKind, result: AckResult) {
        let pipeline = &mut self.pipeline;
        let Some(PendingGesture {
            gesture: front,
            session,
        }) = pipeline.awaiting_ack.front().copied()
        else {
            pipeline.record_violation(ProtocolViolation::GestureAckWithoutPending);
            return;
        };
        if front.kind != kind {
            pipeline.record_violation(ProtocolViolation::GestureAckMismatch {
                expected: front.kind,
                got: kind,
            });
            return;
        }
        pipeline.awaiting_ack.pop_front();
        if !front.is_update() {
            return;
        }
        if session != pipeline.session_generation {
            tracing::trace!(
                target: "scrollgate.overscroll",
                result = ?result,
                "update ack for a closed session ignored"
            );
            return;
        }
        pipeline
            .overscroll
            .on_update_ack(front.delta_x, front.delta_y, result);
    }

    // --- Other scroll sources ---

    /// A device outside the wheel queue began a gesture scroll.
    ///
    /// Non-wheel devices take the gesture over: open wheel sessions end and
    /// new ones are blocked until the device ends or flings.
    pub fn on_gesture_scroll_begin(&mut self, device: ScrollDevice) {
        match self.pipeline.arbitrator.on_external_scroll_begin(device) {
            Takeover::PreemptWheel => self.pipeline.preempt_wheel_sessions(&mut self.consumer),
            Takeover::None => {}
        }
    }

    /// A device outside the wheel queue ended its gesture scroll or flung.
    pub fn on_gesture_scroll_end_or_fling(&mut self, device: ScrollDevice) {
        self.pipeline
            .arbitrator
            .on_external_scroll_end_or_fling(device);
    }

    /// Forward an externally produced gesture (e.g. touchscreen) to the
    /// consumer, applying arbitration and overscroll interception.
    pub fn forward_gesture(&mut self, gesture: GestureScrollEvent) {
        let device = gesture.device;
        match gesture.kind {
            GestureScrollKind::Begin => {
                self.on_gesture_scroll_begin(device);
                self.pipeline.external_sessions.insert(device);
                self.pipeline.emit(gesture, &mut self.consumer);
            }
            GestureScrollKind::Update => {
                if self.pipeline.arbitrator.blocks(device) {
                    tracing::trace!(
                        target: "scrollgate.arbitration",
                        device = ?device,
                        "update from non-owning device dropped"
                    );
                    return;
                }
                self.pipeline.emit(gesture, &mut self.consumer);
            }
            GestureScrollKind::End => {
                if !self.pipeline.external_sessions.remove(&device) {
                    self.pipeline
                        .record_violation(ProtocolViolation::EndWithoutSession(device));
                    return;
                }
                self.pipeline.emit(gesture, &mut self.consumer);
                self.on_gesture_scroll_end_or_fling(device);
            }
        }
    }

    /// A fling started on `device`. Ends the device's arbitration lock and
    /// resolves any overscroll. The caller forwards the fling only when this
    /// returns [`FlingDisposition::Forward`].
    pub fn on_fling_start(
        &mut self,
        device: ScrollDevice,
        velocity_x: f32,
        velocity_y: f32,
    ) -> FlingDisposition {
        self.on_gesture_scroll_end_or_fling(device);
        let disposition = self
            .pipeline
            .overscroll
            .on_fling_start(velocity_x, velocity_y);
        tracing::debug!(
            target: "scrollgate.overscroll",
            device = ?device,
            vx = velocity_x,
            vy = velocity_y,
            disposition = ?disposition,
            "fling start"
        );
        disposition
    }

    /// The pointer moved outside any scroll gesture.
    pub fn on_mouse_move(&mut self) -> ResetOutcome {
        self.pipeline.overscroll.reset(ResetTrigger::MouseMove)
    }

    /// Content unrelated to the current gesture consumed a scroll.
    pub fn on_consumed_scroll(&mut self) -> ResetOutcome {
        self.pipeline.overscroll.on_consumed_scroll()
    }

    /// The target lost focus. Resolves overscroll synchronously; pending and
    /// in-flight wheel events are untouched.
    pub fn on_focus_lost(&mut self) -> ResetOutcome {
        self.pipeline.overscroll.reset(ResetTrigger::FocusLost)
    }

    // --- Accessors ---

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> RouterStats {
        self.pipeline.stats
    }

    #[must_use]
    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    #[must_use]
    pub fn delegate(&self) -> &D {
        self.pipeline.overscroll.delegate()
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        self.pipeline.overscroll.delegate_mut()
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.dispatcher.in_flight()
    }

    /// Pending (not yet dispatched) queue entries.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.dispatcher.queue().len()
    }

    #[must_use]
    pub fn session_state(&self, device: ScrollDevice) -> SessionState {
        self.pipeline.synthesizer.session_state(device)
    }

    #[must_use]
    pub fn overscroll_state(&self) -> OverscrollState {
        self.pipeline.overscroll.state()
    }

    /// When [`tick`](Self::tick) next has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pipeline.timer.deadline()
    }

    #[must_use]
    pub fn scrolling_device(&self) -> Option<ScrollDevice> {
        self.pipeline.arbitrator.scrolling_device()
    }

    /// Gestures sent and not yet acked.
    #[must_use]
    pub fn gestures_awaiting_ack(&self) -> usize {
        self.pipeline.awaiting_ack.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overscroll::NoopOverscrollDelegate;
    use scrollgate_core::WheelPhase;

    #[derive(Debug, Default)]
    struct Log {
        wheel: Vec<WheelEvent>,
        gestures: Vec<GestureScrollEvent>,
    }

    impl ScrollConsumer for Log {
        fn send_wheel_event(&mut self, event: &WheelEvent) {
            self.wheel.push(*event);
        }
        fn send_gesture_event(&mut self, event: &GestureScrollEvent) {
            self.gestures.push(*event);
        }
    }

    fn router() -> ScrollRouter<Log, NoopOverscrollDelegate> {
        ScrollRouter::new(RouterConfig::default(), Log::default(), NoopOverscrollDelegate)
    }

    fn kinds(r: &ScrollRouter<Log, NoopOverscrollDelegate>) -> Vec<GestureScrollKind> {
        r.consumer().gestures.iter().map(|g| g.kind).collect()
    }

    #[test]
    fn stats_track_queue_outcomes() {
        let t0 = Instant::now();
        let mut r = router();
        r.enqueue(WheelEvent::new(-1.0, 0.0), t0);
        r.enqueue(WheelEvent::new(-1.0, 0.0), t0);
        r.enqueue(WheelEvent::new(-1.0, 0.0), t0);
        r.enqueue(WheelEvent::new(0.0, 0.0), t0);

        let stats = r.stats();
        assert_eq!(stats.wheel_events_enqueued, 4);
        assert_eq!(stats.wheel_events_coalesced, 1);
        assert_eq!(stats.wheel_events_dropped, 1);
        assert_eq!(stats.wheel_events_sent, 1);
        assert_eq!(r.pending_len(), 1);
    }

    #[test]
    fn ack_records_latency_and_dispatches_next() {
        let t0 = Instant::now();
        let mut r = router();
        r.enqueue(WheelEvent::new(-1.0, 0.0), t0);
        r.enqueue(WheelEvent::new(-2.0, 0.0), t0);

        let acked = r
            .on_wheel_ack(AckResult::Consumed, t0 + Duration::from_millis(4))
            .expect("in flight");
        assert_eq!(acked.latency, Duration::from_millis(4));
        assert_eq!(r.stats().last_ack_latency, Some(Duration::from_millis(4)));
        assert_eq!(r.consumer().wheel.len(), 2);
        assert_eq!(r.stats().wheel_events_sent, 2);
    }

    #[test]
    fn stray_wheel_ack_is_counted() {
        let mut r = router();
        assert!(r.on_wheel_ack(AckResult::Consumed, Instant::now()).is_none());
        assert_eq!(r.stats().protocol_violations, 1);
        assert_eq!(r.stats().wheel_acks, 0);
    }

    #[test]
    fn gesture_ack_mismatch_leaves_queue() {
        let t0 = Instant::now();
        let mut r = router();
        r.enqueue(WheelEvent::new(-5.0, 0.0), t0);
        r.on_wheel_ack(AckResult::NotConsumed, t0);
        assert_eq!(kinds(&r), vec![GestureScrollKind::Begin, GestureScrollKind::Update]);

        r.on_gesture_ack(GestureScrollKind::Update, AckResult::NotConsumed);
        assert_eq!(r.stats().protocol_violations, 1);
        assert_eq!(r.gestures_awaiting_ack(), 2);

        r.on_gesture_ack(GestureScrollKind::Begin, AckResult::NotConsumed);
        r.on_gesture_ack(GestureScrollKind::Update, AckResult::NotConsumed);
        assert_eq!(r.gestures_awaiting_ack(), 0);
        r.on_gesture_ack(GestureScrollKind::End, AckResult::NotConsumed);
        assert_eq!(r.stats().protocol_violations, 2);
    }

    #[test]
    fn send_gestures_off_skips_synthesis() {
        let t0 = Instant::now();
        let config = RouterConfig {
            send_gestures: false,
            ..RouterConfig::default()
        };
        let mut r = ScrollRouter::new(config, Log::default(), NoopOverscrollDelegate);
        r.enqueue(WheelEvent::new(-5.0, 0.0), t0);
        r.on_wheel_ack(AckResult::NotConsumed, t0);
        assert!(r.consumer().gestures.is_empty());
        assert_eq!(r.next_deadline(), None);
    }

    #[test]
    fn touchpad_begin_preempts_wheel_session() {
        let t0 = Instant::now();
        let mut r = router();
        r.enqueue(WheelEvent::new(-5.0, 0.0), t0);
        r.on_wheel_ack(AckResult::NotConsumed, t0);
        assert!(r.next_deadline().is_some());

        let pad = WheelEvent::new(0.0, 3.0)
            .with_device(ScrollDevice::Touchpad)
            .with_precise_deltas(true)
            .with_phase(WheelPhase::Began);
        r.enqueue(pad, t0);
        r.on_wheel_ack(AckResult::NotConsumed, t0);

        let tail: Vec<_> = r.consumer().gestures[2..]
            .iter()
            .map(|g| (g.kind, g.device))
            .collect();
        assert_eq!(
            tail,
            vec![
                (GestureScrollKind::End, ScrollDevice::Wheel),
                (GestureScrollKind::Begin, ScrollDevice::Touchpad),
                (GestureScrollKind::Update, ScrollDevice::Touchpad),
            ]
        );
        assert_eq!(r.session_state(ScrollDevice::Wheel), SessionState::Idle);
        assert_eq!(r.next_deadline(), None);
    }

    #[test]
    fn stale_timer_fire_is_benign() {
        let t0 = Instant::now();
        let mut r = router();
        r.enqueue(WheelEvent::new(-5.0, 0.0), t0);
        r.on_wheel_ack(AckResult::NotConsumed, t0);
        // Close the session behind the timer's back.
        r.pipeline.synthesizer.end_session(ScrollDevice::Wheel);
        r.tick(t0 + Duration::from_millis(100));
        assert_eq!(r.stats().protocol_violations, 1);
        assert_eq!(kinds(&r).len(), 2);
    }
}
