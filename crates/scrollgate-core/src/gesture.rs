#![forbid(unsafe_code)]

//! Gesture synthesis: turns acknowledged wheel events into gesture scrolls.
//!
//! [`GestureSynthesizer`] is a stateful processor that converts each
//! `(WheelEvent, AckResult)` pair into zero or more [`GestureScrollEvent`]s
//! (`Begin` / `Update` / `End`), keeping one [`SessionState`] per
//! [`ScrollDevice`].
//!
//! # State Machine
//!
//! Each device is either `Idle` (the next scroll needs a `Begin`) or `Active`
//! (the session needs an `End`). Sessions close on:
//!
//! - **Explicit phase end**: `phase` or `momentum_phase` is `Ended` or
//!   `Cancelled`.
//! - **Quiescence**: the caller's session timer fires
//!   ([`end_session`](GestureSynthesizer::end_session)).
//! - **Preemption**: another device starts scrolling
//!   ([`end_session`](GestureSynthesizer::end_session)).
//!
//! # Invariants
//!
//! 1. `End` is emitted for a device only while it is `Active`, except for the
//!    synthetic `Begin` + `End` pair produced when an unconsumed phase end
//!    arrives for an idle device.
//! 2. Consumed acks never emit `Begin` or `Update`.
//! 3. Page-unit updates carry unit deltas.
//! 4. After [`reset`](GestureSynthesizer::reset), every device is `Idle`.
//!
//! # Failure Modes
//!
//! - A quiescence fire for an idle device returns `None`; the caller treats
//!   it as a stale timer.
//! - A `Begin` is synthetic when it re-opens a session only to demarcate the
//!   momentum continuation of a session closed by a direct phase end.

use ahash::AHashMap;

use crate::event::{AckResult, ScrollDevice, WheelEvent, WheelPhase};
use crate::geometry::Point;
use crate::semantic_event::{GestureScrollEvent, InertialPhase, ScrollUnits};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Gesture session state of one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No open gesture; the next scroll needs a `Begin`.
    #[default]
    Idle,
    /// A `Begin` was sent; the session needs an `End`.
    Active,
}

impl SessionState {
    /// The next scroll must be preceded by a `Begin`.
    #[inline]
    #[must_use]
    pub const fn needs_begin(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The open session must eventually be closed by an `End`.
    #[inline]
    #[must_use]
    pub const fn needs_end(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// What the caller should do with its session timer after an ack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerDirective {
    /// Leave the timer as it is.
    #[default]
    Keep,
    /// Arm (or re-arm) the quiescence timer for this device.
    Restart(ScrollDevice),
    /// Disarm the timer; the session is phase-driven or closed.
    Stop,
}

/// Output of one acknowledged wheel event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesis {
    /// Gesture events to forward, in order.
    pub gestures: Vec<GestureScrollEvent>,
    /// Timer adjustment requested by this event.
    pub timer: TimerDirective,
}

#[derive(Debug, Clone, Copy, Default)]
struct DeviceSession {
    state: SessionState,
    /// The last session ended on a direct phase end, so a momentum
    /// continuation may follow.
    momentum_may_follow: bool,
    last_position: Point,
    last_global_position: Point,
}

// ---------------------------------------------------------------------------
// GestureSynthesizer
// ---------------------------------------------------------------------------

/// Per-device gesture-scroll synthesizer.
///
/// Call [`on_wheel_ack`](GestureSynthesizer::on_wheel_ack) for every
/// acknowledged wheel event, and
/// [`end_session`](GestureSynthesizer::end_session) when the quiescence timer
/// fires or another device takes over.
#[derive(Debug, Clone, Default)]
pub struct GestureSynthesizer {
    sessions: AHashMap<ScrollDevice, DeviceSession>,
}

impl GestureSynthesizer {
    /// Create a synthesizer with every device idle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an acknowledged wheel event.
    ///
    /// `blocked` is `true` when another device currently owns the active
    /// gesture; nothing is emitted in that case.
    pub fn on_wheel_ack(&mut self, event: &WheelEvent, ack: AckResult, blocked: bool) -> Synthesis {
        let mut out = Synthesis::default();
        if blocked {
            return out;
        }

        let event = event.sanitized();
        let session = self.sessions.entry(event.device).or_default();
        let (dx, dy) = event.railed_delta();
        let has_delta = dx != 0.0 || dy != 0.0;
        let can_scroll = !ack.is_consumed() && (has_delta || event.has_phase_info());

        // Zero-velocity fling start: close what is open, emit nothing new.
        if event.momentum_phase == WheelPhase::Began
            && !has_delta
            && session.state == SessionState::Active
        {
            out.gestures.push(close(session, &event, false));
            session.momentum_may_follow = false;
            out.timer = TimerDirective::Stop;
            return out;
        }

        if can_scroll && has_delta {
            if session.state.needs_begin() {
                let synthetic = session.momentum_may_follow && event.momentum_phase.is_some();
                out.gestures.push(
                    GestureScrollEvent::begin(event.device)
                        .at(event.position, event.global_position)
                        .with_inertial_phase(InertialPhase::of(&event))
                        .with_synthetic(synthetic),
                );
                session.state = SessionState::Active;
            }
            out.gestures.push(update_for(&event, dx, dy));
            session.momentum_may_follow = false;
            session.last_position = event.position;
            session.last_global_position = event.global_position;
        }

        if event.ends_phase() {
            match session.state {
                SessionState::Active => out.gestures.push(close(session, &event, false)),
                SessionState::Idle if can_scroll => {
                    // Unconsumed end with nothing open: keep the pairing intact.
                    out.gestures.push(
                        GestureScrollEvent::begin(event.device)
                            .at(event.position, event.global_position)
                            .with_synthetic(true),
                    );
                    out.gestures.push(close(session, &event, true));
                }
                SessionState::Idle => {}
            }
            session.momentum_may_follow =
                event.phase.is_terminal() && !event.momentum_phase.is_terminal();
            out.timer = TimerDirective::Stop;
        } else if event.has_phase_info() {
            out.timer = TimerDirective::Stop;
        } else if can_scroll && has_delta {
            out.timer = TimerDirective::Restart(event.device);
        }

        out
    }

    /// Close the open session of `device`, if any.
    ///
    /// Returns the non-synthetic `End` to forward, or `None` when the device
    /// was already idle.
    pub fn end_session(&mut self, device: ScrollDevice) -> Option<GestureScrollEvent> {
        let session = self.sessions.get_mut(&device)?;
        if session.state != SessionState::Active {
            return None;
        }
        session.state = SessionState::Idle;
        session.momentum_may_follow = false;
        Some(
            GestureScrollEvent::end(device)
                .at(session.last_position, session.last_global_position),
        )
    }

    /// Session state of `device` (idle if never seen).
    #[must_use]
    pub fn session_state(&self, device: ScrollDevice) -> SessionState {
        self.sessions
            .get(&device)
            .map(|s| s.state)
            .unwrap_or_default()
    }

    /// Devices with an open session.
    pub fn active_devices(&self) -> impl Iterator<Item = ScrollDevice> + '_ {
        self.sessions
            .iter()
            .filter(|(_, s)| s.state == SessionState::Active)
            .map(|(d, _)| *d)
    }

    /// Whether any wheel-family device has an open session.
    #[must_use]
    pub fn has_active_wheel_session(&self) -> bool {
        self.active_devices().any(ScrollDevice::is_wheel_family)
    }

    /// Forget every session without emitting anything.
    pub fn reset(&mut self) {
        self.sessions.clear();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn close(session: &mut DeviceSession, event: &WheelEvent, synthetic: bool) -> GestureScrollEvent {
    session.state = SessionState::Idle;
    GestureScrollEvent::end(event.device)
        .at(event.position, event.global_position)
        .with_inertial_phase(InertialPhase::of(event))
        .with_synthetic(synthetic)
}

fn update_for(event: &WheelEvent, dx: f32, dy: f32) -> GestureScrollEvent {
    let (units, dx, dy) = if event.scroll_by_page {
        (ScrollUnits::Page, unit_sign(dx), unit_sign(dy))
    } else if event.precise_deltas {
        (ScrollUnits::PrecisePixels, dx, dy)
    } else {
        (ScrollUnits::Pixels, dx, dy)
    };
    GestureScrollEvent::update(event.device, dx, dy)
        .at(event.position, event.global_position)
        .with_units(units)
        .with_inertial_phase(InertialPhase::of(event))
}

/// `-1`, `0`, or `1`; unlike `f32::signum`, zero maps to zero.
fn unit_sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
