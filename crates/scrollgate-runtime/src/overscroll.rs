#![forbid(unsafe_code)]

//! Overscroll state machine.
//!
//! Decides, one unconsumed gesture update at a time, whether accumulated
//! scroll the content did not use is ordinary scrolling or a directional
//! overscroll gesture. Overscroll has its own lifecycle reported to an
//! [`OverscrollDelegate`]: mode change (start or cancel), updates, and
//! completion.
//!
//! # State Machine
//!
//! ```text
//!            consumed update            reset / session end
//!   Unknown ─────────────────▶ ContentScrolling ──────────────▶ Unknown
//!      │
//!      │ |dominant| ≥ start_threshold
//!      ▼
//!   Overscrolling ── reversal through zero ──▶ Unknown  (cancel)
//!      │
//!      └──── reset trigger ──▶ Unknown  (complete if |mode axis| ≥
//!                                        complete_threshold, else cancel)
//! ```
//!
//! # Invariants
//!
//! 1. `mode != None` exactly when `scroll_state == Overscrolling`.
//! 2. Every path out of `Overscrolling` resets to `(None, Unknown, 0, 0)`.
//! 3. A cancel reports `on_overscroll_mode_change(mode, None)`; a completion
//!    reports only `on_overscroll_complete(mode)`.
//! 4. A fling opposing the active mode cancels, regardless of magnitude.
//!
//! # Failure Modes
//!
//! - Non-finite update deltas are clamped to zero before accumulation.
//! - A delegate returning `false` from `on_overscroll_update` cancels.

use scrollgate_core::event::finite_or_zero;
use scrollgate_core::{AckResult, Axis, ScrollDevice};

use crate::config::OverscrollConfig;

// ---------------------------------------------------------------------------
// Delegate
// ---------------------------------------------------------------------------

/// Receives overscroll lifecycle notifications.
///
/// All methods default to no-ops so implementors only override what they
/// render.
pub trait OverscrollDelegate {
    /// `old → new`. `(None, mode)` starts an overscroll; `(mode, None)`
    /// cancels it.
    fn on_overscroll_mode_change(&mut self, old: OverscrollMode, new: OverscrollMode) {
        let _ = (old, new);
    }

    /// Progress of the active overscroll. The mode axis carries the delta in
    /// excess of the start threshold; the other axis carries the full
    /// accumulated delta. Return `false` to cancel.
    fn on_overscroll_update(&mut self, delta_x: f32, delta_y: f32) -> bool {
        let _ = (delta_x, delta_y);
        true
    }

    /// The overscroll ended past the complete threshold.
    fn on_overscroll_complete(&mut self, mode: OverscrollMode) {
        let _ = mode;
    }
}

/// Delegate that ignores everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopOverscrollDelegate;

impl OverscrollDelegate for NoopOverscrollDelegate {}

impl<D: OverscrollDelegate + ?Sized> OverscrollDelegate for &mut D {
    fn on_overscroll_mode_change(&mut self, old: OverscrollMode, new: OverscrollMode) {
        (**self).on_overscroll_mode_change(old, new);
    }

    fn on_overscroll_update(&mut self, delta_x: f32, delta_y: f32) -> bool {
        (**self).on_overscroll_update(delta_x, delta_y)
    }

    fn on_overscroll_complete(&mut self, mode: OverscrollMode) {
        (**self).on_overscroll_complete(mode);
    }
}

impl<D: OverscrollDelegate + ?Sized> OverscrollDelegate for Box<D> {
    fn on_overscroll_mode_change(&mut self, old: OverscrollMode, new: OverscrollMode) {
        (**self).on_overscroll_mode_change(old, new);
    }

    fn on_overscroll_update(&mut self, delta_x: f32, delta_y: f32) -> bool {
        (**self).on_overscroll_update(delta_x, delta_y)
    }

    fn on_overscroll_complete(&mut self, mode: OverscrollMode) {
        (**self).on_overscroll_complete(mode);
    }
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

/// Direction of an overscroll, named after the edge being pulled past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverscrollMode {
    #[default]
    None,
    North,
    South,
    East,
    West,
}

impl OverscrollMode {
    /// Mode for a non-zero delta along `axis`.
    #[must_use]
    pub fn from_axis_delta(axis: Axis, delta: f32) -> Self {
        match axis {
            Axis::Horizontal if delta < 0.0 => Self::West,
            Axis::Horizontal if delta > 0.0 => Self::East,
            Axis::Vertical if delta < 0.0 => Self::North,
            Axis::Vertical if delta > 0.0 => Self::South,
            _ => Self::None,
        }
    }

    /// Axis this mode moves along.
    #[must_use]
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::None => None,
            Self::East | Self::West => Some(Axis::Horizontal),
            Self::North | Self::South => Some(Axis::Vertical),
        }
    }

    /// Sign of the mode-axis delta that drives this mode.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::East | Self::South => 1.0,
            Self::West | Self::North => -1.0,
        }
    }

    /// Whether a velocity moves against this mode.
    #[must_use]
    pub fn opposes(self, velocity_x: f32, velocity_y: f32) -> bool {
        match self.axis() {
            Some(axis) => axis.pick(velocity_x, velocity_y) * self.sign() < 0.0,
            None => false,
        }
    }
}

/// What the current scroll session is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollState {
    /// Undecided.
    #[default]
    Unknown,
    /// The content consumed scroll; overscroll is off until the session ends.
    ContentScrolling,
    /// Unconsumed scroll drives an overscroll.
    Overscrolling,
}

/// Snapshot of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverscrollState {
    pub mode: OverscrollMode,
    pub scroll_state: ScrollState,
    pub accumulated_delta_x: f32,
    pub accumulated_delta_y: f32,
}

/// Events that end the current overscroll decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetTrigger {
    /// Pointer moved outside the gesture.
    MouseMove,
    FocusLost,
    /// A consumed scroll unrelated to the overscroll.
    ConsumedScroll,
    /// The gesture ended.
    ScrollEnd,
    /// A non-opposing fling started.
    Fling,
}

/// How a reset resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// No overscroll was active.
    Idle,
    Completed(OverscrollMode),
    Cancelled(OverscrollMode),
}

/// Whether a fling start should reach the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlingDisposition {
    Forward,
    /// Zero velocity; nothing to animate.
    Drop,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Threshold/hysteresis overscroll state machine.
#[derive(Debug)]
pub struct OverscrollController<D> {
    config: OverscrollConfig,
    state: OverscrollState,
    source: Option<ScrollDevice>,
    delegate: D,
}

impl<D: OverscrollDelegate> OverscrollController<D> {
    #[must_use]
    pub fn new(config: OverscrollConfig, delegate: D) -> Self {
        Self {
            config,
            state: OverscrollState::default(),
            source: None,
            delegate,
        }
    }

    /// Whether gesture updates should be kept from the consumer and fed to
    /// the state machine instead.
    #[inline]
    #[must_use]
    pub fn should_intercept(&self) -> bool {
        self.config.enabled && self.state.scroll_state == ScrollState::Overscrolling
    }

    /// A gesture scroll began on `device`.
    ///
    /// Switching devices cancels any overscroll in progress. A fresh
    /// session that is not overscrolling starts undecided.
    pub fn on_scroll_begin(&mut self, device: ScrollDevice) {
        if self.source.is_some_and(|prev| prev != device) {
            self.cancel();
        }
        self.source = Some(device);
        if self.state.scroll_state != ScrollState::Overscrolling {
            self.state = OverscrollState::default();
        }
    }

    /// The consumer acked a gesture update carrying `(delta_x, delta_y)`.
    ///
    /// Updates are intercepted while overscrolling, so a consumed ack that
    /// arrives then belongs to an update sent before the overscroll started
    /// and leaves it running.
    pub fn on_update_ack(&mut self, delta_x: f32, delta_y: f32, result: AckResult) {
        if !self.config.enabled {
            return;
        }
        if !result.is_consumed() {
            self.process_unconsumed(delta_x, delta_y);
            return;
        }
        match self.state.scroll_state {
            ScrollState::Unknown => {
                self.state.scroll_state = ScrollState::ContentScrolling;
                tracing::trace!(target: "scrollgate.overscroll", "content scrolling");
            }
            ScrollState::ContentScrolling => {}
            ScrollState::Overscrolling => {
                tracing::trace!(
                    target: "scrollgate.overscroll",
                    "consumed ack from before overscroll start ignored"
                );
            }
        }
    }

    /// Content outside the current gesture consumed a scroll.
    ///
    /// Resolves an active overscroll; otherwise a no-op.
    pub fn on_consumed_scroll(&mut self) -> ResetOutcome {
        if self.state.scroll_state != ScrollState::Overscrolling {
            return ResetOutcome::Idle;
        }
        self.reset(ResetTrigger::ConsumedScroll)
    }

    /// Accumulate unconsumed delta and advance the state machine.
    pub fn process_unconsumed(&mut self, delta_x: f32, delta_y: f32) {
        if !self.config.enabled || self.state.scroll_state == ScrollState::ContentScrolling {
            return;
        }
        self.state.accumulated_delta_x += finite_or_zero(delta_x);
        self.state.accumulated_delta_y += finite_or_zero(delta_y);
        let (ax, ay) = (self.state.accumulated_delta_x, self.state.accumulated_delta_y);

        match self.state.mode.axis() {
            None => {
                let axis = Axis::dominant(ax, ay);
                let along = axis.pick(ax, ay);
                if along != 0.0 && along.abs() >= self.config.start_threshold {
                    let mode = OverscrollMode::from_axis_delta(axis, along);
                    self.state.mode = mode;
                    self.state.scroll_state = ScrollState::Overscrolling;
                    tracing::debug!(
                        target: "scrollgate.overscroll",
                        mode = ?mode,
                        dx = ax,
                        dy = ay,
                        "overscroll started"
                    );
                    self.delegate
                        .on_overscroll_mode_change(OverscrollMode::None, mode);
                    self.report_update();
                }
            }
            Some(axis) => {
                if axis.pick(ax, ay) * self.state.mode.sign() <= 0.0 {
                    self.cancel();
                } else {
                    self.report_update();
                }
            }
        }
    }

    /// Resolve the current overscroll: complete if the mode-axis magnitude
    /// reached the complete threshold, cancel otherwise. The state returns
    /// to `(None, Unknown, 0, 0)` either way.
    pub fn reset(&mut self, trigger: ResetTrigger) -> ResetOutcome {
        let mode = self.state.mode;
        let Some(axis) = mode.axis() else {
            self.state = OverscrollState::default();
            return ResetOutcome::Idle;
        };

        let along = axis.pick(self.state.accumulated_delta_x, self.state.accumulated_delta_y);
        if along.abs() >= self.config.complete_threshold {
            self.state = OverscrollState::default();
            tracing::debug!(
                target: "scrollgate.overscroll",
                mode = ?mode,
                trigger = ?trigger,
                "overscroll completed"
            );
            self.delegate.on_overscroll_complete(mode);
            ResetOutcome::Completed(mode)
        } else {
            tracing::debug!(target: "scrollgate.overscroll", trigger = ?trigger, "reset below complete threshold");
            self.cancel();
            ResetOutcome::Cancelled(mode)
        }
    }

    /// A fling started with the given velocity.
    pub fn on_fling_start(&mut self, velocity_x: f32, velocity_y: f32) -> FlingDisposition {
        let (vx, vy) = (finite_or_zero(velocity_x), finite_or_zero(velocity_y));
        let zero = vx == 0.0 && vy == 0.0;

        if !zero && self.state.mode.opposes(vx, vy) {
            self.cancel();
        } else {
            self.reset(ResetTrigger::Fling);
        }

        if zero {
            FlingDisposition::Drop
        } else {
            FlingDisposition::Forward
        }
    }

    /// Abandon any overscroll without completing it.
    pub fn cancel(&mut self) {
        let mode = self.state.mode;
        self.state = OverscrollState::default();
        if mode != OverscrollMode::None {
            tracing::debug!(target: "scrollgate.overscroll", mode = ?mode, "overscroll cancelled");
            self.delegate
                .on_overscroll_mode_change(mode, OverscrollMode::None);
        }
    }

    fn report_update(&mut self) {
        let mode = self.state.mode;
        let Some(axis) = mode.axis() else {
            return;
        };
        let excess = |v: f32| v - mode.sign() * self.config.start_threshold;
        let (dx, dy) = match axis {
            Axis::Horizontal => (excess(self.state.accumulated_delta_x), self.state.accumulated_delta_y),
            Axis::Vertical => (self.state.accumulated_delta_x, excess(self.state.accumulated_delta_y)),
        };
        tracing::trace!(target: "scrollgate.overscroll", dx, dy, "overscroll update");
        if !self.delegate.on_overscroll_update(dx, dy) {
            self.cancel();
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> OverscrollState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> OverscrollMode {
        self.state.mode
    }

    #[inline]
    #[must_use]
    pub fn scroll_state(&self) -> ScrollState {
        self.state.scroll_state
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &OverscrollConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    #[inline]
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
