#![forbid(unsafe_code)]

//! Canonical wheel input and acknowledgment types.
//!
//! Events arrive here already decoded from the device layer. Everything in
//! this module is plain data: `Clone`, `PartialEq`, cheap to copy, and free
//! of any notion of time or dispatch state.
//!
//! # Design Notes
//!
//! - Deltas are in device-independent pixels; positive `delta_x` scrolls
//!   content towards the right edge, positive `delta_y` towards the bottom.
//! - `Modifiers` use bitflags for easy combination
//! - Non-finite deltas are never trusted; use [`WheelEvent::sanitized`]
//!   before any accumulation.

use bitflags::bitflags;

use crate::geometry::Point;

/// The physical class of device that produced scroll input.
///
/// Wheel and touchpad input both travel through the wheel queue; touchscreen
/// scrolls are produced by an external gesture detector and only observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollDevice {
    /// A notched mouse wheel (no phase information).
    #[default]
    Wheel,
    /// A touchpad or other precise device that reports phases.
    Touchpad,
    /// A touchscreen driving gesture scrolls directly.
    Touchscreen,
    /// Programmatic or replayed input.
    Synthetic,
}

impl ScrollDevice {
    /// Whether this device delivers its input through the wheel queue.
    #[inline]
    #[must_use]
    pub const fn is_wheel_family(self) -> bool {
        matches!(self, Self::Wheel | Self::Touchpad)
    }
}

/// Phase reported by precise scrolling devices.
///
/// Classic notched wheels report [`WheelPhase::None`] for both `phase` and
/// `momentum_phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WheelPhase {
    /// No phase information.
    #[default]
    None,
    /// Fingers touched the surface but have not moved yet.
    MayBegin,
    /// First event of a phase.
    Began,
    /// Continuation of a phase.
    Changed,
    /// Phase finished normally.
    Ended,
    /// Phase was aborted by the platform.
    Cancelled,
}

impl WheelPhase {
    /// Whether any phase information is present.
    #[inline]
    #[must_use]
    pub const fn is_some(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether this phase closes a sequence.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }

    /// Whether this phase marks a sequence boundary that coalescing must not
    /// cross.
    #[inline]
    #[must_use]
    pub const fn is_boundary(self) -> bool {
        matches!(
            self,
            Self::MayBegin | Self::Began | Self::Ended | Self::Cancelled
        )
    }
}

/// Axis locking applied to wheel deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RailMode {
    /// Both axes scroll freely.
    #[default]
    Free,
    /// Locked to the horizontal axis; `delta_y` is ignored.
    Horizontal,
    /// Locked to the vertical axis; `delta_x` is ignored.
    Vertical,
}

bitflags! {
    /// Modifier keys held during a wheel event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

/// A single scroll-wheel sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Position relative to the target surface.
    pub position: Point,
    /// Position in screen coordinates.
    pub global_position: Point,
    /// Horizontal delta.
    pub delta_x: f32,
    /// Vertical delta.
    pub delta_y: f32,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    /// Whether the deltas are precise pixels (touchpad) rather than notches.
    pub precise_deltas: bool,
    /// Whether the device asked to scroll by whole pages.
    pub scroll_by_page: bool,
    /// Axis locking requested by the platform.
    pub rail_mode: RailMode,
    /// Direct-manipulation phase.
    pub phase: WheelPhase,
    /// Inertial (momentum) phase.
    pub momentum_phase: WheelPhase,
    /// Identifies events resent on behalf of an embedded consumer.
    pub resend_marker: Option<u32>,
    /// Device that produced the sample.
    pub device: ScrollDevice,
}

impl Default for WheelEvent {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl WheelEvent {
    /// Create a plain wheel event with the given delta.
    #[must_use]
    pub const fn new(delta_x: f32, delta_y: f32) -> Self {
        Self {
            position: Point::ORIGIN,
            global_position: Point::ORIGIN,
            delta_x,
            delta_y,
            modifiers: Modifiers::NONE,
            precise_deltas: false,
            scroll_by_page: false,
            rail_mode: RailMode::Free,
            phase: WheelPhase::None,
            momentum_phase: WheelPhase::None,
            resend_marker: None,
            device: ScrollDevice::Wheel,
        }
    }

    /// Create a zero-delta event that only carries a phase transition.
    #[must_use]
    pub const fn phase_only(phase: WheelPhase) -> Self {
        Self::new(0.0, 0.0)
            .with_phase(phase)
            .with_device(ScrollDevice::Touchpad)
            .with_precise_deltas(true)
    }

    /// Set the local and global positions.
    #[must_use]
    pub const fn at(mut self, position: Point, global_position: Point) -> Self {
        self.position = position;
        self.global_position = global_position;
        self
    }

    /// Set modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the direct-manipulation phase.
    #[must_use]
    pub const fn with_phase(mut self, phase: WheelPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Set the momentum phase.
    #[must_use]
    pub const fn with_momentum_phase(mut self, phase: WheelPhase) -> Self {
        self.momentum_phase = phase;
        self
    }

    /// Set the rail mode.
    #[must_use]
    pub const fn with_rail_mode(mut self, rail_mode: RailMode) -> Self {
        self.rail_mode = rail_mode;
        self
    }

    /// Mark the deltas as precise.
    #[must_use]
    pub const fn with_precise_deltas(mut self, precise: bool) -> Self {
        self.precise_deltas = precise;
        self
    }

    /// Request page scrolling.
    #[must_use]
    pub const fn with_scroll_by_page(mut self, by_page: bool) -> Self {
        self.scroll_by_page = by_page;
        self
    }

    /// Set the producing device.
    #[must_use]
    pub const fn with_device(mut self, device: ScrollDevice) -> Self {
        self.device = device;
        self
    }

    /// Tag the event as resent on behalf of an embedded consumer.
    #[must_use]
    pub const fn with_resend_marker(mut self, marker: u32) -> Self {
        self.resend_marker = Some(marker);
        self
    }

    /// Whether the event carries phase or momentum-phase information.
    #[inline]
    #[must_use]
    pub const fn has_phase_info(&self) -> bool {
        self.phase.is_some() || self.momentum_phase.is_some()
    }

    /// Whether either phase closes a sequence.
    #[inline]
    #[must_use]
    pub const fn ends_phase(&self) -> bool {
        self.phase.is_terminal() || self.momentum_phase.is_terminal()
    }

    /// Whether both deltas are exactly zero.
    #[inline]
    #[must_use]
    pub fn is_zero_delta(&self) -> bool {
        self.delta_x == 0.0 && self.delta_y == 0.0
    }

    /// Deltas after applying the rail mode.
    #[must_use]
    pub fn railed_delta(&self) -> (f32, f32) {
        match self.rail_mode {
            RailMode::Free => (self.delta_x, self.delta_y),
            RailMode::Horizontal => (self.delta_x, 0.0),
            RailMode::Vertical => (0.0, self.delta_y),
        }
    }

    /// Copy of this event with non-finite deltas clamped to zero.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.delta_x = finite_or_zero(self.delta_x);
        self.delta_y = finite_or_zero(self.delta_y);
        self
    }
}

/// Replace NaN and infinities with zero.
#[inline]
#[must_use]
pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// The consumer's verdict on a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckResult {
    /// The consumer used the event (e.g. content scrolled).
    Consumed,
    /// The consumer saw the event but did not use it.
    NotConsumed,
    /// No consumer was registered for the event's target.
    NoConsumer,
}

impl AckResult {
    /// Whether the consumer used the event.
    #[inline]
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}
