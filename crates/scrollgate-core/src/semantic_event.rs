#![forbid(unsafe_code)]

//! Gesture-scroll events synthesized from acknowledged wheel input.
//!
//! [`GestureScrollEvent`] represents the scroll *intent* behind one or more
//! wheel samples. The gesture synthesizer (see [`crate::gesture`]) produces
//! these; they are never coalesced.
//!
//! # Invariants
//! 1. Every sequence is well-formed per device: `Begin` → zero or more
//!    `Update` → `End`.
//! 2. An `End` is never emitted without an open `Begin` (a synthetic `Begin`
//!    is emitted first when needed).
//! 3. Page-unit updates carry deltas in `{-1, 0, 1}` on each axis.

use crate::event::{ScrollDevice, WheelEvent, WheelPhase};
use crate::geometry::Point;

/// Which part of the gesture sequence an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureScrollKind {
    Begin,
    Update,
    End,
}

/// Units of an update's delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollUnits {
    /// Notched wheel pixels.
    #[default]
    Pixels,
    /// Precise touchpad pixels.
    PrecisePixels,
    /// Whole pages; deltas are unit direction signs.
    Page,
}

/// Whether an update came from direct manipulation or inertia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InertialPhase {
    /// The source carried no phase information.
    #[default]
    Unknown,
    /// Fingers on the surface.
    NonMomentum,
    /// Inertial continuation after lift-off.
    Momentum,
}

impl InertialPhase {
    /// Derive the inertial phase from a wheel event's phases.
    #[must_use]
    pub const fn of(event: &WheelEvent) -> Self {
        if !matches!(event.momentum_phase, WheelPhase::None) {
            Self::Momentum
        } else if !matches!(event.phase, WheelPhase::None) {
            Self::NonMomentum
        } else {
            Self::Unknown
        }
    }
}

/// A synthesized (or externally produced) gesture-scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureScrollEvent {
    pub kind: GestureScrollKind,
    pub position: Point,
    pub global_position: Point,
    pub delta_x: f32,
    pub delta_y: f32,
    pub units: ScrollUnits,
    pub inertial_phase: InertialPhase,
    /// `true` when the event only exists to keep the Begin/End pairing
    /// well-formed.
    pub synthetic: bool,
    pub device: ScrollDevice,
}

impl GestureScrollEvent {
    /// Create an event of the given kind with zero delta.
    #[must_use]
    pub const fn new(kind: GestureScrollKind, device: ScrollDevice) -> Self {
        Self {
            kind,
            position: Point::ORIGIN,
            global_position: Point::ORIGIN,
            delta_x: 0.0,
            delta_y: 0.0,
            units: ScrollUnits::Pixels,
            inertial_phase: InertialPhase::Unknown,
            synthetic: false,
            device,
        }
    }

    /// A `Begin` for the given device.
    #[must_use]
    pub const fn begin(device: ScrollDevice) -> Self {
        Self::new(GestureScrollKind::Begin, device)
    }

    /// An `Update` with the given delta.
    #[must_use]
    pub const fn update(device: ScrollDevice, delta_x: f32, delta_y: f32) -> Self {
        let mut ev = Self::new(GestureScrollKind::Update, device);
        ev.delta_x = delta_x;
        ev.delta_y = delta_y;
        ev
    }

    /// An `End` for the given device.
    #[must_use]
    pub const fn end(device: ScrollDevice) -> Self {
        Self::new(GestureScrollKind::End, device)
    }

    /// Copy the positions of a wheel event.
    #[must_use]
    pub const fn at(mut self, position: Point, global_position: Point) -> Self {
        self.position = position;
        self.global_position = global_position;
        self
    }

    /// Mark as synthetic.
    #[must_use]
    pub const fn with_synthetic(mut self, synthetic: bool) -> Self {
        self.synthetic = synthetic;
        self
    }

    #[must_use]
    pub const fn with_units(mut self, units: ScrollUnits) -> Self {
        self.units = units;
        self
    }

    #[must_use]
    pub const fn with_inertial_phase(mut self, phase: InertialPhase) -> Self {
        self.inertial_phase = phase;
        self
    }

    #[inline]
    #[must_use]
    pub const fn is_begin(&self) -> bool {
        matches!(self.kind, GestureScrollKind::Begin)
    }

    #[inline]
    #[must_use]
    pub const fn is_update(&self) -> bool {
        matches!(self.kind, GestureScrollKind::Update)
    }

    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        matches!(self.kind, GestureScrollKind::End)
    }
}
