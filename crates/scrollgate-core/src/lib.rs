#![forbid(unsafe_code)]

//! Core: wheel input types, coalescing, and gesture-scroll synthesis.
//!
//! # Role in scrollgate
//! `scrollgate-core` is the pure layer. It owns the canonical wheel event
//! types, the coalescing queue that merges samples while one is in flight,
//! and the per-device synthesizer that turns acknowledged wheel events into
//! `Begin` / `Update` / `End` gesture scrolls.
//!
//! # Primary responsibilities
//! - **WheelEvent**: canonical scroll samples (deltas, phases, rails, device).
//! - **WheelEventQueue**: FIFO with tail coalescing of compatible samples.
//! - **GestureSynthesizer**: per-device Idle/Active session state machine.
//!
//! # How it fits in the system
//! Nothing here knows about time or dispatch. The runtime
//! (`scrollgate-runtime`) owns the in-flight slot, the quiescence timer,
//! cross-device arbitration, and overscroll, and drives these types.

pub mod event;
pub mod geometry;
pub mod gesture;
pub mod semantic_event;
pub mod wheel_queue;

pub use event::{AckResult, Modifiers, RailMode, ScrollDevice, WheelEvent, WheelPhase};
pub use geometry::{Axis, Point};
pub use gesture::{GestureSynthesizer, SessionState, Synthesis, TimerDirective};
pub use semantic_event::{GestureScrollEvent, GestureScrollKind, InertialPhase, ScrollUnits};
pub use wheel_queue::{Enqueued, QueuedWheelEvent, WheelEventQueue};
