#![forbid(unsafe_code)]

//! scrollgate Runtime
//!
//! This crate drives the pure types of `scrollgate-core` against a real
//! consumer: one wheel event in flight at a time, gestures synthesized from
//! each ack, cross-device arbitration, and the overscroll state machine.
//!
//! # Key Components
//!
//! - [`ScrollRouter`] - Entry point wiring every component below together
//! - [`AckGatedDispatcher`] - Single in-flight slot in front of the wheel queue
//! - [`SessionTimer`] - Quiescence timer ending phaseless wheel sessions
//! - [`ScrollArbitrator`] - Which non-wheel device owns the active gesture
//! - [`OverscrollController`] - Threshold/hysteresis overscroll state machine
//! - [`RouterConfig`] - Tunables, loadable from TOML/JSON with `config`
//!
//! # Role in scrollgate
//! `scrollgate-runtime` is the orchestrator. Input calls
//! ([`ScrollRouter::enqueue`], acks, gesture notifications, [`ScrollRouter::tick`])
//! run synchronously to completion and invoke the [`ScrollConsumer`] and
//! [`OverscrollDelegate`] inline. No threads, no locks.
//!
//! # Logging
//! Everything is instrumented with `tracing` under the `scrollgate.*`
//! targets (`queue`, `dispatch`, `gesture`, `arbitration`, `overscroll`).
//! No subscriber is installed here.

pub mod arbitration;
pub mod config;
pub mod consumer;
pub mod dispatcher;
pub mod error;
pub mod overscroll;
pub mod router;
pub mod session_timer;

pub use arbitration::{ScrollArbitrator, Takeover};
pub use config::{ConfigError, OverscrollConfig, RouterConfig};
pub use consumer::ScrollConsumer;
pub use dispatcher::{AckGatedDispatcher, AckedWheelEvent, InFlight};
pub use error::ProtocolViolation;
pub use overscroll::{
    FlingDisposition, NoopOverscrollDelegate, OverscrollController, OverscrollDelegate,
    OverscrollMode, OverscrollState, ResetOutcome, ResetTrigger, ScrollState,
};
pub use router::{RouterStats, ScrollRouter};
pub use session_timer::{SessionTimer, TimerFire};
