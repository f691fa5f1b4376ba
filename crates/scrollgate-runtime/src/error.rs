#![forbid(unsafe_code)]

//! Protocol violations reported by the router.
//!
//! None of these are fatal. The router logs each one, counts it in
//! [`RouterStats`](crate::router::RouterStats), and carries on with its state
//! unchanged.

use std::fmt;

use scrollgate_core::{GestureScrollKind, ScrollDevice};

/// A caller broke the dispatch or acknowledgment protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// A wheel ack arrived while nothing was in flight.
    AckWithoutInFlight,
    /// A gesture ack arrived while no gesture was awaiting one.
    GestureAckWithoutPending,
    /// A gesture ack named a different kind than the oldest pending gesture.
    GestureAckMismatch {
        expected: GestureScrollKind,
        got: GestureScrollKind,
    },
    /// A gesture `End` was forwarded for a device with no open session.
    EndWithoutSession(ScrollDevice),
    /// The session timer fired after its session had already closed.
    StaleTimerFire(ScrollDevice),
}

impl ProtocolViolation {
    /// Short machine-friendly name, used as a log field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AckWithoutInFlight => "ack_without_in_flight",
            Self::GestureAckWithoutPending => "gesture_ack_without_pending",
            Self::GestureAckMismatch { .. } => "gesture_ack_mismatch",
            Self::EndWithoutSession(_) => "end_without_session",
            Self::StaleTimerFire(_) => "stale_timer_fire",
        }
    }

    /// Stale timer fires are an expected race, not a caller bug.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::StaleTimerFire(_))
    }
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AckWithoutInFlight => write!(f, "wheel ack with no event in flight"),
            Self::GestureAckWithoutPending => write!(f, "gesture ack with no gesture pending"),
            Self::GestureAckMismatch { expected, got } => {
                write!(f, "gesture ack for {got:?} but {expected:?} was pending")
            }
            Self::EndWithoutSession(device) => {
                write!(f, "gesture end for {device:?} with no open session")
            }
            Self::StaleTimerFire(device) => {
                write!(f, "session timer fired for closed {device:?} session")
            }
        }
    }
}

impl std::error::Error for ProtocolViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_kinds() {
        let v = ProtocolViolation::GestureAckMismatch {
            expected: GestureScrollKind::Update,
            got: GestureScrollKind::End,
        };
        let msg = v.to_string();
        assert!(msg.contains("End"));
        assert!(msg.contains("Update"));
    }

    #[test]
    fn only_stale_fire_is_benign() {
        assert!(ProtocolViolation::StaleTimerFire(ScrollDevice::Wheel).is_benign());
        assert!(!ProtocolViolation::AckWithoutInFlight.is_benign());
        assert!(!ProtocolViolation::EndWithoutSession(ScrollDevice::Touchscreen).is_benign());
    }

    #[test]
    fn names_are_distinct() {
        let all = [
            ProtocolViolation::AckWithoutInFlight,
            ProtocolViolation::GestureAckWithoutPending,
            ProtocolViolation::GestureAckMismatch {
                expected: GestureScrollKind::Begin,
                got: GestureScrollKind::Update,
            },
            ProtocolViolation::EndWithoutSession(ScrollDevice::Wheel),
            ProtocolViolation::StaleTimerFire(ScrollDevice::Wheel),
        ];
        let mut names: Vec<_> = all.iter().map(ProtocolViolation::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }
}
