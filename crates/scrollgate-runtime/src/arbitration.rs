#![forbid(unsafe_code)]

//! Cross-device scroll arbitration.
//!
//! Wheel and touchpad input flow through the wheel queue; any other device
//! (touchscreen, synthetic) scrolls through externally produced gestures.
//! When such a device begins scrolling it takes the gesture over: open wheel
//! sessions are terminated and new ones are blocked until it ends or flings.

use scrollgate_core::ScrollDevice;

/// What the router must do after an external scroll begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Takeover {
    /// The device is part of the wheel family; nothing changes.
    None,
    /// The device now owns the gesture; terminate open wheel sessions.
    PreemptWheel,
}

/// Tracks which non-wheel device currently owns the active gesture.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollArbitrator {
    scrolling_device: Option<ScrollDevice>,
}

impl ScrollArbitrator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scrolling_device: None,
        }
    }

    /// Record that `device` began scrolling outside the wheel queue.
    pub fn on_external_scroll_begin(&mut self, device: ScrollDevice) -> Takeover {
        if device.is_wheel_family() {
            return Takeover::None;
        }
        if self.scrolling_device != Some(device) {
            tracing::debug!(
                target: "scrollgate.arbitration",
                device = ?device,
                previous = ?self.scrolling_device,
                "external device took over scrolling"
            );
        }
        self.scrolling_device = Some(device);
        Takeover::PreemptWheel
    }

    /// Release the lock if `device` holds it. Returns `true` if released.
    pub fn on_external_scroll_end_or_fling(&mut self, device: ScrollDevice) -> bool {
        if self.scrolling_device != Some(device) {
            return false;
        }
        self.scrolling_device = None;
        tracing::debug!(
            target: "scrollgate.arbitration",
            device = ?device,
            "external device released scrolling"
        );
        true
    }

    /// Whether gestures from `device` must be suppressed.
    #[inline]
    #[must_use]
    pub fn blocks(&self, device: ScrollDevice) -> bool {
        matches!(self.scrolling_device, Some(owner) if owner != device)
    }

    #[inline]
    #[must_use]
    pub const fn scrolling_device(&self) -> Option<ScrollDevice> {
        self.scrolling_device
    }
}
