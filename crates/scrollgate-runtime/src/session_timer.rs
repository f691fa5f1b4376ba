#![forbid(unsafe_code)]

//! One-shot quiescence timer for phaseless wheel sessions.
//!
//! The timer is a polled deadline, not a callback: the owner calls
//! [`SessionTimer::poll`] from its tick and acts on the returned
//! [`TimerFire`]. Every arming bumps a generation counter so a fire can be
//! matched against the arming that produced it.

use scrollgate_core::ScrollDevice;
use web_time::{Duration, Instant};

/// A fired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFire {
    /// Device whose session the timer was guarding.
    pub device: ScrollDevice,
    /// Generation of the arming that fired.
    pub generation: u64,
}

/// Owned one-shot timer handle.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    deadline: Option<Instant>,
    owner: Option<ScrollDevice>,
    generation: u64,
}

impl SessionTimer {
    /// Create a disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`, replacing any previous
    /// arming.
    pub fn start_or_reset(&mut self, now: Instant, delay: Duration, device: ScrollDevice) {
        self.deadline = Some(now + delay);
        self.owner = Some(device);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Disarm without firing.
    pub fn stop(&mut self) {
        self.deadline = None;
        self.owner = None;
    }

    /// Disarm only if the timer is guarding `device`.
    pub fn stop_for(&mut self, device: ScrollDevice) {
        if self.owner == Some(device) {
            self.stop();
        }
    }

    /// Fire if the deadline has passed. A fired timer is disarmed.
    pub fn poll(&mut self, now: Instant) -> Option<TimerFire> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        let device = self.owner?;
        self.stop();
        Some(TimerFire {
            device,
            generation: self.generation,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Device the armed timer is guarding.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Option<ScrollDevice> {
        self.owner
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start_or_reset(t0, MS_100, ScrollDevice::Wheel);
        assert!(timer.is_running());

        assert_eq!(timer.poll(t0 + Duration::from_millis(99)), None);
        let fire = timer.poll(t0 + MS_100).expect("deadline reached");
        assert_eq!(fire.device, ScrollDevice::Wheel);
        assert!(!timer.is_running());
        assert_eq!(timer.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn reset_pushes_deadline_out() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start_or_reset(t0, MS_100, ScrollDevice::Wheel);
        timer.start_or_reset(t0 + Duration::from_millis(80), MS_100, ScrollDevice::Wheel);

        assert_eq!(timer.poll(t0 + Duration::from_millis(150)), None);
        assert!(timer.poll(t0 + Duration::from_millis(180)).is_some());
    }

    #[test]
    fn stop_disarms() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start_or_reset(t0, MS_100, ScrollDevice::Wheel);
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.poll(t0 + MS_100), None);
    }

    #[test]
    fn stop_for_other_device_is_ignored() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start_or_reset(t0, MS_100, ScrollDevice::Wheel);
        timer.stop_for(ScrollDevice::Touchpad);
        assert_eq!(timer.owner(), Some(ScrollDevice::Wheel));
        timer.stop_for(ScrollDevice::Wheel);
        assert!(!timer.is_running());
    }

    #[test]
    fn generation_tracks_armings() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start_or_reset(t0, MS_100, ScrollDevice::Wheel);
        timer.start_or_reset(t0, MS_100, ScrollDevice::Wheel);
        let fire = timer.poll(t0 + MS_100).expect("fires");
        assert_eq!(fire.generation, 2);
        assert_eq!(timer.generation(), 2);
    }
}
