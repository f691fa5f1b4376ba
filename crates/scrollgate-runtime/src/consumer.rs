#![forbid(unsafe_code)]

//! The downstream content consumer.

use scrollgate_core::{GestureScrollEvent, WheelEvent};

/// Receives wheel events and gesture scrolls from the router.
///
/// Sending is fire-and-forget: the consumer answers later through
/// [`ScrollRouter::on_wheel_ack`](crate::router::ScrollRouter::on_wheel_ack)
/// and [`ScrollRouter::on_gesture_ack`](crate::router::ScrollRouter::on_gesture_ack).
/// Implementations must not call back into the router from these methods.
pub trait ScrollConsumer {
    /// Deliver a wheel event. Exactly one is outstanding at a time.
    fn send_wheel_event(&mut self, event: &WheelEvent);

    /// Deliver a gesture-scroll event.
    fn send_gesture_event(&mut self, event: &GestureScrollEvent);
}

impl<C: ScrollConsumer + ?Sized> ScrollConsumer for &mut C {
    fn send_wheel_event(&mut self, event: &WheelEvent) {
        (**self).send_wheel_event(event);
    }

    fn send_gesture_event(&mut self, event: &GestureScrollEvent) {
        (**self).send_gesture_event(event);
    }
}

impl<C: ScrollConsumer + ?Sized> ScrollConsumer for Box<C> {
    fn send_wheel_event(&mut self, event: &WheelEvent) {
        (**self).send_wheel_event(event);
    }

    fn send_gesture_event(&mut self, event: &GestureScrollEvent) {
        (**self).send_gesture_event(event);
    }
}
