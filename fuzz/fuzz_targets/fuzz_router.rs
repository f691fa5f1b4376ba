#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scrollgate_core::{AckResult, GestureScrollEvent, ScrollDevice, WheelEvent, WheelPhase};
use scrollgate_runtime::{
    NoopOverscrollDelegate, OverscrollMode, RouterConfig, ScrollConsumer, ScrollRouter,
    ScrollState,
};
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Wheel { dx: f32, dy: f32, pad: bool, phase: u8 },
    AckWheel(u8),
    AckGesture(u8),
    Advance(u8),
    TouchBegin,
    TouchEnd,
    Fling { vx: f32, vy: f32 },
    MouseMove,
    FocusLost,
}

#[derive(Default)]
struct Sink {
    wheel: usize,
    gestures: Vec<GestureScrollEvent>,
    acked: usize,
}

impl ScrollConsumer for Sink {
    fn send_wheel_event(&mut self, _event: &WheelEvent) {
        self.wheel += 1;
    }
    fn send_gesture_event(&mut self, event: &GestureScrollEvent) {
        self.gestures.push(*event);
    }
}

fn ack(sel: u8) -> AckResult {
    match sel % 3 {
        0 => AckResult::Consumed,
        1 => AckResult::NotConsumed,
        _ => AckResult::NoConsumer,
    }
}

fn phase(sel: u8) -> WheelPhase {
    match sel % 4 {
        0 => WheelPhase::None,
        1 => WheelPhase::Began,
        2 => WheelPhase::Changed,
        _ => WheelPhase::Ended,
    }
}

fuzz_target!(|ops: Vec<FuzzOp>| {
    let mut now = Instant::now();
    let mut router = ScrollRouter::new(
        RouterConfig::default(),
        Sink::default(),
        NoopOverscrollDelegate,
    );
    let mut acks = 0usize;

    for op in ops.into_iter().take(512) {
        match op {
            FuzzOp::Wheel { dx, dy, pad, phase: p } => {
                let mut event = WheelEvent::new(dx, dy);
                if pad {
                    event = event
                        .with_device(ScrollDevice::Touchpad)
                        .with_precise_deltas(true)
                        .with_phase(phase(p));
                }
                router.enqueue(event, now);
            }
            FuzzOp::AckWheel(sel) => {
                if router.on_wheel_ack(ack(sel), now).is_some() {
                    acks += 1;
                }
            }
            FuzzOp::AckGesture(sel) => {
                let sink = router.consumer();
                if let Some(g) = sink.gestures.get(sink.acked).copied() {
                    router.consumer_mut().acked += 1;
                    router.on_gesture_ack(g.kind, ack(sel));
                }
            }
            FuzzOp::Advance(ms) => {
                now += Duration::from_millis(u64::from(ms));
                router.tick(now);
            }
            FuzzOp::TouchBegin => router.on_gesture_scroll_begin(ScrollDevice::Touchscreen),
            FuzzOp::TouchEnd => router.on_gesture_scroll_end_or_fling(ScrollDevice::Touchscreen),
            FuzzOp::Fling { vx, vy } => {
                router.on_fling_start(ScrollDevice::Touchpad, vx, vy);
            }
            FuzzOp::MouseMove => {
                router.on_mouse_move();
            }
            FuzzOp::FocusLost => {
                router.on_focus_lost();
            }
        }

        // Post-conditions that must always hold:
        let sent = router.consumer().wheel;
        assert!(sent >= acks && sent - acks <= 1, "more than one wheel event in flight");
        assert_eq!(router.in_flight().is_some(), sent - acks == 1);
        let state = router.overscroll_state();
        assert_eq!(
            state.mode != OverscrollMode::None,
            state.scroll_state == ScrollState::Overscrolling,
            "overscroll mode and state disagree"
        );
    }
});
