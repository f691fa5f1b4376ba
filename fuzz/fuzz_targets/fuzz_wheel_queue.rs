#![no_main]

use scrollgate_core::{Enqueued, WheelEvent, WheelEventQueue, WheelPhase};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut queue = WheelEventQueue::new();
    let mut accepted = 0u32;

    // Each 3-byte chunk is one sample: dx, dy, phase selector.
    for chunk in data.chunks_exact(3) {
        let dx = f32::from(chunk[0] as i8);
        let dy = f32::from(chunk[1] as i8);
        let phase = match chunk[2] % 6 {
            0 => WheelPhase::None,
            1 => WheelPhase::MayBegin,
            2 => WheelPhase::Began,
            3 => WheelPhase::Changed,
            4 => WheelPhase::Ended,
            _ => WheelPhase::Cancelled,
        };
        let event = WheelEvent::new(dx, dy).with_phase(phase);
        if queue.enqueue(event) != Enqueued::Dropped {
            accepted += 1;
        }
        if chunk[2] & 0x80 != 0 {
            let _ = queue.pop_front();
        }
    }

    // Post-conditions: no adjacent entries could have merged, and the
    // per-entry counts never exceed what was accepted.
    let entries: Vec<_> = queue.iter().copied().collect();
    for pair in entries.windows(2) {
        assert!(!pair[0].can_coalesce_with(&pair[1].event), "mergeable neighbours");
    }
    let total: u32 = entries.iter().map(|e| e.coalesced_count).sum();
    assert!(total <= accepted, "count exceeds accepted samples");
    assert!(entries.iter().all(|e| e.coalesced_count >= 1));
});
