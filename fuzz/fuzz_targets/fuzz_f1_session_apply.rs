//! Fuzzes decode + aggregation + sensor derivation. Each input is split into
//! datagrams at 0xFE bytes and applied in order.
//!
//! Run with:
//!   cargo fuzz run fuzz_f1_session_apply

#![no_main]

use f1_telemetry_session::{SessionAggregator, derive_sensor_sets};
use f1_telemetry_wire::decode_datagram;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let aggregator = SessionAggregator::default();
    for chunk in data.split(|b| *b == 0xFE) {
        if let Ok(packet) = decode_datagram(chunk) {
            aggregator.apply(&packet);
        }
    }
    let _sets = derive_sensor_sets(&aggregator.snapshot());
});
