//! Fuzzes the F1 datagram decoder with arbitrary bytes.
//!
//! Run with:
//!   cargo fuzz run fuzz_f1_datagram

#![no_main]

use f1_telemetry_wire::decode_datagram;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Err(err) = decode_datagram(data) {
        let _kind = err.kind();
    }
});
