//! Ingress counters.

use std::sync::atomic::{AtomicU64, Ordering};

use f1_telemetry_wire::ErrorKind;
use serde::Serialize;

/// Lock-free counters shared between the receive loop, the forwarder and
/// callers reading them through [`crate::IngressHandle::stats`].
#[derive(Debug, Default)]
pub struct IngressStats {
    datagrams: AtomicU64,
    bytes: AtomicU64,
    truncated: AtomicU64,
    unknown_packet_type: AtomicU64,
    unsupported_format: AtomicU64,
    count_out_of_range: AtomicU64,
    anomalies: AtomicU64,
    forwarded: AtomicU64,
    forward_failures: AtomicU64,
    forward_queue_drops: AtomicU64,
    publish_queue_drops: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecodeFailures {
    pub truncated_packet: u64,
    pub unknown_packet_type: u64,
    pub unsupported_format_version: u64,
    pub count_out_of_range: u64,
}

impl DecodeFailures {
    pub fn total(&self) -> u64 {
        self.truncated_packet
            .saturating_add(self.unknown_packet_type)
            .saturating_add(self.unsupported_format_version)
            .saturating_add(self.count_out_of_range)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngressStatsSnapshot {
    pub datagrams: u64,
    pub bytes: u64,
    pub decode_failures: DecodeFailures,
    pub anomalies: u64,
    pub forwarded: u64,
    pub forward_failures: u64,
    pub forward_queue_drops: u64,
    pub publish_queue_drops: u64,
}

impl IngressStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_datagram(&self, len: usize) {
        self.datagrams.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(len as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_failure(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::TruncatedPacket => &self.truncated,
            ErrorKind::UnknownPacketType => &self.unknown_packet_type,
            ErrorKind::UnsupportedFormatVersion => &self.unsupported_format,
            ErrorKind::CountOutOfRange => &self.count_out_of_range,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_anomalies(&self, count: usize) {
        if count > 0 {
            self.anomalies.fetch_add(count as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the failure count including this one.
    pub(crate) fn record_forward_failure(&self) -> u64 {
        self.forward_failures
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1)
    }

    pub(crate) fn record_forward_queue_drop(&self) {
        self.forward_queue_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish_queue_drop(&self) {
        self.publish_queue_drops.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> IngressStatsSnapshot {
        IngressStatsSnapshot {
            datagrams: self.datagrams.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            decode_failures: DecodeFailures {
                truncated_packet: self.truncated.load(Ordering::Relaxed),
                unknown_packet_type: self.unknown_packet_type.load(Ordering::Relaxed),
                unsupported_format_version: self.unsupported_format.load(Ordering::Relaxed),
                count_out_of_range: self.count_out_of_range.load(Ordering::Relaxed),
            },
            anomalies: self.anomalies.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            forward_failures: self.forward_failures.load(Ordering::Relaxed),
            forward_queue_drops: self.forward_queue_drops.load(Ordering::Relaxed),
            publish_queue_drops: self.publish_queue_drops.load(Ordering::Relaxed),
        }
    }
}
