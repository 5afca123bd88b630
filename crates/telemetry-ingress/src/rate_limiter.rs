//! Publish-rate limiting for high-frequency packet types.

use std::time::{Duration, Instant};

/// Admits at most `max_rate_hz` events per second; anything arriving sooner
/// than the minimum interval after the last admitted event is dropped.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_rate_hz: u32,
    min_interval: Duration,
    last_processed: Option<Instant>,
    dropped_count: u64,
    processed_count: u64,
}

impl RateLimiter {
    pub fn new(max_rate_hz: u32) -> Self {
        let effective = max_rate_hz.max(1);
        Self {
            max_rate_hz: effective,
            min_interval: Duration::from_nanos(1_000_000_000 / u64::from(effective)),
            last_processed: None,
            dropped_count: 0,
            processed_count: 0,
        }
    }

    /// Returns true if an event arriving at `now` should be processed.
    pub fn should_process_at(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_processed
            && now.saturating_duration_since(last) < self.min_interval
        {
            self.dropped_count = self.dropped_count.saturating_add(1);
            return false;
        }
        self.last_processed = Some(now);
        self.processed_count = self.processed_count.saturating_add(1);
        true
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn drop_rate_percent(&self) -> f32 {
        let total = self.dropped_count.saturating_add(self.processed_count);
        if total == 0 {
            0.0
        } else {
            (self.dropped_count as f32 / total as f32) * 100.0
        }
    }
}

/// Counters reported when the publisher stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiterStats {
    pub max_rate_hz: u32,
    pub processed_count: u64,
    pub dropped_count: u64,
    pub drop_rate_percent: f32,
}

impl From<&RateLimiter> for RateLimiterStats {
    fn from(limiter: &RateLimiter) -> Self {
        Self {
            max_rate_hz: limiter.max_rate_hz,
            processed_count: limiter.processed_count,
            dropped_count: limiter.dropped_count,
            drop_rate_percent: limiter.drop_rate_percent(),
        }
    }
}
