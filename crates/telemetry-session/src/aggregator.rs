//! The shared owner of the live [`SessionState`].

use parking_lot::RwLock;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use f1_telemetry_wire::DecodedPacket;
use tracing::{debug, info};

use crate::apply::ApplyAnomaly;
use crate::staleness::{Category, FreshnessMap};
use crate::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// A category with no update for longer than this is flagged stale.
    pub stale_after: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_millis(2_000),
        }
    }
}

/// What applying one packet did beyond the state update itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// The packet carried a new session UID and replaced the previous session.
    pub reset: bool,
    pub anomalies: Vec<ApplyAnomaly>,
}

/// An immutable view of the state at one instant. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionSnapshot(Arc<SessionState>);

impl Deref for SessionSnapshot {
    type Target = SessionState;

    fn deref(&self) -> &SessionState {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregatorStats {
    pub applied: u64,
    pub resets: u64,
    pub anomalies: u64,
}

/// Folds decoded packets into the current session.
///
/// `apply` calls are serialised by the write lock; snapshots only clone the
/// `Arc` under the read lock, so a reader never sees a half-applied packet and
/// never blocks an update for longer than that clone.
#[derive(Debug)]
pub struct SessionAggregator {
    config: AggregatorConfig,
    state: RwLock<Arc<SessionState>>,
    applied: AtomicU64,
    resets: AtomicU64,
    anomalies: AtomicU64,
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self::new(AggregatorConfig::default())
    }
}

impl SessionAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            state: RwLock::new(Arc::new(SessionState::default())),
            applied: AtomicU64::new(0),
            resets: AtomicU64::new(0),
            anomalies: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn apply(&self, packet: &DecodedPacket) -> ApplyOutcome {
        self.apply_at(packet, Instant::now())
    }

    /// Apply `packet` as if it arrived at `now`.
    ///
    /// A session UID different from the current one replaces the entire
    /// state before the packet is applied.
    pub fn apply_at(&self, packet: &DecodedPacket, now: Instant) -> ApplyOutcome {
        let uid = packet.header.session_uid;
        let mut outcome = ApplyOutcome::default();

        let previous_uid = {
            let mut guard = self.state.write();
            let previous_uid = guard.session_uid;
            if previous_uid != Some(uid) {
                *guard = Arc::new(SessionState::new(uid));
                outcome.reset = previous_uid.is_some();
            }
            Arc::make_mut(&mut guard).apply_packet(packet, now, &mut outcome.anomalies);
            previous_uid
        };

        self.applied.fetch_add(1, Ordering::Relaxed);
        if outcome.reset {
            self.resets.fetch_add(1, Ordering::Relaxed);
            info!(
                old_uid = previous_uid.unwrap_or_default(),
                new_uid = uid,
                "session changed, state reset"
            );
        } else if previous_uid.is_none() {
            info!(uid, "first session seen");
        }
        for anomaly in &outcome.anomalies {
            self.anomalies.fetch_add(1, Ordering::Relaxed);
            debug!(kind = anomaly.kind(), %anomaly, "dropped car reference");
        }
        outcome
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot(Arc::clone(&self.state.read()))
    }

    /// Re-evaluate one category against the staleness threshold. Returns
    /// `true` when its stale flag flipped.
    pub fn mark_stale(&self, category: Category, now: Instant) -> bool {
        self.update_freshness(|freshness| {
            freshness.evaluate(category, now, self.config.stale_after)
        })
    }

    /// Re-evaluate every category and return the resulting snapshot.
    pub fn poll(&self, now: Instant) -> SessionSnapshot {
        self.update_freshness(|freshness| freshness.evaluate_all(now, self.config.stale_after));
        self.snapshot()
    }

    /// Runs `evaluate` on a copy of the freshness map; the state is only
    /// written when a flag flipped.
    fn update_freshness<F>(&self, evaluate: F) -> bool
    where
        F: FnOnce(&mut FreshnessMap) -> bool,
    {
        let mut guard = self.state.write();
        let mut freshness = guard.freshness;
        let changed = evaluate(&mut freshness);
        if changed {
            Arc::make_mut(&mut guard).freshness = freshness;
        }
        changed
    }

    pub fn stats(&self) -> AggregatorStats {
        AggregatorStats {
            applied: self.applied.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
        }
    }
}
