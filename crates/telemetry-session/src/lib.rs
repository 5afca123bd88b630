//! Live session model for F1 24/25 telemetry.
//!
//! A [`SessionAggregator`] owns the current [`SessionState`] and folds decoded
//! packets into it. A change of session UID in any header replaces the whole
//! state; there is no other session-boundary signal on the wire.
//!
//! Readers take a [`SessionSnapshot`], an immutable shared copy that never
//! reflects a half-applied packet, and turn it into named values with
//! [`derive_sensor_sets`].

#![deny(static_mut_refs)]

mod aggregator;
mod apply;
pub mod derive;
pub mod names;
mod staleness;
mod state;

pub use aggregator::{
    AggregatorConfig, AggregatorStats, ApplyOutcome, SessionAggregator, SessionSnapshot,
};
pub use apply::ApplyAnomaly;
pub use derive::{SensorSet, SensorValue, derive_sensor_sets, format_lap_time};
pub use staleness::{Category, Freshness, FreshnessMap};
pub use state::{CarState, EventState, FastestLap, SessionState, SessionStatus, TrackFlags};
