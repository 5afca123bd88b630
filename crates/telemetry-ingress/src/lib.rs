//! UDP ingress for F1 24/25 telemetry.
//!
//! [`TelemetryIngress`] owns the listen socket. Every received datagram is
//! first queued, byte for byte, for the optional forwarder, then decoded and
//! applied to a shared [`SessionAggregator`]. Decode failures are counted in
//! [`IngressStats`] and never stop the loop; only binding can fail.
//!
//! With a [`SensorSink`] attached, a publisher task derives sensor sets from
//! the aggregator and pushes them at a bounded rate.
//!
//! ```no_run
//! use std::sync::Arc;
//! use f1_telemetry_ingress::{ChannelSink, IngressConfig, TelemetryIngress};
//! use f1_telemetry_session::SessionAggregator;
//!
//! # async fn start() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IngressConfig::default().with_env_overrides();
//! let aggregator = Arc::new(SessionAggregator::new(config.aggregator_config()));
//! let (sink, mut sensors) = ChannelSink::channel(16);
//!
//! let handle = TelemetryIngress::bind(config, aggregator)
//!     .await?
//!     .with_sink(Arc::new(sink))
//!     .run();
//! while let Some(sets) = sensors.recv().await {
//!     println!("{} sensor sets", sets.len());
//! }
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! [`SessionAggregator`]: f1_telemetry_session::SessionAggregator

#![deny(static_mut_refs)]

pub mod config;
mod error;
mod forwarder;
mod ingress;
mod publisher;
mod rate_limiter;
mod sink;
mod stats;

pub use config::{ForwardConfig, IngressConfig};
pub use error::{ConfigError, ForwardError, IngressError};
pub use ingress::{IngressHandle, TelemetryIngress};
pub use publisher::{PublisherConfig, SensorPublisher};
pub use sink::{ChannelSink, NullSink, SensorSink};
pub use stats::{DecodeFailures, IngressStats, IngressStatsSnapshot};
