//! Pushes derived sensor sets to a [`SensorSink`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use f1_telemetry_session::{Category, SessionAggregator, SessionSnapshot, derive_sensor_sets};
use f1_telemetry_wire::PacketType;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::IngressConfig;
use crate::rate_limiter::{RateLimiter, RateLimiterStats};
use crate::sink::SensorSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Pushes per second allowed for high-frequency packet types; also the
    /// staleness re-evaluation rate.
    pub rate_hz: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self { rate_hz: 10 }
    }
}

impl From<&IngressConfig> for PublisherConfig {
    fn from(config: &IngressConfig) -> Self {
        Self {
            rate_hz: config.publish_rate_hz,
        }
    }
}

pub struct SensorPublisher {
    aggregator: Arc<SessionAggregator>,
    sink: Arc<dyn SensorSink>,
    limiter: RateLimiter,
    tick: Duration,
    notifications: mpsc::Receiver<PacketType>,
    pending: bool,
    last_stale: Vec<Category>,
    published: u64,
}

impl SensorPublisher {
    /// Spawn the publishing task. It ends when every sender for
    /// `notifications` has been dropped.
    ///
    /// Each notification names the packet type just applied. Low-frequency
    /// types publish immediately; high-frequency types are rate limited, and
    /// a suppressed update is published on the next tick. Every tick also
    /// re-evaluates staleness and publishes when a category's flag flipped.
    pub fn spawn(
        aggregator: Arc<SessionAggregator>,
        sink: Arc<dyn SensorSink>,
        config: PublisherConfig,
        notifications: mpsc::Receiver<PacketType>,
    ) -> JoinHandle<()> {
        let limiter = RateLimiter::new(config.rate_hz);
        let publisher = Self {
            aggregator,
            sink,
            tick: limiter.min_interval(),
            limiter,
            notifications,
            pending: false,
            last_stale: Vec::new(),
            published: 0,
        };
        tokio::spawn(publisher.run())
    }

    async fn run(mut self) {
        let mut tick = tokio::time::interval(self.tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                next = self.notifications.recv() => match next {
                    Some(packet_type) => self.on_packet(packet_type).await,
                    None => break,
                },
                _ = tick.tick() => self.on_tick().await,
            }
        }
        let limiter = RateLimiterStats::from(&self.limiter);
        debug!(
            published = self.published,
            rate_hz = limiter.max_rate_hz,
            admitted = limiter.processed_count,
            suppressed = limiter.dropped_count,
            suppressed_pct = limiter.drop_rate_percent,
            "sensor publisher stopped"
        );
    }

    async fn on_packet(&mut self, packet_type: PacketType) {
        let now = Instant::now();
        if packet_type.is_high_frequency() && !self.limiter.should_process_at(now) {
            self.pending = true;
            return;
        }
        let snapshot = self.aggregator.poll(now);
        self.publish(&snapshot).await;
    }

    async fn on_tick(&mut self) {
        let snapshot = self.aggregator.poll(Instant::now());
        let stale_changed = snapshot.freshness.stale_categories().ne(self.last_stale.iter().copied());
        if self.pending || stale_changed {
            self.publish(&snapshot).await;
        }
    }

    async fn publish(&mut self, snapshot: &SessionSnapshot) {
        self.pending = false;
        self.last_stale = snapshot.freshness.stale_categories().collect();
        let sets = derive_sensor_sets(snapshot);
        match self.sink.publish(&sets).await {
            Ok(()) => self.published = self.published.saturating_add(1),
            Err(err) => warn!(error = %err, "sensor sink publish failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use f1_telemetry_session::{AggregatorConfig, SensorSet, SensorValue};
    use f1_telemetry_wire::builder::{DamageSpec, HeaderSpec, build_car_damage_packet, zeroed_packet};
    use f1_telemetry_wire::{PACKET_FORMAT_2025, decode_datagram};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn category(sets: &[SensorSet], category: Category) -> Option<&SensorSet> {
        sets.iter().find(|set| set.category == category)
    }

    async fn next_batch(
        receiver: &mut mpsc::Receiver<Vec<SensorSet>>,
    ) -> Result<Vec<SensorSet>, Box<dyn std::error::Error>> {
        let batch = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
            .await?
            .ok_or("sink channel closed")?;
        Ok(batch)
    }

    #[tokio::test]
    async fn test_low_frequency_packet_publishes_immediately() -> TestResult {
        let aggregator = Arc::new(SessionAggregator::default());
        let (sink, mut batches) = ChannelSink::channel(8);
        let (notify, notifications) = mpsc::channel(8);
        let task = SensorPublisher::spawn(
            Arc::clone(&aggregator),
            Arc::new(sink),
            PublisherConfig { rate_hz: 1 },
            notifications,
        );

        let raw = build_car_damage_packet(
            &HeaderSpec::new(PACKET_FORMAT_2025, PacketType::CarDamage, 9),
            0,
            &DamageSpec {
                tyres_wear: [10.0, 20.0, 42.0, 30.0],
                ..DamageSpec::default()
            },
        );
        aggregator.apply(&decode_datagram(&raw)?);
        notify.send(PacketType::CarDamage).await?;

        // The first tick fires at once and may publish the empty state first.
        let mut damage = None;
        for _ in 0..2 {
            let batch = next_batch(&mut batches).await?;
            let set = category(&batch, Category::Damage).ok_or("no damage set")?;
            if set.get("tyre_wear_fl") == Some(&SensorValue::Int(42)) {
                damage = Some(set.clone());
                break;
            }
        }
        let damage = damage.ok_or("damage update never published")?;
        assert!(!damage.stale);

        drop(notify);
        tokio::time::timeout(Duration::from_secs(2), task).await??;
        Ok(())
    }

    #[tokio::test]
    async fn test_tick_publishes_when_category_goes_stale() -> TestResult {
        let aggregator = Arc::new(SessionAggregator::new(AggregatorConfig {
            stale_after: Duration::from_millis(50),
        }));
        let raw = zeroed_packet(&HeaderSpec::new(PACKET_FORMAT_2025, PacketType::CarDamage, 3));
        aggregator.apply(&decode_datagram(&raw)?);

        let (sink, mut batches) = ChannelSink::channel(16);
        let (notify, notifications) = mpsc::channel(8);
        let task = SensorPublisher::spawn(
            Arc::clone(&aggregator),
            Arc::new(sink),
            PublisherConfig { rate_hz: 50 },
            notifications,
        );

        let mut went_stale = false;
        for _ in 0..10 {
            let batch = next_batch(&mut batches).await?;
            if category(&batch, Category::Damage).is_some_and(|set| set.stale) {
                went_stale = true;
                break;
            }
        }
        assert!(went_stale);

        drop(notify);
        tokio::time::timeout(Duration::from_secs(2), task).await??;
        Ok(())
    }
}
