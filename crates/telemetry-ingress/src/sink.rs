//! Destinations for derived sensor values.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use f1_telemetry_session::SensorSet;
use tokio::sync::mpsc;

/// Receives every published batch of sensor sets, one set per category.
///
/// A failing sink is logged by the publisher and does not stop later pushes.
#[async_trait]
pub trait SensorSink: Send + Sync {
    async fn publish(&self, sets: &[SensorSet]) -> Result<()>;
}

/// Forwards each batch over a bounded channel for hosts that pull.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Vec<SensorSet>>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<Vec<SensorSet>>) -> Self {
        Self { sender }
    }

    /// A sink paired with the receiving end of a channel holding `capacity`
    /// batches.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Vec<SensorSet>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl SensorSink for ChannelSink {
    async fn publish(&self, sets: &[SensorSet]) -> Result<()> {
        self.sender
            .send(sets.to_vec())
            .await
            .map_err(|_closed| anyhow!("sensor channel receiver dropped"))
    }
}

/// Discards every batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl SensorSink for NullSink {
    async fn publish(&self, _sets: &[SensorSet]) -> Result<()> {
        Ok(())
    }
}
