//! UDP receive loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use f1_telemetry_session::SessionAggregator;
use f1_telemetry_wire::{PacketType, decode_datagram};
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::config::IngressConfig;
use crate::error::IngressError;
use crate::forwarder::{ForwardQueue, Forwarder};
use crate::publisher::{PublisherConfig, SensorPublisher};
use crate::sink::SensorSink;
use crate::stats::{IngressStats, IngressStatsSnapshot};

/// Applied-packet notifications buffered for the publisher.
const NOTIFY_QUEUE_DEPTH: usize = 64;

/// How long shutdown waits for a publish blocked in the sink.
const PUBLISHER_DRAIN: Duration = Duration::from_millis(500);

/// A bound, not yet running ingress.
pub struct TelemetryIngress {
    config: IngressConfig,
    socket: UdpSocket,
    local_addr: SocketAddr,
    aggregator: Arc<SessionAggregator>,
    forwarder: Option<Forwarder>,
    sink: Option<Arc<dyn SensorSink>>,
    stats: Arc<IngressStats>,
}

impl TelemetryIngress {
    /// Validate `config` and bind the listen socket and, when forwarding is
    /// enabled, the forwarding socket.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a failed bind. These are the only fatal
    /// errors; nothing after a successful bind stops the ingress.
    pub async fn bind(
        config: IngressConfig,
        aggregator: Arc<SessionAggregator>,
    ) -> Result<Self, IngressError> {
        config.validate()?;
        let addr = config.bind_addr()?;
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| IngressError::Bind { addr, source })?;
        Self::with_socket(config, socket, aggregator).await
    }

    /// Use an already bound listen socket; `config.bind_address` and
    /// `config.port` are ignored.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a failed forwarding-socket bind.
    pub async fn with_socket(
        config: IngressConfig,
        socket: UdpSocket,
        aggregator: Arc<SessionAggregator>,
    ) -> Result<Self, IngressError> {
        config.validate()?;
        let local_addr = socket
            .local_addr()
            .map_err(|source| IngressError::Bind {
                addr: SocketAddr::from(([0, 0, 0, 0], config.port)),
                source,
            })?;
        info!(
            port = local_addr.port(),
            address = %local_addr.ip(),
            "F1 telemetry UDP ingress bound"
        );

        let stats = Arc::new(IngressStats::new());
        let forwarder = match config.forward_target()? {
            Some(dest) => {
                Some(Forwarder::bind(dest, config.send_timeout(), Arc::clone(&stats)).await?)
            }
            None => {
                info!("UDP forwarding disabled");
                None
            }
        };

        Ok(Self {
            config,
            socket,
            local_addr,
            aggregator,
            forwarder,
            sink: None,
            stats,
        })
    }

    /// Publish derived sensor sets to `sink` while running.
    pub fn with_sink(mut self, sink: Arc<dyn SensorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn aggregator(&self) -> &Arc<SessionAggregator> {
        &self.aggregator
    }

    /// Spawn the receive loop, the forwarder and the publisher.
    pub fn run(self) -> IngressHandle {
        let (shutdown, _) = broadcast::channel(1);
        let mut tasks = Vec::with_capacity(2);

        let forward = self.forwarder.map(|forwarder| {
            let (queue, receiver) = forwarder.queue(self.config.forward.queue_depth);
            debug!(dest = %forwarder.dest(), depth = self.config.forward.queue_depth, "forwarder started");
            tasks.push(tokio::spawn(forwarder.run(receiver, shutdown.subscribe())));
            queue
        });

        let mut publisher = None;
        let notify = self.sink.map(|sink| {
            let (sender, receiver) = mpsc::channel(NOTIFY_QUEUE_DEPTH);
            publisher = Some(SensorPublisher::spawn(
                Arc::clone(&self.aggregator),
                sink,
                PublisherConfig::from(&self.config),
                receiver,
            ));
            sender
        });

        let pipeline = Pipeline {
            aggregator: self.aggregator,
            stats: Arc::clone(&self.stats),
            forward,
            notify,
        };
        tasks.insert(
            0,
            tokio::spawn(receive_loop(
                self.socket,
                pipeline,
                self.config.max_datagram_bytes,
                shutdown.subscribe(),
            )),
        );

        IngressHandle {
            local_addr: self.local_addr,
            stats: self.stats,
            shutdown,
            tasks,
            publisher,
        }
    }
}

/// Controls a running ingress.
#[derive(Debug)]
pub struct IngressHandle {
    local_addr: SocketAddr,
    stats: Arc<IngressStats>,
    shutdown: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
    publisher: Option<JoinHandle<()>>,
}

impl IngressHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn stats(&self) -> IngressStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop receiving, close the sockets and wait for every task to finish.
    /// Datagrams still queued for forwarding are discarded.
    ///
    /// The publisher stops once the receive loop is gone; a publish still
    /// blocked in the sink after a short grace period is aborted.
    pub async fn shutdown(self) {
        if self.shutdown.send(()).is_err() {
            debug!("ingress tasks already stopped");
        }
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!(error = %err, "ingress task ended abnormally");
            }
        }
        if let Some(mut publisher) = self.publisher {
            match tokio::time::timeout(PUBLISHER_DRAIN, &mut publisher).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "sensor publisher ended abnormally"),
                Err(_elapsed) => {
                    publisher.abort();
                    warn!("sensor publisher blocked in sink, aborted");
                }
            }
        }
        info!(port = self.local_addr.port(), "F1 telemetry UDP ingress stopped");
    }
}

/// Per-datagram work, in order: forward, decode, apply, notify.
struct Pipeline {
    aggregator: Arc<SessionAggregator>,
    stats: Arc<IngressStats>,
    forward: Option<ForwardQueue>,
    notify: Option<mpsc::Sender<PacketType>>,
}

impl Pipeline {
    fn handle(&self, datagram: &[u8]) {
        let len = datagram.len();
        self.stats.record_datagram(len);
        if let Some(forward) = &self.forward {
            forward.offer(datagram);
        }

        let packet = match decode_datagram(datagram) {
            Ok(packet) => packet,
            Err(err) => {
                self.stats.record_decode_failure(err.kind());
                debug!(error = %err, kind = err.kind().as_str(), len, "F1 telemetry packet decode failed");
                return;
            }
        };

        let packet_type = packet.packet_type();
        trace!(?packet_type, frame = packet.header.frame_identifier, "applying packet");
        let outcome = self.aggregator.apply(&packet);
        self.stats.record_anomalies(outcome.anomalies.len());

        if let Some(notify) = &self.notify
            && notify.try_send(packet_type).is_err()
        {
            self.stats.record_publish_queue_drop();
        }
    }
}

async fn receive_loop(
    socket: UdpSocket,
    pipeline: Pipeline,
    max_datagram_bytes: usize,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut buf = vec![0u8; max_datagram_bytes];
    loop {
        let len = tokio::select! {
            _ = shutdown.recv() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, _peer)) => len,
                Err(err) => {
                    warn!(error = %err, "F1 telemetry UDP receive error");
                    continue;
                }
            },
        };
        if let Some(datagram) = buf.get(..len) {
            pipeline.handle(datagram);
        }
    }
    debug!("receive loop stopped");
}
