//! Best-effort raw re-broadcast of received datagrams.
//!
//! The receive loop hands each datagram to a [`ForwardQueue`] without
//! waiting; a separate task drains the queue through its own socket. A full
//! queue drops the datagram, so a stalled destination never delays ingestion.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::error::{ForwardError, IngressError};
use crate::stats::IngressStats;

/// Failures after the first are only warned about once per this many.
const WARN_EVERY: u64 = 100;

/// Sending half of the forward queue, owned by the receive loop.
#[derive(Debug, Clone)]
pub(crate) struct ForwardQueue {
    sender: mpsc::Sender<Vec<u8>>,
    stats: Arc<IngressStats>,
}

impl ForwardQueue {
    /// Queue a copy of `datagram`. Drops and counts it when the queue is full.
    pub(crate) fn offer(&self, datagram: &[u8]) {
        match self.sender.try_send(datagram.to_vec()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.record_forward_queue_drop();
                debug!(len = datagram.len(), "forward queue full, datagram dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.stats.record_forward_queue_drop();
            }
        }
    }
}

pub(crate) struct Forwarder {
    socket: UdpSocket,
    dest: SocketAddr,
    send_timeout: Duration,
    stats: Arc<IngressStats>,
}

impl Forwarder {
    /// Bind an ephemeral socket of the destination's address family.
    pub(crate) async fn bind(
        dest: SocketAddr,
        send_timeout: Duration,
        stats: Arc<IngressStats>,
    ) -> Result<Self, IngressError> {
        let local = match dest {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|source| IngressError::Bind {
                addr: local,
                source,
            })?;
        info!(%dest, "UDP forwarding enabled");
        Ok(Self {
            socket,
            dest,
            send_timeout,
            stats,
        })
    }

    pub(crate) fn dest(&self) -> SocketAddr {
        self.dest
    }

    pub(crate) fn queue(&self, depth: usize) -> (ForwardQueue, mpsc::Receiver<Vec<u8>>) {
        let (sender, receiver) = mpsc::channel(depth.max(1));
        let queue = ForwardQueue {
            sender,
            stats: Arc::clone(&self.stats),
        };
        (queue, receiver)
    }

    /// Send one datagram unchanged.
    pub(crate) async fn forward(&self, datagram: &[u8]) -> Result<(), ForwardError> {
        let sent = tokio::time::timeout(self.send_timeout, self.socket.send_to(datagram, self.dest))
            .await
            .map_err(|_elapsed| ForwardError::Timeout {
                dest: self.dest,
                timeout: self.send_timeout,
            })?
            .map_err(|source| ForwardError::Send {
                dest: self.dest,
                source,
            })?;
        if sent != datagram.len() {
            return Err(ForwardError::Short {
                dest: self.dest,
                sent,
                len: datagram.len(),
            });
        }
        Ok(())
    }

    /// Drain `queue` until it closes or shutdown is signalled.
    pub(crate) async fn run(
        self,
        mut queue: mpsc::Receiver<Vec<u8>>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                next = queue.recv() => match next {
                    Some(datagram) => self.forward_logged(&datagram).await,
                    None => break,
                },
            }
        }
        debug!(dest = %self.dest, "forwarder stopped");
    }

    async fn forward_logged(&self, datagram: &[u8]) {
        match self.forward(datagram).await {
            Ok(()) => self.stats.record_forwarded(),
            Err(err) => {
                let failures = self.stats.record_forward_failure();
                if failures == 1 || failures.is_multiple_of(WARN_EVERY) {
                    warn!(error = %err, kind = err.kind(), failures, "UDP forward failed");
                } else {
                    debug!(error = %err, kind = err.kind(), "UDP forward failed");
                }
            }
        }
    }
}
