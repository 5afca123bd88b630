//! Error types for the ingress runtime.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Invalid or unreadable ingress configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: port must be non-zero")]
    InvalidPort { field: &'static str },

    #[error("invalid {field} {address:?}: not an IP address")]
    InvalidAddress {
        field: &'static str,
        address: String,
    },

    #[error("invalid {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config file extension: {path:?}")]
    UnsupportedFormat { path: PathBuf },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPort { .. } => "invalid_port",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::InvalidValue { .. } => "invalid_value",
            Self::Read { .. } => "read",
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Yaml(_) => "yaml",
            Self::Json(_) => "json",
        }
    }
}

/// Errors surfaced by [`crate::TelemetryIngress::bind`].
///
/// Nothing after a successful bind is fatal; per-datagram failures are
/// counted in [`crate::IngressStats`] instead.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl IngressError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bind { .. } => "bind",
            Self::Config(_) => "config",
        }
    }
}

/// A single failed forward. Logged and counted by the forwarder task; never
/// returned to the receive loop.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("forward to {dest} failed: {source}")]
    Send {
        dest: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("forward to {dest} timed out after {timeout:?}")]
    Timeout { dest: SocketAddr, timeout: Duration },

    #[error("short forward to {dest}: sent {sent} of {len} bytes")]
    Short {
        dest: SocketAddr,
        sent: usize,
        len: usize,
    },
}

impl ForwardError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send_failed",
            Self::Timeout { .. } => "send_timeout",
            Self::Short { .. } => "short_send",
        }
    }
}
