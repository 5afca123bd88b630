//! Ingress configuration.
//!
//! Loaded from YAML or JSON, then optionally overridden from the environment:
//!
//! | Variable                       | Field               |
//! |--------------------------------|---------------------|
//! | `F1_TELEMETRY_UDP_PORT`        | `port`              |
//! | `F1_TELEMETRY_FORWARD_ADDRESS` | `forward.address`   |
//! | `F1_TELEMETRY_FORWARD_PORT`    | `forward.port`      |
//! | `F1_TELEMETRY_STALE_AFTER_MS`  | `stale_after_ms`    |
//!
//! Unparseable or zero override values are ignored.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use f1_telemetry_session::AggregatorConfig;
use f1_telemetry_wire::MAX_DATAGRAM_SIZE;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 20777;
pub const DEFAULT_MAX_DATAGRAM_BYTES: usize = 2048;

pub const ENV_UDP_PORT: &str = "F1_TELEMETRY_UDP_PORT";
pub const ENV_FORWARD_ADDRESS: &str = "F1_TELEMETRY_FORWARD_ADDRESS";
pub const ENV_FORWARD_PORT: &str = "F1_TELEMETRY_FORWARD_PORT";
pub const ENV_STALE_AFTER_MS: &str = "F1_TELEMETRY_STALE_AFTER_MS";

/// Raw re-broadcast of every received datagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    pub enabled: bool,
    pub address: String,
    pub port: u16,
    /// Datagrams waiting to be forwarded beyond this depth are dropped.
    pub queue_depth: usize,
    pub send_timeout_ms: u64,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            address: String::new(),
            port: DEFAULT_PORT,
            queue_depth: 256,
            send_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngressConfig {
    pub bind_address: String,
    pub port: u16,
    pub forward: ForwardConfig,
    pub stale_after_ms: u64,
    /// Upper bound on sensor pushes per second caused by high-frequency packets.
    pub publish_rate_hz: u32,
    pub max_datagram_bytes: usize,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            forward: ForwardConfig::default(),
            stale_after_ms: 2_000,
            publish_rate_hz: 10,
            max_datagram_bytes: DEFAULT_MAX_DATAGRAM_BYTES,
        }
    }
}

impl IngressConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a `.yaml`/`.yml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, has another extension, or does not
    /// parse.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&source)
    }

    /// Apply the `F1_TELEMETRY_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to
    /// its value.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.port = override_u16(lookup(ENV_UDP_PORT), self.port);
        self.forward.port = override_u16(lookup(ENV_FORWARD_PORT), self.forward.port);
        self.stale_after_ms = override_u64(lookup(ENV_STALE_AFTER_MS), self.stale_after_ms);
        if let Some(address) = lookup(ENV_FORWARD_ADDRESS)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            self.forward.address = address;
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        self.forward_target()?;
        if self.forward.enabled && self.forward.queue_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forward.queue_depth",
                reason: "must be at least 1",
            });
        }
        if self.forward.enabled && self.forward.send_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "forward.send_timeout_ms",
                reason: "must be non-zero",
            });
        }
        if self.stale_after_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stale_after_ms",
                reason: "must be non-zero",
            });
        }
        if self.publish_rate_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "publish_rate_hz",
                reason: "must be non-zero",
            });
        }
        if self.max_datagram_bytes < MAX_DATAGRAM_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "max_datagram_bytes",
                reason: "must hold the largest telemetry packet",
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort { field: "port" });
        }
        let ip = parse_ip("bind_address", &self.bind_address)?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// The forwarding destination, or `None` when forwarding is disabled.
    pub fn forward_target(&self) -> Result<Option<SocketAddr>, ConfigError> {
        if !self.forward.enabled {
            return Ok(None);
        }
        if self.forward.port == 0 {
            return Err(ConfigError::InvalidPort {
                field: "forward.port",
            });
        }
        let ip = parse_ip("forward.address", &self.forward.address)?;
        Ok(Some(SocketAddr::new(ip, self.forward.port)))
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            stale_after: Duration::from_millis(self.stale_after_ms),
        }
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.forward.send_timeout_ms)
    }
}

fn parse_ip(field: &'static str, address: &str) -> Result<IpAddr, ConfigError> {
    address
        .trim()
        .parse::<IpAddr>()
        .map_err(|_parse| ConfigError::InvalidAddress {
            field,
            address: address.to_string(),
        })
}

fn override_u16(value: Option<String>, fallback: u16) -> u16 {
    value
        .and_then(|v| v.trim().parse::<u16>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

fn override_u64(value: Option<String>, fallback: u64) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() -> TestResult {
        let config = IngressConfig::default();
        assert_eq!(config.port, 20777);
        assert!(!config.forward.enabled);
        assert_eq!(config.forward.queue_depth, 256);
        assert_eq!(config.stale_after_ms, 2_000);
        config.validate()?;
        assert_eq!(config.forward_target()?, None);
        assert_eq!(
            config.aggregator_config().stale_after,
            Duration::from_secs(2)
        );
        Ok(())
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> TestResult {
        let config = IngressConfig::from_yaml_str(
            "port: 20800\nforward:\n  enabled: true\n  address: 192.168.1.20\n",
        )?;
        assert_eq!(config.port, 20800);
        assert_eq!(config.forward.port, DEFAULT_PORT);
        assert_eq!(config.forward.send_timeout_ms, 50);
        assert_eq!(
            config.forward_target()?,
            Some("192.168.1.20:20777".parse::<SocketAddr>()?)
        );
        Ok(())
    }

    #[test]
    fn test_json() -> TestResult {
        let config = IngressConfig::from_json_str(r#"{"stale_after_ms": 500, "publish_rate_hz": 4}"#)?;
        assert_eq!(config.stale_after_ms, 500);
        assert_eq!(config.publish_rate_hz, 4);
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let config = IngressConfig::default().apply_overrides(lookup(&[
            (ENV_UDP_PORT, "20999"),
            (ENV_FORWARD_ADDRESS, " 10.0.0.5 "),
            (ENV_FORWARD_PORT, "30000"),
            (ENV_STALE_AFTER_MS, "750"),
        ]));
        assert_eq!(config.port, 20999);
        assert_eq!(config.forward.address, "10.0.0.5");
        assert_eq!(config.forward.port, 30000);
        assert_eq!(config.stale_after_ms, 750);
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let config = IngressConfig::default().apply_overrides(lookup(&[
            (ENV_UDP_PORT, "0"),
            (ENV_FORWARD_PORT, "not-a-port"),
            (ENV_STALE_AFTER_MS, "-5"),
            (ENV_FORWARD_ADDRESS, "   "),
        ]));
        assert_eq!(config, IngressConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = IngressConfig {
            port: 0,
            ..IngressConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPort { field: "port" })
        ));

        let config = IngressConfig {
            forward: ForwardConfig {
                enabled: true,
                address: "f1.local".to_string(),
                ..ForwardConfig::default()
            },
            ..IngressConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress {
                field: "forward.address",
                ..
            })
        ));

        let config = IngressConfig {
            stale_after_ms: 0,
            ..IngressConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "stale_after_ms",
                ..
            })
        ));

        let config = IngressConfig {
            max_datagram_bytes: MAX_DATAGRAM_SIZE - 1,
            ..IngressConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "max_datagram_bytes",
                ..
            })
        ));
        let config = IngressConfig {
            max_datagram_bytes: MAX_DATAGRAM_SIZE,
            ..IngressConfig::default()
        };
        assert!(matches!(config.validate(), Ok(())));
    }

    #[test]
    fn test_disabled_forward_ignores_address() -> TestResult {
        let config = IngressConfig {
            forward: ForwardConfig {
                address: "garbage".to_string(),
                queue_depth: 0,
                ..ForwardConfig::default()
            },
            ..IngressConfig::default()
        };
        config.validate()?;
        Ok(())
    }

    #[test]
    fn test_unknown_extension() {
        let err = IngressConfig::from_path("ingress.toml");
        assert!(matches!(err, Err(ConfigError::UnsupportedFormat { .. })));
    }
}
