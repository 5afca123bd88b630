//! UDP round trips through a running ingress on loopback.

use std::collections::BTreeSet;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use f1_telemetry_ingress::{
    ChannelSink, ConfigError, ForwardConfig, IngressConfig, IngressError, TelemetryIngress,
};
use f1_telemetry_session::{Category, SensorValue, SessionAggregator, SessionStatus};
use f1_telemetry_wire::builder::{
    DamageSpec, HeaderSpec, LapSpec, SessionSpec, build_car_damage_packet, build_lap_data_packet,
    build_session_packet, zeroed_packet,
};
use f1_telemetry_wire::{MAX_DATAGRAM_SIZE, PACKET_FORMAT_2025, PacketType};
use tokio::net::UdpSocket;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const WAIT: Duration = Duration::from_secs(2);

async fn loopback_socket() -> Result<UdpSocket, Box<dyn std::error::Error>> {
    Ok(UdpSocket::bind("127.0.0.1:0").await?)
}

fn forwarding_to(dest: SocketAddr) -> IngressConfig {
    IngressConfig {
        forward: ForwardConfig {
            enabled: true,
            address: dest.ip().to_string(),
            port: dest.port(),
            ..ForwardConfig::default()
        },
        ..IngressConfig::default()
    }
}

fn damage_packet(uid: u64, tyre_wear_fl: f32) -> Vec<u8> {
    build_car_damage_packet(
        &HeaderSpec::new(PACKET_FORMAT_2025, PacketType::CarDamage, uid),
        0,
        &DamageSpec {
            tyres_wear: [0.0, 0.0, tyre_wear_fl, 0.0],
            ..DamageSpec::default()
        },
    )
}

/// Polls `done` until it holds or `WAIT` elapses.
async fn eventually<F>(mut done: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    done()
}

// ─── Forwarding ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn forwards_every_datagram_byte_for_byte() -> TestResult {
    let target = loopback_socket().await?;
    let listen = loopback_socket().await?;
    let aggregator = Arc::new(SessionAggregator::default());
    let ingress =
        TelemetryIngress::with_socket(forwarding_to(target.local_addr()?), listen, aggregator)
            .await?;
    let ingress_addr = ingress.local_addr();
    let handle = ingress.run();

    let valid = damage_packet(1, 12.0);
    let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x01];
    let client = loopback_socket().await?;
    client.send_to(&valid, ingress_addr).await?;
    client.send_to(&garbage, ingress_addr).await?;

    let mut received = BTreeSet::new();
    let mut buf = vec![0u8; 4096];
    for _ in 0..2 {
        let (len, _) = tokio::time::timeout(WAIT, target.recv_from(&mut buf)).await??;
        received.insert(buf.get(..len).ok_or("bad length")?.to_vec());
    }
    assert_eq!(received, BTreeSet::from([valid, garbage]));

    assert!(eventually(|| handle.stats().forwarded == 2).await);
    let stats = handle.stats();
    assert_eq!(stats.datagrams, 2);
    assert_eq!(stats.decode_failures.total(), 1);
    assert_eq!(stats.forward_failures, 0);

    handle.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn largest_packet_is_forwarded_whole() -> TestResult {
    let target = loopback_socket().await?;
    let listen = loopback_socket().await?;
    let config = IngressConfig {
        max_datagram_bytes: MAX_DATAGRAM_SIZE,
        ..forwarding_to(target.local_addr()?)
    };
    let aggregator = Arc::new(SessionAggregator::default());
    let handle = TelemetryIngress::with_socket(config, listen, Arc::clone(&aggregator))
        .await?
        .run();

    let history = zeroed_packet(&HeaderSpec::new(
        PACKET_FORMAT_2025,
        PacketType::SessionHistory,
        5,
    ));
    assert_eq!(history.len(), MAX_DATAGRAM_SIZE);
    let client = loopback_socket().await?;
    client.send_to(&history, handle.local_addr()).await?;

    let mut buf = vec![0u8; 4096];
    let (len, _) = tokio::time::timeout(WAIT, target.recv_from(&mut buf)).await??;
    assert_eq!(buf.get(..len), Some(history.as_slice()));
    assert!(eventually(|| aggregator.stats().applied == 1).await);
    assert_eq!(handle.stats().decode_failures.total(), 0);

    handle.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn disabled_forwarding_sends_nothing() -> TestResult {
    let target = loopback_socket().await?;
    let listen = loopback_socket().await?;
    let mut config = forwarding_to(target.local_addr()?);
    config.forward.enabled = false;
    let aggregator = Arc::new(SessionAggregator::default());
    let handle = TelemetryIngress::with_socket(config, listen, Arc::clone(&aggregator))
        .await?
        .run();

    let client = loopback_socket().await?;
    client.send_to(&damage_packet(4, 7.0), handle.local_addr()).await?;
    assert!(eventually(|| aggregator.stats().applied == 1).await);

    let mut buf = [0u8; 64];
    if let Ok(received) =
        tokio::time::timeout(Duration::from_millis(200), target.recv_from(&mut buf)).await
    {
        return Err(format!("datagram forwarded while disabled: {received:?}").into());
    }
    assert_eq!(handle.stats().forwarded, 0);

    handle.shutdown().await;
    Ok(())
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn received_packets_reach_the_aggregator() -> TestResult {
    let listen = loopback_socket().await?;
    let aggregator = Arc::new(SessionAggregator::default());
    let handle =
        TelemetryIngress::with_socket(IngressConfig::default(), listen, Arc::clone(&aggregator))
            .await?
            .run();
    let client = loopback_socket().await?;
    let addr = handle.local_addr();

    let session = build_session_packet(
        &HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Session, 100),
        &SessionSpec {
            session_type: 10,
            session_time_left: 3600,
            ..SessionSpec::default()
        },
    );
    let lap = build_lap_data_packet(
        &HeaderSpec::new(PACKET_FORMAT_2025, PacketType::LapData, 100),
        0,
        &LapSpec {
            current_lap_num: 3,
            last_lap_time_ms: 87_543,
            car_position: 1,
            ..LapSpec::default()
        },
    );
    client.send_to(&session, addr).await?;
    client.send_to(&lap, addr).await?;
    client.send_to(&damage_packet(100, 42.0), addr).await?;

    assert!(eventually(|| aggregator.stats().applied == 3).await);
    let snapshot = aggregator.snapshot();
    assert_eq!(snapshot.session_uid, Some(100));
    assert_eq!(snapshot.status, SessionStatus::Active);
    let car = snapshot.player_car().ok_or("no player car")?;
    assert_eq!(car.lap.map(|lap| lap.current_lap_num), Some(3));
    assert!(car.damage.is_some());

    client.send_to(&damage_packet(200, 5.0), addr).await?;
    assert!(eventually(|| aggregator.snapshot().session_uid == Some(200)).await);
    let snapshot = aggregator.snapshot();
    assert!(snapshot.player_car().is_some_and(|car| car.lap.is_none()));
    assert_eq!(aggregator.stats().resets, 1);

    handle.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn sink_receives_derived_sensor_sets() -> TestResult {
    let listen = loopback_socket().await?;
    let aggregator = Arc::new(SessionAggregator::default());
    let (sink, mut batches) = ChannelSink::channel(32);
    let handle = TelemetryIngress::with_socket(IngressConfig::default(), listen, aggregator)
        .await?
        .with_sink(Arc::new(sink))
        .run();

    let client = loopback_socket().await?;
    client.send_to(&damage_packet(8, 42.0), handle.local_addr()).await?;

    let deadline = tokio::time::Instant::now() + WAIT;
    let mut wear = None;
    while wear.is_none() {
        let batch = tokio::time::timeout_at(deadline, batches.recv())
            .await?
            .ok_or("sensor channel closed")?;
        wear = batch
            .iter()
            .find(|set| set.category == Category::Damage)
            .and_then(|set| set.get("tyre_wear_fl"))
            .filter(|value| value.is_available())
            .cloned();
    }
    assert_eq!(wear, Some(SensorValue::Int(42)));

    handle.shutdown().await;
    Ok(())
}

// ─── Startup ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bind_conflict_is_reported() -> TestResult {
    let occupied = loopback_socket().await?;
    let config = IngressConfig {
        bind_address: "127.0.0.1".to_string(),
        port: occupied.local_addr()?.port(),
        ..IngressConfig::default()
    };

    let result = TelemetryIngress::bind(config, Arc::new(SessionAggregator::default())).await;
    match result {
        Err(IngressError::Bind { addr, .. }) => {
            assert_eq!(addr, occupied.local_addr()?);
        }
        Err(other) => return Err(format!("unexpected error: {other}").into()),
        Ok(_) => return Err("bind on an occupied port succeeded".into()),
    }
    Ok(())
}

#[tokio::test]
async fn invalid_forward_address_is_rejected_before_binding() -> TestResult {
    let listen = loopback_socket().await?;
    let config = IngressConfig {
        forward: ForwardConfig {
            enabled: true,
            address: "not-an-ip".to_string(),
            ..ForwardConfig::default()
        },
        ..IngressConfig::default()
    };

    let result =
        TelemetryIngress::with_socket(config, listen, Arc::new(SessionAggregator::default())).await;
    assert!(matches!(
        result,
        Err(IngressError::Config(ConfigError::InvalidAddress { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn receive_buffer_smaller_than_a_packet_is_rejected() -> TestResult {
    let listen = loopback_socket().await?;
    let config = IngressConfig {
        max_datagram_bytes: 64,
        ..IngressConfig::default()
    };
    let result =
        TelemetryIngress::with_socket(config, listen, Arc::new(SessionAggregator::default())).await;
    assert!(matches!(
        result,
        Err(IngressError::Config(ConfigError::InvalidValue {
            field: "max_datagram_bytes",
            ..
        }))
    ));
    Ok(())
}

#[test]
fn config_file_loads_by_extension() -> TestResult {
    let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile()?;
    writeln!(yaml, "port: 20800")?;
    writeln!(yaml, "stale_after_ms: 1500")?;
    writeln!(yaml, "forward:")?;
    writeln!(yaml, "  enabled: true")?;
    writeln!(yaml, "  address: 127.0.0.1")?;
    writeln!(yaml, "  port: 20900")?;
    yaml.flush()?;

    let config = IngressConfig::from_path(yaml.path())?;
    config.validate()?;
    assert_eq!(config.port, 20800);
    assert_eq!(config.stale_after_ms, 1500);
    assert_eq!(
        config.forward_target()?,
        Some(SocketAddr::from(([127, 0, 0, 1], 20900)))
    );

    let mut json = tempfile::Builder::new().suffix(".json").tempfile()?;
    json.write_all(br#"{"publish_rate_hz": 30, "forward": {"queue_depth": 16}}"#)?;
    json.flush()?;
    let config = IngressConfig::from_path(json.path())?;
    assert_eq!(config.publish_rate_hz, 30);
    assert_eq!(config.forward.queue_depth, 16);
    assert_eq!(config.port, 20777);
    Ok(())
}

#[test]
fn malformed_config_file_is_a_parse_error() -> TestResult {
    let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile()?;
    writeln!(yaml, "port: [not, a, port]")?;
    yaml.flush()?;
    assert!(matches!(
        IngressConfig::from_path(yaml.path()),
        Err(ConfigError::Yaml(_))
    ));

    assert!(matches!(
        IngressConfig::from_path("/nonexistent/ingress.json"),
        Err(ConfigError::Read { .. })
    ));
    Ok(())
}
