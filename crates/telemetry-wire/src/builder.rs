//! Packet builders for tests, fuzz seeds and replay tooling.
//!
//! Builders zero-fill every byte they are not told about, so a built packet is
//! always exactly the size the game would send for its type and format.

use crate::packets::{body_size, car_damage, car_status, car_telemetry, lap_data, participants, session};
use crate::{HEADER_SIZE, NUM_CARS, PacketFormat, PacketType, SECONDARY_PLAYER_ABSENT};

/// Little-endian byte writer.
#[derive(Debug, Clone, Default)]
pub struct PacketWriter {
    buf: Vec<u8>,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn zeros(&mut self, len: usize) -> &mut Self {
        self.buf.resize(self.buf.len().saturating_add(len), 0);
        self
    }

    /// Write `text` NUL-padded (and truncated) to exactly `len` bytes.
    pub fn fixed_string(&mut self, text: &str, len: usize) -> &mut Self {
        let mut field = text.as_bytes().to_vec();
        field.resize(len, 0);
        self.bytes(&field)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Overwrite `bytes` at `offset`; writes that would run past the end are dropped.
pub fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
    let end = offset.saturating_add(bytes.len());
    if let Some(target) = buf.get_mut(offset..end) {
        target.copy_from_slice(bytes);
    }
}

/// Header fields for a built packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderSpec {
    pub packet_format: u16,
    pub packet_type: PacketType,
    pub session_uid: u64,
    pub session_time: f32,
    pub frame_identifier: u32,
    pub player_car_index: u8,
    pub secondary_player_car_index: u8,
}

impl HeaderSpec {
    pub fn new(packet_format: u16, packet_type: PacketType, session_uid: u64) -> Self {
        Self {
            packet_format,
            packet_type,
            session_uid,
            session_time: 0.0,
            frame_identifier: 0,
            player_car_index: 0,
            secondary_player_car_index: SECONDARY_PLAYER_ABSENT,
        }
    }

    pub fn with_player(mut self, player_car_index: u8) -> Self {
        self.player_car_index = player_car_index;
        self
    }

    pub fn with_type(mut self, packet_type: PacketType) -> Self {
        self.packet_type = packet_type;
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let game_year = u8::try_from(self.packet_format % 100).unwrap_or(0);
        let mut w = PacketWriter::new();
        w.u16(self.packet_format)
            .u8(game_year)
            .u8(1)
            .u8(0)
            .u8(1)
            .u8(self.packet_type.id())
            .u64(self.session_uid)
            .f32(self.session_time)
            .u32(self.frame_identifier)
            .u32(self.frame_identifier)
            .u8(self.player_car_index)
            .u8(self.secondary_player_car_index);
        w.into_bytes()
    }
}

/// Header followed by an all-zero body of the right size.
///
/// For a format this crate does not know, or a type the format lacks, only the
/// header is produced.
pub fn zeroed_packet(header: &HeaderSpec) -> Vec<u8> {
    let mut buf = header.encode();
    let body = PacketFormat::from_raw(header.packet_format)
        .ok()
        .and_then(|format| body_size(header.packet_type, format))
        .unwrap_or(0);
    buf.resize(HEADER_SIZE.saturating_add(body), 0);
    buf
}

fn packet_of(header: &HeaderSpec, packet_type: PacketType) -> Vec<u8> {
    zeroed_packet(&header.with_type(packet_type))
}

fn format_of(header: &HeaderSpec) -> PacketFormat {
    PacketFormat::from_raw(header.packet_format).unwrap_or(PacketFormat::F2025)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForecastSpec {
    pub session_type: u8,
    pub time_offset: u8,
    pub weather: u8,
    pub rain_percentage: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSpec {
    pub weather: u8,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    pub session_type: u8,
    pub track_id: i8,
    pub session_time_left: u16,
    pub safety_car_status: u8,
    pub marshal_zone_flags: Vec<i8>,
    pub forecast: Vec<ForecastSpec>,
}

pub fn build_session_packet(header: &HeaderSpec, spec: &SessionSpec) -> Vec<u8> {
    use session::offsets as o;
    let mut buf = packet_of(header, PacketType::Session);
    let at = |offset: usize| HEADER_SIZE + offset;
    put(&mut buf, at(o::WEATHER), &[spec.weather]);
    put(&mut buf, at(o::TRACK_TEMPERATURE), &spec.track_temperature.to_le_bytes());
    put(&mut buf, at(o::AIR_TEMPERATURE), &spec.air_temperature.to_le_bytes());
    put(&mut buf, at(o::TOTAL_LAPS), &[spec.total_laps]);
    put(&mut buf, at(o::SESSION_TYPE), &[spec.session_type]);
    put(&mut buf, at(o::TRACK_ID), &spec.track_id.to_le_bytes());
    put(&mut buf, at(o::SESSION_TIME_LEFT), &spec.session_time_left.to_le_bytes());
    put(&mut buf, at(o::SAFETY_CAR_STATUS), &[spec.safety_car_status]);

    let zones = spec.marshal_zone_flags.len().min(session::MAX_MARSHAL_ZONES);
    put(&mut buf, at(o::NUM_MARSHAL_ZONES), &[u8::try_from(zones).unwrap_or(0)]);
    for (i, flag) in spec.marshal_zone_flags.iter().take(zones).enumerate() {
        let zone = at(o::MARSHAL_ZONES + i * session::MARSHAL_ZONE_SIZE);
        put(&mut buf, zone + 4, &flag.to_le_bytes());
    }

    let samples = spec.forecast.len().min(session::MAX_WEATHER_FORECAST_SAMPLES);
    put(
        &mut buf,
        at(o::NUM_WEATHER_FORECAST_SAMPLES),
        &[u8::try_from(samples).unwrap_or(0)],
    );
    for (i, sample) in spec.forecast.iter().take(samples).enumerate() {
        let offset = at(o::WEATHER_FORECAST_SAMPLES + i * session::WEATHER_FORECAST_SAMPLE_SIZE);
        put(&mut buf, offset, &[sample.session_type, sample.time_offset, sample.weather]);
        put(&mut buf, offset + 7, &[sample.rain_percentage]);
    }
    buf
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LapSpec {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub car_position: u8,
    pub current_lap_num: u8,
    pub pit_status: u8,
    pub sector: u8,
    pub current_lap_invalid: bool,
    pub penalties: u8,
}

/// Lap data with one car populated; `car` values past the last slot are ignored.
pub fn build_lap_data_packet(header: &HeaderSpec, car: usize, spec: &LapSpec) -> Vec<u8> {
    build_lap_data_packet_for(header, &[(car, *spec)])
}

pub fn build_lap_data_packet_for(header: &HeaderSpec, cars: &[(usize, LapSpec)]) -> Vec<u8> {
    use lap_data::offsets as o;
    let mut buf = packet_of(header, PacketType::LapData);
    for (car, spec) in cars.iter().filter(|(car, _)| *car < NUM_CARS) {
        let base = HEADER_SIZE + car * lap_data::LAP_DATA_ENTRY_SIZE;
        put(&mut buf, base + o::LAST_LAP_TIME_MS, &spec.last_lap_time_ms.to_le_bytes());
        put(&mut buf, base + o::CURRENT_LAP_TIME_MS, &spec.current_lap_time_ms.to_le_bytes());
        put(&mut buf, base + o::CAR_POSITION, &[spec.car_position]);
        put(&mut buf, base + o::CURRENT_LAP_NUM, &[spec.current_lap_num]);
        put(&mut buf, base + o::PIT_STATUS, &[spec.pit_status]);
        put(&mut buf, base + o::SECTOR, &[spec.sector]);
        put(&mut buf, base + o::CURRENT_LAP_INVALID, &[u8::from(spec.current_lap_invalid)]);
        put(&mut buf, base + o::PENALTIES, &[spec.penalties]);
    }
    buf
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageSpec {
    pub tyres_wear: [f32; 4],
    pub front_left_wing: u8,
    pub front_right_wing: u8,
    pub rear_wing: u8,
    pub floor: u8,
}

pub fn build_car_damage_packet(header: &HeaderSpec, car: usize, spec: &DamageSpec) -> Vec<u8> {
    let format = format_of(header);
    let mut buf = packet_of(header, PacketType::CarDamage);
    if car >= NUM_CARS {
        return buf;
    }
    let base = HEADER_SIZE + car * car_damage::entry_size(format);
    for (i, wear) in spec.tyres_wear.iter().enumerate() {
        put(&mut buf, base + i * 4, &wear.to_le_bytes());
    }
    put(
        &mut buf,
        base + car_damage::wing_offset(format),
        &[spec.front_left_wing, spec.front_right_wing, spec.rear_wing, spec.floor],
    );
    buf
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetrySpec {
    pub speed: u16,
    pub throttle: f32,
    pub brake: f32,
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: bool,
    pub tyres_surface_temperature: [u8; 4],
}

pub fn build_car_telemetry_packet(
    header: &HeaderSpec,
    car: usize,
    spec: &TelemetrySpec,
) -> Vec<u8> {
    use car_telemetry::offsets as o;
    let mut buf = packet_of(header, PacketType::CarTelemetry);
    if car >= NUM_CARS {
        return buf;
    }
    let base = HEADER_SIZE + car * car_telemetry::CAR_TELEMETRY_ENTRY_SIZE;
    put(&mut buf, base + o::SPEED, &spec.speed.to_le_bytes());
    put(&mut buf, base + o::THROTTLE, &spec.throttle.to_le_bytes());
    put(&mut buf, base + o::BRAKE, &spec.brake.to_le_bytes());
    put(&mut buf, base + o::GEAR, &spec.gear.to_le_bytes());
    put(&mut buf, base + o::ENGINE_RPM, &spec.engine_rpm.to_le_bytes());
    put(&mut buf, base + o::DRS, &[u8::from(spec.drs)]);
    put(&mut buf, base + o::TYRES_SURFACE_TEMPERATURE, &spec.tyres_surface_temperature);
    buf
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusSpec {
    pub fuel_remaining_laps: f32,
    pub drs_allowed: bool,
    pub visual_tyre_compound: u8,
    pub tyres_age_laps: u8,
    pub vehicle_fia_flags: i8,
    pub ers_store_energy: f32,
    pub ers_deploy_mode: u8,
}

pub fn build_car_status_packet(header: &HeaderSpec, car: usize, spec: &StatusSpec) -> Vec<u8> {
    use car_status::offsets as o;
    let mut buf = packet_of(header, PacketType::CarStatus);
    if car >= NUM_CARS {
        return buf;
    }
    let base = HEADER_SIZE + car * car_status::CAR_STATUS_ENTRY_SIZE;
    put(&mut buf, base + o::FUEL_REMAINING_LAPS, &spec.fuel_remaining_laps.to_le_bytes());
    put(&mut buf, base + o::DRS_ALLOWED, &[u8::from(spec.drs_allowed)]);
    put(&mut buf, base + o::VISUAL_TYRE_COMPOUND, &[spec.visual_tyre_compound]);
    put(&mut buf, base + o::TYRES_AGE_LAPS, &[spec.tyres_age_laps]);
    put(&mut buf, base + o::VEHICLE_FIA_FLAGS, &spec.vehicle_fia_flags.to_le_bytes());
    put(&mut buf, base + o::ERS_STORE_ENERGY, &spec.ers_store_energy.to_le_bytes());
    put(&mut buf, base + o::ERS_DEPLOY_MODE, &[spec.ers_deploy_mode]);
    buf
}

/// Event packet with `code` and up to 12 detail bytes.
pub fn build_event_packet(header: &HeaderSpec, code: &[u8; 4], details: &[u8]) -> Vec<u8> {
    let mut buf = packet_of(header, PacketType::Event);
    put(&mut buf, HEADER_SIZE, code);
    let details = details.get(..details.len().min(12)).unwrap_or_default();
    put(&mut buf, HEADER_SIZE + 4, details);
    buf
}

/// Participants packet naming the first `names.len()` cars, all human-driven.
pub fn build_participants_packet(header: &HeaderSpec, names: &[&str]) -> Vec<u8> {
    let format = format_of(header);
    let layout = participants::ParticipantLayout::for_format(format);
    let mut buf = packet_of(header, PacketType::Participants);
    let active = names.len().min(NUM_CARS);
    put(&mut buf, HEADER_SIZE, &[u8::try_from(active).unwrap_or(0)]);
    for (car, name) in names.iter().take(active).enumerate() {
        let base = HEADER_SIZE + 1 + car * layout.entry_size();
        let mut field = name.as_bytes().to_vec();
        field.resize(layout.name_len, 0);
        put(&mut buf, base + participants::ParticipantLayout::NAME_OFFSET, &field);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PACKET_FORMAT_2024, PACKET_FORMAT_2025, PacketBody, decode_datagram};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_zeroed_packets_decode_for_every_type() -> TestResult {
        for packet_type in PacketType::ALL {
            let header = HeaderSpec::new(PACKET_FORMAT_2025, packet_type, 1);
            let decoded = decode_datagram(&zeroed_packet(&header))?;
            assert_eq!(decoded.packet_type(), packet_type);
        }
        Ok(())
    }

    #[test]
    fn test_damage_builder_respects_format() -> TestResult {
        for format in [PACKET_FORMAT_2024, PACKET_FORMAT_2025] {
            let header = HeaderSpec::new(format, PacketType::CarDamage, 9);
            let raw = build_car_damage_packet(
                &header,
                3,
                &DamageSpec {
                    tyres_wear: [1.0, 2.0, 42.0, 3.0],
                    front_left_wing: 12,
                    floor: 4,
                    ..DamageSpec::default()
                },
            );
            let decoded = decode_datagram(&raw)?;
            let PacketBody::CarDamage(damage) = decoded.body else {
                return Err("expected damage".into());
            };
            let car = damage.cars.get(3).ok_or("car 3")?;
            assert_eq!(car.tyres_wear, [1.0, 2.0, 42.0, 3.0]);
            assert_eq!(car.front_left_wing_damage, 12);
            assert_eq!(car.floor_damage, 4);
        }
        Ok(())
    }

    #[test]
    fn test_participants_builder() -> TestResult {
        let header = HeaderSpec::new(PACKET_FORMAT_2024, PacketType::Participants, 1);
        let decoded = decode_datagram(&build_participants_packet(&header, &["VER", "NOR"]))?;
        let PacketBody::Participants(p) = decoded.body else {
            return Err("expected participants".into());
        };
        assert_eq!(p.num_active_cars, 2);
        assert_eq!(p.participants.get(1).map(|d| d.name.as_str()), Some("NOR"));
        Ok(())
    }

    #[test]
    fn test_put_out_of_range_is_ignored() {
        let mut buf = vec![0u8; 4];
        put(&mut buf, 3, &[1, 2]);
        assert_eq!(buf, vec![0, 0, 0, 0]);
        put(&mut buf, 2, &[1, 2]);
        assert_eq!(buf, vec![0, 0, 1, 2]);
    }
}
