//! Per-packet-type update rules.

use std::time::Instant;

use f1_telemetry_wire::packets::{
    EventDetails, PacketCarDamage, PacketCarStatus, PacketCarTelemetry, PacketEvent,
    PacketFinalClassification, PacketLapData, PacketParticipants, PacketSession,
    PacketSessionHistory,
};
use f1_telemetry_wire::{CarIndex, DecodedPacket, NUM_CARS, PacketBody, PacketType};
use thiserror::Error;
use tracing::trace;

use crate::staleness::Category;
use crate::state::{FastestLap, SessionState, SessionStatus};

const MARSHAL_FLAG_YELLOW: i8 = 3;
const SAFETY_CAR_FULL: u8 = 1;
const SAFETY_CAR_VIRTUAL: u8 = 2;
const SAFETY_CAR_FORMATION_LAP: u8 = 3;
const SAFETY_CAR_EVENT_DEPLOYED: u8 = 0;
const SAFETY_CAR_EVENT_RETURNED: u8 = 2;
const SAFETY_CAR_EVENT_RESUME_RACE: u8 = 3;
const RETIREMENT_TERMINAL_DAMAGE: u8 = 3;

/// A record that referenced something outside the model. The rest of the
/// packet is still applied; only the offending reference is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApplyAnomaly {
    #[error("{packet_type} packet references car index {index}, outside 0..{NUM_CARS}")]
    CarIndexOutOfRange { packet_type: PacketType, index: u8 },
}

impl ApplyAnomaly {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CarIndexOutOfRange { .. } => "car_index_out_of_range",
        }
    }
}

/// Collects anomalies for one packet.
struct Anomalies<'a> {
    packet_type: PacketType,
    sink: &'a mut Vec<ApplyAnomaly>,
}

impl Anomalies<'_> {
    fn car(&mut self, index: u8) -> Option<CarIndex> {
        let checked = CarIndex::new(index);
        if checked.is_none() {
            self.out_of_range(index);
        }
        checked
    }

    fn out_of_range(&mut self, index: u8) {
        self.sink.push(ApplyAnomaly::CarIndexOutOfRange {
            packet_type: self.packet_type,
            index,
        });
    }
}

impl SessionState {
    /// Folds one packet into this state. The caller has already matched the
    /// session UID.
    pub(crate) fn apply_packet(
        &mut self,
        packet: &DecodedPacket,
        now: Instant,
        anomalies: &mut Vec<ApplyAnomaly>,
    ) {
        let header = &packet.header;
        let mut anomalies = Anomalies {
            packet_type: packet.packet_type(),
            sink: anomalies,
        };

        self.packet_format = Some(header.packet_format);
        self.session_time = header.session_time;
        self.frame_identifier = header.frame_identifier;
        self.resolve_player(header.player_car_index, &mut anomalies);
        self.secondary_player = header.secondary_player_car();

        trace!(
            packet_type = %packet.packet_type(),
            frame = header.frame_identifier,
            "applying packet"
        );

        match &packet.body {
            PacketBody::Session(session) => self.apply_session(session, now),
            PacketBody::LapData(laps) => self.apply_lap_data(laps, now),
            PacketBody::Event(event) => self.apply_event(event, now, &mut anomalies),
            PacketBody::Participants(participants) => {
                self.apply_participants(participants, now);
            }
            PacketBody::CarTelemetry(telemetry) => self.apply_car_telemetry(telemetry, now),
            PacketBody::CarStatus(status) => self.apply_car_status(status, now),
            PacketBody::CarDamage(damage) => self.apply_car_damage(damage, now),
            PacketBody::FinalClassification(classification) => {
                self.apply_final_classification(classification, now);
            }
            PacketBody::SessionHistory(history) => {
                self.apply_session_history(history, now, &mut anomalies);
            }
            PacketBody::Motion(_)
            | PacketBody::CarSetups(_)
            | PacketBody::LobbyInfo(_)
            | PacketBody::TyreSets(_)
            | PacketBody::MotionEx(_)
            | PacketBody::TimeTrial(_)
            | PacketBody::LapPositions(_) => {}
        }
    }

    /// Spectator mode sends 255 in every header; it is reported once until a
    /// valid index returns.
    fn resolve_player(&mut self, index: u8, anomalies: &mut Anomalies<'_>) {
        self.player = CarIndex::new(index);
        if self.player.is_some() {
            self.unresolved_player = None;
        } else if self.unresolved_player != Some(index) {
            self.unresolved_player = Some(index);
            anomalies.out_of_range(index);
        }
    }

    fn apply_session(&mut self, session: &PacketSession, now: Instant) {
        let known_type = session.session_type != 0;
        if known_type && session.session_time_left > 0 {
            if matches!(self.status, SessionStatus::Unknown | SessionStatus::Inactive) {
                self.status = SessionStatus::Active;
            }
        } else if self.status == SessionStatus::Active {
            self.status = SessionStatus::Ended;
        }

        if session.safety_car_status == SAFETY_CAR_FORMATION_LAP {
            if self.status != SessionStatus::Started {
                self.status = SessionStatus::Formation;
            }
        } else if self.status == SessionStatus::Formation {
            self.status = SessionStatus::Active;
        }

        self.track_flags.yellow = session
            .marshal_zones
            .iter()
            .any(|zone| zone.zone_flag == MARSHAL_FLAG_YELLOW);
        self.track_flags.safety_car = session.safety_car_status == SAFETY_CAR_FULL;
        self.track_flags.virtual_safety_car = session.safety_car_status == SAFETY_CAR_VIRTUAL;

        self.session = Some(session.clone());
        self.freshness.touch(Category::Session, now);
        self.freshness.touch(Category::Weather, now);
    }

    fn apply_lap_data(&mut self, laps: &PacketLapData, now: Instant) {
        for (car, lap) in self.cars.iter_mut().zip(laps.cars.iter()) {
            car.lap = Some(*lap);
        }
        self.leader = laps
            .cars
            .indexed()
            .find(|(_, lap)| lap.car_position == 1)
            .map(|(index, _)| index);
        self.freshness.touch(Category::Lap, now);
    }

    fn apply_event(&mut self, event: &PacketEvent, now: Instant, anomalies: &mut Anomalies<'_>) {
        match event.details {
            EventDetails::SessionStarted => {
                self.status = SessionStatus::Started;
                self.track_flags.red = false;
            }
            EventDetails::SessionEnded => self.status = SessionStatus::Ended,
            EventDetails::ChequeredFlag => self.status = SessionStatus::ChequeredFlag,
            EventDetails::StartLights { num_lights } => {
                self.events.start_lights = Some(num_lights);
            }
            EventDetails::LightsOut => {
                self.events.start_lights = Some(0);
                self.track_flags.red = false;
            }
            EventDetails::FastestLap {
                vehicle_idx,
                lap_time,
            } => {
                if let Some(car) = anomalies.car(vehicle_idx) {
                    self.events.fastest_lap = Some(FastestLap { car, lap_time });
                }
            }
            EventDetails::Retirement {
                vehicle_idx,
                reason,
            } => {
                if let Some(car) = anomalies.car(vehicle_idx).and_then(|i| self.cars.car_mut(i)) {
                    car.retired = true;
                    if reason == Some(RETIREMENT_TERMINAL_DAMAGE) {
                        car.terminal_damage = true;
                    }
                }
            }
            EventDetails::RedFlag => self.track_flags.red = true,
            EventDetails::SafetyCar {
                safety_car_type,
                event_type,
            } => self.apply_safety_car_event(safety_car_type, event_type),
            _ => {}
        }
        self.events.last_event = Some(event.code);
        self.freshness.touch(Category::Events, now);
    }

    fn apply_safety_car_event(&mut self, safety_car_type: u8, event_type: u8) {
        let deployed = match event_type {
            SAFETY_CAR_EVENT_DEPLOYED => true,
            SAFETY_CAR_EVENT_RETURNED | SAFETY_CAR_EVENT_RESUME_RACE => false,
            // Returning: still on track.
            _ => return,
        };
        match safety_car_type {
            SAFETY_CAR_FULL => self.track_flags.safety_car = deployed,
            SAFETY_CAR_VIRTUAL => self.track_flags.virtual_safety_car = deployed,
            _ => {}
        }
    }

    fn apply_participants(&mut self, participants: &PacketParticipants, now: Instant) {
        for (car, participant) in self
            .cars
            .iter_mut()
            .zip(participants.participants.iter())
        {
            car.participant = Some(participant.clone());
        }
        self.num_active_cars = Some(participants.num_active_cars);
        self.freshness.touch(Category::Participants, now);
    }

    fn apply_car_telemetry(&mut self, telemetry: &PacketCarTelemetry, now: Instant) {
        for (car, data) in self.cars.iter_mut().zip(telemetry.cars.iter()) {
            car.telemetry = Some(*data);
        }
        self.freshness.touch(Category::Telemetry, now);
    }

    fn apply_car_status(&mut self, status: &PacketCarStatus, now: Instant) {
        for (car, data) in self.cars.iter_mut().zip(status.cars.iter()) {
            car.status = Some(*data);
        }
        self.freshness.touch(Category::Status, now);
    }

    fn apply_car_damage(&mut self, damage: &PacketCarDamage, now: Instant) {
        for (car, data) in self.cars.iter_mut().zip(damage.cars.iter()) {
            car.damage = Some(*data);
        }
        self.freshness.touch(Category::Damage, now);
    }

    fn apply_final_classification(
        &mut self,
        classification: &PacketFinalClassification,
        now: Instant,
    ) {
        let classified = usize::from(classification.num_cars);
        for (car, data) in self
            .cars
            .iter_mut()
            .zip(classification.cars.iter())
            .take(classified)
        {
            car.classification = Some(*data);
        }
        self.status = SessionStatus::Ended;
        self.freshness.touch(Category::Session, now);
    }

    fn apply_session_history(
        &mut self,
        history: &PacketSessionHistory,
        now: Instant,
        anomalies: &mut Anomalies<'_>,
    ) {
        let Some(car) = anomalies
            .car(history.car_idx)
            .and_then(|index| self.cars.car_mut(index))
        else {
            return;
        };
        car.best_lap_time_ms = history.best_lap_time_ms();
        self.freshness.touch(Category::Lap, now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use f1_telemetry_wire::builder::{HeaderSpec, build_event_packet, zeroed_packet};
    use f1_telemetry_wire::packets::{LapHistoryData, MarshalZone};
    use f1_telemetry_wire::{PACKET_FORMAT_2024, PACKET_FORMAT_2025, decode_datagram};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn decode(spec: &HeaderSpec) -> Result<DecodedPacket, Box<dyn std::error::Error>> {
        Ok(decode_datagram(&zeroed_packet(spec))?)
    }

    fn apply(state: &mut SessionState, packet: &DecodedPacket) -> Vec<ApplyAnomaly> {
        let mut anomalies = Vec::new();
        state.apply_packet(packet, Instant::now(), &mut anomalies);
        anomalies
    }

    fn session_packet(
        session_type: u8,
        time_left: u16,
        safety_car_status: u8,
    ) -> Result<DecodedPacket, Box<dyn std::error::Error>> {
        let mut packet = decode(&HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Session, 1))?;
        if let PacketBody::Session(session) = &mut packet.body {
            session.session_type = session_type;
            session.session_time_left = time_left;
            session.safety_car_status = safety_car_status;
        }
        Ok(packet)
    }

    #[test]
    fn test_session_status_transitions() -> TestResult {
        let mut state = SessionState::new(1);
        apply(&mut state, &session_packet(10, 3600, 0)?);
        assert_eq!(state.status, SessionStatus::Active);

        apply(&mut state, &session_packet(10, 0, 0)?);
        assert_eq!(state.status, SessionStatus::Ended);

        // Ended is sticky until an event moves it on.
        apply(&mut state, &session_packet(10, 3600, 0)?);
        assert_eq!(state.status, SessionStatus::Ended);
        Ok(())
    }

    #[test]
    fn test_formation_lap_unless_started() -> TestResult {
        let mut state = SessionState::new(1);
        apply(&mut state, &session_packet(10, 3600, 3)?);
        assert_eq!(state.status, SessionStatus::Formation);
        apply(&mut state, &session_packet(10, 3600, 0)?);
        assert_eq!(state.status, SessionStatus::Active);

        let header = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Event, 1);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"SSTA", &[]))?);
        apply(&mut state, &session_packet(10, 3600, 3)?);
        assert_eq!(state.status, SessionStatus::Started);
        Ok(())
    }

    #[test]
    fn test_marshal_zone_yellow_and_safety_car() -> TestResult {
        let mut state = SessionState::new(1);
        let mut packet = session_packet(10, 100, 2)?;
        if let PacketBody::Session(session) = &mut packet.body {
            session.marshal_zones = vec![
                MarshalZone {
                    zone_start: 0.1,
                    zone_flag: 1,
                },
                MarshalZone {
                    zone_start: 0.4,
                    zone_flag: MARSHAL_FLAG_YELLOW,
                },
            ];
        }
        apply(&mut state, &packet);
        assert!(state.track_flags.yellow);
        assert!(state.track_flags.virtual_safety_car);
        assert!(!state.track_flags.safety_car);
        assert!(!state.is_stale(Category::Session));
        assert!(!state.is_stale(Category::Weather));
        Ok(())
    }

    #[test]
    fn test_red_flag_cleared_by_lights_out() -> TestResult {
        let mut state = SessionState::new(1);
        let header = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Event, 1);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"RDFL", &[]))?);
        assert!(state.track_flags.red);
        assert_eq!(
            state.events.last_event.map(|c| c.to_string()),
            Some("RDFL".to_string())
        );

        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"STLG", &[4]))?);
        assert_eq!(state.events.start_lights, Some(4));
        assert!(state.track_flags.red);

        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"LGOT", &[]))?);
        assert_eq!(state.events.start_lights, Some(0));
        assert!(!state.track_flags.red);
        Ok(())
    }

    #[test]
    fn test_safety_car_event_deploys_and_returns() -> TestResult {
        let mut state = SessionState::new(1);
        let header = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Event, 1);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"SCAR", &[1, 0]))?);
        assert!(state.track_flags.safety_car);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"SCAR", &[1, 1]))?);
        assert!(state.track_flags.safety_car);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"SCAR", &[1, 2]))?);
        assert!(!state.track_flags.safety_car);
        Ok(())
    }

    #[test]
    fn test_retirement_reason_marks_terminal_damage() -> TestResult {
        let mut state = SessionState::new(1);
        let header = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Event, 1);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"RTMT", &[5, 3]))?);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"RTMT", &[6, 1]))?);

        let terminal = state.cars.get(5).ok_or("car 5")?;
        assert!(terminal.retired && terminal.terminal_damage);
        let other = state.cars.get(6).ok_or("car 6")?;
        assert!(other.retired && !other.terminal_damage);

        // 2024 retirements carry no reason.
        let header = HeaderSpec::new(PACKET_FORMAT_2024, PacketType::Event, 1);
        apply(&mut state, &decode_datagram(&build_event_packet(&header, b"RTMT", &[7, 3]))?);
        let old_format = state.cars.get(7).ok_or("car 7")?;
        assert!(old_format.retired && !old_format.terminal_damage);
        Ok(())
    }

    #[test]
    fn test_out_of_range_event_car_is_an_anomaly() -> TestResult {
        let mut state = SessionState::new(1);
        let header = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Event, 1);
        let mut lap_time = vec![40];
        lap_time.extend_from_slice(&80.5f32.to_le_bytes());
        let anomalies = apply(
            &mut state,
            &decode_datagram(&build_event_packet(&header, b"FTLP", &lap_time))?,
        );
        assert_eq!(
            anomalies,
            vec![ApplyAnomaly::CarIndexOutOfRange {
                packet_type: PacketType::Event,
                index: 40
            }]
        );
        assert!(state.events.fastest_lap.is_none());
        assert!(!state.is_stale(Category::Events));
        Ok(())
    }

    #[test]
    fn test_spectator_player_index_is_unset() -> TestResult {
        let mut state = SessionState::new(1);
        let spec = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Motion, 1).with_player(255);
        let anomalies = apply(&mut state, &decode(&spec)?);
        assert!(state.player.is_none());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies.first().map(ApplyAnomaly::kind), Some("car_index_out_of_range"));

        for packet_type in [PacketType::Motion, PacketType::CarTelemetry, PacketType::LapData] {
            let spec = spec.with_type(packet_type);
            assert_eq!(apply(&mut state, &decode(&spec)?), Vec::new());
        }
        Ok(())
    }

    #[test]
    fn test_spectator_reported_again_after_valid_player() -> TestResult {
        let mut state = SessionState::new(1);
        let spectator = HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Motion, 1).with_player(255);
        assert_eq!(apply(&mut state, &decode(&spectator)?).len(), 1);
        let driving = spectator.with_player(4);
        assert!(apply(&mut state, &decode(&driving)?).is_empty());
        assert_eq!(state.player.map(CarIndex::get), Some(4));
        assert_eq!(apply(&mut state, &decode(&spectator)?).len(), 1);
        Ok(())
    }

    #[test]
    fn test_session_history_sets_best_lap() -> TestResult {
        let mut state = SessionState::new(1);
        let mut packet = decode(&HeaderSpec::new(
            PACKET_FORMAT_2025,
            PacketType::SessionHistory,
            1,
        ))?;
        if let PacketBody::SessionHistory(history) = &mut packet.body {
            history.car_idx = 2;
            history.num_laps = 2;
            history.best_lap_time_lap_num = 2;
            history.laps = vec![
                LapHistoryData {
                    lap_time_ms: 91_000,
                    ..LapHistoryData::default()
                },
                LapHistoryData {
                    lap_time_ms: 89_250,
                    ..LapHistoryData::default()
                },
            ];
        }
        assert!(apply(&mut state, &packet).is_empty());
        assert_eq!(state.cars.get(2).and_then(|c| c.best_lap_time_ms), Some(89_250));
        assert!(!state.is_stale(Category::Lap));

        if let PacketBody::SessionHistory(history) = &mut packet.body {
            history.car_idx = 22;
        }
        assert_eq!(apply(&mut state, &packet).len(), 1);
        Ok(())
    }

    #[test]
    fn test_final_classification_ends_session() -> TestResult {
        let mut state = SessionState::new(1);
        state.status = SessionStatus::ChequeredFlag;
        let mut packet = decode(&HeaderSpec::new(
            PACKET_FORMAT_2025,
            PacketType::FinalClassification,
            1,
        ))?;
        if let PacketBody::FinalClassification(classification) = &mut packet.body {
            classification.num_cars = 2;
            if let Some(first) = classification.cars.get_mut(1) {
                first.position = 1;
            }
        }
        apply(&mut state, &packet);
        assert_eq!(state.status, SessionStatus::Ended);
        assert_eq!(
            state.cars.get(1).and_then(|c| c.classification).map(|c| c.position),
            Some(1)
        );
        assert!(state.cars.get(2).and_then(|c| c.classification).is_none());
        Ok(())
    }

    #[test]
    fn test_motion_touches_no_category() -> TestResult {
        let mut state = SessionState::new(1);
        apply(&mut state, &decode(&HeaderSpec::new(PACKET_FORMAT_2025, PacketType::Motion, 1))?);
        assert_eq!(state.freshness.stale_categories().count(), Category::ALL.len());
        assert_eq!(state.packet_format, Some(PACKET_FORMAT_2025));
        Ok(())
    }
}
