//! Lap data packet (id 2).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const LAP_DATA_ENTRY_SIZE: usize = 57;
pub const LAP_DATA_BODY_SIZE: usize = NUM_CARS * LAP_DATA_ENTRY_SIZE + 2;

/// Byte offsets inside one lap-data entry.
pub mod offsets {
    pub const LAST_LAP_TIME_MS: usize = 0;
    pub const CURRENT_LAP_TIME_MS: usize = 4;
    pub const LAP_DISTANCE: usize = 20;
    pub const CAR_POSITION: usize = 32;
    pub const CURRENT_LAP_NUM: usize = 33;
    pub const PIT_STATUS: usize = 34;
    pub const NUM_PIT_STOPS: usize = 35;
    pub const SECTOR: usize = 36;
    pub const CURRENT_LAP_INVALID: usize = 37;
    pub const PENALTIES: usize = 38;
    pub const GRID_POSITION: usize = 43;
    pub const DRIVER_STATUS: usize = 44;
    pub const RESULT_STATUS: usize = 45;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LapData {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub sector1_time_ms_part: u16,
    pub sector1_time_minutes_part: u8,
    pub sector2_time_ms_part: u16,
    pub sector2_time_minutes_part: u8,
    pub delta_to_car_in_front_ms_part: u16,
    pub delta_to_car_in_front_minutes_part: u8,
    pub delta_to_race_leader_ms_part: u16,
    pub delta_to_race_leader_minutes_part: u8,
    /// Metres around the current lap; negative before the line is crossed.
    pub lap_distance: f32,
    pub total_distance: f32,
    pub safety_car_delta: f32,
    pub car_position: u8,
    pub current_lap_num: u8,
    /// 0 none, 1 pitting, 2 in pit area.
    pub pit_status: u8,
    pub num_pit_stops: u8,
    /// 0-based sector index.
    pub sector: u8,
    pub current_lap_invalid: u8,
    /// Accumulated time penalties in seconds.
    pub penalties: u8,
    pub total_warnings: u8,
    pub corner_cutting_warnings: u8,
    pub num_unserved_drive_through_pens: u8,
    pub num_unserved_stop_go_pens: u8,
    pub grid_position: u8,
    pub driver_status: u8,
    pub result_status: u8,
    pub pit_lane_timer_active: u8,
    pub pit_lane_time_in_lane_ms: u16,
    pub pit_stop_timer_ms: u16,
    pub pit_stop_should_serve_pen: u8,
    pub speed_trap_fastest_speed: f32,
    pub speed_trap_fastest_lap: u8,
}

fn split_time_ms(minutes: u8, ms: u16) -> u32 {
    u32::from(minutes) * 60_000 + u32::from(ms)
}

impl LapData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            last_lap_time_ms: r.u32_le()?,
            current_lap_time_ms: r.u32_le()?,
            sector1_time_ms_part: r.u16_le()?,
            sector1_time_minutes_part: r.u8()?,
            sector2_time_ms_part: r.u16_le()?,
            sector2_time_minutes_part: r.u8()?,
            delta_to_car_in_front_ms_part: r.u16_le()?,
            delta_to_car_in_front_minutes_part: r.u8()?,
            delta_to_race_leader_ms_part: r.u16_le()?,
            delta_to_race_leader_minutes_part: r.u8()?,
            lap_distance: r.f32_le()?,
            total_distance: r.f32_le()?,
            safety_car_delta: r.f32_le()?,
            car_position: r.u8()?,
            current_lap_num: r.u8()?,
            pit_status: r.u8()?,
            num_pit_stops: r.u8()?,
            sector: r.u8()?,
            current_lap_invalid: r.u8()?,
            penalties: r.u8()?,
            total_warnings: r.u8()?,
            corner_cutting_warnings: r.u8()?,
            num_unserved_drive_through_pens: r.u8()?,
            num_unserved_stop_go_pens: r.u8()?,
            grid_position: r.u8()?,
            driver_status: r.u8()?,
            result_status: r.u8()?,
            pit_lane_timer_active: r.u8()?,
            pit_lane_time_in_lane_ms: r.u16_le()?,
            pit_stop_timer_ms: r.u16_le()?,
            pit_stop_should_serve_pen: r.u8()?,
            speed_trap_fastest_speed: r.f32_le()?,
            speed_trap_fastest_lap: r.u8()?,
        })
    }

    pub fn sector1_time_ms(&self) -> u32 {
        split_time_ms(self.sector1_time_minutes_part, self.sector1_time_ms_part)
    }

    pub fn sector2_time_ms(&self) -> u32 {
        split_time_ms(self.sector2_time_minutes_part, self.sector2_time_ms_part)
    }

    pub fn delta_to_car_in_front_ms(&self) -> u32 {
        split_time_ms(
            self.delta_to_car_in_front_minutes_part,
            self.delta_to_car_in_front_ms_part,
        )
    }

    pub fn delta_to_race_leader_ms(&self) -> u32 {
        split_time_ms(
            self.delta_to_race_leader_minutes_part,
            self.delta_to_race_leader_ms_part,
        )
    }

    pub fn is_current_lap_invalid(&self) -> bool {
        self.current_lap_invalid != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketLapData {
    pub cars: CarArray<LapData>,
    /// 255 when there is no personal-best car.
    pub time_trial_pb_car_idx: u8,
    pub time_trial_rival_car_idx: u8,
}

impl PacketLapData {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            cars: CarArray::decode_with(r, LapData::decode)?,
            time_trial_pb_car_idx: r.u8()?,
            time_trial_rival_car_idx: r.u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::put;
    use crate::{PACKET_FORMAT_2024, PACKET_FORMAT_2025};

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_decode_entry_fields() -> TestResult {
        let mut body = vec![0u8; LAP_DATA_BODY_SIZE];
        let base = 5 * LAP_DATA_ENTRY_SIZE;
        put(&mut body, base, &87_543u32.to_le_bytes());
        put(&mut body, base + offsets::CURRENT_LAP_TIME_MS, &12_000u32.to_le_bytes());
        put(&mut body, base + 8, &29_500u16.to_le_bytes());
        put(&mut body, base + 10, &[1]);
        put(&mut body, base + offsets::CAR_POSITION, &[1]);
        put(&mut body, base + offsets::CURRENT_LAP_NUM, &[3]);
        put(&mut body, base + offsets::SECTOR, &[2]);
        put(&mut body, base + offsets::CURRENT_LAP_INVALID, &[1]);
        put(&mut body, base + 52, &331.5f32.to_le_bytes());
        put(&mut body, base + 56, &[2]);
        put(&mut body, NUM_CARS * LAP_DATA_ENTRY_SIZE, &[255, 7]);

        for format in [PACKET_FORMAT_2024, PACKET_FORMAT_2025] {
            let mut r = ByteReader::new(&body);
            let packet = PacketLapData::decode(&mut r, format)?;
            assert_eq!(r.remaining(), 0);
            let lap = packet.cars.get(5).ok_or("car 5")?;
            assert_eq!(lap.last_lap_time_ms, 87_543);
            assert_eq!(lap.current_lap_time_ms, 12_000);
            assert_eq!(lap.sector1_time_ms(), 89_500);
            assert_eq!(lap.car_position, 1);
            assert_eq!(lap.current_lap_num, 3);
            assert_eq!(lap.sector, 2);
            assert!(lap.is_current_lap_invalid());
            assert!((lap.speed_trap_fastest_speed - 331.5).abs() < f32::EPSILON);
            assert_eq!(lap.speed_trap_fastest_lap, 2);
            assert_eq!(packet.time_trial_pb_car_idx, 255);
            assert_eq!(packet.time_trial_rival_car_idx, 7);
        }
        Ok(())
    }

    #[test]
    fn test_missing_trailer_is_truncated() {
        let body = vec![0u8; LAP_DATA_BODY_SIZE - 1];
        let mut r = ByteReader::new(&body);
        assert!(matches!(
            PacketLapData::decode(&mut r, PACKET_FORMAT_2025),
            Err(DecodeError::TruncatedPacket { .. })
        ));
    }
}
