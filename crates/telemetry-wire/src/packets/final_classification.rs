//! Final classification packet (id 8), sent once at the end of a session.

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const MAX_TYRE_STINTS: usize = 8;

pub(crate) fn entry_size(format: PacketFormat) -> usize {
    match format {
        PacketFormat::F2024 => 45,
        PacketFormat::F2025 => 46,
    }
}

pub fn final_classification_body_size(format: PacketFormat) -> usize {
    1 + NUM_CARS * entry_size(format)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinalClassificationData {
    pub position: u8,
    pub num_laps: u8,
    pub grid_position: u8,
    pub points: u8,
    pub num_pit_stops: u8,
    pub result_status: u8,
    /// 2025 format only.
    pub result_reason: Option<u8>,
    pub best_lap_time_ms: u32,
    /// Seconds, without penalties.
    pub total_race_time: f64,
    /// Seconds.
    pub penalties_time: u8,
    pub num_penalties: u8,
    pub num_tyre_stints: u8,
    pub tyre_stints_actual: [u8; MAX_TYRE_STINTS],
    pub tyre_stints_visual: [u8; MAX_TYRE_STINTS],
    pub tyre_stints_end_laps: [u8; MAX_TYRE_STINTS],
}

impl FinalClassificationData {
    fn decode(r: &mut ByteReader<'_>, format: PacketFormat) -> Result<Self, DecodeError> {
        let position = r.u8()?;
        let num_laps = r.u8()?;
        let grid_position = r.u8()?;
        let points = r.u8()?;
        let num_pit_stops = r.u8()?;
        let result_status = r.u8()?;
        let result_reason = match format {
            PacketFormat::F2024 => None,
            PacketFormat::F2025 => Some(r.u8()?),
        };
        let best_lap_time_ms = r.u32_le()?;
        let total_race_time = r.f64_le()?;
        let penalties_time = r.u8()?;
        let num_penalties = r.u8()?;
        let num_tyre_stints = r.u8()?;
        DecodeError::check_count("numTyreStints", num_tyre_stints, MAX_TYRE_STINTS)?;

        Ok(Self {
            position,
            num_laps,
            grid_position,
            points,
            num_pit_stops,
            result_status,
            result_reason,
            best_lap_time_ms,
            total_race_time,
            penalties_time,
            num_penalties,
            num_tyre_stints,
            tyre_stints_actual: r.u8_array()?,
            tyre_stints_visual: r.u8_array()?,
            tyre_stints_end_laps: r.u8_array()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketFinalClassification {
    pub num_cars: u8,
    pub cars: CarArray<FinalClassificationData>,
}

impl PacketFinalClassification {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let format = PacketFormat::from_raw(format)?;
        let num_cars = r.u8()?;
        DecodeError::check_count("numCars", num_cars, NUM_CARS)?;
        Ok(Self {
            num_cars,
            cars: CarArray::decode_with(r, |r| FinalClassificationData::decode(r, format))?,
        })
    }
}
