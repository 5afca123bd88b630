//! Lap positions packet (id 15): race position of every car at the start of
//! each lap. Introduced with the 2025 format.

use crate::{ByteReader, DecodeError, NUM_CARS, PacketFormat};

pub const MAX_LAPS_IN_LAP_POSITIONS: usize = 50;
pub const LAP_POSITIONS_BODY_SIZE: usize = 2 + MAX_LAPS_IN_LAP_POSITIONS * NUM_CARS;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketLapPositions {
    pub num_laps: u8,
    /// Lap number of the first row; packets page through long races.
    pub lap_start: u8,
    /// One row per lap; 0 marks a car slot with no position.
    pub positions: Vec<[u8; NUM_CARS]>,
}

impl PacketLapPositions {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        match PacketFormat::from_raw(format)? {
            PacketFormat::F2024 => return Err(DecodeError::UnsupportedFormatVersion(format)),
            PacketFormat::F2025 => {}
        }
        let num_laps = r.u8()?;
        let lap_count =
            DecodeError::check_count("numLaps", num_laps, MAX_LAPS_IN_LAP_POSITIONS)?;
        let lap_start = r.u8()?;
        let mut positions = Vec::with_capacity(lap_count);
        for slot in 0..MAX_LAPS_IN_LAP_POSITIONS {
            let row: [u8; NUM_CARS] = r.u8_array()?;
            if slot < lap_count {
                positions.push(row);
            }
        }
        Ok(Self {
            num_laps,
            lap_start,
            positions,
        })
    }
}
