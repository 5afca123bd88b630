//! Session history packet (id 11): per-lap times and stints for one car.
//!
//! The game cycles through the cars, sending one of these per car every few
//! frames.

use crate::{ByteReader, DecodeError, PacketFormat};

pub const MAX_LAPS_IN_HISTORY: usize = 100;
pub const MAX_TYRE_STINTS_IN_HISTORY: usize = 8;
pub const LAP_HISTORY_ENTRY_SIZE: usize = 14;
pub const TYRE_STINT_HISTORY_ENTRY_SIZE: usize = 3;
pub const SESSION_HISTORY_BODY_SIZE: usize = 7
    + MAX_LAPS_IN_HISTORY * LAP_HISTORY_ENTRY_SIZE
    + MAX_TYRE_STINTS_IN_HISTORY * TYRE_STINT_HISTORY_ENTRY_SIZE;

/// Bits of [`LapHistoryData::lap_valid_bit_flags`].
pub mod lap_valid {
    pub const LAP: u8 = 0x01;
    pub const SECTOR1: u8 = 0x02;
    pub const SECTOR2: u8 = 0x04;
    pub const SECTOR3: u8 = 0x08;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LapHistoryData {
    pub lap_time_ms: u32,
    pub sector1_time_ms_part: u16,
    pub sector1_time_minutes_part: u8,
    pub sector2_time_ms_part: u16,
    pub sector2_time_minutes_part: u8,
    pub sector3_time_ms_part: u16,
    pub sector3_time_minutes_part: u8,
    pub lap_valid_bit_flags: u8,
}

impl LapHistoryData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            lap_time_ms: r.u32_le()?,
            sector1_time_ms_part: r.u16_le()?,
            sector1_time_minutes_part: r.u8()?,
            sector2_time_ms_part: r.u16_le()?,
            sector2_time_minutes_part: r.u8()?,
            sector3_time_ms_part: r.u16_le()?,
            sector3_time_minutes_part: r.u8()?,
            lap_valid_bit_flags: r.u8()?,
        })
    }

    pub fn is_lap_valid(&self) -> bool {
        self.lap_valid_bit_flags & lap_valid::LAP != 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TyreStintHistoryData {
    /// 255 for the current stint.
    pub end_lap: u8,
    pub tyre_actual_compound: u8,
    pub tyre_visual_compound: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketSessionHistory {
    pub car_idx: u8,
    pub num_laps: u8,
    pub num_tyre_stints: u8,
    /// 1-based lap numbers; 0 when not set.
    pub best_lap_time_lap_num: u8,
    pub best_sector1_lap_num: u8,
    pub best_sector2_lap_num: u8,
    pub best_sector3_lap_num: u8,
    /// Laps actually driven; unused wire slots are dropped.
    pub laps: Vec<LapHistoryData>,
    pub tyre_stints: Vec<TyreStintHistoryData>,
}

impl PacketSessionHistory {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        let car_idx = r.u8()?;
        let num_laps = r.u8()?;
        let num_tyre_stints = r.u8()?;
        let lap_count = DecodeError::check_count("numLaps", num_laps, MAX_LAPS_IN_HISTORY)?;
        let stint_count = DecodeError::check_count(
            "numTyreStints",
            num_tyre_stints,
            MAX_TYRE_STINTS_IN_HISTORY,
        )?;
        let best_lap_time_lap_num = r.u8()?;
        let best_sector1_lap_num = r.u8()?;
        let best_sector2_lap_num = r.u8()?;
        let best_sector3_lap_num = r.u8()?;

        let mut laps = Vec::with_capacity(lap_count);
        for slot in 0..MAX_LAPS_IN_HISTORY {
            let lap = LapHistoryData::decode(r)?;
            if slot < lap_count {
                laps.push(lap);
            }
        }

        let mut tyre_stints = Vec::with_capacity(stint_count);
        for slot in 0..MAX_TYRE_STINTS_IN_HISTORY {
            let stint = TyreStintHistoryData {
                end_lap: r.u8()?,
                tyre_actual_compound: r.u8()?,
                tyre_visual_compound: r.u8()?,
            };
            if slot < stint_count {
                tyre_stints.push(stint);
            }
        }

        Ok(Self {
            car_idx,
            num_laps,
            num_tyre_stints,
            best_lap_time_lap_num,
            best_sector1_lap_num,
            best_sector2_lap_num,
            best_sector3_lap_num,
            laps,
            tyre_stints,
        })
    }

    /// Time of the best lap, when the game has named one.
    pub fn best_lap_time_ms(&self) -> Option<u32> {
        let index = usize::from(self.best_lap_time_lap_num).checked_sub(1)?;
        self.laps
            .get(index)
            .map(|lap| lap.lap_time_ms)
            .filter(|ms| *ms > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PacketWriter;
    use crate::PACKET_FORMAT_2025;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn body(num_laps: u8, best: u8) -> Vec<u8> {
        let mut w = PacketWriter::new();
        w.u8(6).u8(num_laps).u8(2).u8(best).u8(1).u8(2).u8(2);
        for lap in 0..MAX_LAPS_IN_HISTORY {
            if lap < usize::from(num_laps) {
                let ms = 90_000u32 - u32::try_from(lap).unwrap_or(0) * 500;
                w.u32(ms).u16(29_000).u8(0).u16(31_000).u8(0).u16(30_000).u8(0);
                w.u8(lap_valid::LAP | lap_valid::SECTOR1);
            } else {
                w.zeros(LAP_HISTORY_ENTRY_SIZE);
            }
        }
        w.bytes(&[12, 18, 18, 255, 16, 16]);
        w.zeros((MAX_TYRE_STINTS_IN_HISTORY - 2) * TYRE_STINT_HISTORY_ENTRY_SIZE);
        w.into_bytes()
    }

    #[test]
    fn test_decode_laps_and_stints() -> TestResult {
        let bytes = body(3, 3);
        assert_eq!(bytes.len(), SESSION_HISTORY_BODY_SIZE);
        let mut r = ByteReader::new(&bytes);
        let packet = PacketSessionHistory::decode(&mut r, PACKET_FORMAT_2025)?;
        assert_eq!(r.remaining(), 0);
        assert_eq!(packet.car_idx, 6);
        assert_eq!(packet.laps.len(), 3);
        assert!(packet.laps.iter().all(LapHistoryData::is_lap_valid));
        assert_eq!(packet.best_lap_time_ms(), Some(89_000));
        assert_eq!(
            packet.tyre_stints,
            vec![
                TyreStintHistoryData {
                    end_lap: 12,
                    tyre_actual_compound: 18,
                    tyre_visual_compound: 18,
                },
                TyreStintHistoryData {
                    end_lap: 255,
                    tyre_actual_compound: 16,
                    tyre_visual_compound: 16,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_best_lap_unset() -> TestResult {
        let bytes = body(2, 0);
        let mut r = ByteReader::new(&bytes);
        let packet = PacketSessionHistory::decode(&mut r, PACKET_FORMAT_2025)?;
        assert_eq!(packet.best_lap_time_ms(), None);
        Ok(())
    }

    #[test]
    fn test_lap_count_over_capacity() {
        let bytes = body(101, 1);
        let mut r = ByteReader::new(&bytes);
        assert!(matches!(
            PacketSessionHistory::decode(&mut r, PACKET_FORMAT_2025),
            Err(DecodeError::CountOutOfRange {
                field: "numLaps",
                count: 101,
                ..
            })
        ));
    }
}
