//! Tyre sets packet (id 12): the tyre allocation of one car.

use crate::{ByteReader, DecodeError, PacketFormat};

/// 13 dry sets followed by 7 wet sets.
pub const NUM_TYRE_SETS: usize = 20;
pub const TYRE_SET_ENTRY_SIZE: usize = 10;
pub const TYRE_SETS_BODY_SIZE: usize = 1 + NUM_TYRE_SETS * TYRE_SET_ENTRY_SIZE + 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TyreSetData {
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    /// Percent.
    pub wear: u8,
    pub available: u8,
    pub recommended_session: u8,
    pub life_span: u8,
    pub usable_life: u8,
    /// Lap-time delta in milliseconds relative to the fitted set.
    pub lap_delta_time: i16,
    pub fitted: u8,
}

impl TyreSetData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            actual_tyre_compound: r.u8()?,
            visual_tyre_compound: r.u8()?,
            wear: r.u8()?,
            available: r.u8()?,
            recommended_session: r.u8()?,
            life_span: r.u8()?,
            usable_life: r.u8()?,
            lap_delta_time: r.i16_le()?,
            fitted: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketTyreSets {
    pub car_idx: u8,
    pub tyre_sets: [TyreSetData; NUM_TYRE_SETS],
    pub fitted_idx: u8,
}

impl PacketTyreSets {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            car_idx: r.u8()?,
            tyre_sets: r.read_array(TyreSetData::decode)?,
            fitted_idx: r.u8()?,
        })
    }

    pub fn fitted(&self) -> Option<&TyreSetData> {
        self.tyre_sets.get(usize::from(self.fitted_idx))
    }
}
