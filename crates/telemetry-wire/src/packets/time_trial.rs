//! Time trial packet (id 14).

use crate::{ByteReader, DecodeError, PacketFormat};

pub const TIME_TRIAL_SET_SIZE: usize = 24;
pub const TIME_TRIAL_BODY_SIZE: usize = 3 * TIME_TRIAL_SET_SIZE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeTrialDataSet {
    pub car_idx: u8,
    pub team_id: u8,
    pub lap_time_ms: u32,
    pub sector1_time_ms: u32,
    pub sector2_time_ms: u32,
    pub sector3_time_ms: u32,
    pub traction_control: u8,
    pub gearbox_assist: u8,
    pub anti_lock_brakes: u8,
    pub equal_car_performance: u8,
    pub custom_setup: u8,
    pub valid: u8,
}

impl TimeTrialDataSet {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            car_idx: r.u8()?,
            team_id: r.u8()?,
            lap_time_ms: r.u32_le()?,
            sector1_time_ms: r.u32_le()?,
            sector2_time_ms: r.u32_le()?,
            sector3_time_ms: r.u32_le()?,
            traction_control: r.u8()?,
            gearbox_assist: r.u8()?,
            anti_lock_brakes: r.u8()?,
            equal_car_performance: r.u8()?,
            custom_setup: r.u8()?,
            valid: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketTimeTrial {
    pub player_session_best: TimeTrialDataSet,
    pub personal_best: TimeTrialDataSet,
    pub rival: TimeTrialDataSet,
}

impl PacketTimeTrial {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            player_session_best: TimeTrialDataSet::decode(r)?,
            personal_best: TimeTrialDataSet::decode(r)?,
            rival: TimeTrialDataSet::decode(r)?,
        })
    }
}
