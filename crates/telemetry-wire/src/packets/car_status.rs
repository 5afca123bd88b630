//! Car status packet (id 7).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const CAR_STATUS_ENTRY_SIZE: usize = 55;
pub const CAR_STATUS_BODY_SIZE: usize = NUM_CARS * CAR_STATUS_ENTRY_SIZE;

/// ERS store capacity in joules.
pub const ERS_STORE_CAPACITY_J: f32 = 4_000_000.0;

/// Byte offsets inside one car-status entry.
pub mod offsets {
    pub const PIT_LIMITER_STATUS: usize = 4;
    pub const FUEL_IN_TANK: usize = 5;
    pub const FUEL_REMAINING_LAPS: usize = 13;
    pub const DRS_ALLOWED: usize = 22;
    pub const ACTUAL_TYRE_COMPOUND: usize = 25;
    pub const VISUAL_TYRE_COMPOUND: usize = 26;
    pub const TYRES_AGE_LAPS: usize = 27;
    pub const VEHICLE_FIA_FLAGS: usize = 28;
    pub const ERS_STORE_ENERGY: usize = 37;
    pub const ERS_DEPLOY_MODE: usize = 41;
    pub const NETWORK_PAUSED: usize = 54;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarStatusData {
    pub traction_control: u8,
    pub anti_lock_brakes: u8,
    pub fuel_mix: u8,
    pub front_brake_bias: u8,
    pub pit_limiter_status: u8,
    /// Kilograms.
    pub fuel_in_tank: f32,
    pub fuel_capacity: f32,
    /// Laps of fuel left, as shown on the MFD.
    pub fuel_remaining_laps: f32,
    pub max_rpm: u16,
    pub idle_rpm: u16,
    pub max_gears: u8,
    pub drs_allowed: u8,
    /// Metres until DRS may be used; 0 when unavailable.
    pub drs_activation_distance: u16,
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    pub tyres_age_laps: u8,
    /// -1 invalid/unknown, 0 none, 1 green, 2 blue, 3 yellow, 4 red.
    pub vehicle_fia_flags: i8,
    pub engine_power_ice: f32,
    pub engine_power_mguk: f32,
    /// Joules.
    pub ers_store_energy: f32,
    /// 0 none, 1 medium, 2 hotlap, 3 overtake.
    pub ers_deploy_mode: u8,
    pub ers_harvested_this_lap_mguk: f32,
    pub ers_harvested_this_lap_mguh: f32,
    pub ers_deployed_this_lap: f32,
    pub network_paused: u8,
}

impl CarStatusData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            traction_control: r.u8()?,
            anti_lock_brakes: r.u8()?,
            fuel_mix: r.u8()?,
            front_brake_bias: r.u8()?,
            pit_limiter_status: r.u8()?,
            fuel_in_tank: r.f32_le()?,
            fuel_capacity: r.f32_le()?,
            fuel_remaining_laps: r.f32_le()?,
            max_rpm: r.u16_le()?,
            idle_rpm: r.u16_le()?,
            max_gears: r.u8()?,
            drs_allowed: r.u8()?,
            drs_activation_distance: r.u16_le()?,
            actual_tyre_compound: r.u8()?,
            visual_tyre_compound: r.u8()?,
            tyres_age_laps: r.u8()?,
            vehicle_fia_flags: r.i8()?,
            engine_power_ice: r.f32_le()?,
            engine_power_mguk: r.f32_le()?,
            ers_store_energy: r.f32_le()?,
            ers_deploy_mode: r.u8()?,
            ers_harvested_this_lap_mguk: r.f32_le()?,
            ers_harvested_this_lap_mguh: r.f32_le()?,
            ers_deployed_this_lap: r.f32_le()?,
            network_paused: r.u8()?,
        })
    }

    /// ERS store as a percentage of capacity.
    pub fn ers_store_percent(&self) -> f32 {
        self.ers_store_energy / ERS_STORE_CAPACITY_J * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketCarStatus {
    pub cars: CarArray<CarStatusData>,
}

impl PacketCarStatus {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            cars: CarArray::decode_with(r, CarStatusData::decode)?,
        })
    }
}
