//! Car setups packet (id 5).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const CAR_SETUP_ENTRY_SIZE: usize = 50;
pub const CAR_SETUPS_BODY_SIZE: usize = NUM_CARS * CAR_SETUP_ENTRY_SIZE + 4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarSetupData {
    pub front_wing: u8,
    pub rear_wing: u8,
    pub on_throttle: u8,
    pub off_throttle: u8,
    pub front_camber: f32,
    pub rear_camber: f32,
    pub front_toe: f32,
    pub rear_toe: f32,
    pub front_suspension: u8,
    pub rear_suspension: u8,
    pub front_anti_roll_bar: u8,
    pub rear_anti_roll_bar: u8,
    pub front_suspension_height: u8,
    pub rear_suspension_height: u8,
    pub brake_pressure: u8,
    pub brake_bias: u8,
    pub engine_braking: u8,
    /// PSI, wire order RL, RR, FL, FR.
    pub tyre_pressures: [f32; 4],
    pub ballast: u8,
    pub fuel_load: f32,
}

impl CarSetupData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            front_wing: r.u8()?,
            rear_wing: r.u8()?,
            on_throttle: r.u8()?,
            off_throttle: r.u8()?,
            front_camber: r.f32_le()?,
            rear_camber: r.f32_le()?,
            front_toe: r.f32_le()?,
            rear_toe: r.f32_le()?,
            front_suspension: r.u8()?,
            rear_suspension: r.u8()?,
            front_anti_roll_bar: r.u8()?,
            rear_anti_roll_bar: r.u8()?,
            front_suspension_height: r.u8()?,
            rear_suspension_height: r.u8()?,
            brake_pressure: r.u8()?,
            brake_bias: r.u8()?,
            engine_braking: r.u8()?,
            tyre_pressures: r.f32_le_array()?,
            ballast: r.u8()?,
            fuel_load: r.f32_le()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketCarSetups {
    pub cars: CarArray<CarSetupData>,
    pub next_front_wing_value: f32,
}

impl PacketCarSetups {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            cars: CarArray::decode_with(r, CarSetupData::decode)?,
            next_front_wing_value: r.f32_le()?,
        })
    }
}
