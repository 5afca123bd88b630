//! Car telemetry packet (id 6).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const CAR_TELEMETRY_ENTRY_SIZE: usize = 60;
pub const CAR_TELEMETRY_BODY_SIZE: usize = NUM_CARS * CAR_TELEMETRY_ENTRY_SIZE + 3;

/// Byte offsets inside one car-telemetry entry.
pub mod offsets {
    pub const SPEED: usize = 0;
    pub const THROTTLE: usize = 2;
    pub const STEER: usize = 6;
    pub const BRAKE: usize = 10;
    pub const CLUTCH: usize = 14;
    pub const GEAR: usize = 15;
    pub const ENGINE_RPM: usize = 16;
    pub const DRS: usize = 18;
    pub const REV_LIGHTS_PERCENT: usize = 19;
    pub const BRAKES_TEMPERATURE: usize = 22;
    pub const TYRES_SURFACE_TEMPERATURE: usize = 30;
    pub const TYRES_INNER_TEMPERATURE: usize = 34;
    pub const ENGINE_TEMPERATURE: usize = 38;
    pub const TYRES_PRESSURE: usize = 40;
    pub const SURFACE_TYPE: usize = 56;
}

/// Wheel arrays are in wire order RL, RR, FL, FR.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarTelemetryData {
    /// km/h.
    pub speed: u16,
    /// 0.0..=1.0.
    pub throttle: f32,
    /// -1.0 (full left)..=1.0 (full right).
    pub steer: f32,
    pub brake: f32,
    pub clutch: u8,
    /// -1 reverse, 0 neutral, 1..=8.
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: u8,
    pub rev_lights_percent: u8,
    pub rev_lights_bit_value: u16,
    pub brakes_temperature: [u16; 4],
    pub tyres_surface_temperature: [u8; 4],
    pub tyres_inner_temperature: [u8; 4],
    pub engine_temperature: u16,
    /// PSI.
    pub tyres_pressure: [f32; 4],
    pub surface_type: [u8; 4],
}

impl CarTelemetryData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            speed: r.u16_le()?,
            throttle: r.f32_le()?,
            steer: r.f32_le()?,
            brake: r.f32_le()?,
            clutch: r.u8()?,
            gear: r.i8()?,
            engine_rpm: r.u16_le()?,
            drs: r.u8()?,
            rev_lights_percent: r.u8()?,
            rev_lights_bit_value: r.u16_le()?,
            brakes_temperature: r.u16_le_array()?,
            tyres_surface_temperature: r.u8_array()?,
            tyres_inner_temperature: r.u8_array()?,
            engine_temperature: r.u16_le()?,
            tyres_pressure: r.f32_le_array()?,
            surface_type: r.u8_array()?,
        })
    }

    pub fn is_drs_open(&self) -> bool {
        self.drs != 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketCarTelemetry {
    pub cars: CarArray<CarTelemetryData>,
    /// 255 when the MFD is closed.
    pub mfd_panel_index: u8,
    pub mfd_panel_index_secondary_player: u8,
    /// 0 when there is no suggestion.
    pub suggested_gear: i8,
}

impl PacketCarTelemetry {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            cars: CarArray::decode_with(r, CarTelemetryData::decode)?,
            mfd_panel_index: r.u8()?,
            mfd_panel_index_secondary_player: r.u8()?,
            suggested_gear: r.i8()?,
        })
    }
}
