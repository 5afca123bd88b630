//! Motion packet (id 0).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub const CAR_MOTION_ENTRY_SIZE: usize = 60;
pub const MOTION_BODY_SIZE: usize = NUM_CARS * CAR_MOTION_ENTRY_SIZE;

/// World-space physics state of one car.
///
/// Direction vectors are normalised and scaled to the `i16` range by the game;
/// divide by 32767 to recover unit vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarMotionData {
    pub world_position: [f32; 3],
    pub world_velocity: [f32; 3],
    pub world_forward_dir: [i16; 3],
    pub world_right_dir: [i16; 3],
    pub g_force_lateral: f32,
    pub g_force_longitudinal: f32,
    pub g_force_vertical: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl CarMotionData {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            world_position: r.f32_le_array()?,
            world_velocity: r.f32_le_array()?,
            world_forward_dir: r.i16_le_array()?,
            world_right_dir: r.i16_le_array()?,
            g_force_lateral: r.f32_le()?,
            g_force_longitudinal: r.f32_le()?,
            g_force_vertical: r.f32_le()?,
            yaw: r.f32_le()?,
            pitch: r.f32_le()?,
            roll: r.f32_le()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketMotion {
    pub cars: CarArray<CarMotionData>,
}

impl PacketMotion {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        // Same layout in 2024 and 2025.
        let _format = PacketFormat::from_raw(format)?;
        Ok(Self {
            cars: CarArray::decode_with(r, CarMotionData::decode)?,
        })
    }
}
