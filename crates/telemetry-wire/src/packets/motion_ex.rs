//! Extended motion packet (id 13): player-car-only suspension and wheel data.

use crate::{ByteReader, DecodeError, PacketFormat};

pub fn motion_ex_body_size(format: PacketFormat) -> usize {
    let floats = match format {
        PacketFormat::F2024 => 52,
        PacketFormat::F2025 => 61,
    };
    floats * 4
}

/// Wheel arrays are in wire order RL, RR, FL, FR.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PacketMotionEx {
    pub suspension_position: [f32; 4],
    pub suspension_velocity: [f32; 4],
    pub suspension_acceleration: [f32; 4],
    pub wheel_speed: [f32; 4],
    pub wheel_slip_ratio: [f32; 4],
    pub wheel_slip_angle: [f32; 4],
    pub wheel_lat_force: [f32; 4],
    pub wheel_long_force: [f32; 4],
    pub height_of_cog_above_ground: f32,
    pub local_velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub angular_acceleration: [f32; 3],
    pub front_wheels_angle: f32,
    pub wheel_vert_force: [f32; 4],
    pub front_aero_height: f32,
    pub rear_aero_height: f32,
    pub front_roll_angle: f32,
    pub rear_roll_angle: f32,
    pub chassis_yaw: f32,
    /// 2025 format only.
    pub chassis_pitch: Option<f32>,
    pub wheel_camber: Option<[f32; 4]>,
    pub wheel_camber_gain: Option<[f32; 4]>,
}

impl PacketMotionEx {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let format = PacketFormat::from_raw(format)?;
        let mut packet = Self {
            suspension_position: r.f32_le_array()?,
            suspension_velocity: r.f32_le_array()?,
            suspension_acceleration: r.f32_le_array()?,
            wheel_speed: r.f32_le_array()?,
            wheel_slip_ratio: r.f32_le_array()?,
            wheel_slip_angle: r.f32_le_array()?,
            wheel_lat_force: r.f32_le_array()?,
            wheel_long_force: r.f32_le_array()?,
            height_of_cog_above_ground: r.f32_le()?,
            local_velocity: r.f32_le_array()?,
            angular_velocity: r.f32_le_array()?,
            angular_acceleration: r.f32_le_array()?,
            front_wheels_angle: r.f32_le()?,
            wheel_vert_force: r.f32_le_array()?,
            front_aero_height: r.f32_le()?,
            rear_aero_height: r.f32_le()?,
            front_roll_angle: r.f32_le()?,
            rear_roll_angle: r.f32_le()?,
            chassis_yaw: r.f32_le()?,
            chassis_pitch: None,
            wheel_camber: None,
            wheel_camber_gain: None,
        };
        if format == PacketFormat::F2025 {
            packet.chassis_pitch = Some(r.f32_le()?);
            packet.wheel_camber = Some(r.f32_le_array()?);
            packet.wheel_camber_gain = Some(r.f32_le_array()?);
        }
        Ok(packet)
    }
}
