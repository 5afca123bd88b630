//! Car damage packet (id 10).

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub(crate) fn entry_size(format: PacketFormat) -> usize {
    match format {
        PacketFormat::F2024 => 42,
        PacketFormat::F2025 => 46,
    }
}

pub fn car_damage_body_size(format: PacketFormat) -> usize {
    NUM_CARS * entry_size(format)
}

/// Offset of the front-left wing byte inside an entry; everything after it is
/// shifted by the 2025 blister block.
pub(crate) fn wing_offset(format: PacketFormat) -> usize {
    match format {
        PacketFormat::F2024 => 24,
        PacketFormat::F2025 => 28,
    }
}

/// Damage values are percentages; wheel arrays are in wire order RL, RR, FL, FR.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarDamageData {
    pub tyres_wear: [f32; 4],
    pub tyres_damage: [u8; 4],
    pub brakes_damage: [u8; 4],
    /// 2025 format only.
    pub tyre_blisters: Option<[u8; 4]>,
    pub front_left_wing_damage: u8,
    pub front_right_wing_damage: u8,
    pub rear_wing_damage: u8,
    pub floor_damage: u8,
    pub diffuser_damage: u8,
    pub sidepod_damage: u8,
    pub drs_fault: u8,
    pub ers_fault: u8,
    pub gear_box_damage: u8,
    pub engine_damage: u8,
    pub engine_mguh_wear: u8,
    pub engine_es_wear: u8,
    pub engine_ce_wear: u8,
    pub engine_ice_wear: u8,
    pub engine_mguk_wear: u8,
    pub engine_tc_wear: u8,
    pub engine_blown: u8,
    pub engine_seized: u8,
}

impl CarDamageData {
    fn decode(r: &mut ByteReader<'_>, format: PacketFormat) -> Result<Self, DecodeError> {
        let tyres_wear = r.f32_le_array()?;
        let tyres_damage = r.u8_array()?;
        let brakes_damage = r.u8_array()?;
        let tyre_blisters = match format {
            PacketFormat::F2024 => None,
            PacketFormat::F2025 => Some(r.u8_array()?),
        };
        Ok(Self {
            tyres_wear,
            tyres_damage,
            brakes_damage,
            tyre_blisters,
            front_left_wing_damage: r.u8()?,
            front_right_wing_damage: r.u8()?,
            rear_wing_damage: r.u8()?,
            floor_damage: r.u8()?,
            diffuser_damage: r.u8()?,
            sidepod_damage: r.u8()?,
            drs_fault: r.u8()?,
            ers_fault: r.u8()?,
            gear_box_damage: r.u8()?,
            engine_damage: r.u8()?,
            engine_mguh_wear: r.u8()?,
            engine_es_wear: r.u8()?,
            engine_ce_wear: r.u8()?,
            engine_ice_wear: r.u8()?,
            engine_mguk_wear: r.u8()?,
            engine_tc_wear: r.u8()?,
            engine_blown: r.u8()?,
            engine_seized: r.u8()?,
        })
    }

    /// Wear of the most worn tyre.
    pub fn max_tyre_wear(&self) -> f32 {
        self.tyres_wear.iter().copied().fold(0.0, f32::max)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketCarDamage {
    pub cars: CarArray<CarDamageData>,
}

impl PacketCarDamage {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let format = PacketFormat::from_raw(format)?;
        Ok(Self {
            cars: CarArray::decode_with(r, |r| CarDamageData::decode(r, format))?,
        })
    }
}
