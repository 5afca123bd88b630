//! Lobby info packet (id 9), sent while in a multiplayer lobby.

use crate::{ByteReader, CarArray, DecodeError, NUM_CARS, PacketFormat};

pub(crate) fn name_len(format: PacketFormat) -> usize {
    match format {
        PacketFormat::F2024 => 48,
        PacketFormat::F2025 => 32,
    }
}

pub(crate) fn entry_size(format: PacketFormat) -> usize {
    10 + name_len(format)
}

pub fn lobby_info_body_size(format: PacketFormat) -> usize {
    1 + NUM_CARS * entry_size(format)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobbyInfoData {
    pub ai_controlled: u8,
    /// 255 when no team is selected yet.
    pub team_id: u8,
    pub nationality: u8,
    pub platform: u8,
    pub name: String,
    pub car_number: u8,
    pub your_telemetry: u8,
    pub show_online_names: u8,
    pub tech_level: u16,
    /// 0 not ready, 1 ready, 2 spectating.
    pub ready_status: u8,
}

impl LobbyInfoData {
    fn decode(r: &mut ByteReader<'_>, format: PacketFormat) -> Result<Self, DecodeError> {
        Ok(Self {
            ai_controlled: r.u8()?,
            team_id: r.u8()?,
            nationality: r.u8()?,
            platform: r.u8()?,
            name: r.fixed_string(name_len(format))?,
            car_number: r.u8()?,
            your_telemetry: r.u8()?,
            show_online_names: r.u8()?,
            tech_level: r.u16_le()?,
            ready_status: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketLobbyInfo {
    pub num_players: u8,
    pub players: CarArray<LobbyInfoData>,
}

impl PacketLobbyInfo {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let format = PacketFormat::from_raw(format)?;
        let num_players = r.u8()?;
        DecodeError::check_count("numPlayers", num_players, NUM_CARS)?;
        Ok(Self {
            num_players,
            players: CarArray::decode_with(r, |r| LobbyInfoData::decode(r, format))?,
        })
    }
}
