//! The 29-byte header shared by every packet, plus the identifiers it carries.

use crate::{ByteReader, DecodeError, HeaderDecodeError, NUM_CARS};
use serde::Serialize;
use std::fmt;

/// Size of the common packet header in bytes.
pub const HEADER_SIZE: usize = 29;

/// Wire sentinel for "no secondary player" (single-player and online sessions).
pub const SECONDARY_PLAYER_ABSENT: u8 = 255;

pub const PACKET_FORMAT_2024: u16 = 2024;
pub const PACKET_FORMAT_2025: u16 = 2025;

/// Packet identifier from the header's `packetId` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum PacketType {
    Motion = 0,
    Session = 1,
    LapData = 2,
    Event = 3,
    Participants = 4,
    CarSetups = 5,
    CarTelemetry = 6,
    CarStatus = 7,
    FinalClassification = 8,
    LobbyInfo = 9,
    CarDamage = 10,
    SessionHistory = 11,
    TyreSets = 12,
    MotionEx = 13,
    TimeTrial = 14,
    LapPositions = 15,
}

impl PacketType {
    pub const ALL: [PacketType; 16] = [
        Self::Motion,
        Self::Session,
        Self::LapData,
        Self::Event,
        Self::Participants,
        Self::CarSetups,
        Self::CarTelemetry,
        Self::CarStatus,
        Self::FinalClassification,
        Self::LobbyInfo,
        Self::CarDamage,
        Self::SessionHistory,
        Self::TyreSets,
        Self::MotionEx,
        Self::TimeTrial,
        Self::LapPositions,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Motion => "Motion",
            Self::Session => "Session",
            Self::LapData => "LapData",
            Self::Event => "Event",
            Self::Participants => "Participants",
            Self::CarSetups => "CarSetups",
            Self::CarTelemetry => "CarTelemetry",
            Self::CarStatus => "CarStatus",
            Self::FinalClassification => "FinalClassification",
            Self::LobbyInfo => "LobbyInfo",
            Self::CarDamage => "CarDamage",
            Self::SessionHistory => "SessionHistory",
            Self::TyreSets => "TyreSets",
            Self::MotionEx => "MotionEx",
            Self::TimeTrial => "TimeTrial",
            Self::LapPositions => "LapPositions",
        }
    }

    /// Packets the game sends at the configured telemetry rate rather than
    /// on change or a few times per second.
    pub fn is_high_frequency(self) -> bool {
        matches!(
            self,
            Self::Motion | Self::MotionEx | Self::CarTelemetry | Self::LapData | Self::CarStatus
        )
    }
}

impl TryFrom<u8> for PacketType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id() == value)
            .ok_or(DecodeError::UnknownPacketType(value))
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Packet format versions with a known body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketFormat {
    F2024,
    F2025,
}

impl PacketFormat {
    pub fn from_raw(raw: u16) -> Result<Self, DecodeError> {
        match raw {
            PACKET_FORMAT_2024 => Ok(Self::F2024),
            PACKET_FORMAT_2025 => Ok(Self::F2025),
            other => Err(DecodeError::UnsupportedFormatVersion(other)),
        }
    }

    pub fn raw(self) -> u16 {
        match self {
            Self::F2024 => PACKET_FORMAT_2024,
            Self::F2025 => PACKET_FORMAT_2025,
        }
    }
}

/// Index into the fixed 22-slot car arrays, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CarIndex(u8);

impl CarIndex {
    pub fn new(raw: u8) -> Option<Self> {
        (usize::from(raw) < NUM_CARS).then_some(Self(raw))
    }

    pub fn from_usize(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::new)
    }

    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    pub fn raw(self) -> u8 {
        self.0
    }
}

impl fmt::Display for CarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketHeader {
    /// Raw `packetFormat`; body decoders decide whether they support it.
    pub packet_format: u16,
    pub game_year: u8,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_type: PacketType,
    pub session_uid: u64,
    pub session_time: f32,
    pub frame_identifier: u32,
    pub overall_frame_identifier: u32,
    pub player_car_index: u8,
    /// `None` when the wire carried [`SECONDARY_PLAYER_ABSENT`].
    pub secondary_player_car_index: Option<u8>,
}

impl PacketHeader {
    /// Player car as a checked index, or `None` for out-of-range values.
    pub fn player_car(&self) -> Option<CarIndex> {
        CarIndex::new(self.player_car_index)
    }

    pub fn secondary_player_car(&self) -> Option<CarIndex> {
        self.secondary_player_car_index.and_then(CarIndex::new)
    }
}

/// Decode the header and hand back a cursor positioned at the body.
pub fn decode_header(raw: &[u8]) -> Result<(PacketHeader, ByteReader<'_>), HeaderDecodeError> {
    if raw.len() < HEADER_SIZE {
        return Err(HeaderDecodeError::TooShort { len: raw.len() });
    }

    let mut r = ByteReader::new(raw);
    read_header(&mut r)
        .map(|header| (header, r))
        .map_err(|err| match err {
            DecodeError::UnknownPacketType(id) => HeaderDecodeError::UnknownPacketType(id),
            _ => HeaderDecodeError::TooShort { len: raw.len() },
        })
}

fn read_header(r: &mut ByteReader<'_>) -> Result<PacketHeader, DecodeError> {
    let packet_format = r.u16_le()?;
    let game_year = r.u8()?;
    let game_major_version = r.u8()?;
    let game_minor_version = r.u8()?;
    let packet_version = r.u8()?;
    let packet_type = PacketType::try_from(r.u8()?)?;
    let session_uid = r.u64_le()?;
    let session_time = r.f32_le()?;
    let frame_identifier = r.u32_le()?;
    let overall_frame_identifier = r.u32_le()?;
    let player_car_index = r.u8()?;
    let secondary = r.u8()?;

    Ok(PacketHeader {
        packet_format,
        game_year,
        game_major_version,
        game_minor_version,
        packet_version,
        packet_type,
        session_uid,
        session_time,
        frame_identifier,
        overall_frame_identifier,
        player_car_index,
        secondary_player_car_index: (secondary != SECONDARY_PLAYER_ABSENT).then_some(secondary),
    })
}
