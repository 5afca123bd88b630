//! Body decoders, one module per packet type, and the exhaustive dispatch
//! from [`PacketType`] to decoder.

pub mod car_damage;
pub mod car_setups;
pub mod car_status;
pub mod car_telemetry;
pub mod event;
pub mod final_classification;
pub mod lap_data;
pub mod lap_positions;
pub mod lobby_info;
pub mod motion;
pub mod motion_ex;
pub mod participants;
pub mod session;
pub mod session_history;
pub mod time_trial;
pub mod tyre_sets;

pub use car_damage::{CarDamageData, PacketCarDamage};
pub use car_setups::{CarSetupData, PacketCarSetups};
pub use car_status::{CarStatusData, PacketCarStatus};
pub use car_telemetry::{CarTelemetryData, PacketCarTelemetry};
pub use event::{EventCode, EventDetails, PacketEvent};
pub use final_classification::{FinalClassificationData, PacketFinalClassification};
pub use lap_data::{LapData, PacketLapData};
pub use lap_positions::PacketLapPositions;
pub use lobby_info::{LobbyInfoData, PacketLobbyInfo};
pub use motion::{CarMotionData, PacketMotion};
pub use motion_ex::PacketMotionEx;
pub use participants::{Livery, LiveryColour, PacketParticipants, ParticipantData};
pub use session::{
    MarshalZone, PacketSession, SessionAssists, SessionRules, WeatherForecastSample,
};
pub use session_history::{LapHistoryData, PacketSessionHistory, TyreStintHistoryData};
pub use time_trial::{PacketTimeTrial, TimeTrialDataSet};
pub use tyre_sets::{PacketTyreSets, TyreSetData};

use crate::{
    ByteReader, DatagramError, HEADER_SIZE, PacketDecodeError, PacketFormat, PacketHeader,
    PacketType, decode_header,
};

/// One decoded packet body, tagged by packet type.
#[derive(Debug, Clone, PartialEq)]
pub enum PacketBody {
    Motion(PacketMotion),
    Session(PacketSession),
    LapData(PacketLapData),
    Event(PacketEvent),
    Participants(PacketParticipants),
    CarSetups(PacketCarSetups),
    CarTelemetry(PacketCarTelemetry),
    CarStatus(PacketCarStatus),
    FinalClassification(PacketFinalClassification),
    LobbyInfo(PacketLobbyInfo),
    CarDamage(PacketCarDamage),
    SessionHistory(PacketSessionHistory),
    TyreSets(PacketTyreSets),
    MotionEx(PacketMotionEx),
    TimeTrial(PacketTimeTrial),
    LapPositions(PacketLapPositions),
}

impl PacketBody {
    /// Decode the body that follows a header declaring `packet_type` and `format`.
    ///
    /// Trailing bytes past the known layout are ignored.
    pub fn decode(
        packet_type: PacketType,
        format: u16,
        r: &mut ByteReader<'_>,
    ) -> Result<Self, PacketDecodeError> {
        let body = match packet_type {
            PacketType::Motion => PacketMotion::decode(r, format).map(Self::Motion),
            PacketType::Session => PacketSession::decode(r, format).map(Self::Session),
            PacketType::LapData => PacketLapData::decode(r, format).map(Self::LapData),
            PacketType::Event => PacketEvent::decode(r, format).map(Self::Event),
            PacketType::Participants => {
                PacketParticipants::decode(r, format).map(Self::Participants)
            }
            PacketType::CarSetups => PacketCarSetups::decode(r, format).map(Self::CarSetups),
            PacketType::CarTelemetry => {
                PacketCarTelemetry::decode(r, format).map(Self::CarTelemetry)
            }
            PacketType::CarStatus => PacketCarStatus::decode(r, format).map(Self::CarStatus),
            PacketType::FinalClassification => {
                PacketFinalClassification::decode(r, format).map(Self::FinalClassification)
            }
            PacketType::LobbyInfo => PacketLobbyInfo::decode(r, format).map(Self::LobbyInfo),
            PacketType::CarDamage => PacketCarDamage::decode(r, format).map(Self::CarDamage),
            PacketType::SessionHistory => {
                PacketSessionHistory::decode(r, format).map(Self::SessionHistory)
            }
            PacketType::TyreSets => PacketTyreSets::decode(r, format).map(Self::TyreSets),
            PacketType::MotionEx => PacketMotionEx::decode(r, format).map(Self::MotionEx),
            PacketType::TimeTrial => PacketTimeTrial::decode(r, format).map(Self::TimeTrial),
            PacketType::LapPositions => {
                PacketLapPositions::decode(r, format).map(Self::LapPositions)
            }
        };
        body.map_err(|reason| PacketDecodeError {
            packet_type,
            reason,
        })
    }

    pub fn packet_type(&self) -> PacketType {
        match self {
            Self::Motion(_) => PacketType::Motion,
            Self::Session(_) => PacketType::Session,
            Self::LapData(_) => PacketType::LapData,
            Self::Event(_) => PacketType::Event,
            Self::Participants(_) => PacketType::Participants,
            Self::CarSetups(_) => PacketType::CarSetups,
            Self::CarTelemetry(_) => PacketType::CarTelemetry,
            Self::CarStatus(_) => PacketType::CarStatus,
            Self::FinalClassification(_) => PacketType::FinalClassification,
            Self::LobbyInfo(_) => PacketType::LobbyInfo,
            Self::CarDamage(_) => PacketType::CarDamage,
            Self::SessionHistory(_) => PacketType::SessionHistory,
            Self::TyreSets(_) => PacketType::TyreSets,
            Self::MotionEx(_) => PacketType::MotionEx,
            Self::TimeTrial(_) => PacketType::TimeTrial,
            Self::LapPositions(_) => PacketType::LapPositions,
        }
    }
}

/// A header plus its decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPacket {
    pub header: PacketHeader,
    pub body: PacketBody,
}

impl DecodedPacket {
    pub fn packet_type(&self) -> PacketType {
        self.body.packet_type()
    }
}

/// Decode one UDP datagram.
pub fn decode_datagram(raw: &[u8]) -> Result<DecodedPacket, DatagramError> {
    let (header, mut body) = decode_header(raw)?;
    let body = PacketBody::decode(header.packet_type, header.packet_format, &mut body)?;
    Ok(DecodedPacket { header, body })
}

/// Largest datagram any known packet type occupies in either format.
pub const MAX_DATAGRAM_SIZE: usize = HEADER_SIZE + session_history::SESSION_HISTORY_BODY_SIZE;

/// Size in bytes of the body layout for `packet_type` under `format`, or
/// `None` when that packet type does not exist in that format.
pub fn body_size(packet_type: PacketType, format: PacketFormat) -> Option<usize> {
    let size = match packet_type {
        PacketType::Motion => motion::MOTION_BODY_SIZE,
        PacketType::Session => session::SESSION_BODY_SIZE,
        PacketType::LapData => lap_data::LAP_DATA_BODY_SIZE,
        PacketType::Event => event::EVENT_BODY_SIZE,
        PacketType::Participants => participants::participants_body_size(format),
        PacketType::CarSetups => car_setups::CAR_SETUPS_BODY_SIZE,
        PacketType::CarTelemetry => car_telemetry::CAR_TELEMETRY_BODY_SIZE,
        PacketType::CarStatus => car_status::CAR_STATUS_BODY_SIZE,
        PacketType::FinalClassification => {
            final_classification::final_classification_body_size(format)
        }
        PacketType::LobbyInfo => lobby_info::lobby_info_body_size(format),
        PacketType::CarDamage => car_damage::car_damage_body_size(format),
        PacketType::SessionHistory => session_history::SESSION_HISTORY_BODY_SIZE,
        PacketType::TyreSets => tyre_sets::TYRE_SETS_BODY_SIZE,
        PacketType::MotionEx => motion_ex::motion_ex_body_size(format),
        PacketType::TimeTrial => time_trial::TIME_TRIAL_BODY_SIZE,
        PacketType::LapPositions => match format {
            PacketFormat::F2024 => return None,
            PacketFormat::F2025 => lap_positions::LAP_POSITIONS_BODY_SIZE,
        },
    };
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full datagram sizes the game sends for each packet type.
    const SIZES_2025: [(PacketType, usize); 16] = [
        (PacketType::Motion, 1349),
        (PacketType::Session, 753),
        (PacketType::LapData, 1285),
        (PacketType::Event, 45),
        (PacketType::Participants, 1284),
        (PacketType::CarSetups, 1133),
        (PacketType::CarTelemetry, 1352),
        (PacketType::CarStatus, 1239),
        (PacketType::FinalClassification, 1042),
        (PacketType::LobbyInfo, 954),
        (PacketType::CarDamage, 1041),
        (PacketType::SessionHistory, 1460),
        (PacketType::TyreSets, 231),
        (PacketType::MotionEx, 273),
        (PacketType::TimeTrial, 101),
        (PacketType::LapPositions, 1131),
    ];

    #[test]
    fn test_2025_body_sizes_match_datagram_sizes() {
        for (packet_type, datagram) in SIZES_2025 {
            assert_eq!(
                body_size(packet_type, PacketFormat::F2025).map(|b| b + HEADER_SIZE),
                Some(datagram),
                "{packet_type}"
            );
        }
    }

    #[test]
    fn test_max_datagram_size_covers_every_layout() {
        let largest = PacketType::ALL
            .iter()
            .flat_map(|&t| [PacketFormat::F2024, PacketFormat::F2025].map(|f| body_size(t, f)))
            .flatten()
            .max()
            .map(|b| b + HEADER_SIZE);
        assert_eq!(largest, Some(MAX_DATAGRAM_SIZE));
        assert_eq!(MAX_DATAGRAM_SIZE, 1460);
    }

    #[test]
    fn test_2024_differences() {
        let sizes: Vec<_> = [
            PacketType::Participants,
            PacketType::FinalClassification,
            PacketType::LobbyInfo,
            PacketType::CarDamage,
            PacketType::MotionEx,
        ]
        .into_iter()
        .map(|t| body_size(t, PacketFormat::F2024).map(|b| b + HEADER_SIZE))
        .collect();
        assert_eq!(
            sizes,
            vec![Some(1350), Some(1020), Some(1306), Some(953), Some(237)]
        );
        assert_eq!(body_size(PacketType::LapPositions, PacketFormat::F2024), None);
    }
}
