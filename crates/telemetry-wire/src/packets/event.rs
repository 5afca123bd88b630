//! Event packet (id 3): a four-character code plus a code-specific detail block.

use crate::{ByteReader, DecodeError, PacketFormat};
use std::fmt;

pub const EVENT_DETAILS_SIZE: usize = 12;
pub const EVENT_BODY_SIZE: usize = 4 + EVENT_DETAILS_SIZE;

/// Four ASCII bytes identifying the event, e.g. `SSTA` or `FTLP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventCode(pub [u8; 4]);

impl EventCode {
    pub const SESSION_STARTED: Self = Self(*b"SSTA");
    pub const SESSION_ENDED: Self = Self(*b"SEND");
    pub const FASTEST_LAP: Self = Self(*b"FTLP");
    pub const RETIREMENT: Self = Self(*b"RTMT");
    pub const DRS_ENABLED: Self = Self(*b"DRSE");
    pub const DRS_DISABLED: Self = Self(*b"DRSD");
    pub const TEAM_MATE_IN_PITS: Self = Self(*b"TMPT");
    pub const CHEQUERED_FLAG: Self = Self(*b"CHQF");
    pub const RACE_WINNER: Self = Self(*b"RCWN");
    pub const PENALTY: Self = Self(*b"PENA");
    pub const SPEED_TRAP: Self = Self(*b"SPTP");
    pub const START_LIGHTS: Self = Self(*b"STLG");
    pub const LIGHTS_OUT: Self = Self(*b"LGOT");
    pub const DRIVE_THROUGH_SERVED: Self = Self(*b"DTSV");
    pub const STOP_GO_SERVED: Self = Self(*b"SGSV");
    pub const FLASHBACK: Self = Self(*b"FLBK");
    pub const BUTTONS: Self = Self(*b"BUTN");
    pub const RED_FLAG: Self = Self(*b"RDFL");
    pub const OVERTAKE: Self = Self(*b"OVTK");
    pub const SAFETY_CAR: Self = Self(*b"SCAR");
    pub const COLLISION: Self = Self(*b"COLL");

    /// The code as text; non-ASCII codes render as `"????"`.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0)
            .ok()
            .filter(|s| s.is_ascii())
            .unwrap_or("????")
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventDetails {
    SessionStarted,
    SessionEnded,
    FastestLap {
        vehicle_idx: u8,
        /// Seconds.
        lap_time: f32,
    },
    Retirement {
        vehicle_idx: u8,
        /// Present from the 2025 format on; 3 is terminal damage.
        reason: Option<u8>,
    },
    DrsEnabled,
    DrsDisabled {
        reason: Option<u8>,
    },
    TeamMateInPits {
        vehicle_idx: u8,
    },
    ChequeredFlag,
    RaceWinner {
        vehicle_idx: u8,
    },
    Penalty {
        penalty_type: u8,
        infringement_type: u8,
        vehicle_idx: u8,
        other_vehicle_idx: u8,
        time: u8,
        lap_num: u8,
        places_gained: u8,
    },
    SpeedTrap {
        vehicle_idx: u8,
        speed: f32,
        is_overall_fastest_in_session: u8,
        is_driver_fastest_in_session: u8,
        fastest_vehicle_idx_in_session: u8,
        fastest_speed_in_session: f32,
    },
    StartLights {
        num_lights: u8,
    },
    LightsOut,
    DriveThroughServed {
        vehicle_idx: u8,
    },
    StopGoServed {
        vehicle_idx: u8,
        stop_time: f32,
    },
    Flashback {
        flashback_frame_identifier: u32,
        flashback_session_time: f32,
    },
    Buttons {
        button_status: u32,
    },
    RedFlag,
    Overtake {
        overtaking_vehicle_idx: u8,
        being_overtaken_vehicle_idx: u8,
    },
    SafetyCar {
        /// 0 none, 1 full, 2 virtual, 3 formation lap.
        safety_car_type: u8,
        /// 0 deployed, 1 returning, 2 returned, 3 resume race.
        event_type: u8,
    },
    Collision {
        vehicle1_idx: u8,
        vehicle2_idx: u8,
    },
    /// A code this decoder does not know; the detail block is kept raw.
    Other {
        details: [u8; EVENT_DETAILS_SIZE],
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketEvent {
    pub code: EventCode,
    pub details: EventDetails,
}

impl PacketEvent {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        let format = PacketFormat::from_raw(format)?;
        let code = EventCode(r.u8_array()?);
        let mut block = ByteReader::new(r.fixed_bytes(EVENT_DETAILS_SIZE)?);
        let details = decode_details(&mut block, code, format)?;
        Ok(Self { code, details })
    }

    /// Car the event is about, for event types that name one.
    pub fn vehicle_idx(&self) -> Option<u8> {
        match self.details {
            EventDetails::FastestLap { vehicle_idx, .. }
            | EventDetails::Retirement { vehicle_idx, .. }
            | EventDetails::TeamMateInPits { vehicle_idx }
            | EventDetails::RaceWinner { vehicle_idx }
            | EventDetails::Penalty { vehicle_idx, .. }
            | EventDetails::SpeedTrap { vehicle_idx, .. }
            | EventDetails::DriveThroughServed { vehicle_idx }
            | EventDetails::StopGoServed { vehicle_idx, .. } => Some(vehicle_idx),
            EventDetails::Overtake {
                overtaking_vehicle_idx,
                ..
            } => Some(overtaking_vehicle_idx),
            EventDetails::Collision { vehicle1_idx, .. } => Some(vehicle1_idx),
            _ => None,
        }
    }
}

/// Parses one detail block; `r` spans exactly [`EVENT_DETAILS_SIZE`] bytes.
fn decode_details(
    r: &mut ByteReader<'_>,
    code: EventCode,
    format: PacketFormat,
) -> Result<EventDetails, DecodeError> {
    let has_reasons = format == PacketFormat::F2025;
    let details = match code {
        EventCode::SESSION_STARTED => EventDetails::SessionStarted,
        EventCode::SESSION_ENDED => EventDetails::SessionEnded,
        EventCode::DRS_ENABLED => EventDetails::DrsEnabled,
        EventCode::CHEQUERED_FLAG => EventDetails::ChequeredFlag,
        EventCode::LIGHTS_OUT => EventDetails::LightsOut,
        EventCode::RED_FLAG => EventDetails::RedFlag,
        EventCode::FASTEST_LAP => EventDetails::FastestLap {
            vehicle_idx: r.u8()?,
            lap_time: r.f32_le()?,
        },
        EventCode::RETIREMENT => EventDetails::Retirement {
            vehicle_idx: r.u8()?,
            reason: if has_reasons { Some(r.u8()?) } else { None },
        },
        EventCode::DRS_DISABLED => EventDetails::DrsDisabled {
            reason: if has_reasons { Some(r.u8()?) } else { None },
        },
        EventCode::TEAM_MATE_IN_PITS => EventDetails::TeamMateInPits {
            vehicle_idx: r.u8()?,
        },
        EventCode::RACE_WINNER => EventDetails::RaceWinner {
            vehicle_idx: r.u8()?,
        },
        EventCode::PENALTY => EventDetails::Penalty {
            penalty_type: r.u8()?,
            infringement_type: r.u8()?,
            vehicle_idx: r.u8()?,
            other_vehicle_idx: r.u8()?,
            time: r.u8()?,
            lap_num: r.u8()?,
            places_gained: r.u8()?,
        },
        EventCode::SPEED_TRAP => EventDetails::SpeedTrap {
            vehicle_idx: r.u8()?,
            speed: r.f32_le()?,
            is_overall_fastest_in_session: r.u8()?,
            is_driver_fastest_in_session: r.u8()?,
            fastest_vehicle_idx_in_session: r.u8()?,
            fastest_speed_in_session: r.f32_le()?,
        },
        EventCode::START_LIGHTS => EventDetails::StartLights {
            num_lights: r.u8()?,
        },
        EventCode::DRIVE_THROUGH_SERVED => EventDetails::DriveThroughServed {
            vehicle_idx: r.u8()?,
        },
        EventCode::STOP_GO_SERVED => EventDetails::StopGoServed {
            vehicle_idx: r.u8()?,
            stop_time: r.f32_le()?,
        },
        EventCode::FLASHBACK => EventDetails::Flashback {
            flashback_frame_identifier: r.u32_le()?,
            flashback_session_time: r.f32_le()?,
        },
        EventCode::BUTTONS => EventDetails::Buttons {
            button_status: r.u32_le()?,
        },
        EventCode::OVERTAKE => EventDetails::Overtake {
            overtaking_vehicle_idx: r.u8()?,
            being_overtaken_vehicle_idx: r.u8()?,
        },
        EventCode::SAFETY_CAR => EventDetails::SafetyCar {
            safety_car_type: r.u8()?,
            event_type: r.u8()?,
        },
        EventCode::COLLISION => EventDetails::Collision {
            vehicle1_idx: r.u8()?,
            vehicle2_idx: r.u8()?,
        },
        _ => EventDetails::Other {
            details: r.u8_array()?,
        },
    };
    Ok(details)
}
