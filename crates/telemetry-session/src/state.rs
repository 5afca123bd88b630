//! The live session model owned by the aggregator.

use f1_telemetry_wire::packets::{
    CarDamageData, CarStatusData, CarTelemetryData, EventCode, FinalClassificationData, LapData,
    PacketSession, ParticipantData,
};
use f1_telemetry_wire::{CarArray, CarIndex};
use serde::Serialize;

use crate::staleness::{Category, FreshnessMap};

/// Lifecycle of the session as seen from the packet stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Unknown,
    Inactive,
    Active,
    Started,
    Formation,
    ChequeredFlag,
    Ended,
}

impl SessionStatus {
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Inactive => "Inactive",
            Self::Active => "Active",
            Self::Started => "Started",
            Self::Formation => "Formation Lap",
            Self::ChequeredFlag => "Chequered Flag",
            Self::Ended => "Ended",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackFlags {
    /// At least one marshal zone shows yellow.
    pub yellow: bool,
    pub red: bool,
    pub safety_car: bool,
    pub virtual_safety_car: bool,
}

impl TrackFlags {
    /// Most severe flag currently shown.
    pub fn display_name(&self) -> &'static str {
        if self.red {
            "Red"
        } else if self.safety_car {
            "Safety Car"
        } else if self.virtual_safety_car {
            "VSC"
        } else if self.yellow {
            "Yellow"
        } else {
            "Green"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastestLap {
    pub car: CarIndex,
    /// Seconds.
    pub lap_time: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EventState {
    /// Lights currently lit on the start gantry; `Some(0)` after lights out.
    pub start_lights: Option<u8>,
    pub fastest_lap: Option<FastestLap>,
    pub last_event: Option<EventCode>,
}

/// Everything known about one car slot. `None` means no packet of that kind
/// has reached this slot in the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CarState {
    pub lap: Option<LapData>,
    pub telemetry: Option<CarTelemetryData>,
    pub status: Option<CarStatusData>,
    pub damage: Option<CarDamageData>,
    pub participant: Option<ParticipantData>,
    pub classification: Option<FinalClassificationData>,
    pub best_lap_time_ms: Option<u32>,
    pub retired: bool,
    /// Retired with terminal damage (2025 retirement reason 3).
    pub terminal_damage: bool,
}

impl CarState {
    /// Any tyre, wing, floor, diffuser or sidepod damage on the last damage packet.
    pub fn has_damage(&self) -> bool {
        self.damage.is_some_and(|d| {
            d.tyres_damage.iter().any(|&v| v > 0)
                || [
                    d.front_left_wing_damage,
                    d.front_right_wing_damage,
                    d.rear_wing_damage,
                    d.floor_damage,
                    d.diffuser_damage,
                    d.sidepod_damage,
                ]
                .iter()
                .any(|&v| v > 0)
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.participant
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// State of one session, keyed by its UID.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// `None` only before the first packet.
    pub session_uid: Option<u64>,
    pub packet_format: Option<u16>,
    pub session: Option<PacketSession>,
    pub status: SessionStatus,
    pub player: Option<CarIndex>,
    /// Out-of-range player index already reported as an anomaly.
    pub(crate) unresolved_player: Option<u8>,
    pub secondary_player: Option<CarIndex>,
    pub cars: CarArray<CarState>,
    pub num_active_cars: Option<u8>,
    pub leader: Option<CarIndex>,
    pub track_flags: TrackFlags,
    pub events: EventState,
    pub freshness: FreshnessMap,
    /// Session time of the most recently applied header, seconds.
    pub session_time: f32,
    pub frame_identifier: u32,
}

impl SessionState {
    pub fn new(session_uid: u64) -> Self {
        Self {
            session_uid: Some(session_uid),
            ..Self::default()
        }
    }

    pub fn car(&self, index: CarIndex) -> Option<&CarState> {
        self.cars.car(index)
    }

    pub fn player_car(&self) -> Option<&CarState> {
        self.player.and_then(|index| self.car(index))
    }

    pub fn secondary_player_car(&self) -> Option<&CarState> {
        self.secondary_player.and_then(|index| self.car(index))
    }

    pub fn leader_car(&self) -> Option<&CarState> {
        self.leader.and_then(|index| self.car(index))
    }

    pub fn is_stale(&self, category: Category) -> bool {
        self.freshness.is_stale(category)
    }
}
