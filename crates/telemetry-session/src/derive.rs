//! Pure mapping from a session snapshot to named sensor values.
//!
//! Nothing here mutates state or performs I/O: the same snapshot always
//! yields the same [`SensorSet`]s.

use f1_telemetry_wire::packets::WeatherForecastSample;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::names;
use crate::staleness::Category;
use crate::state::{CarState, SessionState};

/// Wire order of the four-corner arrays.
const CORNERS: [&str; 4] = ["rl", "rr", "fl", "fr"];

/// Forecast look-ahead, minutes, and the key each one is published under.
const RAIN_CHANCE_KEYS: [(u8, &str); 4] = [
    (0, "rain_chance_now"),
    (5, "rain_chance_5m"),
    (10, "rain_chance_10m"),
    (15, "rain_chance_15m"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// No data has been received for this value.
    Unavailable,
}

impl SensorValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! int_sensor_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SensorValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_sensor_value!(u8, i8, u16, u32, i64);

impl From<f64> for SensorValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for SensorValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for SensorValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SensorValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SensorValue>> From<Option<T>> for SensorValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unavailable, Into::into)
    }
}

/// Named values for one category, plus whether that category is stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSet {
    pub category: Category,
    pub stale: bool,
    pub values: BTreeMap<String, SensorValue>,
}

impl SensorSet {
    fn new(state: &SessionState, category: Category) -> Self {
        Self {
            category,
            stale: state.is_stale(category),
            values: BTreeMap::new(),
        }
    }

    fn put(&mut self, key: &str, value: impl Into<SensorValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SensorValue> {
        self.values.get(key)
    }
}

/// One [`SensorSet`] per [`Category`], in [`Category::ALL`] order.
pub fn derive_sensor_sets(state: &SessionState) -> Vec<SensorSet> {
    Category::ALL
        .into_iter()
        .map(|category| derive_category(state, category))
        .collect()
}

pub fn derive_category(state: &SessionState, category: Category) -> SensorSet {
    let mut set = SensorSet::new(state, category);
    let player = state.player_car();
    match category {
        Category::Telemetry => telemetry_values(&mut set, player),
        Category::Status => status_values(&mut set, player),
        Category::Damage => damage_values(&mut set, player),
        Category::Lap => lap_values(&mut set, player),
        Category::Session => session_values(&mut set, state),
        Category::Weather => weather_values(&mut set, state),
        Category::Participants => participant_values(&mut set, state),
        Category::Events => event_values(&mut set, state),
    }
    set
}

/// Formats a lap time as `M:SS.mmm`; zero reads `0:00.000`.
pub fn format_lap_time(lap_time_ms: u32) -> String {
    let minutes = (lap_time_ms / 60_000) % 60;
    let seconds = (lap_time_ms % 60_000) / 1_000;
    let millis = lap_time_ms % 1_000;
    format!("{minutes}:{seconds:02}.{millis:03}")
}

/// The first forecast sample at or after `minutes` from now.
///
/// Samples for `session_type` are preferred; samples for later sessions of
/// the weekend are used only when the current one has nothing upcoming.
pub fn nearest_forecast_sample(
    samples: &[WeatherForecastSample],
    session_type: u8,
    minutes: u8,
) -> Option<&WeatherForecastSample> {
    let upcoming = |same_session: bool| {
        samples
            .iter()
            .filter(|s| !same_session || s.session_type == session_type)
            .filter(|s| s.time_offset >= minutes)
            .min_by_key(|s| s.time_offset)
    };
    upcoming(true).or_else(|| upcoming(false))
}

fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

fn on_off(value: bool) -> &'static str {
    if value { "On" } else { "Off" }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Whole percent, truncated toward zero.
fn percent(pedal: f32) -> i64 {
    (f64::from(pedal) * 100.0).trunc() as i64
}

fn telemetry_values(set: &mut SensorSet, player: Option<&CarState>) {
    let t = player.and_then(|car| car.telemetry);
    set.put("speed_kmh", t.map(|t| t.speed));
    set.put("gear", t.map(|t| t.gear));
    set.put("engine_rpm", t.map(|t| t.engine_rpm));
    set.put("throttle_pct", t.map(|t| percent(t.throttle)));
    set.put("brake_pct", t.map(|t| percent(t.brake)));
    set.put("drs_state", t.map(|t| on_off(t.is_drs_open())));
    for (corner, key) in CORNERS.iter().enumerate() {
        let temp = t.and_then(|t| t.tyres_surface_temperature.get(corner).copied());
        set.put(&format!("tyre_temp_{key}"), temp);
    }
}

fn status_values(set: &mut SensorSet, player: Option<&CarState>) {
    let s = player.and_then(|car| car.status);
    set.put(
        "ers_store_pct",
        s.map(|s| round_to(f64::from(s.ers_store_percent()), 1)),
    );
    set.put("ers_mode", s.map(|s| names::ers_mode_name(s.ers_deploy_mode)));
    set.put(
        "drs_allowed",
        s.map(|s| {
            if s.drs_allowed == 1 {
                "Allowed"
            } else {
                "Not Allowed"
            }
        }),
    );
    set.put(
        "tyre_compound",
        s.map(|s| names::visual_tyre_compound_name(s.visual_tyre_compound)),
    );
    set.put("tyre_age_laps", s.map(|s| s.tyres_age_laps));
    set.put(
        "fuel_laps",
        s.map(|s| round_to(f64::from(s.fuel_remaining_laps), 2)),
    );
    set.put("flag", s.map(|s| names::fia_flag_name(s.vehicle_fia_flags)));
    set.put("pit_limiter", s.map(|s| on_off(s.pit_limiter_status == 1)));
}

fn damage_values(set: &mut SensorSet, player: Option<&CarState>) {
    let d = player.and_then(|car| car.damage);
    for (corner, key) in CORNERS.iter().enumerate() {
        let wear = d.and_then(|d| d.tyres_wear.get(corner).copied());
        set.put(&format!("tyre_wear_{key}"), wear.map(|w| w as i64));
    }
    set.put("max_tyre_wear", d.map(|d| d.max_tyre_wear() as i64));
    set.put(
        "damage",
        player.filter(|car| car.damage.is_some()).map(|car| yes_no(car.has_damage())),
    );
    set.put("terminal_damage", player.map(|car| yes_no(car.terminal_damage)));
    set.put(
        "damaged_front_left_wing",
        d.map(|d| yes_no(d.front_left_wing_damage > 0)),
    );
    set.put(
        "damaged_front_right_wing",
        d.map(|d| yes_no(d.front_right_wing_damage > 0)),
    );
    set.put("damaged_rear_wing", d.map(|d| yes_no(d.rear_wing_damage > 0)));
    set.put("damaged_floor", d.map(|d| yes_no(d.floor_damage > 0)));
}

fn lap_values(set: &mut SensorSet, player: Option<&CarState>) {
    let lap = player.and_then(|car| car.lap);
    set.put("lap", lap.map(|l| l.current_lap_num));
    set.put("position", lap.map(|l| l.car_position));
    set.put("last_lap", lap.map(|l| format_lap_time(l.last_lap_time_ms)));
    set.put(
        "last_lap_time_s",
        lap.map(|l| l.last_lap_time_ms)
            .filter(|ms| *ms > 0)
            .map(|ms| f64::from(ms) / 1_000.0),
    );
    set.put("lap_invalid", lap.map(|l| yes_no(l.is_current_lap_invalid())));
    // Wire sectors are zero-based.
    set.put("sector", lap.map(|l| i64::from(l.sector) + 1));
    set.put("pit_status", lap.map(|l| names::pit_status_name(l.pit_status)));
}

fn session_values(set: &mut SensorSet, state: &SessionState) {
    let session = state.session.as_ref();
    set.put("track", session.map(|s| names::track_name(s.track_id)));
    set.put(
        "session_type",
        session.map(|s| names::session_type_name(s.session_type)),
    );
    set.put("session_status", state.status.name());
    set.put(
        "safety_car",
        session.map(|s| names::safety_car_name(s.safety_car_status)),
    );
    set.put("track_temperature_c", session.map(|s| s.track_temperature));
    set.put("air_temperature_c", session.map(|s| s.air_temperature));
    set.put("total_laps", session.map(|s| s.total_laps));
    set.put("session_time_left_s", session.map(|s| s.session_time_left));
    set.put("track_flag", state.track_flags.display_name());
}

fn weather_values(set: &mut SensorSet, state: &SessionState) {
    let session = state.session.as_ref();
    set.put("weather", session.map(|s| names::weather_name(s.weather)));
    for (minutes, key) in RAIN_CHANCE_KEYS {
        let rain = session.and_then(|s| {
            nearest_forecast_sample(&s.weather_forecast_samples, s.session_type, minutes)
                .map(|sample| sample.rain_percentage)
        });
        set.put(key, rain);
    }
}

fn car_name(car: Option<&CarState>) -> String {
    car.and_then(CarState::name).unwrap_or("Unknown").to_string()
}

fn participant_values(set: &mut SensorSet, state: &SessionState) {
    set.put("leader", state.leader.map(|_| car_name(state.leader_car())));
    set.put("player_name", state.player.map(|_| car_name(state.player_car())));
}

fn event_values(set: &mut SensorSet, state: &SessionState) {
    let events = &state.events;
    set.put("start_lights", events.start_lights);
    set.put(
        "fastest_lap",
        events.fastest_lap.map(|f| car_name(state.car(f.car))),
    );
    set.put(
        "fastest_lap_time_s",
        events
            .fastest_lap
            .map(|f| f64::from(f.lap_time))
            .filter(|t| *t > 0.0)
            .map(|t| round_to(t, 3)),
    );
    set.put(
        "last_event",
        events.last_event.map(|code| code.as_str().to_string()),
    );
}
