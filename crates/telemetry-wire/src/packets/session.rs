//! Session packet (id 1): track, weather, forecast, rules and assists.

use crate::{ByteReader, DecodeError, PacketFormat};

pub const MAX_MARSHAL_ZONES: usize = 21;
pub const MAX_WEATHER_FORECAST_SAMPLES: usize = 64;
pub const MAX_SESSIONS_IN_WEEKEND: usize = 12;
pub const MARSHAL_ZONE_SIZE: usize = 5;
pub const WEATHER_FORECAST_SAMPLE_SIZE: usize = 8;
pub const SESSION_BODY_SIZE: usize = 724;

/// Byte offsets inside the session body, used by packet builders.
pub mod offsets {
    pub const WEATHER: usize = 0;
    pub const TRACK_TEMPERATURE: usize = 1;
    pub const AIR_TEMPERATURE: usize = 2;
    pub const TOTAL_LAPS: usize = 3;
    pub const SESSION_TYPE: usize = 6;
    pub const TRACK_ID: usize = 7;
    pub const SESSION_TIME_LEFT: usize = 9;
    pub const NUM_MARSHAL_ZONES: usize = 18;
    pub const MARSHAL_ZONES: usize = 19;
    pub const SAFETY_CAR_STATUS: usize = 124;
    pub const NUM_WEATHER_FORECAST_SAMPLES: usize = 126;
    pub const WEATHER_FORECAST_SAMPLES: usize = 127;
    pub const FORECAST_ACCURACY: usize = 639;
    pub const NUM_SESSIONS_IN_WEEKEND: usize = 703;
    pub const SECTOR3_LAP_DISTANCE_START: usize = 720;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarshalZone {
    /// Fraction (0..1) of the lap where the zone starts.
    pub zone_start: f32,
    /// -1 invalid, 0 none, 1 green, 2 blue, 3 yellow.
    pub zone_flag: i8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeatherForecastSample {
    pub session_type: u8,
    /// Minutes from now.
    pub time_offset: u8,
    pub weather: u8,
    pub track_temperature: i8,
    pub track_temperature_change: i8,
    pub air_temperature: i8,
    pub air_temperature_change: i8,
    pub rain_percentage: u8,
}

impl WeatherForecastSample {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            session_type: r.u8()?,
            time_offset: r.u8()?,
            weather: r.u8()?,
            track_temperature: r.i8()?,
            track_temperature_change: r.i8()?,
            air_temperature: r.i8()?,
            air_temperature_change: r.i8()?,
            rain_percentage: r.u8()?,
        })
    }
}

/// Driving assists and game-mode selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionAssists {
    pub steering_assist: u8,
    pub braking_assist: u8,
    pub gearbox_assist: u8,
    pub pit_assist: u8,
    pub pit_release_assist: u8,
    pub ers_assist: u8,
    pub drs_assist: u8,
    pub dynamic_racing_line: u8,
    pub dynamic_racing_line_type: u8,
    pub game_mode: u8,
    pub rule_set: u8,
}

/// Per-session rule toggles from the custom-settings menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionRules {
    pub equal_car_performance: u8,
    pub recovery_mode: u8,
    pub flashback_limit: u8,
    pub surface_type: u8,
    pub low_fuel_mode: u8,
    pub race_starts: u8,
    pub tyre_temperature: u8,
    pub pit_lane_tyre_sim: u8,
    pub car_damage: u8,
    pub car_damage_rate: u8,
    pub collisions: u8,
    pub collisions_off_for_first_lap_only: u8,
    pub mp_unsafe_pit_release: u8,
    pub mp_off_for_griefing: u8,
    pub corner_cutting_stringency: u8,
    pub parc_ferme_rules: u8,
    pub pit_stop_experience: u8,
    pub safety_car: u8,
    pub safety_car_experience: u8,
    pub formation_lap: u8,
    pub formation_lap_experience: u8,
    pub red_flags: u8,
    pub affects_licence_level_solo: u8,
    pub affects_licence_level_mp: u8,
}

impl SessionRules {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            equal_car_performance: r.u8()?,
            recovery_mode: r.u8()?,
            flashback_limit: r.u8()?,
            surface_type: r.u8()?,
            low_fuel_mode: r.u8()?,
            race_starts: r.u8()?,
            tyre_temperature: r.u8()?,
            pit_lane_tyre_sim: r.u8()?,
            car_damage: r.u8()?,
            car_damage_rate: r.u8()?,
            collisions: r.u8()?,
            collisions_off_for_first_lap_only: r.u8()?,
            mp_unsafe_pit_release: r.u8()?,
            mp_off_for_griefing: r.u8()?,
            corner_cutting_stringency: r.u8()?,
            parc_ferme_rules: r.u8()?,
            pit_stop_experience: r.u8()?,
            safety_car: r.u8()?,
            safety_car_experience: r.u8()?,
            formation_lap: r.u8()?,
            formation_lap_experience: r.u8()?,
            red_flags: r.u8()?,
            affects_licence_level_solo: r.u8()?,
            affects_licence_level_mp: r.u8()?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketSession {
    pub weather: u8,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    pub track_length: u16,
    pub session_type: u8,
    pub track_id: i8,
    pub formula: u8,
    /// Seconds.
    pub session_time_left: u16,
    pub session_duration: u16,
    pub pit_speed_limit: u8,
    pub game_paused: u8,
    pub is_spectating: u8,
    pub spectator_car_index: u8,
    pub sli_pro_native_support: u8,
    /// Zones actually in use; the unused wire slots are dropped.
    pub marshal_zones: Vec<MarshalZone>,
    /// 0 none, 1 full, 2 virtual, 3 formation lap.
    pub safety_car_status: u8,
    pub network_game: u8,
    pub weather_forecast_samples: Vec<WeatherForecastSample>,
    pub forecast_accuracy: u8,
    pub ai_difficulty: u8,
    pub season_link_identifier: u32,
    pub weekend_link_identifier: u32,
    pub session_link_identifier: u32,
    pub pit_stop_window_ideal_lap: u8,
    pub pit_stop_window_latest_lap: u8,
    pub pit_stop_rejoin_position: u8,
    pub assists: SessionAssists,
    /// Minutes since midnight.
    pub time_of_day: u32,
    pub session_length: u8,
    pub speed_units_lead_player: u8,
    pub temperature_units_lead_player: u8,
    pub speed_units_secondary_player: u8,
    pub temperature_units_secondary_player: u8,
    pub num_safety_car_periods: u8,
    pub num_virtual_safety_car_periods: u8,
    pub num_red_flag_periods: u8,
    pub rules: SessionRules,
    pub weekend_structure: Vec<u8>,
    pub sector2_lap_distance_start: f32,
    pub sector3_lap_distance_start: f32,
}

impl PacketSession {
    pub fn decode(r: &mut ByteReader<'_>, format: u16) -> Result<Self, DecodeError> {
        // Same layout in 2024 and 2025.
        let _format = PacketFormat::from_raw(format)?;

        let weather = r.u8()?;
        let track_temperature = r.i8()?;
        let air_temperature = r.i8()?;
        let total_laps = r.u8()?;
        let track_length = r.u16_le()?;
        let session_type = r.u8()?;
        let track_id = r.i8()?;
        let formula = r.u8()?;
        let session_time_left = r.u16_le()?;
        let session_duration = r.u16_le()?;
        let pit_speed_limit = r.u8()?;
        let game_paused = r.u8()?;
        let is_spectating = r.u8()?;
        let spectator_car_index = r.u8()?;
        let sli_pro_native_support = r.u8()?;

        let num_marshal_zones =
            DecodeError::check_count("numMarshalZones", r.u8()?, MAX_MARSHAL_ZONES)?;
        let mut marshal_zones = Vec::with_capacity(num_marshal_zones);
        for slot in 0..MAX_MARSHAL_ZONES {
            let zone = MarshalZone {
                zone_start: r.f32_le()?,
                zone_flag: r.i8()?,
            };
            if slot < num_marshal_zones {
                marshal_zones.push(zone);
            }
        }

        let safety_car_status = r.u8()?;
        let network_game = r.u8()?;

        let num_samples = DecodeError::check_count(
            "numWeatherForecastSamples",
            r.u8()?,
            MAX_WEATHER_FORECAST_SAMPLES,
        )?;
        let mut weather_forecast_samples = Vec::with_capacity(num_samples);
        for slot in 0..MAX_WEATHER_FORECAST_SAMPLES {
            let sample = WeatherForecastSample::decode(r)?;
            if slot < num_samples {
                weather_forecast_samples.push(sample);
            }
        }

        let forecast_accuracy = r.u8()?;
        let ai_difficulty = r.u8()?;
        let season_link_identifier = r.u32_le()?;
        let weekend_link_identifier = r.u32_le()?;
        let session_link_identifier = r.u32_le()?;
        let pit_stop_window_ideal_lap = r.u8()?;
        let pit_stop_window_latest_lap = r.u8()?;
        let pit_stop_rejoin_position = r.u8()?;

        let assists = SessionAssists {
            steering_assist: r.u8()?,
            braking_assist: r.u8()?,
            gearbox_assist: r.u8()?,
            pit_assist: r.u8()?,
            pit_release_assist: r.u8()?,
            ers_assist: r.u8()?,
            drs_assist: r.u8()?,
            dynamic_racing_line: r.u8()?,
            dynamic_racing_line_type: r.u8()?,
            game_mode: r.u8()?,
            rule_set: r.u8()?,
        };

        let time_of_day = r.u32_le()?;
        let session_length = r.u8()?;
        let speed_units_lead_player = r.u8()?;
        let temperature_units_lead_player = r.u8()?;
        let speed_units_secondary_player = r.u8()?;
        let temperature_units_secondary_player = r.u8()?;
        let num_safety_car_periods = r.u8()?;
        let num_virtual_safety_car_periods = r.u8()?;
        let num_red_flag_periods = r.u8()?;
        let rules = SessionRules::decode(r)?;

        let num_sessions = DecodeError::check_count(
            "numSessionsInWeekend",
            r.u8()?,
            MAX_SESSIONS_IN_WEEKEND,
        )?;
        let structure: [u8; MAX_SESSIONS_IN_WEEKEND] = r.u8_array()?;
        let weekend_structure = structure.iter().take(num_sessions).copied().collect();

        let sector2_lap_distance_start = r.f32_le()?;
        let sector3_lap_distance_start = r.f32_le()?;

        Ok(Self {
            weather,
            track_temperature,
            air_temperature,
            total_laps,
            track_length,
            session_type,
            track_id,
            formula,
            session_time_left,
            session_duration,
            pit_speed_limit,
            game_paused,
            is_spectating,
            spectator_car_index,
            sli_pro_native_support,
            marshal_zones,
            safety_car_status,
            network_game,
            weather_forecast_samples,
            forecast_accuracy,
            ai_difficulty,
            season_link_identifier,
            weekend_link_identifier,
            session_link_identifier,
            pit_stop_window_ideal_lap,
            pit_stop_window_latest_lap,
            pit_stop_rejoin_position,
            assists,
            time_of_day,
            session_length,
            speed_units_lead_player,
            temperature_units_lead_player,
            speed_units_secondary_player,
            temperature_units_secondary_player,
            num_safety_car_periods,
            num_virtual_safety_car_periods,
            num_red_flag_periods,
            rules,
            weekend_structure,
            sector2_lap_distance_start,
            sector3_lap_distance_start,
        })
    }
}
