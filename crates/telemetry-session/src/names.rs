//! Display names for the enumerated codes the game sends.
//!
//! Every lookup falls back to `"Unknown"` for codes outside its table.

const UNKNOWN: &str = "Unknown";

// ── Weather ───────────────────────────────────────────────────────────────────

/// Maps `m_weather` to a weather-condition name (sunny … lightning-rainy).
pub fn weather_name(weather: u8) -> &'static str {
    match weather {
        0 => "sunny",
        1 => "partlycloudy",
        2 => "cloudy",
        3 => "rainy",
        4 => "pouring",
        5 => "lightning-rainy",
        _ => UNKNOWN,
    }
}

// ── Flags and safety car ──────────────────────────────────────────────────────

pub fn safety_car_name(status: u8) -> &'static str {
    match status {
        0 => "No Safety Car",
        1 => "Safety Car",
        2 => "Virtual Safety Car",
        3 => "Formation Lap",
        _ => UNKNOWN,
    }
}

/// Maps `m_vehicleFiaFlags` (-1 … 4) to a flag name.
pub fn fia_flag_name(flag: i8) -> &'static str {
    match flag {
        -1 => UNKNOWN,
        0 => "None",
        1 => "Green",
        2 => "Blue",
        3 => "Yellow",
        4 => "Red",
        _ => UNKNOWN,
    }
}

// ── Car status ────────────────────────────────────────────────────────────────

pub fn ers_mode_name(mode: u8) -> &'static str {
    match mode {
        0 => "None",
        1 => "Medium",
        2 => "Hotlap",
        3 => "Overtake",
        _ => UNKNOWN,
    }
}

/// Maps `m_visualTyreCompound` to the compound shown on the tyre wall.
pub fn visual_tyre_compound_name(compound: u8) -> &'static str {
    match compound {
        16 => "Soft",
        17 => "Medium",
        18 => "Hard",
        7 => "Inter",
        8 => "Wet",
        _ => UNKNOWN,
    }
}

pub fn pit_status_name(status: u8) -> &'static str {
    match status {
        0 => "None",
        1 => "Pitting",
        2 => "In Pit Area",
        _ => UNKNOWN,
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

pub fn session_type_name(session_type: u8) -> &'static str {
    match session_type {
        0 => UNKNOWN,
        1 => "Practice 1",
        2 => "Practice 2",
        3 => "Practice 3",
        4 => "Short Practice",
        5 => "Qualifying 1",
        6 => "Qualifying 2",
        7 => "Qualifying 3",
        8 => "Short Qualifying",
        9 => "One-Shot Qualifying",
        10 => "Race",
        11 => "Race 2",
        12 => "Race 3",
        13 => "Time Trial",
        _ => UNKNOWN,
    }
}

/// Maps `m_trackId` to a circuit name. Negative ids (unknown track) and ids
/// past the table return `"Unknown"`.
pub fn track_name(track_id: i8) -> &'static str {
    const NAMES: &[&str] = &[
        "Melbourne",         // 0
        "Paul Ricard",       // 1
        "Shanghai",          // 2
        "Sakhir (Bahrain)",  // 3
        "Catalunya",         // 4
        "Monaco",            // 5
        "Montreal",          // 6
        "Silverstone",       // 7
        "Hockenheim",        // 8
        "Hungaroring",       // 9
        "Spa",               // 10
        "Monza",             // 11
        "Singapore",         // 12
        "Suzuka",            // 13
        "Abu Dhabi",         // 14
        "Texas",             // 15
        "Brazil",            // 16
        "Austria",           // 17
        "Sochi",             // 18
        "Mexico",            // 19
        "Baku",              // 20
        "Sakhir Short",      // 21
        "Silverstone Short", // 22
        "Texas Short",       // 23
        "Suzuka Short",      // 24
        "Hanoi",             // 25
        "Zandvoort",         // 26
        "Imola",             // 27
        "Portimao",          // 28
        "Jeddah",            // 29
        "Miami",             // 30
        "Las Vegas",         // 31
        "Losail",            // 32
    ];
    usize::try_from(track_id)
        .ok()
        .and_then(|idx| NAMES.get(idx))
        .copied()
        .unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_names() {
        assert_eq!(track_name(0), "Melbourne");
        assert_eq!(track_name(20), "Baku");
        assert_eq!(track_name(32), "Losail");
        assert_eq!(track_name(33), "Unknown");
        assert_eq!(track_name(-1), "Unknown");
    }

    #[test]
    fn test_session_types() {
        assert_eq!(session_type_name(10), "Race");
        assert_eq!(session_type_name(13), "Time Trial");
        assert_eq!(session_type_name(0), "Unknown");
        assert_eq!(session_type_name(200), "Unknown");
    }

    #[test]
    fn test_weather_and_flags() {
        assert_eq!(weather_name(0), "sunny");
        assert_eq!(weather_name(5), "lightning-rainy");
        assert_eq!(weather_name(6), "Unknown");
        assert_eq!(fia_flag_name(-1), "Unknown");
        assert_eq!(fia_flag_name(3), "Yellow");
        assert_eq!(fia_flag_name(4), "Red");
        assert_eq!(safety_car_name(3), "Formation Lap");
    }

    #[test]
    fn test_status_tables() {
        assert_eq!(ers_mode_name(3), "Overtake");
        assert_eq!(ers_mode_name(4), "Unknown");
        assert_eq!(visual_tyre_compound_name(16), "Soft");
        assert_eq!(visual_tyre_compound_name(7), "Inter");
        assert_eq!(visual_tyre_compound_name(12), "Unknown");
        assert_eq!(pit_status_name(1), "Pitting");
    }
}
