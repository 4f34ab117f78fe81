//! Pure helpers turning raw provider values into the units and wording used
//! in a [`WeatherReading`](crate::WeatherReading).

use crate::model::{PressureUnit, VisibilityUnit};

/// Multiplier applied to hPa when "mb" is requested.
///
/// 1 hPa is 1 mb, so this factor is dimensionally wrong. It is kept because
/// clients already depend on the values it produces; see
/// [`convert_pressure_corrected`].
pub const HPA_TO_MB_FACTOR: f64 = 0.01;

pub const KM_TO_MILES_FACTOR: f64 = 0.621371;

/// Returned for any code missing from the WMO table.
pub const UNKNOWN_CONDITION: &str = "unknown";

/// Map a WMO weather interpretation code to a lowercase description.
pub fn code_to_condition(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "fog",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "moderate drizzle",
        55 => "dense drizzle",
        56 => "light freezing drizzle",
        57 => "dense freezing drizzle",
        61 => "slight rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 => "light freezing rain",
        67 => "heavy freezing rain",
        71 => "slight snow fall",
        73 => "moderate snow fall",
        75 => "heavy snow fall",
        77 => "snow grains",
        80 => "slight rain showers",
        81 => "moderate rain showers",
        82 => "violent rain showers",
        85 => "slight snow showers",
        86 => "heavy snow showers",
        95 => "thunderstorm",
        96 => "thunderstorm with slight hail",
        99 => "thunderstorm with heavy hail",
        _ => UNKNOWN_CONDITION,
    }
}

pub fn convert_pressure(hpa: f64, to: PressureUnit) -> f64 {
    match to {
        PressureUnit::HPa => hpa,
        PressureUnit::Mb => hpa * HPA_TO_MB_FACTOR,
    }
}

/// hPa and mb are the same unit, so both targets are the identity.
pub fn convert_pressure_corrected(hpa: f64, _to: PressureUnit) -> f64 {
    hpa
}

pub fn convert_visibility(km: f64, to: VisibilityUnit) -> f64 {
    match to {
        VisibilityUnit::Km => km,
        VisibilityUnit::Miles => km * KM_TO_MILES_FACTOR,
    }
}

/// Fold any finite bearing into `[0, 360)`.
pub fn normalize_direction(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if d >= 360.0 { 0.0 } else { d }
}
