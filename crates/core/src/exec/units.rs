/// Unit suffix appended to values of `row`. Unknown rows have none.
pub fn unit(row: &str) -> &'static str {
    match row {
        "temperature_max" | "temperature_min" => "°",
        "precipitation_sum" => "in",
        "wind_speed_max" => "mph",
        "precipitation_probability_max" => "%",
        _ => "",
    }
}

/// Human name of a WMO weather interpretation code.
pub fn weather_code_name(code: i64) -> Option<&'static str> {
    Some(match code {
        0 => "Clear Sky",
        1 => "Mainly Clear",
        2 => "Partly Cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Fog (depositing rime)",
        51 => "Drizzle (Light)",
        53 => "Drizzle (Moderate)",
        55 => "Drizzle (Heavy)",
        56 => "Freezing Drizzle (Light)",
        57 => "Freezing Drizzle (Heavy)",
        61 => "Rain (Light)",
        63 => "Rain (Moderate)",
        65 => "Rain (Heavy)",
        71 => "Snow (Light)",
        73 => "Snow (Moderate)",
        75 => "Snow (Heavy)",
        77 => "Snow (grains)",
        80 => "Rain Shower (Light)",
        81 => "Rain Shower (Moderate)",
        82 => "Rain Shower (Heavy)",
        85 => "Snow Shower (Light)",
        86 => "Snow Shower (Heavy)",
        95 => "Thunderstorm",
        96 => "Thunderstorm with Hail (Slight)",
        99 => "Thunderstorm with Hail (Heavy)",
        _ => return None,
    })
}

/// `"{code} - {name}"`, with `Unknown` for unmapped codes.
pub fn weather_code_label(code: i64) -> String {
    format!("{code} - {}", weather_code_name(code).unwrap_or("Unknown"))
}

/// Weather code of a raw dataset or aggregate value. Fractional values
/// (e.g. an average) are truncated.
pub fn weather_code_of(value: f64) -> i64 {
    value.trunc() as i64
}

/// Render a table cell: weather codes get their label, everything else its
/// unit.
pub fn cell(row: &str, raw: &str) -> String {
    match row {
        "date" => raw.to_string(),
        "weather_code" => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => weather_code_label(weather_code_of(v)),
            _ => raw.to_string(),
        },
        _ => format!("{raw}{}", unit(row)),
    }
}

/// Format a number the way results are printed: integers without a
/// fractional part.
pub fn number(value: f64) -> String {
    value.to_string()
}
