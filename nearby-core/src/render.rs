//! Plain-text views of weather readings.

use std::fmt::Write;

use crate::model::WeatherReading;

pub const CELSIUS_SYMBOL: &str = "°C";

pub const LOADING: &str = "Loading";

pub fn icon_url(icon_code: &str) -> String {
    format!("https://openweathermap.org/img/w/{icon_code}.png")
}

/// The reading for the current position, or the loading placeholder.
pub fn render_primary(reading: Option<&WeatherReading>) -> String {
    match reading {
        Some(reading) => render_reading(reading, ""),
        None => LOADING.to_string(),
    }
}

/// One indented block per available nearby reading; empty slots are skipped.
pub fn render_nearby(readings: &[Option<WeatherReading>]) -> String {
    readings
        .iter()
        .flatten()
        .map(|reading| render_reading(reading, "  "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_reading(reading: &WeatherReading, indent: &str) -> String {
    let mut out = String::new();

    // Writing into a String never fails.
    let _ = writeln!(
        out,
        "{indent}{} {}",
        reading.location_name, reading.location_country
    );
    let _ = writeln!(
        out,
        "{indent}{}, {}{CELSIUS_SYMBOL}",
        reading.weather_description, reading.temp
    );
    let _ = writeln!(out, "{indent}Min Temp: {}{CELSIUS_SYMBOL}", reading.temp_min);
    let _ = writeln!(out, "{indent}Max Temp: {}{CELSIUS_SYMBOL}", reading.temp_max);
    let _ = writeln!(out, "{indent}{}", icon_url(&reading.icon_code));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(name: &str, country: &str) -> WeatherReading {
        WeatherReading {
            id: 7,
            location_name: name.to_string(),
            location_country: country.to_string(),
            weather_description: "light rain".to_string(),
            icon_code: "10d".to_string(),
            temp: 11.5,
            temp_min: 9.0,
            temp_max: 13.25,
            observed_at: None,
        }
    }

    #[test]
    fn missing_primary_renders_loading() {
        assert_eq!(render_primary(None), "Loading");
    }

    #[test]
    fn primary_lists_all_fields() {
        let text = render_primary(Some(&reading("London", "GB")));

        assert_eq!(
            text,
            "London GB\n\
             light rain, 11.5°C\n\
             Min Temp: 9°C\n\
             Max Temp: 13.25°C\n\
             https://openweathermap.org/img/w/10d.png\n"
        );
    }

    #[test]
    fn nearby_skips_empty_slots() {
        let slots = vec![
            Some(reading("Luton", "GB")),
            None,
            Some(reading("Romford", "GB")),
            None,
        ];

        let text = render_nearby(&slots);
        assert!(text.contains("Luton GB"));
        assert!(text.contains("Romford GB"));
        assert_eq!(text.matches("Min Temp").count(), 2);
    }

    #[test]
    fn nearby_with_no_readings_is_empty() {
        assert_eq!(render_nearby(&[None, None, None, None]), "");
    }

    #[test]
    fn icon_url_embeds_code() {
        assert_eq!(icon_url("01n"), "https://openweathermap.org/img/w/01n.png");
    }
}
