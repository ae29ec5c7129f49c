use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{Coordinate, WeatherReading};

use super::{FetchError, WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_client(api_key: String, base_url: impl Into<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            http,
        }
    }

    async fn fetch_current(&self, coord: Coordinate) -> Result<WeatherReading, FetchError> {
        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coord.latitude.to_string()),
                ("lon", coord.longitude.to_string()),
                ("units", "metric".to_string()),
                ("APPID", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        parsed.into_reading()
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    id: u64,
    name: String,
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    #[serde(default)]
    sys: OwSys,
}

impl OwCurrentResponse {
    fn into_reading(self) -> Result<WeatherReading, FetchError> {
        let weather = self
            .weather
            .into_iter()
            .next()
            .ok_or(FetchError::MissingField("weather[0]"))?;

        Ok(WeatherReading {
            id: self.id,
            location_name: self.name,
            location_country: self.sys.country,
            weather_description: weather.description,
            icon_code: weather.icon,
            temp: self.main.temp,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            observed_at: self.dt.and_then(unix_to_utc),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(&self, coord: Coordinate) -> Result<WeatherReading, FetchError> {
        self.fetch_current(coord).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.1, "lat": 51.5},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "base": "stations",
        "main": {
            "temp": 14.2, "pressure": 1012, "humidity": 72,
            "temp_min": 12.8, "temp_max": 15.6
        },
        "visibility": 10000,
        "wind": {"speed": 4.1},
        "clouds": {"all": 75},
        "dt": 1700000000,
        "sys": {
            "type": 2, "id": 2019646, "message": 0.0, "country": "GB",
            "sunrise": 1699945000, "sunset": 1699978000
        },
        "id": 2643743,
        "name": "London",
        "cod": 200
    }"#;

    #[test]
    fn projects_consumed_subset() {
        let parsed: OwCurrentResponse = serde_json::from_str(LONDON).expect("valid json");
        let reading = parsed.into_reading().expect("reading");

        assert_eq!(reading.id, 2643743);
        assert_eq!(reading.location_name, "London");
        assert_eq!(reading.location_country, "GB");
        assert_eq!(reading.weather_description, "broken clouds");
        assert_eq!(reading.icon_code, "04d");
        assert_eq!(reading.temp, 14.2);
        assert_eq!(reading.temp_min, 12.8);
        assert_eq!(reading.temp_max, 15.6);
        assert_eq!(reading.observed_at.map(|t| t.timestamp()), Some(1700000000));
    }

    #[test]
    fn empty_weather_list_is_missing_field() {
        let json = r#"{"id": 1, "name": "Nowhere",
                      "main": {"temp": 1.0, "temp_min": 0.0, "temp_max": 2.0}, "weather": []}"#;
        let parsed: OwCurrentResponse = serde_json::from_str(json).expect("valid json");

        let err = parsed.into_reading().unwrap_err();
        assert!(matches!(err, FetchError::MissingField("weather[0]")));
    }

    #[test]
    fn missing_sys_leaves_country_empty() {
        let json = r#"{"id": 1, "name": "Sea",
                      "main": {"temp": 1.0, "temp_min": 0.0, "temp_max": 2.0},
                      "weather": [{"description": "clear sky", "icon": "01n"}]}"#;
        let parsed: OwCurrentResponse = serde_json::from_str(json).expect("valid json");

        let reading = parsed.into_reading().expect("reading");
        assert_eq!(reading.location_country, "");
        assert!(reading.observed_at.is_none());
    }
}
