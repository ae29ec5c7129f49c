use crate::model::{Coordinate, WeatherReading};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

pub use openweather::OpenWeatherProvider;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Could not parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Response is missing {0}")]
    MissingField(&'static str),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, coord: Coordinate) -> Result<WeatherReading, FetchError>;
}

/// Fetch one reading, treating any failure as "no data".
pub async fn fetch_or_none(
    provider: &dyn WeatherProvider,
    coord: Coordinate,
) -> Option<WeatherReading> {
    match provider.fetch_weather(coord).await {
        Ok(reading) => Some(reading),
        Err(FetchError::Http { status, .. }) => {
            tracing::debug!(%coord, status, "weather provider returned no data");
            None
        }
        Err(FetchError::Network(e)) => {
            tracing::debug!(%coord, error = %e, "network error");
            None
        }
        Err(e) => {
            tracing::debug!(%coord, error = %e, "could not parse weather response");
            None
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
