//! Single-shot geolocation.
//!
//! A [`LocationProvider`] answers "where am I right now" exactly once per
//! call. There is no watch/subscription mode and no retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

use crate::model::Coordinate;

pub const DEFAULT_IP_LOCATION_URL: &str = "http://ip-api.com";

#[derive(Debug, Error)]
pub enum LocationError {
    /// The location capability is absent altogether.
    #[error("Geolocation is not available")]
    Unavailable,

    /// The lookup was attempted and failed.
    #[error("Could not get the location: {0}")]
    Failed(String),
}

#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn current_coordinates(&self) -> Result<Coordinate, LocationError>;
}

/// Location taken from configuration or the command line.
#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    coordinate: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(coordinate: Option<Coordinate>) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_coordinates(&self) -> Result<Coordinate, LocationError> {
        self.coordinate.ok_or(LocationError::Unavailable)
    }
}

/// Approximate location derived from the public IP address.
#[derive(Debug, Clone)]
pub struct IpLocation {
    base_url: String,
    http: Client,
}

impl IpLocation {
    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

#[async_trait]
impl LocationProvider for IpLocation {
    async fn current_coordinates(&self) -> Result<Coordinate, LocationError> {
        let url = format!("{}/json", self.base_url.trim_end_matches('/'));

        let res = self
            .http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(|e| LocationError::Failed(format!("request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocationError::Failed(format!("lookup returned status {status}")));
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Failed(format!("malformed response: {e}")))?;

        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(LocationError::Failed(format!("lookup denied: {reason}")));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinate::new(latitude, longitude)),
            _ => Err(LocationError::Failed("response is missing lat/lon".to_string())),
        }
    }
}
