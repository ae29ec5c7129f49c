//! Core library for the `nearby-weather` CLI.
//!
//! This crate defines:
//! - Geolocation (single-shot, fixed or IP based)
//! - The OpenWeatherMap current-weather fetcher
//! - The aggregator that fans out over the center and four nearby points
//! - Plain-text rendering and configuration handling
//!
//! It is used by `nearby-cli`, but can also be reused by other binaries or services.

pub mod aggregator;
pub mod config;
pub mod location;
pub mod model;
pub mod provider;
pub mod render;

pub use aggregator::{Aggregator, InitOutcome, WeatherState, nearby_coordinates};
pub use config::{Config, LocationConfig, LocationSource};
pub use location::{FixedLocation, IpLocation, LocationError, LocationProvider};
pub use model::{
    Coordinate, DEFAULT_DISTANCE, Direction, NearbyWeather, WeatherReading, is_valid_distance,
};
pub use provider::{FetchError, OpenWeatherProvider, WeatherProvider};
