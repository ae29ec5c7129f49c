use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    location::{DEFAULT_IP_LOCATION_URL, FixedLocation, IpLocation, LocationProvider},
    model::{Coordinate, DEFAULT_DISTANCE, is_valid_distance},
    provider::openweather::{DEFAULT_BASE_URL, OpenWeatherProvider},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPEN_WEATHER_MAP_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Look the position up from the public IP address.
    #[default]
    Ip,
    /// Use the configured latitude/longitude.
    Fixed,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::Ip => "ip",
            LocationSource::Fixed => "fixed",
        }
    }

    pub const fn all() -> &'static [LocationSource] {
        &[LocationSource::Ip, LocationSource::Fixed]
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current position comes from.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocationConfig {
    #[serde(default)]
    pub source: LocationSource,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Overrides the IP lookup endpoint.
    pub lookup_url: Option<String>,
}

impl LocationConfig {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// distance = 0.5
///
/// [location]
/// source = "fixed"
/// latitude = 51.5
/// longitude = -0.1
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Weather API root, e.g. "https://api.openweathermap.org".
    pub base_url: Option<String>,

    /// Offset of the nearby points in degrees.
    pub distance: Option<f64>,

    /// HTTP timeout; transport default when absent.
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "nearby-weather", "nearby-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        let key = std::env::var(API_KEY_ENV).ok();
        self.with_api_key_override(key)
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn distance(&self) -> f64 {
        match self.distance {
            Some(distance) if is_valid_distance(distance) => distance,
            Some(distance) => {
                tracing::warn!(distance, "ignoring unusable distance, using {DEFAULT_DISTANCE}");
                DEFAULT_DISTANCE
            }
            None => DEFAULT_DISTANCE,
        }
    }

    pub fn http_client(&self) -> Result<Client> {
        let mut builder = Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }

    /// A missing API key is not rejected here; the provider answers 401 and
    /// the cycle shows as still loading.
    pub fn weather_provider(&self, http: Client) -> OpenWeatherProvider {
        OpenWeatherProvider::with_client(
            self.api_key.clone().unwrap_or_default(),
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            http,
        )
    }

    pub fn location_provider(&self, http: Client) -> Arc<dyn LocationProvider> {
        match self.location.source {
            LocationSource::Fixed => Arc::new(FixedLocation::new(self.location.coordinate())),
            LocationSource::Ip => Arc::new(IpLocation::with_base_url(
                http,
                self.location.lookup_url.as_deref().unwrap_or(DEFAULT_IP_LOCATION_URL),
            )),
        }
    }
}
