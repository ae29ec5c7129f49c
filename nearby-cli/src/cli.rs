use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text};
use nearby_core::{
    Aggregator, Config, Coordinate, FixedLocation, LocationProvider, LocationSource,
    NearbyWeather, WeatherState, is_valid_distance, render,
};
use tokio_util::sync::CancellationToken;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "nearby-weather",
    version,
    about = "Current weather here and half a degree around"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key and location source.
    Configure,

    /// Show weather for the current position and its four neighbours.
    Show {
        /// Latitude to use instead of the configured location source.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude to use instead of the configured location source.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Offset of the nearby points in degrees.
        #[arg(long, value_parser = parse_distance, allow_negative_numbers = true)]
        distance: Option<f64>,

        /// Print the readings as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the config file location.
    ConfigPath,
}

fn parse_distance(s: &str) -> Result<f64, String> {
    let distance: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if is_valid_distance(distance) {
        Ok(distance)
    } else {
        Err(format!("{s} is not a positive number of degrees"))
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                lat,
                lon,
                distance,
                json,
            } => {
                let at = lat.zip(lon).map(|(lat, lon)| Coordinate::new(lat, lon));
                show(at, distance, json).await
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn show(at: Option<Coordinate>, distance: Option<f64>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?.with_env_overrides();
    let http = config.http_client()?;

    let location: Arc<dyn LocationProvider> = match at {
        Some(coord) => Arc::new(FixedLocation::new(Some(coord))),
        None => config.location_provider(http.clone()),
    };
    let aggregator = Aggregator::new(location, Arc::new(config.weather_provider(http)))
        .with_distance(distance.unwrap_or_else(|| config.distance()));

    // Ctrl-C tears the view down; the cycle is abandoned and nothing is shown.
    let liveness = CancellationToken::new();
    let teardown = liveness.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            teardown.cancel();
        }
    });

    let mut state = WeatherState::default();
    let outcome = aggregator.run_until_teardown(&mut state, &liveness).await;
    tracing::debug!(?outcome, "weather cycle finished");

    if liveness.is_cancelled() {
        return Ok(());
    }

    if json {
        let weather = NearbyWeather {
            primary: state.primary,
            nearby: state.nearby,
        };
        let out = serde_json::to_string_pretty(&weather).context("Failed to serialize weather")?;
        println!("{out}");
        return Ok(());
    }

    println!("{}", render::render_primary(state.primary.as_ref()));

    let nearby = render::render_nearby(&state.nearby);
    if !nearby.is_empty() {
        println!("Nearby:");
        println!("{nearby}");
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Text::new("OpenWeatherMap API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read API key")?;
    config.api_key = Some(api_key.trim().to_string()).filter(|k| !k.is_empty());

    let source = Select::new("Location source:", LocationSource::all().to_vec())
        .prompt()
        .context("Failed to read location source")?;
    config.location.source = source;

    if source == LocationSource::Fixed {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Failed to read longitude")?;

        config.location.latitude = Some(latitude);
        config.location.longitude = Some(longitude);
    }

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["nearby-weather", "show", "--lat", "51.5", "--lon", "-0.1"])
                .expect("valid args");

        match cli.command {
            Command::Show { lat, lon, .. } => {
                assert_eq!(lat, Some(51.5));
                assert_eq!(lon, Some(-0.1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn distance_must_be_finite_and_positive() {
        for bad in ["0", "-0.5", "NaN", "inf", "far"] {
            let err = Cli::try_parse_from(["nearby-weather", "show", "--distance", bad])
                .expect_err(bad);
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{bad}");
        }

        let cli = Cli::try_parse_from(["nearby-weather", "show", "--distance", "1.5"])
            .expect("valid distance");
        match cli.command {
            Command::Show { distance, .. } => assert_eq!(distance, Some(1.5)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn lat_without_lon_is_rejected() {
        let err = Cli::try_parse_from(["nearby-weather", "show", "--lat", "51.5"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
