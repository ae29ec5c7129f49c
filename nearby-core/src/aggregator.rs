//! Fan-out/fan-in of the center reading and its four neighbours.
//!
//! One cycle resolves the current coordinate, derives the four single-axis
//! offsets, fetches all five readings concurrently and commits them into a
//! [`WeatherState`] in issue order. A failed fetch only empties its own slot.
//! The caller's [`CancellationToken`] is checked after every suspension
//! point; once it is cancelled nothing is written.

use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::{
    location::LocationProvider,
    model::{Coordinate, DEFAULT_DISTANCE, Direction, NearbyWeather, WeatherReading},
    provider::{WeatherProvider, fetch_or_none},
};

/// The four neighbours of `center`, in [`Direction::all`] order.
pub fn nearby_coordinates(center: Coordinate, distance: f64) -> [Coordinate; 4] {
    Direction::all().map(|direction| center.offset(direction, distance))
}

/// Display state owned by whoever drives the cycle. Stays empty ("loading")
/// until a cycle completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub primary: Option<WeatherReading>,
    pub nearby: Vec<Option<WeatherReading>>,
}

impl WeatherState {
    pub fn is_loading(&self) -> bool {
        self.primary.is_none()
    }

    fn commit(&mut self, weather: NearbyWeather) {
        self.primary = weather.primary;
        self.nearby = weather.nearby;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Updated,
    LocationFailed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherProvider>,
    distance: f64,
}

impl Aggregator {
    pub fn new(location: Arc<dyn LocationProvider>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            location,
            weather,
            distance: DEFAULT_DISTANCE,
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Fetch `center` and its neighbours concurrently.
    pub async fn gather(&self, center: Coordinate) -> NearbyWeather {
        let coords = std::iter::once(center).chain(nearby_coordinates(center, self.distance));

        let provider = self.weather.as_ref();
        let mut results = join_all(coords.map(|coord| fetch_or_none(provider, coord))).await;

        let nearby = results.split_off(1);
        let primary = results.pop().flatten();

        NearbyWeather { primary, nearby }
    }

    /// Run one full cycle and commit into `state` unless `liveness` was
    /// cancelled first.
    pub async fn init_weather(
        &self,
        state: &mut WeatherState,
        liveness: &CancellationToken,
    ) -> InitOutcome {
        let center = match self.location.current_coordinates().await {
            Ok(coord) => coord,
            Err(e) => {
                tracing::debug!(error = %e, "could not get the location");
                return InitOutcome::LocationFailed;
            }
        };

        if liveness.is_cancelled() {
            tracing::debug!("torn down after location lookup, discarding");
            return InitOutcome::Cancelled;
        }

        tracing::info!(%center, distance = self.distance, "fetching weather");
        let weather = self.gather(center).await;

        if liveness.is_cancelled() {
            tracing::debug!("torn down during fetch, discarding results");
            return InitOutcome::Cancelled;
        }

        let missing = weather.nearby.iter().filter(|slot| slot.is_none()).count();
        if missing > 0 {
            tracing::debug!(missing, "some nearby readings are unavailable");
        }

        state.commit(weather);
        InitOutcome::Updated
    }

    /// [`Self::init_weather`], abandoned as soon as `liveness` is cancelled
    /// instead of after the pending requests settle. Dropping the cycle drops
    /// its in-flight requests.
    pub async fn run_until_teardown(
        &self,
        state: &mut WeatherState,
        liveness: &CancellationToken,
    ) -> InitOutcome {
        tokio::select! {
            outcome = self.init_weather(state, liveness) => outcome,
            () = liveness.cancelled() => {
                tracing::debug!("torn down, abandoning weather cycle");
                InitOutcome::Cancelled
            }
        }
    }
}
