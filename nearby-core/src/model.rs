use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Offset applied to the center coordinate, in degrees.
pub const DEFAULT_DISTANCE: f64 = 0.5;

/// Zero collapses the neighbours onto the center and a negative offset swaps
/// them, so only finite positive distances are usable.
pub fn is_valid_distance(distance: f64) -> bool {
    distance.is_finite() && distance > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Move `distance` degrees along a single axis.
    pub fn offset(self, direction: Direction, distance: f64) -> Self {
        match direction {
            Direction::North => Self::new(self.latitude + distance, self.longitude),
            Direction::South => Self::new(self.latitude - distance, self.longitude),
            Direction::East => Self::new(self.latitude, self.longitude + distance),
            Direction::West => Self::new(self.latitude, self.longitude - distance),
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Issue order of the nearby fetches.
    pub const fn all() -> [Direction; 4] {
        [Direction::North, Direction::South, Direction::East, Direction::West]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flattened projection of a single current-weather response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub id: u64,
    pub location_name: String,
    pub location_country: String,
    pub weather_description: String,
    pub icon_code: String,
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Result of one fan-out cycle. `nearby` keeps issue order, one slot per
/// [`Direction`], with `None` where that fetch produced no data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearbyWeather {
    pub primary: Option<WeatherReading>,
    pub nearby: Vec<Option<WeatherReading>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_changes_one_axis_only() {
        let c = Coordinate::new(10.0, 20.0);

        assert_eq!(c.offset(Direction::North, 1.0), Coordinate::new(11.0, 20.0));
        assert_eq!(c.offset(Direction::South, 1.0), Coordinate::new(9.0, 20.0));
        assert_eq!(c.offset(Direction::East, 1.0), Coordinate::new(10.0, 21.0));
        assert_eq!(c.offset(Direction::West, 1.0), Coordinate::new(10.0, 19.0));
    }

    #[test]
    fn directions_are_in_issue_order() {
        let names: Vec<_> = Direction::all().iter().map(Direction::as_str).collect();
        assert_eq!(names, ["north", "south", "east", "west"]);
    }

    #[test]
    fn only_finite_positive_distances_are_valid() {
        assert!(is_valid_distance(0.5));
        assert!(is_valid_distance(3.0));
        assert!(!is_valid_distance(0.0));
        assert!(!is_valid_distance(-0.5));
        assert!(!is_valid_distance(f64::NAN));
        assert!(!is_valid_distance(f64::INFINITY));
    }

    #[test]
    fn coordinate_display() {
        assert_eq!(Coordinate::new(51.5, -0.1).to_string(), "(51.5, -0.1)");
    }
}
