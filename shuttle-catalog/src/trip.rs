use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a shuttle run goes relative to the airport.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[serde(alias = "to-destination")]
    ToAirport,
    #[serde(alias = "from-destination")]
    FromAirport,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ToAirport => "to-airport",
            Direction::FromAirport => "from-airport",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single scheduled one-way shuttle run.
///
/// Trips are reference data: they are fixed when the catalog is built and
/// never change at runtime. `price` is in whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub direction: Direction,
    /// 24-hour `HH:MM`
    pub departure_time: String,
    pub departure_time_display: String,
    pub price: i32,
    pub route: String,
    pub duration: String,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl Trip {
    pub fn new(
        id: &str,
        direction: Direction,
        departure_time: &str,
        departure_time_display: &str,
        price: i32,
        route: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            direction,
            departure_time: departure_time.to_string(),
            departure_time_display: departure_time_display.to_string(),
            price,
            route: route.to_string(),
            duration: "45 minutes".to_string(),
            is_available: true,
        }
    }
}
