use std::fmt;

use crate::error::EngineError;
use crate::services::RouteResult;

/// A planned route, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneySummary {
    /// Whole minutes, e.g. "12 minutes".
    pub duration: String,
    /// Kilometres to two decimals, e.g. "8.35 km".
    pub distance: String,
}

impl JourneySummary {
    pub fn from_route(route: &RouteResult) -> Self {
        let minutes = (route.duration_seconds / 60.0).round() as u64;
        Self {
            duration: format!("{minutes} minutes"),
            distance: format!("{:.2} km", route.distance_meters / 1000.0),
        }
    }
}

impl fmt::Display for JourneySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration: {}, Distance: {}", self.duration, self.distance)
    }
}

/// How the latest journey request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JourneyOutcome {
    Planned(JourneySummary),
    /// The directions service found no route; not an error.
    NoRouteFound,
    Failed(EngineError),
}
