use std::fmt;

use geo::Point;

use crate::error::EngineError;
use crate::services::RouteResult;

/// The asynchronous queries keyed off a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    PointsOfInterest,
    Properties,
    Route,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryKind::PointsOfInterest => "points-of-interest",
            QueryKind::Properties => "properties",
            QueryKind::Route => "route",
        })
    }
}

/// A labelled position to be drawn as a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub position: Point<f64>,
    pub label: String,
}

/// How a directions query ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(RouteResult),
    /// The service answered with zero routes.
    NoRouteFound,
    Failed(EngineError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryPayload {
    PointsOfInterest(Vec<PlacedLabel>),
    Properties(Vec<PlacedLabel>),
    Route(RouteOutcome),
    /// The whole query failed; contributes nothing.
    Failed(EngineError),
}

/// A completed query, tagged with the generation and ticket it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub kind: QueryKind,
    pub generation: u64,
    /// Per-kind issue counter; only the latest ticket of a kind may be applied.
    pub ticket: u64,
    pub payload: QueryPayload,
}
