//! Engine error types

use thiserror::Error;

use crate::enrich::QueryKind;
use crate::geom::GeometryError;

/// Errors surfaced by the catchment engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The catchment dataset could not be fetched or parsed; nothing can be shown.
    #[error("Failed to load catchment dataset: {0}")]
    DatasetLoad(String),

    /// The shareable link base URL is not an absolute URL
    #[error("Invalid shareable link base {0}")]
    InvalidLink(String),

    /// No catchment matches the identifier or name
    #[error("No catchment matches {0:?}")]
    NotFound(String),

    /// Catchment geometry is not a Polygon or MultiPolygon
    #[error(transparent)]
    UnsupportedGeometry(#[from] GeometryError),

    /// One enrichment query failed; siblings are unaffected
    #[error("{kind} query failed: {message}")]
    EnrichmentQueryFailed { kind: QueryKind, message: String },

    /// The directions service could not be reached or rejected the request
    #[error("Directions request failed: {0}")]
    DirectionsRequestFailed(String),

    /// The destination search could not be completed
    #[error("Destination search failed: {0}")]
    SearchFailed(String),

    /// A journey was requested before a destination was chosen
    #[error("Please select a destination first")]
    NoDestination,

    /// Destination search text is too short to send
    #[error("Search text must be at least {min} characters")]
    QueryTooShort { min: usize },
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
