//! External collaborators: geocoding, directions and property listings.
//!
//! The engine only talks to these traits; `mapbox` and `listings` provide
//! HTTP implementations behind the `http` feature.

#[cfg(feature = "http")]
mod listings;
#[cfg(feature = "http")]
mod mapbox;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use geo::{LineString, Point};

#[cfg(feature = "http")]
pub use listings::RealtyListings;
#[cfg(feature = "http")]
pub use mapbox::MapboxClient;

/// A geocoded place candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub center: Point<f64>, // (lon, lat)
}

/// One property listing from the first result tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub street_address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// A driving route between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub duration_seconds: f64,
    pub distance_meters: f64,
    pub geometry: LineString<f64>,
}

#[async_trait]
pub trait GeocodingService: Send + Sync {
    /// Ranked place candidates for free text.
    async fn search(&self, text: &str) -> Result<Vec<Place>>;

    /// Places matching a category label, ranked by proximity to `near`.
    async fn nearby(&self, category: &str, near: Point<f64>) -> Result<Vec<Place>>;
}

#[async_trait]
pub trait DirectionsService: Send + Sync {
    /// Candidate driving routes; an empty list means no route exists.
    async fn routes(&self, origin: Point<f64>, destination: Point<f64>) -> Result<Vec<RouteResult>>;
}

#[async_trait]
pub trait ListingsService: Send + Sync {
    /// Listings for a region (suburb) name.
    async fn listings(&self, region: &str) -> Result<Vec<Listing>>;
}

/// The collaborators an engine queries.
#[derive(Clone)]
pub struct Services {
    pub geocoder: Arc<dyn GeocodingService>,
    pub directions: Arc<dyn DirectionsService>,
    pub listings: Arc<dyn ListingsService>,
}
