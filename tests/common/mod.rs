#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use catchment::{
    DirectionsService, Engine, EngineConfig, GeocodingService, HeadlessMap, Listing, ListingsService,
    MemSource, MemoryAddressBar, Place, RouteResult, Services,
};
use geo::{LineString, Point};

/// Four catchments: a plain polygon, a multipolygon with an explicit suburb,
/// a name with no derivable suburb, and a point that cannot be indexed.
pub const FIXTURE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature",
      "properties": { "USE_DESC": "Lindfield PS" },
      "geometry": { "type": "Polygon", "coordinates": [
        [[151.0, -34.0], [151.5, -34.0], [151.5, -33.5], [151.0, -33.5], [151.0, -34.0]]
      ] } },
    { "type": "Feature",
      "properties": { "USE_DESC": "Killara PS", "suburb": "Killara Heights" },
      "geometry": { "type": "MultiPolygon", "coordinates": [
        [[[152.0, -34.0], [152.5, -34.0], [152.5, -33.5], [152.0, -33.5], [152.0, -34.0]]],
        [[[160.0, -30.0], [161.0, -30.0], [161.0, -29.0], [160.0, -29.0], [160.0, -30.0]]]
      ] } },
    { "type": "Feature",
      "properties": { "USE_DESC": "Public School of Distance Education" },
      "geometry": { "type": "Polygon", "coordinates": [
        [[150.0, -35.0], [150.5, -35.0], [150.5, -34.5], [150.0, -34.5], [150.0, -35.0]]
      ] } },
    { "type": "Feature",
      "properties": { "USE_DESC": "Pymble Point PS" },
      "geometry": { "type": "Point", "coordinates": [151.1, -33.7] } }
  ]
}"#;

pub const LINDFIELD_CENTROID: (f64, f64) = (151.25, -33.75);
pub const KILLARA_CENTROID: (f64, f64) = (152.25, -33.75);

pub fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.dataset.suburb_markers = vec![" PS".to_string(), "Public School".to_string()];
    config.link.base_url = "https://schools.example/".to_string();
    config
}

/// Geocoder returning three places per category, offset east of the query point.
#[derive(Default)]
pub struct FakeGeocoder {
    /// Categories whose proximity query fails.
    pub failing: Vec<String>,
    /// Extra latency per category.
    pub slow: Vec<(String, Duration)>,
    /// Extra latency for every proximity query around this point.
    pub slow_near: Option<(Point<f64>, Duration)>,
    /// Results of a free-text search.
    pub places: Vec<Place>,
    pub search_fails: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn nearby_calls(&self) -> usize {
        self.calls().iter().filter(|call| call.starts_with("nearby:")).count()
    }
}

#[async_trait]
impl GeocodingService for FakeGeocoder {
    async fn search(&self, text: &str) -> Result<Vec<Place>> {
        self.calls.lock().unwrap().push(format!("search:{text}"));
        if self.search_fails {
            bail!("geocoding service unavailable");
        }
        Ok(self.places.clone())
    }

    async fn nearby(&self, category: &str, near: Point<f64>) -> Result<Vec<Place>> {
        self.calls.lock().unwrap().push(format!("nearby:{category}"));
        if let Some((_, delay)) = self.slow.iter().find(|(slow, _)| slow == category) {
            tokio::time::sleep(*delay).await;
        }
        if let Some((point, delay)) = self.slow_near {
            if point == near {
                tokio::time::sleep(delay).await;
            }
        }
        if self.failing.iter().any(|failing| failing == category) {
            bail!("{category} lookup failed");
        }
        Ok((1..=3).map(|i| Place {
            id: format!("{category}.{i}"),
            name: format!("{category} {i}"),
            center: Point::new(near.x() + 0.125 * i as f64, near.y()),
        }).collect())
    }
}

#[derive(Default)]
pub struct FakeDirections {
    pub routes: Vec<RouteResult>,
    pub fails: bool,
    pub panics: bool,
    pub calls: Mutex<Vec<(Point<f64>, Point<f64>)>>,
}

impl FakeDirections {
    pub fn with_route() -> Self {
        Self { routes: vec![route()], ..Self::default() }
    }

    pub fn calls(&self) -> Vec<(Point<f64>, Point<f64>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsService for FakeDirections {
    async fn routes(&self, origin: Point<f64>, destination: Point<f64>) -> Result<Vec<RouteResult>> {
        self.calls.lock().unwrap().push((origin, destination));
        if self.panics {
            panic!("directions client crashed");
        }
        if self.fails {
            bail!("directions service returned 401 Unauthorized");
        }
        Ok(self.routes.clone())
    }
}

#[derive(Default)]
pub struct FakeListings {
    pub listings: Vec<Listing>,
    pub fails: bool,
    pub panics: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeListings {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingsService for FakeListings {
    async fn listings(&self, region: &str) -> Result<Vec<Listing>> {
        self.calls.lock().unwrap().push(region.to_string());
        if self.panics {
            panic!("listings client crashed");
        }
        if self.fails {
            bail!("listings quota exceeded");
        }
        Ok(self.listings.clone())
    }
}

pub fn route() -> RouteResult {
    RouteResult {
        duration_seconds: 720.0,
        distance_meters: 8346.0,
        geometry: LineString::from(vec![(151.25, -33.75), (151.3, -33.8), (151.4, -33.9)]),
    }
}

pub fn place(name: &str, x: f64, y: f64) -> Place {
    Place { id: name.to_lowercase(), name: name.to_string(), center: Point::new(x, y) }
}

pub fn listing(address: Option<&str>, longitude: Option<f64>, latitude: Option<f64>) -> Listing {
    Listing { street_address: address.map(str::to_string), longitude, latitude }
}

#[derive(Clone)]
pub struct Fakes {
    pub geocoder: Arc<FakeGeocoder>,
    pub directions: Arc<FakeDirections>,
    pub listings: Arc<FakeListings>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            geocoder: Arc::new(FakeGeocoder::default()),
            directions: Arc::new(FakeDirections::with_route()),
            listings: Arc::new(FakeListings {
                listings: vec![listing(Some("1 Tryon Rd"), Some(151.2), Some(-33.7))],
                ..FakeListings::default()
            }),
        }
    }
}

impl Fakes {
    pub fn services(&self) -> Services {
        Services {
            geocoder: self.geocoder.clone(),
            directions: self.directions.clone(),
            listings: self.listings.clone(),
        }
    }
}

pub async fn engine_over(dataset: &str, config: EngineConfig, fakes: &Fakes) -> Engine<HeadlessMap> {
    let surface = HeadlessMap::from_view(&config.view);
    Engine::start(config, &MemSource::new(dataset.as_bytes()), fakes.services(), surface, Box::new(MemoryAddressBar::new()))
        .await
        .unwrap()
}

pub async fn engine_with(config: EngineConfig, fakes: &Fakes) -> Engine<HeadlessMap> {
    engine_over(FIXTURE, config, fakes).await
}

pub async fn engine(fakes: &Fakes) -> Engine<HeadlessMap> {
    engine_with(config(), fakes).await
}
