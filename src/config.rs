use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Engine settings. Every field has a default, so a config file only needs
/// to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identifier used when the page location names no school.
    pub default_identifier: String,
    /// Minimum length of a destination search.
    pub min_search_len: usize,
    pub dataset: DatasetOptions,
    pub poi: PoiOptions,
    pub view: ViewOptions,
    pub timeouts: Timeouts,
    pub link: LinkOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_identifier: "lindfield_eps".to_string(),
            min_search_len: 3,
            dataset: DatasetOptions::default(),
            poi: PoiOptions::default(),
            view: ViewOptions::default(),
            timeouts: Timeouts::default(),
            link: LinkOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse engine config")
    }

    /// Read a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json_str(&text)
    }
}

/// Where catchment properties live in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    pub name_property: String,
    pub suburb_property: String,
    /// School-type markers stripped from a name to derive its suburb.
    pub suburb_markers: Vec<String>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            name_property: "USE_DESC".to_string(),
            suburb_property: "suburb".to_string(),
            suburb_markers: vec![" PS".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiOptions {
    /// Categories queried in order around the selected school.
    pub categories: Vec<String>,
    /// Results kept per category.
    pub per_category: usize,
}

impl Default for PoiOptions {
    fn default() -> Self {
        Self {
            categories: ["other schools", "day care", "shops", "train stations", "beaches"]
                .map(String::from)
                .to_vec(),
            per_category: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Padding (pixels) used when fitting the viewport to a catchment.
    pub fit_padding: f64,
    /// Zoom used when re-centering after a style change.
    pub recenter_zoom: f64,
    pub streets_style: String,
    pub satellite_style: String,
    /// Initial map center as [lon, lat].
    pub initial_center: [f64; 2],
    pub initial_zoom: f64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            fit_padding: 50.0,
            recenter_zoom: 15.0,
            streets_style: "mapbox://styles/mapbox/streets-v12".to_string(),
            satellite_style: "mapbox://styles/mapbox/satellite-v9".to_string(),
            initial_center: [151.2099, -33.865143],
            initial_zoom: 10.0,
        }
    }
}

/// Bounded waits per query kind, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Applies to each POI category request.
    pub poi_ms: u64,
    pub properties_ms: u64,
    pub route_ms: u64,
    pub search_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { poi_ms: 10_000, properties_ms: 15_000, route_ms: 15_000, search_ms: 10_000 }
    }
}

impl Timeouts {
    #[inline] pub fn poi(&self) -> Duration { Duration::from_millis(self.poi_ms) }
    #[inline] pub fn properties(&self) -> Duration { Duration::from_millis(self.properties_ms) }
    #[inline] pub fn route(&self) -> Duration { Duration::from_millis(self.route_ms) }
    #[inline] pub fn search(&self) -> Duration { Duration::from_millis(self.search_ms) }
}

/// How the shareable identifier is written into the page address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    pub base_url: String,
    /// Query parameter carrying the identifier; `None` writes a path segment.
    pub query_param: Option<String>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self { base_url: "http://localhost:5173/".to_string(), query_param: None }
    }
}
