use std::sync::LazyLock;

use geo::{Geometry, Point};
use regex::Regex;

use crate::geom::{self, BoundingBox, GeometryError};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Identifier derived from a school name: lower-cased, each whitespace run replaced by `_`.
pub fn slug(name: &str) -> String {
    WHITESPACE.replace_all(name, "_").to_lowercase()
}

/// Suburb implied by a school name: the text before the first school-type marker
/// (e.g. "Lindfield PS" -> "Lindfield"), or the whole name when no marker is present.
/// Returns `None` when nothing precedes the marker.
pub fn derive_suburb(name: &str, markers: &[String]) -> Option<String> {
    let prefix = markers.iter()
        .filter(|marker| !marker.is_empty())
        .filter_map(|marker| name.find(marker.as_str()))
        .min()
        .map_or(name, |pos| &name[..pos]);
    (!prefix.is_empty()).then(|| prefix.to_string())
}

/// A school catchment as loaded from the dataset. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchmentFeature {
    id: String,
    name: String,
    geometry: Geometry<f64>,
    suburb: Option<String>,
}

impl CatchmentFeature {
    pub fn new(name: impl Into<String>, geometry: Geometry<f64>, suburb: Option<String>) -> Self {
        let name = name.into();
        Self { id: slug(&name), name, geometry, suburb }
    }

    #[inline] pub fn id(&self) -> &str { &self.id }
    #[inline] pub fn name(&self) -> &str { &self.name }
    #[inline] pub fn geometry(&self) -> &Geometry<f64> { &self.geometry }

    /// Suburb property as stored in the dataset, if any.
    #[inline] pub fn suburb(&self) -> Option<&str> { self.suburb.as_deref() }

    /// Explicit suburb, falling back to one derived from the name.
    pub fn resolved_suburb(&self, markers: &[String]) -> Option<String> {
        self.suburb.clone().or_else(|| derive_suburb(&self.name, markers))
    }

    #[inline]
    pub fn centroid(&self) -> Result<Point<f64>, GeometryError> { geom::centroid(&self.geometry) }

    #[inline]
    pub fn bounds(&self) -> Result<BoundingBox, GeometryError> { geom::bounds_of(&self.geometry) }
}
