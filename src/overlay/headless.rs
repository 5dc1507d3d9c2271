use std::collections::BTreeMap;

use geo::{LineString, Point};
use serde_json::{json, Value};

use crate::config::ViewOptions;
use crate::geom::BoundingBox;
use super::{MapSurface, MarkerId, MarkerKind};

/// A marker as recorded by [`HeadlessMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Point<f64>,
    pub label: String,
}

/// In-memory map surface. Records the overlay state and counts every
/// mutation, so sessions can run without a renderer.
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    style: Option<String>,
    highlight: Option<String>,
    center: Point<f64>,
    zoom: f64,
    last_fit: Option<(BoundingBox, f64)>,
    markers: BTreeMap<MarkerId, Marker>,
    route: Option<LineString<f64>>,
    next_marker: u64,
    mutations: usize,
}

impl HeadlessMap {
    pub fn new(center: Point<f64>, zoom: f64) -> Self {
        Self {
            style: None,
            highlight: None,
            center,
            zoom,
            last_fit: None,
            markers: BTreeMap::new(),
            route: None,
            next_marker: 0,
            mutations: 0,
        }
    }

    /// A surface showing the configured initial view.
    pub fn from_view(view: &ViewOptions) -> Self {
        let [lon, lat] = view.initial_center;
        Self::new(Point::new(lon, lat), view.initial_zoom)
    }

    #[inline] pub fn style(&self) -> Option<&str> { self.style.as_deref() }
    #[inline] pub fn highlight(&self) -> Option<&str> { self.highlight.as_deref() }
    #[inline] pub fn zoom(&self) -> f64 { self.zoom }

    /// Bounds and padding of the most recent viewport fit.
    #[inline] pub fn last_fit(&self) -> Option<&(BoundingBox, f64)> { self.last_fit.as_ref() }

    #[inline] pub fn route(&self) -> Option<&LineString<f64>> { self.route.as_ref() }

    /// Total number of mutations applied so far.
    #[inline] pub fn mutations(&self) -> usize { self.mutations }

    /// Markers of one kind, in placement order.
    pub fn markers(&self, kind: MarkerKind) -> Vec<&Marker> {
        self.markers.values().filter(|marker| marker.kind == kind).collect()
    }

    /// Overlay state as a JSON document.
    pub fn to_json(&self) -> Value {
        let markers = |kind| -> Vec<Value> {
            self.markers(kind).into_iter()
                .map(|marker| json!({ "label": marker.label, "position": [marker.position.x(), marker.position.y()] }))
                .collect()
        };
        json!({
            "style": self.style,
            "highlight": self.highlight,
            "center": [self.center.x(), self.center.y()],
            "zoom": self.zoom,
            "bounds": self.last_fit.map(|(bounds, _)| bounds.to_array()),
            "selection": markers(MarkerKind::Selection),
            "points_of_interest": markers(MarkerKind::PointOfInterest),
            "properties": markers(MarkerKind::Property),
            "route": self.route.as_ref().map(|line| line.coords().map(|c| [c.x, c.y]).collect::<Vec<_>>()),
        })
    }
}

impl MapSurface for HeadlessMap {
    fn set_style(&mut self, url: &str) {
        self.mutations += 1;
        self.style = Some(url.to_string());
    }

    fn set_highlight(&mut self, name: Option<&str>) {
        self.mutations += 1;
        self.highlight = name.map(str::to_string);
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox, padding: f64) {
        self.mutations += 1;
        self.center = bounds.center();
        self.last_fit = Some((*bounds, padding));
    }

    fn fly_to(&mut self, center: Point<f64>, zoom: f64) {
        self.mutations += 1;
        self.center = center;
        self.zoom = zoom;
    }

    fn center(&self) -> Point<f64> { self.center }

    fn add_marker(&mut self, kind: MarkerKind, position: Point<f64>, label: &str) -> MarkerId {
        self.mutations += 1;
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(id, Marker { kind, position, label: label.to_string() });
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.mutations += 1;
        self.markers.remove(&id);
    }

    fn set_route(&mut self, route: Option<&LineString<f64>>) {
        self.mutations += 1;
        self.route = route.cloned();
    }
}
