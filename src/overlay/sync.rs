use ahash::AHashMap;
use geo::{LineString, Point};
use tracing::debug;

use crate::config::ViewOptions;
use crate::enrich::PlacedLabel;
use crate::geom::BoundingBox;
use crate::selection::Selection;
use super::{MapSurface, MarkerId, MarkerKind};

/// Translates selection state and enrichment results into surface mutations.
///
/// Keeps the handles of everything it drew so that each update removes the
/// previous markers of a kind before adding the new ones.
#[derive(Debug, Clone)]
pub struct OverlaySync {
    view: ViewOptions,
    selection_marker: Option<MarkerId>,
    markers: AHashMap<MarkerKind, Vec<MarkerId>>,
    highlight: Option<String>,
    route: Option<LineString<f64>>,
}

impl OverlaySync {
    pub fn new(view: ViewOptions) -> Self {
        Self { view, selection_marker: None, markers: AHashMap::new(), highlight: None, route: None }
    }

    /// Highlight the committed catchment, fit it, and place the selection marker.
    /// Markers and the route of the previous selection are cleared.
    pub fn selection_committed(&mut self, surface: &mut dyn MapSurface, selection: &Selection, bounds: Option<BoundingBox>) {
        self.highlight = Some(selection.school_name().to_string());
        surface.set_highlight(self.highlight.as_deref());

        self.clear_markers(surface, MarkerKind::PointOfInterest);
        self.clear_markers(surface, MarkerKind::Property);
        self.clear_route(surface);

        match bounds {
            Some(bounds) => surface.fit_bounds(&bounds, self.view.fit_padding),
            None => debug!(name = selection.school_name(), "no bounds for selection, viewport left as is"),
        }

        // The pin carries the school name, so a new selection replaces it.
        if let Some(id) = self.selection_marker.take() {
            surface.remove_marker(id);
        }
        let id = surface.add_marker(MarkerKind::Selection, selection.coordinates(), selection.school_name());
        self.selection_marker = Some(id);
    }

    /// Re-apply the layers a style change dropped and re-center on the selection.
    pub fn style_loaded(&mut self, surface: &mut dyn MapSurface, selection: &Selection) {
        surface.set_highlight(self.highlight.as_deref());
        if let Some(route) = &self.route {
            surface.set_route(Some(route));
        }
        surface.fly_to(selection.coordinates(), self.view.recenter_zoom);
    }

    /// Remove every marker of `kind`, then add `items`.
    pub fn replace_markers(&mut self, surface: &mut dyn MapSurface, kind: MarkerKind, items: &[PlacedLabel]) {
        self.clear_markers(surface, kind);
        let ids = items.iter()
            .map(|item| surface.add_marker(kind, item.position, &item.label))
            .collect();
        self.markers.insert(kind, ids);
    }

    /// Fit the viewport to the selection point and every POI.
    pub fn fit_to_points_of_interest(&self, surface: &mut dyn MapSurface, origin: Point<f64>, pois: &[PlacedLabel]) {
        if pois.is_empty() { return }
        let coords = std::iter::once(origin.0).chain(pois.iter().map(|poi| poi.position.0));
        if let Some(bounds) = BoundingBox::from_coords(coords) {
            surface.fit_bounds(&bounds, self.view.fit_padding);
        }
    }

    /// Draw the route line, replacing any previous one.
    pub fn draw_route(&mut self, surface: &mut dyn MapSurface, route: &LineString<f64>) {
        surface.set_route(Some(route));
        self.route = Some(route.clone());
    }

    /// Remove everything this overlay drew and clear the highlight filter.
    pub fn teardown(&mut self, surface: &mut dyn MapSurface) {
        self.clear_markers(surface, MarkerKind::PointOfInterest);
        self.clear_markers(surface, MarkerKind::Property);
        if let Some(id) = self.selection_marker.take() {
            surface.remove_marker(id);
        }
        self.clear_route(surface);
        if self.highlight.take().is_some() {
            surface.set_highlight(None);
        }
    }

    fn clear_markers(&mut self, surface: &mut dyn MapSurface, kind: MarkerKind) {
        for id in self.markers.remove(&kind).unwrap_or_default() {
            surface.remove_marker(id);
        }
    }

    fn clear_route(&mut self, surface: &mut dyn MapSurface) {
        if self.route.take().is_some() {
            surface.set_route(None);
        }
    }

    #[inline] pub fn highlight(&self) -> Option<&str> { self.highlight.as_deref() }

    #[inline] pub fn route(&self) -> Option<&LineString<f64>> { self.route.as_ref() }

    /// Number of markers of `kind` currently drawn (excluding the selection marker).
    pub fn marker_count(&self, kind: MarkerKind) -> usize {
        self.markers.get(&kind).map_or(0, Vec::len)
    }
}
