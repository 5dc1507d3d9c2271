use geo::{LineString, Point};

use crate::config::ViewOptions;
use crate::geom::BoundingBox;

/// Marker groups drawn on the map. Markers of a group are replaced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkerKind {
    Selection,
    PointOfInterest,
    Property,
}

/// Handle to a marker placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Background map style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MapStyle {
    #[default]
    Streets,
    Satellite,
}

impl MapStyle {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            MapStyle::Streets => MapStyle::Satellite,
            MapStyle::Satellite => MapStyle::Streets,
        }
    }

    /// Style URL configured for this style.
    pub fn url(self, view: &ViewOptions) -> &str {
        match self {
            MapStyle::Streets => &view.streets_style,
            MapStyle::Satellite => &view.satellite_style,
        }
    }
}

/// The rendering engine as seen by the overlay. Implementations own every
/// layer and marker; the engine only issues these mutations.
pub trait MapSurface: Send {
    /// Start loading a new style. Custom layers are lost until it finishes.
    fn set_style(&mut self, url: &str);

    /// Filter the highlighted catchment layer to exactly `name`, or clear it.
    fn set_highlight(&mut self, name: Option<&str>);

    fn fit_bounds(&mut self, bounds: &BoundingBox, padding: f64);

    fn fly_to(&mut self, center: Point<f64>, zoom: f64);

    /// Current viewport center (lon, lat).
    fn center(&self) -> Point<f64>;

    fn add_marker(&mut self, kind: MarkerKind, position: Point<f64>, label: &str) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId);

    /// Draw the route line, replacing any previous one; `None` clears it.
    fn set_route(&mut self, route: Option<&LineString<f64>>);
}

#[cfg(test)]
mod tests {
    use super::MapStyle;
    use crate::config::ViewOptions;

    #[test]
    fn toggle_flips_between_styles() {
        let view = ViewOptions::default();
        assert_eq!(MapStyle::default(), MapStyle::Streets);
        assert_eq!(MapStyle::Streets.toggled(), MapStyle::Satellite);
        assert_eq!(MapStyle::Satellite.toggled().url(&view), view.streets_style);
    }
}
