use geo::Point;
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::registry::{CatchmentFeature, CatchmentRegistry};
use super::{AddressBar, ShareableLink};

/// The committed school selection. Replaced, never mutated, on every commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    id: String,
    school_name: String,
    coordinates: Point<f64>, // Centroid (lon, lat)
    suburb: Option<String>,
    generation: u64,
}

impl Selection {
    #[inline] pub fn id(&self) -> &str { &self.id }
    #[inline] pub fn school_name(&self) -> &str { &self.school_name }
    #[inline] pub fn coordinates(&self) -> Point<f64> { self.coordinates }
    #[inline] pub fn suburb(&self) -> Option<&str> { self.suburb.as_deref() }

    /// Commit counter value at which this selection became current.
    #[inline] pub fn generation(&self) -> u64 { self.generation }
}

/// Lifecycle of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Resolving { id: String },
    Selected,
}

/// Owns the current selection, its generation counter and the shareable identifier.
pub struct SelectionMachine {
    phase: Phase,
    current: Option<Selection>,
    generation: u64,
    link: ShareableLink,
    address: Box<dyn AddressBar>,
}

impl SelectionMachine {
    pub fn new(link: ShareableLink, address: Box<dyn AddressBar>) -> Self {
        Self { phase: Phase::Empty, current: None, generation: 0, link, address }
    }

    /// Resolve `id` through the registry and commit it.
    /// On `NotFound` the prior selection (if any) stays current and nothing is written.
    pub fn select_by_identifier(&mut self, id: &str, registry: &CatchmentRegistry) -> EngineResult<Selection> {
        self.phase = Phase::Resolving { id: id.to_string() };
        match registry.resolve(id) {
            Ok(resolved) => Ok(self.commit(
                resolved.feature.id(),
                resolved.feature.name(),
                resolved.entry.coordinates,
                resolved.entry.suburb.clone(),
            )),
            Err(err) => {
                debug!(id, "identifier did not resolve to a catchment");
                self.phase = if self.current.is_some() { Phase::Selected } else { Phase::Empty };
                Err(err)
            }
        }
    }

    /// Commit a feature the caller already holds, bypassing lookup.
    /// Fails only when the feature's geometry has no usable centroid.
    pub fn select_by_feature(&mut self, feature: &CatchmentFeature, suburb_markers: &[String]) -> EngineResult<Selection> {
        let coordinates = feature.centroid()?;
        let suburb = feature.resolved_suburb(suburb_markers);
        Ok(self.commit(feature.id(), feature.name(), coordinates, suburb))
    }

    fn commit(&mut self, id: &str, name: &str, coordinates: Point<f64>, suburb: Option<String>) -> Selection {
        self.generation += 1;
        let selection = Selection {
            id: id.to_string(),
            school_name: name.to_string(),
            coordinates,
            suburb,
            generation: self.generation,
        };
        self.address.replace(&self.link.url_for(id));
        self.current = Some(selection.clone());
        self.phase = Phase::Selected;
        info!(id, name, generation = self.generation, "selection committed");
        selection
    }

    /// Monotonic commit counter; 0 before the first selection.
    #[inline] pub fn current_generation(&self) -> u64 { self.generation }

    #[inline] pub fn current(&self) -> Option<&Selection> { self.current.as_ref() }

    #[inline] pub fn phase(&self) -> &Phase { &self.phase }

    #[inline] pub fn link(&self) -> &ShareableLink { &self.link }

    /// The location last written to the address bar.
    #[inline] pub fn shareable_url(&self) -> Option<&str> { self.address.location() }
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, LineString, MultiPolygon, Point, Polygon};

    use super::{Phase, SelectionMachine};
    use crate::config::{DatasetOptions, LinkOptions};
    use crate::error::EngineError;
    use crate::geom::GeometryError;
    use crate::registry::{CatchmentDataset, CatchmentFeature, CatchmentRegistry};
    use crate::selection::{MemoryAddressBar, ShareableLink};

    fn square(x0: f64, y0: f64) -> Polygon<f64> {
        Polygon::new(LineString::from(vec![(x0, y0), (x0 + 2.0, y0), (x0 + 2.0, y0 + 2.0), (x0, y0 + 2.0)]), vec![])
    }

    fn registry() -> CatchmentRegistry {
        CatchmentRegistry::new(
            CatchmentDataset::new(vec![
                CatchmentFeature::new("Lindfield PS", Geometry::Polygon(square(0.0, 0.0)), None),
                CatchmentFeature::new(
                    "Killara PS",
                    Geometry::MultiPolygon(MultiPolygon(vec![square(10.0, 10.0), square(20.0, 20.0)])),
                    Some("Killara Heights".to_string()),
                ),
            ]),
            DatasetOptions::default(),
        )
    }

    fn machine() -> SelectionMachine {
        let link = ShareableLink::new(&LinkOptions { base_url: "https://schools.example/".to_string(), query_param: None }).unwrap();
        SelectionMachine::new(link, Box::new(MemoryAddressBar::new()))
    }

    #[test]
    fn starts_empty_at_generation_zero() {
        let machine = machine();
        assert_eq!(machine.phase(), &Phase::Empty);
        assert_eq!(machine.current_generation(), 0);
        assert!(machine.current().is_none());
        assert_eq!(machine.shareable_url(), None);
    }

    #[test]
    fn commit_uses_centroid_and_writes_link() {
        let registry = registry();
        let mut machine = machine();
        let selection = machine.select_by_identifier("killara_ps", &registry).unwrap();

        assert_eq!(selection.coordinates(), Point::new(11.0, 11.0));
        assert_eq!(selection.suburb(), Some("Killara Heights"));
        assert_eq!(selection.school_name(), "Killara PS");
        assert_eq!(selection.generation(), 1);
        assert_eq!(machine.phase(), &Phase::Selected);
        assert_eq!(machine.shareable_url(), Some("https://schools.example/killara_ps"));
    }

    #[test]
    fn reselecting_same_id_bumps_generation() {
        let registry = registry();
        let mut machine = machine();
        let first = machine.select_by_identifier("lindfield_ps", &registry).unwrap();
        let second = machine.select_by_identifier("lindfield_ps", &registry).unwrap();

        assert!(second.generation() > first.generation());
        assert_eq!(first.coordinates(), second.coordinates());
        assert_eq!(first.suburb(), second.suburb());
        assert_eq!(second.suburb(), Some("Lindfield"));
    }

    #[test]
    fn not_found_from_empty_stays_empty() {
        let registry = registry();
        let mut machine = machine();
        let err = machine.select_by_identifier("nonexistent_school", &registry).unwrap_err();

        assert_eq!(err, EngineError::NotFound("nonexistent_school".to_string()));
        assert_eq!(machine.phase(), &Phase::Empty);
        assert_eq!(machine.current_generation(), 0);
        assert_eq!(machine.shareable_url(), None);
    }

    #[test]
    fn not_found_keeps_prior_selection() {
        let registry = registry();
        let mut machine = machine();
        let prior = machine.select_by_identifier("lindfield_ps", &registry).unwrap();
        assert!(machine.select_by_identifier("lindfield_eps", &registry).is_err());

        assert_eq!(machine.current(), Some(&prior));
        assert_eq!(machine.current_generation(), prior.generation());
        assert_eq!(machine.phase(), &Phase::Selected);
        assert_eq!(machine.shareable_url(), Some("https://schools.example/lindfield_ps"));
    }

    #[test]
    fn select_by_feature_bypasses_lookup() {
        let mut machine = machine();
        let feature = CatchmentFeature::new("Pymble PS", Geometry::Polygon(square(4.0, 4.0)), None);
        let selection = machine.select_by_feature(&feature, &DatasetOptions::default().suburb_markers).unwrap();

        assert_eq!(selection.generation(), 1);
        assert_eq!(selection.coordinates(), Point::new(5.0, 5.0));
        assert_eq!(selection.suburb(), Some("Pymble"));
        assert_eq!(machine.shareable_url(), Some("https://schools.example/pymble_ps"));
    }

    #[test]
    fn select_by_feature_rejects_points() {
        let mut machine = machine();
        let feature = CatchmentFeature::new("Gordon PS", Geometry::Point(Point::new(1.0, 1.0)), None);
        let err = machine.select_by_feature(&feature, &[]).unwrap_err();

        assert_eq!(err, EngineError::UnsupportedGeometry(GeometryError::Unsupported("Point")));
        assert_eq!(machine.current_generation(), 0);
    }
}
