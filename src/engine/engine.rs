use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::enrich::{Orchestrator, QueryKind, QueryOutcome, QueryPayload, RouteOutcome};
use crate::error::{EngineError, EngineResult};
use crate::geom::BoundingBox;
use crate::io::DatasetSource;
use crate::overlay::{MapStyle, MapSurface, MarkerKind, OverlaySync};
use crate::registry::{CatchmentFeature, CatchmentRegistry};
use crate::selection::{inbound_identifier, AddressBar, Phase, Selection, SelectionMachine, ShareableLink};
use crate::services::{Place, Services};
use super::{JourneyOutcome, JourneySummary};

/// Something that happened to the engine and must be reflected on the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Carries the extent of the exact feature the selection was made from.
    SelectionCommitted { selection: Selection, bounds: Option<BoundingBox> },
    StyleLoaded,
    QueryResolved(QueryOutcome),
}

/// What applying a query outcome did.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    PointsOfInterestShown { generation: u64, count: usize },
    PropertiesShown { generation: u64, count: usize },
    Journey(JourneyOutcome),
    QueryFailed { kind: QueryKind, message: String },
    /// The outcome belonged to a superseded selection or request; nothing was drawn.
    Discarded { kind: QueryKind, generation: u64 },
}

fn feature_bounds(feature: &CatchmentFeature) -> Option<BoundingBox> {
    match feature.bounds() {
        Ok(bounds) => Some(bounds),
        Err(err) => {
            warn!(name = feature.name(), error = %err, "cannot compute catchment bounds");
            None
        }
    }
}

/// A catchment map session: dataset, selection, enrichment and overlay.
///
/// All overlay mutation happens on the engine's own task. Enrichment tasks
/// report back through a channel drained by [`Engine::next_notice`],
/// [`Engine::poll_notices`] or [`Engine::settle`].
pub struct Engine<S: MapSurface> {
    config: EngineConfig,
    registry: CatchmentRegistry,
    machine: SelectionMachine,
    orchestrator: Orchestrator,
    outcomes: UnboundedReceiver<QueryOutcome>,
    overlay: OverlaySync,
    surface: S,
    style: MapStyle,
    style_pending: bool,
    candidates: Vec<Place>,
    destination: Option<Place>,
    journey: Option<JourneyOutcome>,
}

impl<S: MapSurface> Engine<S> {
    /// Build an engine over an already loaded registry and apply the initial style.
    pub fn new(
        config: EngineConfig,
        registry: CatchmentRegistry,
        services: Services,
        mut surface: S,
        address: Box<dyn AddressBar>,
    ) -> EngineResult<Self> {
        let machine = SelectionMachine::new(ShareableLink::new(&config.link)?, address);
        let (orchestrator, outcomes) = Orchestrator::new(services, config.poi.clone(), config.timeouts.clone());
        let overlay = OverlaySync::new(config.view.clone());
        let style = MapStyle::default();
        surface.set_style(style.url(&config.view));

        Ok(Self {
            config,
            registry,
            machine,
            orchestrator,
            outcomes,
            overlay,
            surface,
            style,
            style_pending: false,
            candidates: Vec::new(),
            destination: None,
            journey: None,
        })
    }

    /// Load the catchment dataset from `source` and build an engine around it.
    /// A dataset failure is fatal: no engine is returned.
    pub async fn start(
        config: EngineConfig,
        source: &dyn DatasetSource,
        services: Services,
        surface: S,
        address: Box<dyn AddressBar>,
    ) -> EngineResult<Self> {
        let registry = CatchmentRegistry::open(source, config.dataset.clone()).await?;
        Self::new(config, registry, services, surface, address)
    }

    /// Select the catchment named by `id`. On `NotFound` nothing changes.
    pub fn select_by_identifier(&mut self, id: &str) -> EngineResult<Selection> {
        let selection = self.machine.select_by_identifier(id, &self.registry)?;
        let bounds = self.registry.resolve(selection.id()).ok()
            .and_then(|resolved| feature_bounds(resolved.feature));
        self.dispatch(EngineEvent::SelectionCommitted { selection: selection.clone(), bounds });
        Ok(selection)
    }

    /// Select a feature the caller already holds (e.g. a clicked catchment).
    pub fn select_by_feature(&mut self, feature: &CatchmentFeature) -> EngineResult<Selection> {
        let selection = self.machine.select_by_feature(feature, &self.registry.options().suburb_markers)?;
        let bounds = feature_bounds(feature);
        self.dispatch(EngineEvent::SelectionCommitted { selection: selection.clone(), bounds });
        Ok(selection)
    }

    /// Select whatever a page location names, falling back to the default
    /// identifier only when it names nothing.
    pub fn select_from_location(&mut self, location: Option<&str>) -> EngineResult<Selection> {
        let id = inbound_identifier(location, self.machine.link(), &self.config.default_identifier);
        self.select_by_identifier(&id)
    }

    /// Switch between the streets and satellite styles. Nothing is re-drawn
    /// until [`Engine::style_loaded`]. Returns `false` when there is no selection.
    pub fn toggle_style(&mut self) -> bool {
        if self.machine.current().is_none() {
            debug!("no selection, ignoring style toggle");
            return false;
        }
        self.style = self.style.toggled();
        self.style_pending = true;
        self.surface.set_style(self.style.url(&self.config.view));
        info!(style = ?self.style, "map style toggled");
        true
    }

    /// The surface finished loading a style. Ignored unless a toggle is pending.
    pub fn style_loaded(&mut self) {
        if !self.style_pending {
            debug!("style loaded without a pending toggle, ignoring");
            return;
        }
        self.style_pending = false;
        self.dispatch(EngineEvent::StyleLoaded);
    }

    /// Geocode free text into destination candidates.
    pub async fn search_destination(&mut self, text: &str) -> EngineResult<&[Place]> {
        let text = text.trim();
        let min = self.config.min_search_len;
        if text.chars().count() < min {
            return Err(EngineError::QueryTooShort { min });
        }

        let geocoder = self.orchestrator.services().geocoder.clone();
        let wait = self.config.timeouts.search();
        self.candidates = match timeout(wait, geocoder.search(text)).await {
            Ok(Ok(places)) => places,
            Ok(Err(err)) => return Err(EngineError::SearchFailed(format!("{err:#}"))),
            Err(_) => return Err(EngineError::SearchFailed(format!("timed out after {wait:?}"))),
        };
        debug!(text, candidates = self.candidates.len(), "destination search finished");
        Ok(self.candidates.as_slice())
    }

    /// Make candidate `index` of the last search the pending destination.
    pub fn choose_destination(&mut self, index: usize) -> Option<&Place> {
        let place = self.candidates.get(index)?.clone();
        Some(self.set_destination(place))
    }

    pub fn set_destination(&mut self, place: Place) -> &Place {
        info!(name = %place.name, "destination chosen");
        self.destination.insert(place)
    }

    /// Request a route from the viewport center to the pending destination.
    /// Returns the ticket of the journey request.
    pub fn plan_journey(&mut self) -> EngineResult<u64> {
        let destination = self.destination.as_ref().ok_or(EngineError::NoDestination)?.center;
        let origin = self.surface.center();
        let generation = self.machine.current_generation();
        self.journey = None;
        Ok(self.orchestrator.launch_route(generation, origin, destination))
    }

    fn dispatch(&mut self, event: EngineEvent) -> Option<Notice> {
        match event {
            EngineEvent::SelectionCommitted { selection, bounds } => {
                self.overlay.selection_committed(&mut self.surface, &selection, bounds);
                self.journey = None;
                self.orchestrator.launch_points_of_interest(&selection);
                self.orchestrator.launch_properties(&selection);
                None
            }
            EngineEvent::StyleLoaded => {
                let selection = self.machine.current()?.clone();
                self.overlay.style_loaded(&mut self.surface, &selection);
                self.orchestrator.launch_points_of_interest(&selection);
                None
            }
            EngineEvent::QueryResolved(outcome) => Some(self.apply(outcome)),
        }
    }

    /// Reconcile one query outcome with the current state. Outcomes from a
    /// superseded generation, or superseded by a newer query of the same kind,
    /// are discarded without touching the overlay.
    pub fn apply(&mut self, outcome: QueryOutcome) -> Notice {
        self.orchestrator.settled();
        let QueryOutcome { kind, generation, ticket, payload } = outcome;
        let current = self.machine.current_generation();
        if generation != current || !self.orchestrator.is_latest(kind, ticket) {
            debug!(%kind, generation, current, ticket, "discarding stale query outcome");
            return Notice::Discarded { kind, generation };
        }

        match payload {
            QueryPayload::PointsOfInterest(pois) => {
                self.overlay.replace_markers(&mut self.surface, MarkerKind::PointOfInterest, &pois);
                if let Some(selection) = self.machine.current() {
                    self.overlay.fit_to_points_of_interest(&mut self.surface, selection.coordinates(), &pois);
                }
                debug!(generation, count = pois.len(), "points of interest applied");
                Notice::PointsOfInterestShown { generation, count: pois.len() }
            }
            QueryPayload::Properties(properties) => {
                self.overlay.replace_markers(&mut self.surface, MarkerKind::Property, &properties);
                debug!(generation, count = properties.len(), "property listings applied");
                Notice::PropertiesShown { generation, count: properties.len() }
            }
            QueryPayload::Route(RouteOutcome::Found(route)) => {
                self.overlay.draw_route(&mut self.surface, &route.geometry);
                let summary = JourneySummary::from_route(&route);
                info!(generation, %summary, "journey planned");
                self.finish_journey(JourneyOutcome::Planned(summary))
            }
            QueryPayload::Route(RouteOutcome::NoRouteFound) => {
                info!(generation, "no route found");
                self.finish_journey(JourneyOutcome::NoRouteFound)
            }
            QueryPayload::Route(RouteOutcome::Failed(err)) => {
                warn!(generation, error = %err, "journey request failed");
                self.finish_journey(JourneyOutcome::Failed(err))
            }
            QueryPayload::Failed(err) => {
                warn!(%kind, generation, error = %err, "enrichment query failed");
                Notice::QueryFailed { kind, message: err.to_string() }
            }
        }
    }

    fn finish_journey(&mut self, outcome: JourneyOutcome) -> Notice {
        self.journey = Some(outcome.clone());
        Notice::Journey(outcome)
    }

    /// Wait for the next query outcome and apply it.
    /// Returns `None` once no query is in flight.
    pub async fn next_notice(&mut self) -> Option<Notice> {
        if self.orchestrator.in_flight() == 0 {
            return None;
        }
        let outcome = self.outcomes.recv().await?;
        self.dispatch(EngineEvent::QueryResolved(outcome))
    }

    /// Apply every outcome that has already arrived, without waiting.
    pub fn poll_notices(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(outcome) = self.outcomes.try_recv() {
            notices.extend(self.dispatch(EngineEvent::QueryResolved(outcome)));
        }
        notices
    }

    /// Wait until every launched query has been applied or discarded.
    pub async fn settle(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(notice) = self.next_notice().await {
            notices.push(notice);
        }
        notices
    }

    /// Tear the overlay down and hand the surface back.
    pub fn shutdown(mut self) -> S {
        self.overlay.teardown(&mut self.surface);
        info!(generation = self.machine.current_generation(), "engine shut down");
        self.surface
    }

    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }
    #[inline] pub fn registry(&self) -> &CatchmentRegistry { &self.registry }
    #[inline] pub fn selection(&self) -> Option<&Selection> { self.machine.current() }
    #[inline] pub fn phase(&self) -> &Phase { self.machine.phase() }
    #[inline] pub fn current_generation(&self) -> u64 { self.machine.current_generation() }
    #[inline] pub fn shareable_url(&self) -> Option<&str> { self.machine.shareable_url() }
    #[inline] pub fn surface(&self) -> &S { &self.surface }
    #[inline] pub fn overlay(&self) -> &OverlaySync { &self.overlay }
    #[inline] pub fn style(&self) -> MapStyle { self.style }
    #[inline] pub fn style_pending(&self) -> bool { self.style_pending }
    #[inline] pub fn candidates(&self) -> &[Place] { &self.candidates }
    #[inline] pub fn destination(&self) -> Option<&Place> { self.destination.as_ref() }

    /// Outcome of the latest journey request applied for the current selection.
    #[inline] pub fn journey(&self) -> Option<&JourneyOutcome> { self.journey.as_ref() }

    /// Number of launched queries not yet applied or discarded.
    #[inline] pub fn in_flight(&self) -> usize { self.orchestrator.in_flight() }
}
