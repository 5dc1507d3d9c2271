use std::future::Future;
use std::time::Duration;

use ahash::AHashMap;
use geo::Point;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinError;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{PoiOptions, Timeouts};
use crate::error::EngineError;
use crate::selection::Selection;
use crate::services::{GeocodingService, Listing, Services};
use super::{PlacedLabel, QueryKind, QueryOutcome, QueryPayload, RouteOutcome};

/// Launches enrichment queries as tasks and hands their outcomes back over a channel.
///
/// Tasks never touch the overlay. Each outcome carries the generation and the
/// per-kind ticket it was issued under, so the receiver can drop anything stale.
/// Superseded tasks are not aborted; their results are simply ignored.
/// Every launched query delivers exactly one outcome, even if its task panics.
pub struct Orchestrator {
    services: Services,
    poi: PoiOptions,
    timeouts: Timeouts,
    tx: UnboundedSender<QueryOutcome>,
    tickets: AHashMap<QueryKind, u64>,
    in_flight: usize,
}

impl Orchestrator {
    /// Create an orchestrator and the receiver its outcomes arrive on.
    pub fn new(services: Services, poi: PoiOptions, timeouts: Timeouts) -> (Self, UnboundedReceiver<QueryOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let orchestrator = Self { services, poi, timeouts, tx, tickets: AHashMap::new(), in_flight: 0 };
        (orchestrator, rx)
    }

    fn issue(&mut self, kind: QueryKind) -> u64 {
        let ticket = self.tickets.entry(kind).or_insert(0);
        *ticket += 1;
        self.in_flight += 1;
        *ticket
    }

    /// Run `query` as its own task and deliver its payload. A task that
    /// panics or is cancelled still delivers, as a failure of its kind.
    fn spawn<F>(&self, kind: QueryKind, generation: u64, ticket: u64, query: F)
    where
        F: Future<Output = QueryPayload> + Send + 'static,
    {
        let tx = self.tx.clone();
        let task = tokio::spawn(query);
        tokio::spawn(async move {
            let payload = match task.await {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%kind, generation, ticket, error = %err, "query task did not complete");
                    aborted(kind, &err)
                }
            };
            deliver(&tx, QueryOutcome { kind, generation, ticket, payload });
        });
    }

    /// Query each POI category around the selection, in order.
    pub fn launch_points_of_interest(&mut self, selection: &Selection) -> u64 {
        let kind = QueryKind::PointsOfInterest;
        let ticket = self.issue(kind);
        let generation = selection.generation();
        let near = selection.coordinates();
        let geocoder = self.services.geocoder.clone();
        let categories = self.poi.categories.clone();
        let per_category = self.poi.per_category;
        let wait = self.timeouts.poi();

        debug!(generation, ticket, categories = categories.len(), "launching points-of-interest query");
        self.spawn(kind, generation, ticket, async move {
            let pois = points_of_interest(geocoder.as_ref(), &categories, per_category, near, wait, generation).await;
            QueryPayload::PointsOfInterest(pois)
        });
        ticket
    }

    /// Query listings for the selection's suburb. Skipped (returns `None`) when there is no suburb.
    pub fn launch_properties(&mut self, selection: &Selection) -> Option<u64> {
        let generation = selection.generation();
        let Some(suburb) = selection.suburb().map(str::to_string) else {
            debug!(generation, "selection has no suburb, skipping property listings");
            return None;
        };

        let kind = QueryKind::Properties;
        let ticket = self.issue(kind);
        let listings = self.services.listings.clone();
        let wait = self.timeouts.properties();

        debug!(generation, ticket, suburb = %suburb, "launching property listings query");
        self.spawn(kind, generation, ticket, async move {
            match timeout(wait, listings.listings(&suburb)).await {
                Ok(Ok(found)) => QueryPayload::Properties(found.into_iter().filter_map(listing_marker).collect()),
                Ok(Err(err)) => QueryPayload::Failed(EngineError::EnrichmentQueryFailed {
                    kind,
                    message: format!("{err:#}"),
                }),
                Err(_) => QueryPayload::Failed(EngineError::EnrichmentQueryFailed {
                    kind,
                    message: format!("timed out after {wait:?}"),
                }),
            }
        });
        Some(ticket)
    }

    /// Request driving directions; `generation` is the selection current at request time.
    pub fn launch_route(&mut self, generation: u64, origin: Point<f64>, destination: Point<f64>) -> u64 {
        let kind = QueryKind::Route;
        let ticket = self.issue(kind);
        let directions = self.services.directions.clone();
        let wait = self.timeouts.route();

        debug!(generation, ticket, ?origin, ?destination, "launching directions query");
        self.spawn(kind, generation, ticket, async move {
            let outcome = match timeout(wait, directions.routes(origin, destination)).await {
                Ok(Ok(routes)) => match routes.into_iter().next() {
                    Some(route) => RouteOutcome::Found(route),
                    None => RouteOutcome::NoRouteFound,
                },
                Ok(Err(err)) => RouteOutcome::Failed(EngineError::DirectionsRequestFailed(format!("{err:#}"))),
                Err(_) => RouteOutcome::Failed(EngineError::DirectionsRequestFailed(format!("timed out after {wait:?}"))),
            };
            QueryPayload::Route(outcome)
        });
        ticket
    }

    /// Whether `ticket` is the most recently issued query of `kind`.
    #[inline]
    pub fn is_latest(&self, kind: QueryKind, ticket: u64) -> bool {
        self.tickets.get(&kind) == Some(&ticket)
    }

    /// Number of launched queries whose outcome has not been received yet.
    #[inline] pub fn in_flight(&self) -> usize { self.in_flight }

    #[inline] pub fn services(&self) -> &Services { &self.services }

    /// Record that one outcome was received.
    #[inline] pub(crate) fn settled(&mut self) { self.in_flight = self.in_flight.saturating_sub(1) }
}

fn deliver(tx: &UnboundedSender<QueryOutcome>, outcome: QueryOutcome) {
    if tx.send(outcome).is_err() {
        debug!("engine is gone, dropping query outcome");
    }
}

fn aborted(kind: QueryKind, err: &JoinError) -> QueryPayload {
    let message = if err.is_panic() { "query task panicked" } else { "query task was cancelled" };
    match kind {
        QueryKind::Route => QueryPayload::Route(RouteOutcome::Failed(EngineError::DirectionsRequestFailed(message.to_string()))),
        _ => QueryPayload::Failed(EngineError::EnrichmentQueryFailed { kind, message: message.to_string() }),
    }
}

/// Marker label for a POI category: its first character, upper-cased.
pub fn category_label(category: &str) -> String {
    category.chars().next().map(|c| c.to_uppercase().collect::<String>()).unwrap_or_default()
}

/// Turn a listing into a marker; listings without a position are dropped.
/// Zero ordinates count as missing.
pub(crate) fn listing_marker(listing: Listing) -> Option<PlacedLabel> {
    let longitude = listing.longitude.filter(|v| *v != 0.0)?;
    let latitude = listing.latitude.filter(|v| *v != 0.0)?;
    let label = listing.street_address
        .filter(|address| !address.trim().is_empty())
        .unwrap_or_else(|| "Property".to_string());
    Some(PlacedLabel { position: Point::new(longitude, latitude), label })
}

/// Sequential per-category proximity queries. A failing or slow category
/// contributes nothing and never stops the remaining ones.
async fn points_of_interest(
    geocoder: &dyn GeocodingService,
    categories: &[String],
    per_category: usize,
    near: Point<f64>,
    wait: Duration,
    generation: u64,
) -> Vec<PlacedLabel> {
    let mut pois = Vec::new();
    for category in categories {
        match timeout(wait, geocoder.nearby(category, near)).await {
            Ok(Ok(places)) => {
                let label = category_label(category);
                pois.extend(places.into_iter().take(per_category).map(|place| PlacedLabel {
                    position: place.center,
                    label: label.clone(),
                }));
            }
            Ok(Err(err)) => {
                let message = format!("{err:#}");
                warn!(generation, category = %category, error = %message, "points-of-interest category failed");
            }
            Err(_) => warn!(generation, category = %category, ?wait, "points-of-interest category timed out"),
        }
    }
    pois
}
