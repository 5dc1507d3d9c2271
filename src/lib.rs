#![doc = "Catchment selection and map overlay engine"]
mod config;
mod engine;
mod enrich;
mod error;
mod geom;
mod io;
mod overlay;
mod registry;
mod selection;
mod services;

#[doc(inline)]
pub use config::{DatasetOptions, EngineConfig, LinkOptions, PoiOptions, Timeouts, ViewOptions};

#[doc(inline)]
pub use engine::{Engine, EngineEvent, JourneyOutcome, JourneySummary, Notice};

#[doc(inline)]
pub use enrich::{category_label, PlacedLabel, QueryKind, QueryOutcome, QueryPayload, RouteOutcome};

#[doc(inline)]
pub use error::{EngineError, EngineResult};

#[doc(inline)]
pub use geom::{bounds_of, centroid, exterior_ring, BoundingBox, GeometryError};

#[doc(inline)]
pub use io::{source_for, DatasetSource, DiskSource, MemSource};

#[cfg(feature = "http")]
#[doc(inline)]
pub use io::HttpSource;

#[doc(inline)]
pub use overlay::{HeadlessMap, MapStyle, MapSurface, Marker, MarkerId, MarkerKind, OverlaySync};

#[doc(inline)]
pub use registry::{derive_suburb, slug, CatchmentDataset, CatchmentFeature, CatchmentRegistry, CentroidEntry, CentroidIndex, Resolved};

#[doc(inline)]
pub use selection::{inbound_identifier, AddressBar, MemoryAddressBar, Phase, Selection, SelectionMachine, ShareableLink};

#[doc(inline)]
pub use services::{DirectionsService, GeocodingService, ListingsService, Listing, Place, RouteResult, Services};

#[cfg(feature = "http")]
#[doc(inline)]
pub use services::{MapboxClient, RealtyListings};
