//! IO module for reading the catchment dataset.
//!
//! # Modules
//!
//! - `geojson` - GeoJSON parsing of catchment features and route geometry
//! - `source` - Where the dataset bytes come from (disk, memory, HTTP)

pub(crate) mod geojson;
pub(crate) mod source;

pub use source::{source_for, DatasetSource, DiskSource, MemSource};
#[cfg(feature = "http")]
pub use source::HttpSource;
