mod bbox;
mod geom;

pub use bbox::BoundingBox;
pub use geom::{bounds_of, centroid, exterior_ring, GeometryError};
