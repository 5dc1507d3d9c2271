use geo::{Coord, Geometry, LineString, Point};
use thiserror::Error;

use super::BoundingBox;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Only Polygon and MultiPolygon catchments are supported.
    #[error("unsupported geometry kind: {0}")]
    Unsupported(&'static str),

    #[error("geometry has no vertices")]
    Empty,
}

/// GeoJSON name of a geometry kind.
fn kind_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// The ring used for both centroid and bounds: the exterior of a Polygon,
/// or the exterior of the first part of a MultiPolygon.
pub fn exterior_ring(geometry: &Geometry<f64>) -> Result<&LineString<f64>, GeometryError> {
    let ring = match geometry {
        Geometry::Polygon(polygon) => polygon.exterior(),
        Geometry::MultiPolygon(parts) => parts.0.first().ok_or(GeometryError::Empty)?.exterior(),
        other => return Err(GeometryError::Unsupported(kind_name(other))),
    };
    if ring.0.is_empty() { return Err(GeometryError::Empty) }
    Ok(ring)
}

/// Ring vertices without the duplicated closing coordinate.
fn open_vertices(ring: &LineString<f64>) -> &[Coord<f64>] {
    let coords = ring.0.as_slice();
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => &coords[..coords.len() - 1],
        _ => coords,
    }
}

/// Representative point of a catchment: the mean of its outer-ring vertices.
/// MultiPolygons only contribute their first part; parts are not area-weighted.
pub fn centroid(geometry: &Geometry<f64>) -> Result<Point<f64>, GeometryError> {
    let vertices = open_vertices(exterior_ring(geometry)?);
    let n = vertices.len() as f64;
    let (sx, sy) = vertices.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Ok(Point::new(sx / n, sy / n))
}

/// Bounding box of the outer ring (first part only for MultiPolygons).
pub fn bounds_of(geometry: &Geometry<f64>) -> Result<BoundingBox, GeometryError> {
    BoundingBox::from_coords(exterior_ring(geometry)?.coords().copied()).ok_or(GeometryError::Empty)
}
