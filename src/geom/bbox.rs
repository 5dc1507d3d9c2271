use geo::{Coord, Point};

/// An axis-aligned lon/lat box accumulated from vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Coord<f64>,
    max: Coord<f64>,
}

impl BoundingBox {
    /// Accumulate a box over every coordinate, or `None` if there are none.
    pub fn from_coords(coords: impl IntoIterator<Item = Coord<f64>>) -> Option<Self> {
        let mut coords = coords.into_iter();
        let first = coords.next()?;
        let mut bbox = Self { min: first, max: first };
        coords.for_each(|coord| bbox.extend(coord));
        Some(bbox)
    }

    /// Grow the box so that it covers `coord`.
    pub fn extend(&mut self, coord: Coord<f64>) {
        self.min.x = self.min.x.min(coord.x);
        self.min.y = self.min.y.min(coord.y);
        self.max.x = self.max.x.max(coord.x);
        self.max.y = self.max.y.max(coord.y);
    }

    /// Get the south-west corner.
    #[inline] pub fn min(&self) -> Coord<f64> { self.min }

    /// Get the north-east corner.
    #[inline] pub fn max(&self) -> Coord<f64> { self.max }

    #[inline]
    pub fn center(&self) -> Point<f64> {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    /// Bounds as [min_lon, min_lat, max_lon, max_lat].
    #[inline]
    pub fn to_array(&self) -> [f64; 4] { [self.min.x, self.min.y, self.max.x, self.max.y] }
}
