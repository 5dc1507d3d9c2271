use ahash::AHashMap;
use geo::Point;

/// Precomputed representative point and labels for one catchment.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidEntry {
    pub coordinates: Point<f64>, // (lon, lat)
    pub name: String,
    pub suburb: Option<String>,
    pub(crate) feature: usize, // Position of the feature in the dataset
}

/// Map between catchment ids and their centroid entries.
/// Read-only once built; rebuilt whenever the dataset is reloaded.
#[derive(Debug, Clone, Default)]
pub struct CentroidIndex {
    entries: AHashMap<String, CentroidEntry>,
}

impl CentroidIndex {
    /// Insert an entry, returning the entry it replaced on an id collision.
    pub(crate) fn insert(&mut self, id: String, entry: CentroidEntry) -> Option<CentroidEntry> {
        self.entries.insert(id, entry)
    }

    #[inline] pub fn get(&self, id: &str) -> Option<&CentroidEntry> { self.entries.get(id) }

    #[inline] pub fn contains(&self, id: &str) -> bool { self.entries.contains_key(id) }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// All indexed ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = self.entries.keys().map(String::as_str).collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }
}
