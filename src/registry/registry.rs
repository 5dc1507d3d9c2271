use tracing::{debug, info, warn};

use crate::config::DatasetOptions;
use crate::error::{EngineError, EngineResult};
use crate::io::{geojson::read_catchments, DatasetSource};
use super::{CatchmentFeature, CentroidEntry, CentroidIndex};

async fn fetch_features(source: &dyn DatasetSource, options: &DatasetOptions) -> anyhow::Result<Vec<CatchmentFeature>> {
    let bytes = source.fetch().await?;
    read_catchments(&bytes, options)
}

/// Every catchment loaded for this session, in dataset order.
#[derive(Debug, Clone, Default)]
pub struct CatchmentDataset {
    features: Vec<CatchmentFeature>,
}

impl CatchmentDataset {
    pub fn new(features: Vec<CatchmentFeature>) -> Self { Self { features } }

    #[inline] pub fn features(&self) -> &[CatchmentFeature] { &self.features }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// Find a catchment by its exact name (linear scan).
    pub fn find_by_name(&self, name: &str) -> EngineResult<&CatchmentFeature> {
        self.features.iter()
            .find(|feature| feature.name() == name)
            .ok_or_else(|| EngineError::NotFound(name.to_string()))
    }
}

/// A resolved identifier: the feature and its precomputed centroid entry.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub feature: &'a CatchmentFeature,
    pub entry: &'a CentroidEntry,
}

/// Owns the catchment dataset and its centroid index.
#[derive(Debug, Clone)]
pub struct CatchmentRegistry {
    dataset: CatchmentDataset,
    index: CentroidIndex,
    options: DatasetOptions,
}

impl CatchmentRegistry {
    /// Index a loaded dataset.
    pub fn new(dataset: CatchmentDataset, options: DatasetOptions) -> Self {
        let index = Self::build_index(&dataset, &options);
        Self { dataset, index, options }
    }

    /// Load the dataset from `source` and index it.
    pub async fn open(source: &dyn DatasetSource, options: DatasetOptions) -> EngineResult<Self> {
        let dataset = Self::load(source, &options).await?;
        Ok(Self::new(dataset, options))
    }

    /// Fetch and parse the catchment collection once. Failures are not retried.
    pub async fn load(source: &dyn DatasetSource, options: &DatasetOptions) -> EngineResult<CatchmentDataset> {
        let location = source.describe();
        match fetch_features(source, options).await {
            Ok(features) => {
                info!(source = %location, catchments = features.len(), "loaded catchment dataset");
                Ok(CatchmentDataset::new(features))
            }
            Err(err) => Err(EngineError::DatasetLoad(format!("{location}: {err:#}"))),
        }
    }

    /// Build the id -> centroid index. Colliding ids keep the later feature;
    /// features whose centroid cannot be computed are left out.
    pub fn build_index(dataset: &CatchmentDataset, options: &DatasetOptions) -> CentroidIndex {
        let mut index = CentroidIndex::default();
        for (pos, feature) in dataset.features().iter().enumerate() {
            let coordinates = match feature.centroid() {
                Ok(point) => point,
                Err(err) => {
                    warn!(name = feature.name(), error = %err, "skipping catchment without a usable centroid");
                    continue;
                }
            };
            let entry = CentroidEntry {
                coordinates,
                name: feature.name().to_string(),
                suburb: feature.resolved_suburb(&options.suburb_markers),
                feature: pos,
            };
            if let Some(previous) = index.insert(feature.id().to_string(), entry) {
                warn!(id = feature.id(), previous = %previous.name, name = feature.name(),
                    "catchment id collision, keeping the later feature");
            }
        }
        debug!(entries = index.len(), "built centroid index");
        index
    }

    /// Replace the dataset and rebuild the index.
    pub fn reload(&mut self, dataset: CatchmentDataset) {
        self.index = Self::build_index(&dataset, &self.options);
        self.dataset = dataset;
    }

    /// Look up a catchment by identifier.
    pub fn resolve(&self, id: &str) -> EngineResult<Resolved<'_>> {
        let entry = self.index.get(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        let feature = &self.dataset.features()[entry.feature];
        Ok(Resolved { feature, entry })
    }

    /// Look up a catchment by its exact name.
    #[inline]
    pub fn find_by_name(&self, name: &str) -> EngineResult<&CatchmentFeature> {
        self.dataset.find_by_name(name)
    }

    #[inline] pub fn dataset(&self) -> &CatchmentDataset { &self.dataset }
    #[inline] pub fn index(&self) -> &CentroidIndex { &self.index }
    #[inline] pub fn options(&self) -> &DatasetOptions { &self.options }
}
