use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Read-only access to the raw catchment dataset.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the dataset bytes.
    async fn fetch(&self) -> Result<Arc<[u8]>>;

    /// Human-readable location, for logs and error messages.
    fn describe(&self) -> String;
}

/// Dataset stored on local disk.
pub struct DiskSource {
    path: PathBuf,
}

impl DiskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

#[async_trait]
impl DatasetSource for DiskSource {
    async fn fetch(&self) -> Result<Arc<[u8]>> {
        let bytes = tokio::fs::read(&self.path).await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        Ok(Arc::from(bytes))
    }

    fn describe(&self) -> String { self.path.display().to_string() }
}

/// Dataset already held in memory.
#[derive(Clone)]
pub struct MemSource {
    bytes: Arc<[u8]>,
}

impl MemSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self { Self { bytes: bytes.into() } }
}

#[async_trait]
impl DatasetSource for MemSource {
    async fn fetch(&self) -> Result<Arc<[u8]>> { Ok(self.bytes.clone()) }

    fn describe(&self) -> String { format!("<memory: {} bytes>", self.bytes.len()) }
}

/// Dataset served over HTTP(S).
#[cfg(feature = "http")]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch(&self) -> Result<Arc<[u8]>> {
        let response = self.client.get(&self.url).send().await
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {}", self.url))?;
        let bytes = response.bytes().await
            .with_context(|| format!("Failed to read body of {}", self.url))?;
        Ok(Arc::from(bytes.to_vec()))
    }

    fn describe(&self) -> String { self.url.clone() }
}

/// Pick a source from a location string: URLs go over HTTP, anything else is a path.
pub fn source_for(location: &str) -> Box<dyn DatasetSource> {
    #[cfg(feature = "http")]
    if location.starts_with("http://") || location.starts_with("https://") {
        return Box::new(HttpSource::new(location));
    }
    Box::new(DiskSource::new(location))
}
