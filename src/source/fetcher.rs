//! Cached retrieval of one (year, prefecture) GeoJSON document.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tracing::{debug, info};

use super::{create_client, download_bytes, extract_geojson, zip_url, PrefCode, RetryPolicy};
use crate::error::{Result, SourceError};
use crate::models::MergedFeature;
use crate::n03::extract_features;

/// Fetches N03 documents, reading from and writing to an optional cache
/// directory of extracted `.geojson` files.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base_url: String,
    cache_dir: Option<PathBuf>,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(base_url: impl Into<String>, cache_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            base_url: base_url.into(),
            cache_dir,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn zip_url(&self, year: i32, pref_code: PrefCode) -> String {
        zip_url(&self.base_url, year, pref_code)
    }

    /// `{cache_dir}/{pref}-{year}.geojson`, when caching is enabled.
    pub fn cache_path(&self, year: i32, pref_code: PrefCode) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{pref_code}-{year}.geojson")))
    }

    /// Raw GeoJSON text for one (year, prefecture).
    pub async fn read_geojson(
        &self,
        year: i32,
        pref_code: PrefCode,
    ) -> std::result::Result<String, SourceError> {
        let cache_path = self.cache_path(year, pref_code);

        if let Some(path) = &cache_path {
            if tokio::fs::try_exists(path).await? {
                debug!(path = %path.display(), "Using cached GeoJSON");
                return Ok(tokio::fs::read_to_string(path).await?);
            }
        }

        let url = self.zip_url(year, pref_code);
        info!(%url, "Downloading N03 archive");
        let bytes = download_bytes(&self.client, &url, self.retry).await?;
        let geojson = extract_geojson(&bytes)?;

        if let Some(path) = &cache_path {
            write_cache(path, &geojson).await?;
        }

        Ok(geojson)
    }

    /// Fetch, parse and preprocess one (year, prefecture).
    pub async fn features(&self, year: i32, pref_code: PrefCode) -> Result<Vec<MergedFeature>> {
        let geojson = self.read_geojson(year, pref_code).await?;
        extract_features(&geojson)
    }
}

async fn write_cache(path: &Path, geojson: &str) -> std::result::Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, geojson).await?;
    debug!(path = %path.display(), "Cached GeoJSON");
    Ok(())
}
