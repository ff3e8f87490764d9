use crate::data;
use crate::error::MapError;
use crate::types::BoundaryDataset;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;

/// Session cache of parsed boundary files, keyed by region code. A dataset is
/// fetched on first use and never invalidated.
#[derive(Debug)]
pub struct RegionCache {
    sources: HashMap<String, PathBuf>,
    loaded: HashMap<String, BoundaryDataset>,
}

impl RegionCache {
    pub fn new(sources: HashMap<String, PathBuf>) -> Self {
        RegionCache {
            sources,
            loaded: HashMap::new(),
        }
    }

    /// Region codes known to the configuration, sorted for stable UI order.
    pub fn regions(&self) -> Vec<String> {
        let mut regions: Vec<String> = self.sources.keys().cloned().collect();
        regions.sort();
        regions
    }

    pub fn source_for(&self, region: &str) -> Result<PathBuf, MapError> {
        self.sources
            .get(region)
            .cloned()
            .ok_or_else(|| MapError::UnknownRegion(region.to_string()))
    }

    pub fn contains(&self, region: &str) -> bool {
        self.loaded.contains_key(region)
    }

    pub fn get(&self, region: &str) -> Option<&BoundaryDataset> {
        self.loaded.get(region)
    }

    pub fn loaded(&self) -> &HashMap<String, BoundaryDataset> {
        &self.loaded
    }

    /// Stores a dataset fetched out-of-band (the async server path).
    pub fn insert(&mut self, region: &str, dataset: BoundaryDataset) {
        self.loaded.insert(region.to_string(), dataset);
    }

    /// Fetches and caches the region's dataset if it is not already present.
    /// Idempotent: a second call returns the cached value without touching
    /// the filesystem.
    pub fn ensure_loaded(&mut self, region: &str) -> Result<&BoundaryDataset, MapError> {
        if !self.loaded.contains_key(region) {
            let path = self.source_for(region)?;
            let dataset =
                data::load_dataset(&path).map_err(|e| MapError::fetch(region, format!("{e:#}")))?;
            info!(region, features = dataset.collection.features.len(), "loaded boundary dataset");
            self.loaded.insert(region.to_string(), dataset);
        }
        Ok(&self.loaded[region])
    }
}
