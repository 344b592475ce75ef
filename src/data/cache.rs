//! Content-addressed memo of normalized datasets.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use super::loader::{parse_source, read_source, LoadError, SourceFormat};
use super::model::Dataset;
use super::normalize::normalize;

/// Identity of a source: its format plus a blake3 digest of its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub format: SourceFormat,
    pub digest: blake3::Hash,
}

impl SourceKey {
    pub fn new(format: SourceFormat, bytes: &[u8]) -> Self {
        SourceKey {
            format,
            digest: blake3::hash(bytes),
        }
    }

    /// First 8 hex characters of the digest, for log lines.
    pub fn short(&self) -> String {
        self.digest.to_hex()[..8].to_string()
    }
}

/// Keeps the most recently loaded datasets so re-opening identical content
/// skips parsing. Oldest entries are evicted past `capacity`.
#[derive(Debug)]
pub struct DatasetCache {
    capacity: usize,
    entries: VecDeque<(SourceKey, Arc<Dataset>)>,
    hits: u64,
    misses: u64,
}

impl DatasetCache {
    pub fn new(capacity: usize) -> Self {
        DatasetCache {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Load `path`, reusing a cached dataset when its content was seen before.
    pub fn load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let format = SourceFormat::from_path(path)?;
        let bytes = read_source(path)?;
        let key = SourceKey::new(format, &bytes);

        if let Some(ds) = self.get(&key) {
            self.hits += 1;
            log::info!("Cache hit for {} ({})", path.display(), key.short());
            return Ok(ds);
        }

        self.misses += 1;
        let raw = parse_source(path, format, &bytes)?;
        let dataset = Arc::new(normalize(&raw));
        log::info!(
            "Normalized {} records from {} ({})",
            dataset.len(),
            path.display(),
            key.short()
        );
        self.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn get(&self, key: &SourceKey) -> Option<Arc<Dataset>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, ds)| Arc::clone(ds))
    }

    pub fn insert(&mut self, key: SourceKey, dataset: Arc<Dataset>) {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push_back((key, dataset));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Drop every cached dataset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
