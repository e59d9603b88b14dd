use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

use duel_types::WordCatalog;

/// Read and parse the word catalog file: a single JSON document with the
/// words grouped by tier plus category metadata.
pub fn load_catalog(path: &Path) -> Result<WordCatalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading word catalog from {}", path.display()))?;
    let catalog: WordCatalog = serde_json::from_str(&raw)
        .with_context(|| format!("parsing word catalog {}", path.display()))?;

    info!(
        easy = catalog.easy.len(),
        medium = catalog.medium.len(),
        hard = catalog.hard.len(),
        categories = catalog.categories.len(),
        "word catalog loaded"
    );
    Ok(catalog)
}

enum CacheSource {
    File { path: PathBuf, ttl: Duration },
    /// Fixed catalog, never re-read. Used by tests and tools.
    Static,
}

/// TTL cache in front of the catalog file. Content edits happen out of
/// band, so readers call `get()` and editors call `invalidate()` to force
/// the next read through to disk before the TTL lapses.
pub struct CatalogCache {
    source: CacheSource,
    state: RwLock<Option<(Instant, Arc<WordCatalog>)>>,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            source: CacheSource::File {
                path: path.into(),
                ttl,
            },
            state: RwLock::new(None),
        }
    }

    /// A cache pinned to the given catalog.
    pub fn preloaded(catalog: WordCatalog) -> Self {
        Self {
            source: CacheSource::Static,
            state: RwLock::new(Some((Instant::now(), Arc::new(catalog)))),
        }
    }

    pub async fn get(&self) -> Result<Arc<WordCatalog>> {
        if let Some(catalog) = self.fresh().await {
            return Ok(catalog);
        }

        let (path, _) = match &self.source {
            CacheSource::File { path, ttl } => (path, ttl),
            CacheSource::Static => anyhow::bail!("static catalog was invalidated"),
        };

        let mut state = self.state.write().await;
        // Another task may have refilled the cache while we waited.
        if let Some((at, catalog)) = state.as_ref() {
            if !self.expired(*at) {
                return Ok(catalog.clone());
            }
        }

        let catalog = Arc::new(load_catalog(path)?);
        *state = Some((Instant::now(), catalog.clone()));
        Ok(catalog)
    }

    /// Drop the cached copy so the next `get()` re-reads the file.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        *state = None;
    }

    async fn fresh(&self) -> Option<Arc<WordCatalog>> {
        let state = self.state.read().await;
        let (at, catalog) = state.as_ref()?;
        if self.expired(*at) {
            return None;
        }
        Some(catalog.clone())
    }

    fn expired(&self, cached_at: Instant) -> bool {
        match &self.source {
            CacheSource::File { ttl, .. } => cached_at.elapsed() >= *ttl,
            CacheSource::Static => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_types::{Descriptions, Difficulty, Word};

    fn sample_catalog() -> WordCatalog {
        WordCatalog {
            easy: vec![Word {
                word: "שלג".to_string(),
                category: "nature".to_string(),
                difficulty: Difficulty::Easy,
                descriptions: Descriptions {
                    easy: "לבן וקר".to_string(),
                    medium: "יורד בחורף".to_string(),
                    hard: "משקע מוצק".to_string(),
                },
                hint: "חרמון".to_string(),
                synonyms: vec![],
            }],
            medium: vec![],
            hard: vec![],
            categories: vec![],
        }
    }

    #[tokio::test]
    async fn test_preloaded_cache_serves_catalog() {
        let cache = CatalogCache::preloaded(sample_catalog());
        let catalog = cache.get().await.unwrap();
        assert_eq!(catalog.easy.len(), 1);
        assert!(catalog.find("שלג").is_some());
    }

    #[tokio::test]
    async fn test_invalidated_static_cache_errors() {
        let cache = CatalogCache::preloaded(sample_catalog());
        cache.invalidate().await;
        assert!(cache.get().await.is_err());
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let json = serde_json::to_string(&sample_catalog()).unwrap();
        let parsed: WordCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.easy[0].word, "שלג");
        assert_eq!(parsed.easy[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_catalog(Path::new("/nonexistent/words.json")).unwrap_err();
        assert!(err.to_string().contains("reading word catalog"));
    }
}
