//! Persistent disk cache for registry documents fetched with `registry update`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::data::RegistryDocument;

pub const CACHE_VERSION: u32 = 1;
const CACHE_FILENAME: &str = "registry-cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryCache {
    pub version: u32,
    pub source_url: String,
    pub etag: Option<String>,
    pub fetched_at: i64,
    pub document: RegistryDocument,
}

impl RegistryCache {
    pub fn new(source_url: String, etag: Option<String>, document: RegistryDocument) -> Self {
        Self {
            version: CACHE_VERSION,
            source_url,
            etag,
            fetched_at: now_secs(),
            document,
        }
    }

    pub fn cache_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gpumatch").join(CACHE_FILENAME))
    }

    /// Load the cache, treating an unreadable or outdated file as absent.
    pub fn load() -> Option<Self> {
        match Self::try_load() {
            Ok(cache) => cache,
            Err(err) => {
                tracing::warn!("ignoring unreadable registry cache: {err:#}");
                None
            }
        }
    }

    fn try_load() -> Result<Option<Self>> {
        let Some(path) = Self::cache_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read registry cache: {}", path.display()))?;
        let cache: RegistryCache =
            serde_json::from_str(&contents).context("Failed to parse registry cache")?;

        if cache.version != CACHE_VERSION {
            return Ok(None);
        }

        Ok(Some(cache))
    }

    pub fn save(&self) -> Result<()> {
        let path =
            Self::cache_path().ok_or_else(|| anyhow::anyhow!("Could not determine config dir"))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }

        let contents = serde_json::to_string(self)?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write registry cache: {}", path.display()))?;

        Ok(())
    }

    /// Remove the cache file; returns whether one existed.
    pub fn clear() -> Result<bool> {
        let Some(path) = Self::cache_path() else {
            return Ok(false);
        };
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove registry cache: {}", path.display()))?;
        Ok(true)
    }

    pub fn is_fresh(&self, ttl_secs: u64) -> bool {
        now_secs() - self.fetched_at < ttl_secs as i64
    }

    pub fn touch(&mut self) {
        self.fetched_at = now_secs();
    }
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::data::CanonicalModel;

    fn document() -> RegistryDocument {
        RegistryDocument {
            schema_version: 1,
            models: vec![CanonicalModel {
                identifier: "RTX_4090".into(),
                display_variants: vec!["RTX 4090".into()],
            }],
            exclusions: Vec::new(),
        }
    }

    #[test]
    fn test_new_cache_is_fresh() {
        let cache = RegistryCache::new("https://example.test/r.json".into(), None, document());
        assert_eq!(cache.version, CACHE_VERSION);
        assert!(cache.is_fresh(3600));
    }

    #[test]
    fn test_stale_cache() {
        let mut cache = RegistryCache::new("u".into(), Some("\"abc\"".into()), document());
        cache.fetched_at -= 7200;
        assert!(!cache.is_fresh(3600));
        cache.touch();
        assert!(cache.is_fresh(3600));
    }

    #[test]
    fn test_cache_round_trips_document() {
        let cache = RegistryCache::new("u".into(), Some("\"abc\"".into()), document());
        let json = serde_json::to_string(&cache).unwrap();
        let back: RegistryCache = serde_json::from_str(&json).unwrap();
        assert_eq!(back.document.models, cache.document.models);
        assert_eq!(back.etag.as_deref(), Some("\"abc\""));
    }
}
