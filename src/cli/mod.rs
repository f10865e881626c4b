pub mod batch;
pub mod list;
pub mod registry;
pub mod replay;
pub mod resolve;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::registry::cache::RegistryCache;
use crate::registry::Registry;
use crate::resolve::{Resolver, Threshold};

/// Where the active registry came from.
#[derive(Debug, Clone)]
pub enum RegistrySource {
    File(PathBuf),
    Cache { url: String },
    Embedded,
}

impl std::fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Cache { url } => write!(f, "cache of {url}"),
            Self::Embedded => f.write_str("embedded registry"),
        }
    }
}

/// Options shared by every subcommand that resolves titles.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub registry: Option<PathBuf>,
    pub min_confidence_score: Option<f64>,
}

/// Pick the registry: explicit path, then config path, then fetched cache,
/// then the bundled copy.
pub fn load_registry(config: &Config, flag: Option<&Path>) -> Result<(Registry, RegistrySource)> {
    if let Some(path) = flag.or(config.registry.path.as_deref()) {
        let registry = Registry::load_from_file(path)
            .with_context(|| format!("Failed to load registry: {}", path.display()))?;
        return Ok((registry, RegistrySource::File(path.to_path_buf())));
    }

    if let Some(cache) = RegistryCache::load() {
        if !cache.is_fresh(config.registry.cache_ttl_seconds) {
            warn!("registry cache is stale; run `gpumatch registry update` to refresh it");
        }
        let url = cache.source_url.clone();
        match Registry::from_document(cache.document) {
            Ok(registry) => return Ok((registry, RegistrySource::Cache { url })),
            Err(err) => warn!("ignoring invalid registry cache: {err}"),
        }
    }

    let registry = Registry::load().context("Failed to load embedded registry")?;
    Ok((registry, RegistrySource::Embedded))
}

pub fn build_resolver(config: &Config, options: &EngineOptions) -> Result<Resolver> {
    let threshold: Threshold = config.threshold(options.min_confidence_score)?;
    let (registry, source) = load_registry(config, options.registry.as_deref())?;
    info!(
        models = registry.len(),
        variants = registry.variant_count(),
        exclusions = registry.exclusions().len(),
        threshold = threshold.score(),
        "loaded {source}"
    );
    Resolver::new(registry, threshold).context("Failed to compile pattern rules")
}

/// Shorten long cell text for table output.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}
