use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::registry::cache::RegistryCache;
use crate::registry::fetch::{fetch_registry, FetchOutcome};
use crate::registry::Registry;

pub fn update(config: &Config, url: Option<&str>) -> Result<()> {
    let Some(url) = url.or(config.registry.url.as_deref()) else {
        bail!("No registry URL: pass --url or set [registry] url in config.toml");
    };

    let cached = RegistryCache::load().filter(|c| c.source_url == url);
    let etag = cached.as_ref().and_then(|c| c.etag.as_deref());

    match fetch_registry(url, etag)? {
        FetchOutcome::NotModified => {
            if let Some(mut cache) = cached {
                cache.touch();
                cache.save()?;
            }
            info!(url, "registry not modified");
            println!("Registry is up to date ({url})");
        }
        FetchOutcome::Fresh(document, etag) => {
            let models = document.models.len();
            let exclusions = document.exclusions.len();
            RegistryCache::new(url.to_string(), etag, document).save()?;
            info!(url, models, exclusions, "registry cache updated");
            println!("Fetched {models} models and {exclusions} exclusions from {url}");
        }
    }

    Ok(())
}

pub fn status(config: &Config) -> Result<()> {
    if let Some(path) = &config.registry.path {
        println!("Registry file (config): {}", path.display());
    }

    match RegistryCache::load() {
        Some(cache) => {
            let fresh = cache.is_fresh(config.registry.cache_ttl_seconds);
            println!("Cached registry: {}", cache.source_url);
            println!("  models:     {}", cache.document.models.len());
            println!("  exclusions: {}", cache.document.exclusions.len());
            println!("  etag:       {}", cache.etag.as_deref().unwrap_or("-"));
            println!(
                "  fetched:    {} ({})",
                format_timestamp(cache.fetched_at),
                if fresh { "fresh" } else { "stale" }
            );
        }
        None => {
            let embedded = Registry::load()?;
            println!(
                "No cached registry; using embedded copy ({} models, {} exclusions)",
                embedded.len(),
                embedded.exclusions().len()
            );
        }
    }

    Ok(())
}

pub fn clear() -> Result<()> {
    if RegistryCache::clear()? {
        println!("Removed registry cache");
    } else {
        println!("No registry cache to remove");
    }
    Ok(())
}

fn format_timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13 UTC");
    }

    #[test]
    fn test_update_without_url_fails() {
        let config = Config::default();
        let err = update(&config, None).unwrap_err();
        assert!(err.to_string().contains("No registry URL"));
    }
}
