//! Blocking HTTP client for refreshing the registry document.

use anyhow::{bail, Context, Result};
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;

use super::data::RegistryDocument;
use super::loader::Registry;

/// Result of a conditional fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// New document, already validated, with the server's ETag.
    Fresh(RegistryDocument, Option<String>),
    /// Server answered 304 for the cached ETag.
    NotModified,
}

pub fn fetch_registry(url: &str, etag: Option<&str>) -> Result<FetchOutcome> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("gpumatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let mut request = client.get(url);
    if let Some(etag) = etag {
        request = request.header(IF_NONE_MATCH, etag);
    }

    let response = request
        .send()
        .with_context(|| format!("Failed to fetch registry from {url}"))?;

    if response.status() == StatusCode::NOT_MODIFIED {
        return Ok(FetchOutcome::NotModified);
    }
    if !response.status().is_success() {
        bail!("Registry request to {url} failed with status {}", response.status());
    }

    let new_etag = response
        .headers()
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let document: RegistryDocument = response
        .json()
        .context("Failed to parse registry response")?;

    // Reject a bad document before it can replace a working cache.
    Registry::from_document(document.clone()).context("Fetched registry is invalid")?;

    Ok(FetchOutcome::Fresh(document, new_etag))
}
