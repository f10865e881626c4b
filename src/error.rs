use std::path::PathBuf;

use thiserror::Error;

/// Startup-time failure while reading or validating the canonical registry.
#[derive(Debug, Error)]
pub enum RegistryLoadError {
    #[error("failed to read registry {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed registry document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported registry schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },
    #[error("model at position {index} has an empty identifier")]
    EmptyIdentifier { index: usize },
    #[error("duplicate model identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("model {0} has no display variants")]
    EmptyVariants(String),
    #[error("model {0} has a blank display variant")]
    BlankVariant(String),
    #[error("exclusion rule at position {index} is invalid: {reason}")]
    InvalidExclusion { index: usize, reason: String },
    #[error("pattern for {identifier} does not compile ({source_expression}): {source}")]
    InvalidPattern {
        identifier: String,
        source_expression: String,
        #[source]
        source: regex::Error,
    },
}

/// Startup-time failure in operator-supplied matching configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("min confidence score must be a finite number, got {0}")]
    NonFiniteThreshold(f64),
    #[error("min confidence score must be within 0-100, got {0}")]
    ThresholdOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RegistryLoadError::DuplicateIdentifier("RTX_4090".into());
        assert_eq!(err.to_string(), "duplicate model identifier: RTX_4090");

        let err = ConfigurationError::ThresholdOutOfRange(120.0);
        assert_eq!(
            err.to_string(),
            "min confidence score must be within 0-100, got 120"
        );
    }
}
