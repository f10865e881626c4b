use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use super::data::{CanonicalModel, ExclusionRule, KeywordMode, RegistryDocument, SCHEMA_VERSION};
use crate::error::RegistryLoadError;
use crate::normalize;

const EMBEDDED_REGISTRY: &str = include_str!("../../data/registry.json");

/// Immutable registry of canonical models and exclusion keywords.
#[derive(Debug, Clone)]
pub struct Registry {
    models: Vec<CanonicalModel>,
    exclusions: Vec<ExclusionRule>,
    // exact key -> (model index, variant index); first registration wins
    exact_index: HashMap<String, (usize, usize)>,
}

/// A display variant hit from [`Registry::lookup_exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRef<'a> {
    pub model: &'a CanonicalModel,
    pub variant: &'a str,
}

impl Registry {
    /// Load the registry bundled into the binary.
    pub fn load() -> Result<Self, RegistryLoadError> {
        Self::from_json(EMBEDDED_REGISTRY)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RegistryLoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, RegistryLoadError> {
        let document: RegistryDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }

    pub fn from_document(document: RegistryDocument) -> Result<Self, RegistryLoadError> {
        if document.schema_version != SCHEMA_VERSION {
            return Err(RegistryLoadError::UnsupportedSchema {
                found: document.schema_version,
                expected: SCHEMA_VERSION,
            });
        }

        let mut seen = HashSet::new();
        let mut exact_index = HashMap::new();

        for (index, model) in document.models.iter().enumerate() {
            if model.identifier.trim().is_empty() {
                return Err(RegistryLoadError::EmptyIdentifier { index });
            }
            if !seen.insert(model.identifier.as_str()) {
                return Err(RegistryLoadError::DuplicateIdentifier(
                    model.identifier.clone(),
                ));
            }
            if model.display_variants.is_empty() {
                return Err(RegistryLoadError::EmptyVariants(model.identifier.clone()));
            }

            for (variant_index, variant) in model.display_variants.iter().enumerate() {
                let key = normalize::exact_key(variant);
                if key.is_empty() {
                    return Err(RegistryLoadError::BlankVariant(model.identifier.clone()));
                }
                match exact_index.get(&key) {
                    Some(&(owner, _)) if owner != index => {
                        let owner: &CanonicalModel = &document.models[owner];
                        warn!(
                            variant = %variant,
                            kept = %owner.identifier,
                            shadowed = %model.identifier,
                            "display variant registered by two models; earlier entry wins"
                        );
                    }
                    Some(_) => {}
                    None => {
                        exact_index.insert(key, (index, variant_index));
                    }
                }
            }
        }

        for (index, rule) in document.exclusions.iter().enumerate() {
            validate_exclusion(index, rule)?;
        }

        debug!(
            models = document.models.len(),
            exclusions = document.exclusions.len(),
            "registry loaded"
        );

        Ok(Self {
            models: document.models,
            exclusions: document.exclusions,
            exact_index,
        })
    }

    /// First model in registry order owning a variant equal to `normalized_title`,
    /// which must already be an [`normalize::exact_key`].
    pub fn lookup_exact(&self, normalized_title: &str) -> Option<VariantRef<'_>> {
        let &(model, variant) = self.exact_index.get(normalized_title)?;
        let model = &self.models[model];
        Some(VariantRef {
            model,
            variant: &model.display_variants[variant],
        })
    }

    pub fn models(&self) -> &[CanonicalModel] {
        &self.models
    }

    pub fn exclusions(&self) -> &[ExclusionRule] {
        &self.exclusions
    }

    pub fn get(&self, identifier: &str) -> Option<&CanonicalModel> {
        self.models.iter().find(|m| m.identifier == identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.get(identifier).is_some()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn variant_count(&self) -> usize {
        self.models.iter().map(|m| m.display_variants.len()).sum()
    }

    /// Every display variant in registry order, paired with its model.
    pub fn variants(&self) -> impl Iterator<Item = VariantRef<'_>> {
        self.models.iter().flat_map(|model| {
            model
                .display_variants
                .iter()
                .map(move |variant| VariantRef { model, variant })
        })
    }
}

fn validate_exclusion(index: usize, rule: &ExclusionRule) -> Result<(), RegistryLoadError> {
    let usable = match rule.mode {
        KeywordMode::Word => !normalize::tokens(&rule.keyword).is_empty(),
        KeywordMode::Substring => !rule.keyword.trim().is_empty(),
    };
    if !usable {
        return Err(RegistryLoadError::InvalidExclusion {
            index,
            reason: format!("keyword {:?} is empty", rule.keyword),
        });
    }
    if rule.reason.trim().is_empty() {
        return Err(RegistryLoadError::InvalidExclusion {
            index,
            reason: format!("keyword {:?} has no reason", rule.keyword),
        });
    }
    Ok(())
}
