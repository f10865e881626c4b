use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// On-disk registry document: canonical models plus the exclusion keyword table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub models: Vec<CanonicalModel>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionRule>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CanonicalModel {
    #[serde(rename = "id")]
    pub identifier: String,
    /// Ordered; earlier variants win ties in exact and fuzzy lookup.
    #[serde(rename = "variants")]
    pub display_variants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExclusionRule {
    pub keyword: String,
    pub reason: String,
    #[serde(default)]
    pub mode: KeywordMode,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeywordMode {
    /// Keyword must appear as a whole token sequence.
    #[default]
    Word,
    /// Raw containment in the lowercased title.
    Substring,
}

impl KeywordMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Substring => "substring",
        }
    }
}
