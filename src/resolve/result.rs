use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence attached to exact and pattern matches.
pub const EXACT_CONFIDENCE: f64 = 0.9;
pub const REGEX_CONFIDENCE: f64 = 0.9;

pub const REASON_INVALID_INPUT: &str = "empty or invalid input";
pub const REASON_BELOW_THRESHOLD: &str = "no candidate above threshold";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Regex,
    Fuzzy,
    None,
}

impl MatchType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Regex => "regex",
            Self::Fuzzy => "fuzzy",
            Self::None => "none",
        }
    }

    pub const ALL: [MatchType; 4] = [Self::Exact, Self::Regex, Self::Fuzzy, Self::None];
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of resolving one title. `canonical_model` is `None` exactly when
/// `match_type` is [`MatchType::None`], and only then is `unknown_reason` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub canonical_model: Option<String>,
    pub match_type: MatchType,
    pub confidence: f64,
    pub match_notes: String,
    pub unknown_reason: Option<String>,
}

impl MatchResult {
    pub fn matched(
        identifier: impl Into<String>,
        match_type: MatchType,
        confidence: f64,
        notes: impl Into<String>,
    ) -> Self {
        debug_assert!(match_type != MatchType::None);
        Self {
            canonical_model: Some(identifier.into()),
            match_type,
            confidence,
            match_notes: notes.into(),
            unknown_reason: None,
        }
    }

    pub fn unresolved(reason: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            canonical_model: None,
            match_type: MatchType::None,
            confidence: 0.0,
            match_notes: notes.into(),
            unknown_reason: Some(reason.into()),
        }
    }

    pub fn invalid_input(notes: impl Into<String>) -> Self {
        Self::unresolved(REASON_INVALID_INPUT, notes)
    }

    pub fn model_str(&self) -> &str {
        self.canonical_model.as_deref().unwrap_or("-")
    }
}
