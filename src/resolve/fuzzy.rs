use strsim::normalized_levenshtein;
use tracing::warn;

use super::result::{MatchResult, MatchType};
use crate::error::ConfigurationError;
use crate::normalize;
use crate::registry::Registry;

/// Minimum fuzzy similarity on a 0-100 scale. Scores in the 70s were mostly
/// wrong-model hits on shared substrings, hence the default of 80.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub const DEFAULT_SCORE: f64 = 80.0;

    pub fn new(score: f64) -> Result<Self, ConfigurationError> {
        if !score.is_finite() {
            return Err(ConfigurationError::NonFiniteThreshold(score));
        }
        if !(0.0..=100.0).contains(&score) {
            return Err(ConfigurationError::ThresholdOutOfRange(score));
        }
        if score > 0.0 && score <= 1.0 {
            warn!(
                score,
                "min confidence score is on a 0-100 scale; {score} accepts almost any fuzzy candidate"
            );
        }
        Ok(Self(score))
    }

    pub fn score(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT_SCORE)
    }
}

#[derive(Debug, Clone)]
struct FuzzyEntry {
    identifier: String,
    variant: String,
    key: String,
    model_numbers: Vec<String>,
}

/// Best-scoring registry variant for a title.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyCandidate<'a> {
    pub identifier: &'a str,
    pub variant: &'a str,
    /// Similarity on a 0-100 scale.
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    entries: Vec<FuzzyEntry>,
}

impl FuzzyMatcher {
    pub fn new(registry: &Registry) -> Self {
        let entries = registry
            .variants()
            .filter_map(|v| {
                let key = normalize::fuzzy_key(v.variant);
                (!key.is_empty()).then(|| FuzzyEntry {
                    identifier: v.model.identifier.clone(),
                    variant: v.variant.to_string(),
                    model_numbers: normalize::model_numbers(&key),
                    key,
                })
            })
            .collect();
        Self { entries }
    }

    /// Highest similarity over the variants carrying the same model numbers
    /// as the title; ties keep the earliest in registry order.
    ///
    /// "RTX 3050" is one edit from "RTX 3090", so edit distance alone would
    /// hand unregistered siblings to a registered neighbour.
    pub fn best_candidate(&self, title: &str) -> Option<FuzzyCandidate<'_>> {
        let key = normalize::fuzzy_key(title);
        if key.is_empty() {
            return None;
        }
        let numbers = normalize::model_numbers(&key);

        let mut best: Option<FuzzyCandidate<'_>> = None;
        for entry in self.entries.iter().filter(|e| e.model_numbers == numbers) {
            let score = normalized_levenshtein(&key, &entry.key) * 100.0;
            if best.map_or(true, |b| score > b.score) {
                best = Some(FuzzyCandidate {
                    identifier: &entry.identifier,
                    variant: &entry.variant,
                    score,
                });
            }
        }
        best
    }

    pub fn match_title(&self, title: &str, threshold: Threshold) -> Option<MatchResult> {
        let candidate = self.best_candidate(title)?;
        if candidate.score < threshold.score() {
            return None;
        }
        Some(MatchResult::matched(
            candidate.identifier,
            MatchType::Fuzzy,
            candidate.score / 100.0,
            format!(
                "fuzzy match on variant {:?} (score {:.1})",
                candidate.variant, candidate.score
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> FuzzyMatcher {
        FuzzyMatcher::new(&Registry::load().unwrap())
    }

    #[test]
    fn test_threshold_validation() {
        assert_eq!(Threshold::default().score(), 80.0);
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(100.0).is_ok());
        assert!(matches!(
            Threshold::new(100.5),
            Err(ConfigurationError::ThresholdOutOfRange(_))
        ));
        assert!(matches!(
            Threshold::new(-1.0),
            Err(ConfigurationError::ThresholdOutOfRange(_))
        ));
        assert!(matches!(
            Threshold::new(f64::NAN),
            Err(ConfigurationError::NonFiniteThreshold(_))
        ));
    }

    #[test]
    fn test_typo_resolves() {
        // "qaudro rtx 6000" vs "quadro rtx 6000": two edits over fifteen characters
        let result = matcher()
            .match_title("NVIDIA Qaudro RTX 6000", Threshold::default())
            .unwrap();
        assert_eq!(result.canonical_model.as_deref(), Some("QUADRO_RTX_6000"));
        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert!((result.confidence - 13.0 / 15.0).abs() < 1e-9);
        assert!(result.match_notes.contains("score 86.7"));
        assert!(result.match_notes.contains("\"NVIDIA Quadro RTX 6000\""));
    }

    #[test]
    fn test_unrelated_title_has_no_candidate() {
        let m = matcher();
        assert!(m
            .match_title("GTX 1070 ti-ish typo variant", Threshold::default())
            .is_none());
        assert!(m.best_candidate("GTX 1070 ti-ish typo variant").is_none());
    }

    #[test]
    fn test_unregistered_siblings_are_not_absorbed() {
        let m = matcher();
        for title in [
            "NVIDIA GeForce RTX 3070 Ti",
            "RTX 5070 Ti",
            "RTX 5070",
            "RTX 3050",
            "RTX 2080",
            "NVIDIA Quadro RTX 4000",
            "RTX 6000",
            "NVIDIA RTX A60000",
        ] {
            assert!(
                m.match_title(title, Threshold::default()).is_none(),
                "{title} should not fuzzy-match"
            );
        }
        // same model number, extra suffix: scored, but below the default
        let best = m.best_candidate("NVIDIA GeForce RTX 3070 Ti").unwrap();
        assert_eq!(best.identifier, "RTX_3070");
        assert!(best.score < 80.0);
    }

    #[test]
    fn test_memory_size_does_not_block_candidate() {
        let m = matcher();
        let best = m.best_candidate("Qaudro RTX 6000 24 GB").unwrap();
        assert_eq!(best.identifier, "QUADRO_RTX_6000");
    }

    #[test]
    fn test_fractional_threshold_is_accepted_on_percent_scale() {
        let t = Threshold::new(0.8).unwrap();
        assert_eq!(t.score(), 0.8);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let m = matcher();
        let title = "Quadro RTX 8000 48G";
        let best = m.best_candidate(title).unwrap();
        assert_eq!(best.identifier, "QUADRO_RTX_8000");

        let at = Threshold::new(best.score).unwrap();
        let hit = m.match_title(title, at).unwrap();
        assert_eq!(hit.canonical_model.as_deref(), Some("QUADRO_RTX_8000"));

        let above = Threshold::new((best.score + 0.001).min(100.0)).unwrap();
        if above.score() > best.score {
            assert!(m.match_title(title, above).is_none());
        }
    }

    #[test]
    fn test_noise_only_title_has_no_candidate() {
        assert!(matcher().best_candidate("NVIDIA Graphics Card").is_none());
        assert!(matcher().best_candidate("").is_none());
    }

    #[test]
    fn test_ties_keep_registry_order() {
        let registry = Registry::from_json(
            r#"{"models": [
                {"id": "FIRST", "variants": ["abcd"]},
                {"id": "SECOND", "variants": ["abce"]}
            ]}"#,
        )
        .unwrap();
        let matcher = FuzzyMatcher::new(&registry);
        let best = matcher.best_candidate("abcx").unwrap();
        assert_eq!(best.identifier, "FIRST");
        assert!((best.score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let m = matcher();
        let a = m.best_candidate("NVIDIA Qaudro RTX 6000");
        let b = m.best_candidate("NVIDIA Qaudro RTX 6000");
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
