//! Title-to-canonical-model resolution.
//!
//! A title passes through exclusion, exact, pattern and fuzzy stages in that
//! order and stops at the first stage that produces an answer. Every path
//! ends in a populated [`MatchResult`]; only construction can fail.

pub mod batch;
pub mod exact;
pub mod exclusion;
pub mod fuzzy;
pub mod pattern;
pub mod result;
pub mod rules;

use tracing::debug;

pub use exclusion::ExclusionFilter;
pub use fuzzy::{FuzzyMatcher, Threshold};
pub use pattern::PatternMatcher;
pub use result::{MatchResult, MatchType};

use crate::error::RegistryLoadError;
use crate::registry::Registry;
use crate::normalize;
use result::REASON_BELOW_THRESHOLD;

pub struct Resolver {
    registry: Registry,
    exclusions: ExclusionFilter,
    patterns: PatternMatcher,
    fuzzy: FuzzyMatcher,
    threshold: Threshold,
}

impl Resolver {
    pub fn new(registry: Registry, threshold: Threshold) -> Result<Self, RegistryLoadError> {
        let exclusions = ExclusionFilter::new(registry.exclusions());
        let patterns = PatternMatcher::new(&registry)?;
        let fuzzy = FuzzyMatcher::new(&registry);
        debug!(
            exclusions = exclusions.len(),
            rules = patterns.rules().len(),
            "resolver ready"
        );
        Ok(Self {
            registry,
            exclusions,
            patterns,
            fuzzy,
            threshold,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn patterns(&self) -> &PatternMatcher {
        &self.patterns
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn resolve(&self, title: &str) -> MatchResult {
        self.resolve_with(title, self.threshold)
    }

    /// Resolve with a per-call fuzzy threshold instead of the configured one.
    pub fn resolve_with(&self, title: &str, threshold: Threshold) -> MatchResult {
        if title.trim().is_empty() {
            return MatchResult::invalid_input("title is empty");
        }

        let verdict = self.exclusions.check(title);
        if verdict.excluded {
            let keyword = verdict.keyword.unwrap_or_default();
            debug!(title, keyword = %keyword, "excluded");
            return MatchResult::unresolved(
                verdict.reason.unwrap_or_default(),
                format!("excluded by keyword {keyword:?}"),
            );
        }

        if let Some(result) = exact::match_title(&self.registry, title) {
            debug!(title, model = result.model_str(), "exact match");
            return result;
        }

        if let Some(result) = self.patterns.match_title(title) {
            debug!(title, model = result.model_str(), "pattern match");
            return result;
        }

        if let Some(result) = self.fuzzy.match_title(title, threshold) {
            debug!(title, model = result.model_str(), "fuzzy match");
            return result;
        }

        let notes = match self.fuzzy.best_candidate(title) {
            Some(best) => format!(
                "best fuzzy candidate {:?} ({}) scored {:.1}, below threshold {:.1}",
                best.variant,
                best.identifier,
                best.score,
                threshold.score()
            ),
            None if normalize::fuzzy_key(title).is_empty() => {
                "no comparable tokens for fuzzy matching".to_string()
            }
            None => format!(
                "no registry variant shares model numbers {:?}, threshold {:.1}",
                normalize::model_numbers(title),
                threshold.score()
            ),
        };
        debug!(title, "unresolved");
        MatchResult::unresolved(REASON_BELOW_THRESHOLD, notes)
    }

    /// Resolve an untyped ingestion field; anything but a string is invalid input.
    pub fn resolve_field(&self, value: Option<&serde_json::Value>) -> MatchResult {
        match value {
            Some(serde_json::Value::String(title)) => self.resolve(title),
            Some(serde_json::Value::Null) | None => {
                MatchResult::invalid_input("title is missing")
            }
            Some(other) => MatchResult::invalid_input(format!(
                "title is not text ({})",
                json_kind(other)
            )),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use result::{EXACT_CONFIDENCE, REASON_INVALID_INPUT, REGEX_CONFIDENCE};

    fn resolver() -> Resolver {
        Resolver::new(Registry::load().unwrap(), Threshold::default()).unwrap()
    }

    #[test]
    fn test_exact_scenario() {
        let r = resolver().resolve("NVIDIA GeForce RTX 4090");
        assert_eq!(r.match_type, MatchType::Exact);
        assert_eq!(r.canonical_model.as_deref(), Some("RTX_4090"));
        assert_eq!(r.confidence, EXACT_CONFIDENCE);
        assert_eq!(r.unknown_reason, None);
    }

    #[test]
    fn test_oem_a100_scenario() {
        let r = resolver().resolve("Cisco NVIDIA Tesla A100 80GB PCIe");
        assert_eq!(r.match_type, MatchType::Regex);
        assert_eq!(r.canonical_model.as_deref(), Some("A100_80GB_PCIE"));
        assert_eq!(r.confidence, REGEX_CONFIDENCE);
        assert!(r.match_notes.contains("A100"));
    }

    #[test]
    fn test_rtx_4500_ada_scenario() {
        let r = resolver().resolve("NVIDIA RTX 4500 ADA");
        assert_eq!(r.match_type, MatchType::Regex);
        assert_eq!(r.canonical_model.as_deref(), Some("RTX_4500_ADA"));
    }

    #[test]
    fn test_amx_scenario() {
        let r = resolver().resolve("AMX NMX-WP-N1512 N1000");
        assert_eq!(r.match_type, MatchType::None);
        assert_eq!(r.canonical_model, None);
        assert!(r.unknown_reason.unwrap().contains("AMX"));
        assert_eq!(r.match_notes, "excluded by keyword \"amx\"");
    }

    #[test]
    fn test_typo_below_threshold_scenario() {
        let r = resolver().resolve("GTX 1070 ti-ish typo variant");
        assert_eq!(r.match_type, MatchType::None);
        assert_eq!(r.unknown_reason.as_deref(), Some(REASON_BELOW_THRESHOLD));
        assert!(r.match_notes.contains("threshold 80.0"));
        assert!(r.match_notes.contains("\"1070\""));
    }

    #[test]
    fn test_unregistered_sibling_stays_unresolved() {
        let resolver = resolver();
        for title in ["NVIDIA GeForce RTX 3070 Ti", "RTX 3050", "NVIDIA Quadro RTX 4000"] {
            let r = resolver.resolve(title);
            assert_eq!(r.match_type, MatchType::None, "{title}");
            assert_eq!(r.unknown_reason.as_deref(), Some(REASON_BELOW_THRESHOLD));
        }
    }

    #[test]
    fn test_hyphenated_titles_hit_patterns() {
        let resolver = resolver();
        let r = resolver.resolve("PNY RTX-4500-Ada 24GB");
        assert_eq!(r.match_type, MatchType::Regex);
        assert_eq!(r.canonical_model.as_deref(), Some("RTX_4500_ADA"));
        let r = resolver.resolve("MSI RTX-4090 Suprim X 24GB");
        assert_eq!(r.match_type, MatchType::Regex);
        assert_eq!(r.canonical_model.as_deref(), Some("RTX_4090"));
    }

    #[test]
    fn test_empty_scenario() {
        let resolver = resolver();
        for title in ["", "   ", "\t\n"] {
            let r = resolver.resolve(title);
            assert_eq!(r.match_type, MatchType::None);
            assert_eq!(r.unknown_reason.as_deref(), Some(REASON_INVALID_INPUT));
            assert!(!r.match_notes.is_empty());
        }
    }

    #[test]
    fn test_exclusion_beats_exact_match() {
        let registry = Registry::from_json(
            r#"{"models": [{"id": "A2", "variants": ["Live Gamer A2"]}],
                "exclusions": [{"keyword": "live gamer", "reason": "capture card"}]}"#,
        )
        .unwrap();
        let resolver = Resolver::new(registry, Threshold::default()).unwrap();
        let r = resolver.resolve("Live Gamer A2");
        assert_eq!(r.match_type, MatchType::None);
        assert_eq!(r.unknown_reason.as_deref(), Some("capture card"));
    }

    #[test]
    fn test_exact_beats_pattern_for_other_model() {
        // The variant text would fire the H100_PCIE rule, but exact lookup runs first.
        let registry = Registry::from_json(
            r#"{"models": [
                {"id": "H100_PCIE", "variants": ["NVIDIA H100 PCIe"]},
                {"id": "GH200", "variants": ["NVIDIA H100 Grace Hopper Superchip"]}
            ]}"#,
        )
        .unwrap();
        let resolver = Resolver::new(registry, Threshold::default()).unwrap();
        let r = resolver.resolve("nvidia h100 grace hopper superchip");
        assert_eq!(r.match_type, MatchType::Exact);
        assert_eq!(r.canonical_model.as_deref(), Some("GH200"));

        let r = resolver.resolve("NVIDIA H100 Grace Hopper Superchip 96GB");
        assert_eq!(r.match_type, MatchType::Regex);
        assert_eq!(r.canonical_model.as_deref(), Some("H100_PCIE"));
    }

    #[test]
    fn test_fuzzy_fallback() {
        let r = resolver().resolve("NVIDIA Qaudro RTX 6000");
        assert_eq!(r.match_type, MatchType::Fuzzy);
        assert_eq!(r.canonical_model.as_deref(), Some("QUADRO_RTX_6000"));
    }

    #[test]
    fn test_threshold_override() {
        let resolver = resolver();
        let strict = Threshold::new(95.0).unwrap();
        let r = resolver.resolve_with("NVIDIA Qaudro RTX 6000", strict);
        assert_eq!(r.match_type, MatchType::None);
        assert!(r.match_notes.contains("below threshold 95.0"));
    }

    #[test]
    fn test_resolve_field_rejects_non_text() {
        let resolver = resolver();
        let r = resolver.resolve_field(Some(&serde_json::json!(4090)));
        assert_eq!(r.unknown_reason.as_deref(), Some(REASON_INVALID_INPUT));
        assert!(r.match_notes.contains("number"));

        let r = resolver.resolve_field(None);
        assert_eq!(r.unknown_reason.as_deref(), Some(REASON_INVALID_INPUT));

        let r = resolver.resolve_field(Some(&serde_json::json!("RTX 4090")));
        assert_eq!(r.canonical_model.as_deref(), Some("RTX_4090"));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let resolver = resolver();
        for title in [
            "NVIDIA GeForce RTX 4090",
            "PNY RTX 5000 Ada",
            "NVIDIA Qaudro RTX 6000",
            "Intel Arc A40",
            "something else entirely",
        ] {
            assert_eq!(resolver.resolve(title), resolver.resolve(title));
        }
    }

    #[test]
    fn test_resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Resolver>();
    }
}
