use super::result::{MatchResult, MatchType, EXACT_CONFIDENCE};
use crate::normalize;
use crate::registry::Registry;

/// Direct lookup of the whole title against registry display variants.
pub fn match_title(registry: &Registry, title: &str) -> Option<MatchResult> {
    let key = normalize::exact_key(title);
    if key.is_empty() {
        return None;
    }

    let hit = registry.lookup_exact(&key)?;
    Some(MatchResult::matched(
        hit.model.identifier.clone(),
        MatchType::Exact,
        EXACT_CONFIDENCE,
        format!("exact match on variant {:?}", hit.variant),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_hit_ignores_case_and_spacing() {
        let registry = Registry::load().unwrap();
        let result = match_title(&registry, "  nvidia GEFORCE   rtx 4090 ").unwrap();
        assert_eq!(result.canonical_model.as_deref(), Some("RTX_4090"));
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.confidence, EXACT_CONFIDENCE);
        assert_eq!(
            result.match_notes,
            "exact match on variant \"NVIDIA GeForce RTX 4090\""
        );
    }

    #[test]
    fn test_miss_falls_through() {
        let registry = Registry::load().unwrap();
        assert!(match_title(&registry, "NVIDIA GeForce RTX 4090 24GB Founders").is_none());
        assert!(match_title(&registry, "").is_none());
    }
}
