use crate::normalize;
use crate::registry::{ExclusionRule, KeywordMode};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusionVerdict {
    pub excluded: bool,
    pub reason: Option<String>,
    /// Keyword of the rule that fired.
    pub keyword: Option<String>,
}

impl ExclusionVerdict {
    fn clear() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
struct CompiledExclusion {
    // padded token form for word rules, lowercased text for substring rules
    needle: String,
    rule: ExclusionRule,
}

/// Ordered keyword filter run before any positive matcher.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    rules: Vec<CompiledExclusion>,
}

impl ExclusionFilter {
    pub fn new(rules: &[ExclusionRule]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| CompiledExclusion {
                needle: match rule.mode {
                    KeywordMode::Word => normalize::padded_tokens(&rule.keyword),
                    KeywordMode::Substring => rule.keyword.to_lowercase(),
                },
                rule: rule.clone(),
            })
            .collect();
        Self { rules }
    }

    pub fn check(&self, title: &str) -> ExclusionVerdict {
        let lowered = title.to_lowercase();
        let padded = normalize::padded_tokens(title);

        for compiled in &self.rules {
            let haystack = match compiled.rule.mode {
                KeywordMode::Word => &padded,
                KeywordMode::Substring => &lowered,
            };
            if haystack.contains(compiled.needle.as_str()) {
                return ExclusionVerdict {
                    excluded: true,
                    reason: Some(compiled.rule.reason.clone()),
                    keyword: Some(compiled.rule.keyword.clone()),
                };
            }
        }

        ExclusionVerdict::clear()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}
