use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::result::{MatchResult, MatchType, REGEX_CONFIDENCE};
use super::rules::{RuleSpec, RULES};
use crate::error::RegistryLoadError;
use crate::registry::Registry;

/// A compiled expression that remembers the text it was compiled from.
#[derive(Debug, Clone)]
pub struct Expression {
    pub source: String,
    regex: Regex,
}

impl Expression {
    fn compile(identifier: &str, source: &str) -> Result<Self, RegistryLoadError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|source_err| RegistryLoadError::InvalidPattern {
                identifier: identifier.to_string(),
                source_expression: source.to_string(),
                source: source_err,
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    fn is_match(&self, title: &str) -> bool {
        self.regex.is_match(title)
    }
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub identifier: String,
    pub patterns: Vec<Expression>,
    pub require: Vec<Expression>,
    pub forbid: Vec<Expression>,
}

/// The pattern and matched text that made a rule fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit<'r, 't> {
    pub source: &'r str,
    pub matched: &'t str,
}

impl PatternRule {
    pub fn compile(spec: &RuleSpec) -> Result<Self, RegistryLoadError> {
        let compile_all = |sources: &[&str]| -> Result<Vec<Expression>, RegistryLoadError> {
            sources
                .iter()
                .map(|s| Expression::compile(spec.identifier, s))
                .collect()
        };
        Ok(Self {
            identifier: spec.identifier.to_string(),
            patterns: compile_all(spec.patterns)?,
            require: compile_all(spec.require)?,
            forbid: compile_all(spec.forbid)?,
        })
    }

    pub fn find<'r, 't>(&'r self, title: &'t str) -> Option<RuleHit<'r, 't>> {
        let (expr, m) = self
            .patterns
            .iter()
            .find_map(|expr| expr.regex.find(title).map(|m| (expr, m)))?;

        if !self.require.iter().all(|e| e.is_match(title)) {
            return None;
        }
        if let Some(blocked) = self.forbid.iter().find(|e| e.is_match(title)) {
            debug!(
                rule = %self.identifier,
                forbid = %blocked.source,
                "pattern matched but forbidden qualifier present"
            );
            return None;
        }

        Some(RuleHit {
            source: &expr.source,
            matched: m.as_str(),
        })
    }
}

/// Ordered rule list; the first rule that fires wins.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rules: Vec<PatternRule>,
}

impl PatternMatcher {
    /// Compile the built-in rule table, keeping only rules whose identifier
    /// exists in `registry`.
    pub fn new(registry: &Registry) -> Result<Self, RegistryLoadError> {
        Self::from_specs(RULES, registry)
    }

    pub fn from_specs(specs: &[RuleSpec], registry: &Registry) -> Result<Self, RegistryLoadError> {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            if !registry.contains(spec.identifier) {
                debug!(rule = spec.identifier, "skipping rule for model not in registry");
                continue;
            }
            rules.push(PatternRule::compile(spec)?);
        }
        Ok(Self { rules })
    }

    pub fn match_title(&self, title: &str) -> Option<MatchResult> {
        self.rules.iter().find_map(|rule| {
            let hit = rule.find(title)?;
            Some(MatchResult::matched(
                rule.identifier.clone(),
                MatchType::Regex,
                REGEX_CONFIDENCE,
                describe(rule, &hit),
            ))
        })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }
}

fn describe(rule: &PatternRule, hit: &RuleHit<'_, '_>) -> String {
    let mut notes = format!(
        "rule {}: pattern {} matched {:?}",
        rule.identifier, hit.source, hit.matched
    );
    if !rule.require.is_empty() {
        let required: Vec<&str> = rule.require.iter().map(|e| e.source.as_str()).collect();
        notes.push_str(&format!(" (requires {})", required.join(", ")));
    }
    notes
}
