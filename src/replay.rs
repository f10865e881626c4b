//! False-positive replay set: titles that were once mis-resolved, with the
//! answer they must keep producing. Run after every rule change.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::resolve::{MatchResult, Resolver};

const EMBEDDED_REPLAY: &str = include_str!("../data/replay.json");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayCase {
    pub title: String,
    /// Expected identifier; `None` means the title must stay unresolved.
    pub expected: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub case: ReplayCase,
    pub result: MatchResult,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub outcomes: Vec<ReplayOutcome>,
}

impl ReplayReport {
    pub fn failures(&self) -> impl Iterator<Item = &ReplayOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }
}

pub fn load_embedded() -> Result<Vec<ReplayCase>> {
    serde_json::from_str(EMBEDDED_REPLAY).context("Failed to parse embedded replay.json")
}

pub fn load_from_file(path: &Path) -> Result<Vec<ReplayCase>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse replay file: {}", path.display()))
}

pub fn run(resolver: &Resolver, cases: Vec<ReplayCase>) -> ReplayReport {
    let outcomes = cases
        .into_iter()
        .map(|case| {
            let result = resolver.resolve(&case.title);
            let passed = result.canonical_model == case.expected;
            ReplayOutcome {
                case,
                result,
                passed,
            }
        })
        .collect();
    ReplayReport { outcomes }
}
