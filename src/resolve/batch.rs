use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::thread;

use serde::Serialize;

use super::{MatchResult, MatchType, Resolver};

/// Worker count for `jobs == 0`: one per available CPU.
pub fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Resolve `titles` across up to `jobs` scoped threads. Results keep input order.
pub fn resolve_all<S>(resolver: &Resolver, titles: &[S], jobs: usize) -> Vec<MatchResult>
where
    S: AsRef<str> + Sync,
{
    parallel_map(titles, jobs, |t| resolver.resolve(t.as_ref()))
}

/// Order-preserving map over contiguous chunks, one scoped thread per chunk.
pub fn parallel_map<T, R, F>(items: &[T], jobs: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let jobs = if jobs == 0 { default_jobs() } else { jobs };
    if jobs <= 1 || items.len() < 2 {
        return items.iter().map(&f).collect();
    }

    let chunk_size = items.len().div_ceil(jobs);
    let f = &f;
    thread::scope(|scope| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || chunk.iter().map(f).collect::<Vec<_>>()))
            .collect();

        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(results) => results,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub by_match_type: BTreeMap<String, usize>,
    pub by_unknown_reason: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for match_type in MatchType::ALL {
            summary
                .by_match_type
                .insert(match_type.label().to_string(), 0);
        }
        for result in results {
            *summary
                .by_match_type
                .entry(result.match_type.label().to_string())
                .or_default() += 1;
            if let Some(reason) = &result.unknown_reason {
                *summary.by_unknown_reason.entry(reason.clone()).or_default() += 1;
            }
        }
        summary
    }

    pub fn count(&self, match_type: MatchType) -> usize {
        self.by_match_type
            .get(match_type.label())
            .copied()
            .unwrap_or(0)
    }

    pub fn resolved(&self) -> usize {
        self.total - self.count(MatchType::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::resolve::Threshold;

    fn resolver() -> Resolver {
        Resolver::new(Registry::load().unwrap(), Threshold::default()).unwrap()
    }

    fn titles() -> Vec<String> {
        [
            "NVIDIA GeForce RTX 4090",
            "Cisco NVIDIA Tesla A100 80GB PCIe",
            "AMX NMX-WP-N1512 N1000",
            "",
            "NVIDIA Qaudro RTX 6000",
            "NVIDIA RTX 4500 ADA",
            "GTX 1070 ti-ish typo variant",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let resolver = resolver();
        let titles = titles();
        let sequential = resolve_all(&resolver, &titles, 1);
        for jobs in [2, 3, 8, 64] {
            assert_eq!(resolve_all(&resolver, &titles, jobs), sequential);
        }
        assert_eq!(resolve_all(&resolver, &titles, 0), sequential);
    }

    #[test]
    fn test_order_preserved() {
        let resolver = resolver();
        let results = resolve_all(&resolver, &titles(), 4);
        assert_eq!(results[0].canonical_model.as_deref(), Some("RTX_4090"));
        assert_eq!(results[5].canonical_model.as_deref(), Some("RTX_4500_ADA"));
        assert_eq!(results[3].match_type, MatchType::None);
    }

    #[test]
    fn test_empty_batch() {
        let empty: Vec<String> = Vec::new();
        assert!(resolve_all(&resolver(), &empty, 4).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let resolver = resolver();
        let results = resolve_all(&resolver, &titles(), 2);
        let summary = BatchSummary::from_results(&results);
        assert_eq!(summary.total, 7);
        assert_eq!(summary.count(MatchType::Exact), 1);
        assert_eq!(summary.count(MatchType::Regex), 2);
        assert_eq!(summary.count(MatchType::Fuzzy), 1);
        assert_eq!(summary.count(MatchType::None), 3);
        assert_eq!(summary.resolved(), 4);
        assert_eq!(summary.by_unknown_reason.get("empty or invalid input"), Some(&1));
    }
}
