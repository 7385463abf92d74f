use crate::model::{MatchSet, MatchSummary, PairOutput, SourceCount};

/// Merge per-pair outputs into the run's result set.
///
/// Matches are concatenated in pair order and then sorted by similarity,
/// highest first. The sort is stable, so equal scores keep the order the
/// matcher produced them in. `per_source` has one entry per pair, including
/// pairs without matches.
pub fn aggregate(pairs: Vec<PairOutput>) -> MatchSet {
    let per_source: Vec<SourceCount> = pairs
        .iter()
        .map(|p| SourceCount {
            source: p.candidate.clone(),
            matches: p.matches.len(),
        })
        .collect();

    let mut matches: Vec<_> = pairs.into_iter().flat_map(|p| p.matches).collect();
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));

    let total = matches.len();
    let exact_matches = matches.iter().filter(|m| m.similarity == 1.0).count();
    let mean_similarity = if total == 0 {
        None
    } else {
        Some(matches.iter().map(|m| m.similarity).sum::<f64>() / total as f64)
    };

    MatchSet {
        matches,
        summary: MatchSummary {
            total,
            per_source,
            exact_matches,
            mean_similarity,
        },
    }
}
