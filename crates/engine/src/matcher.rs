use chrono::NaiveDate;

use crate::config::ComparisonConfig;
use crate::model::{ArticleCollection, ArticleRecord, MatchRecord, PairOutput, PairStats};
use crate::similarity::token_set_ratio;

/// Absolute day distance between two dates.
pub fn date_diff_days(a: NaiveDate, b: NaiveDate) -> u32 {
    u32::try_from((a - b).num_days().unsigned_abs()).unwrap_or(u32::MAX)
}

/// Records with a known date inside the configured range, in input order.
fn in_range<'a>(
    collection: &'a ArticleCollection,
    config: &ComparisonConfig,
) -> Vec<(usize, &'a ArticleRecord, NaiveDate)> {
    collection
        .records
        .iter()
        .enumerate()
        .filter_map(|(pos, rec)| rec.date.known().map(|date| (pos, rec, date)))
        .filter(|(_, _, date)| config.date_range.contains(*date))
        .collect()
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Compare every anchor record with every candidate record published within
/// the proximity window of it, and keep the pairs scoring at or above the
/// similarity threshold.
///
/// The anchor is always side 1 of the emitted records. Matches come out in
/// anchor input order, and for one anchor record in candidate input order.
pub fn match_collections(
    anchor: &ArticleCollection,
    candidate: &ArticleCollection,
    config: &ComparisonConfig,
) -> PairOutput {
    let anchors = in_range(anchor, config);

    // Sorted by date once; the sort is stable so input order holds within a day.
    let mut candidates = in_range(candidate, config);
    candidates.sort_by_key(|(_, _, date)| *date);

    let mut stats = PairStats {
        anchor_in_range: anchors.len(),
        candidate_in_range: candidates.len(),
        ..PairStats::default()
    };
    let mut matches = Vec::new();
    let mut window: Vec<&(usize, &ArticleRecord, NaiveDate)> = Vec::new();

    for (_, a, a_date) in &anchors {
        let (lo, hi) = config.window(*a_date);
        let start = candidates.partition_point(|(_, _, d)| *d < lo);
        let end = candidates.partition_point(|(_, _, d)| *d <= hi);

        window.clear();
        window.extend(&candidates[start..end]);
        window.sort_unstable_by_key(|(pos, _, _)| *pos);

        for (_, b, b_date) in window.iter().copied() {
            stats.comparisons += 1;
            let similarity = token_set_ratio(&a.normalized_title, &b.normalized_title);
            if similarity < config.similarity_threshold {
                continue;
            }
            matches.push(MatchRecord {
                source1_id: anchor.source.clone(),
                source1_title: a.title.clone(),
                source1_date: *a_date,
                source2_id: candidate.source.clone(),
                source2_title: b.title.clone(),
                source2_date: *b_date,
                similarity,
                date_diff_days: date_diff_days(*a_date, *b_date),
            });
        }
    }
    stats.matches = matches.len();

    tracing::debug!(
        anchor = %anchor.source,
        candidate = %candidate.source,
        comparisons = stats.comparisons,
        matches = stats.matches,
        "pair matched"
    );

    PairOutput {
        anchor: anchor.source.clone(),
        candidate: candidate.source.clone(),
        matches,
        stats,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
