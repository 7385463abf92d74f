//! Token-set title similarity.
//!
//! Word order and repeated words do not matter: two titles are compared by
//! the sets of whitespace-separated tokens they contain. Scores are in [0, 1].

use std::collections::BTreeSet;

/// Token-set ratio of two (already normalized) titles.
///
/// The shared tokens are compared against each side's remainder, and the best
/// of the three normalized Indel similarities wins. A title whose tokens are
/// all contained in the other scores 1.0. An empty title scores 0 against
/// anything, including another empty title.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 1.0;
    }

    let diff_ab: Vec<char> = diff_ab.join(" ").chars().collect();
    let diff_ba: Vec<char> = diff_ba.join(" ").chars().collect();
    let sect_len = sect.join(" ").chars().count();

    // Lengths of "sect + ' ' + diff" without building the strings.
    let sep = usize::from(sect_len > 0);
    let sect_ab_len = sect_len + sep + diff_ab.len();
    let sect_ba_len = sect_len + sep + diff_ba.len();

    let total = sect_ab_len + sect_ba_len;
    let dist = indel_distance(&diff_ab, &diff_ba);
    let full = 1.0 - dist as f64 / total as f64;
    if sect_len == 0 {
        return full;
    }

    // sect is a prefix of both joined strings, so the distance to either is
    // just the separator plus the remainder.
    let sect_ab = 1.0 - (sep + diff_ab.len()) as f64 / (sect_len + sect_ab_len) as f64;
    let sect_ba = 1.0 - (sep + diff_ba.len()) as f64 / (sect_len + sect_ba_len) as f64;

    full.max(sect_ab).max(sect_ba)
}

/// Insertions plus deletions needed to turn `a` into `b`.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_length(a, b)
}

/// LCS length, two-row DP.
fn lcs_length(a: &[char], b: &[char]) -> usize {
    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}
