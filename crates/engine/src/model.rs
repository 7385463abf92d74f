use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ComparisonConfig;
use crate::diagnostics::Diagnostic;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Publication date of a record after loading.
///
/// Only `Known` dates take part in matching. `Backfilled` carries the lenient
/// loader's sentinel so it can be shown, but two backfilled records never
/// match each other just because they share the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "date", rename_all = "snake_case")]
pub enum DateStatus {
    Known(NaiveDate),
    Unknown,
    Backfilled(NaiveDate),
}

impl DateStatus {
    pub fn known(&self) -> Option<NaiveDate> {
        match self {
            Self::Known(d) => Some(*d),
            _ => None,
        }
    }

    /// Date to display: the parsed date or the backfill sentinel.
    pub fn display_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Known(d) | Self::Backfilled(d) => Some(*d),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

/// One article row from a source, normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    /// 1-based data row in the source table (header excluded).
    pub row: usize,
    pub url: Option<String>,
    /// Title exactly as read; empty when the cell was missing or not text.
    pub title: String,
    /// Lowercased, trimmed title. Empty string when the title is unusable.
    pub normalized_title: String,
    pub date: DateStatus,
}

/// All records of one source outlet, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleCollection {
    pub source: String,
    pub records: Vec<ArticleRecord>,
}

impl ArticleCollection {
    pub fn new(source: impl Into<String>, records: Vec<ArticleRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Per-source load statistics. Backfilled sentinels never count as valid dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub source: String,
    pub rows: usize,
    pub valid_titles: usize,
    pub valid_dates: usize,
    /// Rows whose date cell was blank.
    pub missing_dates: usize,
    /// Rows whose date cell had a value no parser accepted.
    pub date_failures: usize,
    /// First few row numbers of `date_failures`.
    pub failed_rows_sample: Vec<usize>,
    /// The primary format matched nothing and the generic parser was used.
    pub used_fallback_parser: bool,
    pub backfilled: usize,
}

// ---------------------------------------------------------------------------
// Pair matching
// ---------------------------------------------------------------------------

/// A candidate title judged similar to an anchor title. Side 1 is the anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRecord {
    pub source1_id: String,
    pub source1_title: String,
    pub source1_date: NaiveDate,
    pub source2_id: String,
    pub source2_title: String,
    pub source2_date: NaiveDate,
    /// Token-set similarity in [0, 1].
    pub similarity: f64,
    pub date_diff_days: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairStats {
    /// Anchor records with a known date inside the date range.
    pub anchor_in_range: usize,
    /// Candidate records with a known date inside the date range.
    pub candidate_in_range: usize,
    /// Title pairs scored.
    pub comparisons: usize,
    pub matches: usize,
}

#[derive(Debug, Clone)]
pub struct PairOutput {
    pub anchor: String,
    pub candidate: String,
    pub matches: Vec<MatchRecord>,
    pub stats: PairStats,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub matches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSummary {
    pub total: usize,
    /// One entry per compared candidate source, in comparison order.
    pub per_source: Vec<SourceCount>,
    /// Matches scoring exactly 1.0.
    pub exact_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_similarity: Option<f64>,
}

/// All matches of a run, sorted by similarity (descending, stable).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchSet {
    pub matches: Vec<MatchRecord>,
    pub summary: MatchSummary,
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub anchor: String,
    /// Candidate sources that loaded and were compared, in order.
    pub compared: Vec<String>,
    /// Candidate sources excluded because they failed to load.
    pub skipped: Vec<String>,
    pub comparison: ComparisonConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub meta: RunMeta,
    pub loads: Vec<LoadReport>,
    pub diagnostics: Vec<Diagnostic>,
    pub result: MatchSet,
}

/// A finished run either found matches or explicitly found none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matches(usize),
    NoMatches,
}

impl RunReport {
    pub fn outcome(&self) -> Outcome {
        match self.result.matches.len() {
            0 => Outcome::NoMatches,
            n => Outcome::Matches(n),
        }
    }
}
