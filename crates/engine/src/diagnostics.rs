//! Structured diagnostic events emitted while loading and matching.
//!
//! Events carry counts, not prose. Rendering them for people is the caller's
//! job; [`Diagnostic::log`] forwards each event to `tracing` with fields.

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{LoadReport, PairStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    SourceLoaded {
        source: String,
        rows: usize,
        valid_titles: usize,
        valid_dates: usize,
    },
    FallbackDateParser {
        source: String,
        parsed: usize,
    },
    DateParseFailures {
        source: String,
        count: usize,
        sample_rows: Vec<usize>,
    },
    DatesBackfilled {
        source: String,
        count: usize,
        sentinel: NaiveDate,
    },
    SourceSkipped {
        source: String,
        error: String,
    },
    ComparisonCompleted {
        anchor: String,
        candidate: String,
        anchor_records: usize,
        candidate_records: usize,
        comparisons: usize,
        matches: usize,
    },
    NoMatches,
}

impl Diagnostic {
    /// Events describing one source load, in reporting order.
    pub fn from_load(report: &LoadReport, sentinel: NaiveDate) -> Vec<Diagnostic> {
        let mut events = vec![Diagnostic::SourceLoaded {
            source: report.source.clone(),
            rows: report.rows,
            valid_titles: report.valid_titles,
            valid_dates: report.valid_dates,
        }];
        if report.used_fallback_parser {
            events.push(Diagnostic::FallbackDateParser {
                source: report.source.clone(),
                parsed: report.valid_dates,
            });
        }
        if report.date_failures > 0 {
            events.push(Diagnostic::DateParseFailures {
                source: report.source.clone(),
                count: report.date_failures,
                sample_rows: report.failed_rows_sample.clone(),
            });
        }
        if report.backfilled > 0 {
            events.push(Diagnostic::DatesBackfilled {
                source: report.source.clone(),
                count: report.backfilled,
                sentinel,
            });
        }
        events
    }

    pub fn from_pair(anchor: &str, candidate: &str, stats: &PairStats) -> Diagnostic {
        Diagnostic::ComparisonCompleted {
            anchor: anchor.to_string(),
            candidate: candidate.to_string(),
            anchor_records: stats.anchor_in_range,
            candidate_records: stats.candidate_in_range,
            comparisons: stats.comparisons,
            matches: stats.matches,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::DateParseFailures { .. }
            | Self::DatesBackfilled { .. }
            | Self::SourceSkipped { .. }
            | Self::NoMatches => Severity::Warning,
            Self::SourceLoaded { valid_dates, .. } if *valid_dates == 0 => Severity::Warning,
            _ => Severity::Info,
        }
    }

    pub fn log(&self) {
        match self {
            Self::SourceLoaded { source, rows, valid_titles, valid_dates } => {
                if *valid_dates == 0 {
                    tracing::warn!(%source, rows, valid_titles, valid_dates, "source loaded without any usable date");
                } else {
                    tracing::info!(%source, rows, valid_titles, valid_dates, "source loaded");
                }
            }
            Self::FallbackDateParser { source, parsed } => {
                tracing::info!(%source, parsed, "primary date format matched nothing, used generic parser");
            }
            Self::DateParseFailures { source, count, sample_rows } => {
                tracing::warn!(%source, count, ?sample_rows, "unparseable dates");
            }
            Self::DatesBackfilled { source, count, sentinel } => {
                tracing::warn!(%source, count, %sentinel, "dates backfilled with sentinel");
            }
            Self::SourceSkipped { source, error } => {
                tracing::warn!(%source, %error, "candidate source skipped");
            }
            Self::ComparisonCompleted {
                anchor,
                candidate,
                anchor_records,
                candidate_records,
                comparisons,
                matches,
            } => {
                tracing::info!(
                    %anchor,
                    %candidate,
                    anchor_records,
                    candidate_records,
                    comparisons,
                    matches,
                    "comparison completed"
                );
            }
            Self::NoMatches => tracing::warn!("no matches found"),
        }
    }
}
