//! Human-readable rendering of run reports and diagnostics.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use newsmatch_engine::model::LoadReport;
use newsmatch_engine::{ArticleRecord, DateRange, DateStatus, Diagnostic, RunReport, Severity};

const DATE_FMT: &str = "%d/%m/%Y";

/// Titles longer than this are cut in one-line listings.
const TITLE_WIDTH: usize = 72;

pub fn render_range(range: &DateRange) -> String {
    match (range.start == NaiveDate::MIN, range.end == NaiveDate::MAX) {
        (true, true) => "all dates".to_string(),
        (false, true) => format!("from {}", range.start.format(DATE_FMT)),
        (true, false) => format!("until {}", range.end.format(DATE_FMT)),
        (false, false) => format!("{} - {}", range.start.format(DATE_FMT), range.end.format(DATE_FMT)),
    }
}

/// One line per diagnostic event.
pub fn describe(event: &Diagnostic) -> String {
    let text = match event {
        Diagnostic::SourceLoaded { source, rows, valid_titles, valid_dates } => {
            format!("{source}: {rows} rows, {valid_titles} titles, {valid_dates} dated")
        }
        Diagnostic::FallbackDateParser { source, parsed } => {
            format!("{source}: primary date format matched nothing; generic parser read {parsed} dates")
        }
        Diagnostic::DateParseFailures { source, count, sample_rows } => {
            let rows: Vec<String> = sample_rows.iter().map(usize::to_string).collect();
            format!("{source}: {count} unparseable dates (rows {})", rows.join(", "))
        }
        Diagnostic::DatesBackfilled { source, count, sentinel } => {
            format!("{source}: {count} dates set to {}", sentinel.format(DATE_FMT))
        }
        Diagnostic::SourceSkipped { source, error } => format!("{source}: skipped: {error}"),
        Diagnostic::ComparisonCompleted {
            anchor,
            candidate,
            anchor_records,
            candidate_records,
            comparisons,
            matches,
        } => format!(
            "{anchor} vs {candidate}: {anchor_records} x {candidate_records} in range, \
             {comparisons} comparisons, {matches} matches"
        ),
        Diagnostic::NoMatches => "no matches found".to_string(),
    };
    match event.severity() {
        Severity::Warning => format!("warning: {text}"),
        Severity::Info => text,
    }
}

/// First and last known date of a collection.
pub fn date_span(records: &[ArticleRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records.iter().filter_map(|r| r.date.known());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

fn clip(title: &str) -> String {
    if title.chars().count() <= TITLE_WIDTH {
        title.to_string()
    } else {
        let cut: String = title.chars().take(TITLE_WIDTH - 1).collect();
        format!("{cut}…")
    }
}

pub fn render_record(record: &ArticleRecord) -> String {
    // Backfilled dates carry a trailing `*`.
    let date = match record.date.display_date() {
        Some(d) if record.date.is_known() => d.format(DATE_FMT).to_string(),
        Some(d) => format!("{}*", d.format(DATE_FMT)),
        None => "?".to_string(),
    };
    format!("  {:>5}  {:<11} {}", record.row, date, clip(&record.title))
}

pub fn render_load(report: &LoadReport, records: &[ArticleRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.source);
    let _ = writeln!(out, "  rows:          {}", report.rows);
    let _ = writeln!(out, "  titles:        {}", report.valid_titles);
    let _ = writeln!(out, "  dates:         {}", report.valid_dates);
    let _ = writeln!(out, "  missing dates: {}", report.missing_dates);
    let _ = writeln!(out, "  bad dates:     {}", report.date_failures);
    if report.backfilled > 0 {
        let _ = writeln!(out, "  backfilled:    {}", report.backfilled);
    }
    match date_span(records) {
        Some((first, last)) => {
            let _ = write!(out, "  span:          {} - {}", first.format(DATE_FMT), last.format(DATE_FMT));
        }
        None => {
            let _ = write!(out, "  span:          none");
        }
    }
    out
}

/// Summary printed after a run: per-source counts, warnings, written files.
pub fn render_summary(report: &RunReport, written: &[PathBuf]) -> String {
    let mut out = String::new();
    let meta = &report.meta;
    let summary = &report.result.summary;
    let c = &meta.comparison;

    let _ = writeln!(
        out,
        "{}: {} vs {} | threshold {} | proximity {} day(s) | {}",
        meta.config_name,
        meta.anchor,
        meta.compared.join(", "),
        c.similarity_threshold,
        c.date_proximity_days,
        render_range(&c.date_range),
    );

    for source in &summary.per_source {
        let _ = writeln!(out, "  {:<16} {:>6} matches", source.source, source.matches);
    }

    match summary.mean_similarity {
        Some(mean) => {
            let _ = writeln!(
                out,
                "{} matches ({} exact), mean similarity {:.2}",
                summary.total, summary.exact_matches, mean
            );
        }
        None => {
            let _ = writeln!(out, "no matches found");
        }
    }

    for event in report.diagnostics.iter().filter(|e| {
        e.severity() == Severity::Warning && !matches!(e, Diagnostic::NoMatches)
    }) {
        let _ = writeln!(out, "{}", describe(event));
    }

    for path in written {
        let _ = writeln!(out, "wrote {}", path.display());
    }
    out
}
