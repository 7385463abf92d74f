use std::path::PathBuf;

use chrono::NaiveDate;
use proptest::prelude::*;

use newsmatch_engine::aggregate::aggregate;
use newsmatch_engine::matcher::date_diff_days;
use newsmatch_engine::model::{MatchRecord, PairOutput, PairStats};
use newsmatch_engine::normalize::normalize_text;
use newsmatch_engine::similarity::token_set_ratio;
use newsmatch_engine::{
    run, DatePolicy, DateStatus, Diagnostic, LoaderConfig, MatchError, Outcome, RawTable, RunConfig, RunInput,
    RunReport, SourceLoad,
};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn wires_config() -> RunConfig {
    let toml = std::fs::read_to_string(fixtures_dir().join("wires.newsmatch.toml")).unwrap();
    RunConfig::from_toml(&toml).unwrap()
}

fn table(rows: &[&[&str]]) -> Result<RawTable, MatchError> {
    Ok(RawTable::from_strings(&["URL", "Title", "Date"], rows))
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn run_pair(config: &RunConfig, anchor: &[&[&str]], candidate: &[&[&str]]) -> RunReport {
    let input = RunInput {
        anchor: SourceLoad::new("ellada24", table(anchor)),
        candidates: vec![SourceLoad::new("amna", table(candidate))],
    };
    run(config, input).unwrap()
}

fn with(proximity: u32, threshold: f64) -> RunConfig {
    let mut config = wires_config();
    config.comparison.date_proximity_days = proximity;
    config.comparison.similarity_threshold = threshold;
    config.comparison.validate().unwrap();
    config
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn scenario_same_day_rewording() {
    let report = run_pair(
        &with(0, 0.75),
        &[&["https://ellada24.gr/1", "Πρόεδρος υπέγραψε νόμο", "01/03/2025"]],
        &[&["https://amna.gr/9", "Ο πρόεδρος υπέγραψε το νόμο", "01/03/2025"]],
    );
    assert_eq!(report.outcome(), Outcome::Matches(1));
    let m = &report.result.matches[0];
    assert_eq!(m.date_diff_days, 0);
    assert!(m.similarity >= 0.75);
    assert_eq!(m.source1_id, "ellada24");
    assert_eq!(m.source2_title, "Ο πρόεδρος υπέγραψε το νόμο");
}

#[test]
fn scenario_proximity_two_days() {
    let anchor: &[&[&str]] = &[&["u", "Σεισμός 5 ρίχτερ στην Κρήτη", "01/03/2025"]];
    let candidate: &[&[&str]] = &[&["u", "Σεισμός 5 ρίχτερ στην Κρήτη", "03/03/2025"]];

    let report = run_pair(&with(1, 0.75), anchor, candidate);
    assert_eq!(report.outcome(), Outcome::NoMatches);

    let report = run_pair(&with(2, 0.75), anchor, candidate);
    assert_eq!(report.outcome(), Outcome::Matches(1));
    assert_eq!(report.result.matches[0].date_diff_days, 2);
}

#[test]
fn scenario_empty_anchor_title() {
    let anchor: &[&[&str]] = &[&["u", "", "01/03/2025"]];
    let candidate: &[&[&str]] = &[&["u", "Κάτι", "01/03/2025"]];

    for threshold in [0.1, 0.5, 0.75, 1.0] {
        let report = run_pair(&with(0, threshold), anchor, candidate);
        assert_eq!(report.outcome(), Outcome::NoMatches, "threshold {threshold}");
    }

    let report = run_pair(&with(0, 0.0), anchor, candidate);
    assert_eq!(report.outcome(), Outcome::Matches(1));
    assert_eq!(report.result.matches[0].similarity, 0.0);
}

#[test]
fn date_range_is_inclusive_at_both_ends() {
    let report = run_pair(
        &with(0, 0.75),
        &[
            &["u", "πρώτη μέρα", "01/03/2025"],
            &["u", "τελευταία μέρα", "31/03/2025"],
            &["u", "εκτός", "01/04/2025"],
        ],
        &[
            &["u", "πρώτη μέρα", "01/03/2025"],
            &["u", "τελευταία μέρα", "31/03/2025"],
            &["u", "εκτός", "01/04/2025"],
        ],
    );
    let dates: Vec<NaiveDate> = report.result.matches.iter().map(|m| m.source1_date).collect();
    assert_eq!(dates, vec![d("2025-03-01"), d("2025-03-31")]);
}

#[test]
fn missing_column_in_candidate_skips_it() {
    let config = wires_config();
    let input = RunInput {
        anchor: SourceLoad::new("ellada24", table(&[&["u", "Σεισμός στην Κρήτη", "01/03/2025"]])),
        candidates: vec![
            SourceLoad::new("amna", table(&[&["u", "Σεισμός στην Κρήτη", "01/03/2025"]])),
            SourceLoad::new(
                "thema",
                Ok(RawTable::from_strings(&["URL", "Headline", "Date"], &[&["u", "x", "01/03/2025"]])),
            ),
        ],
    };
    let report = run(&config, input).unwrap();
    assert_eq!(report.outcome(), Outcome::Matches(1));
    assert_eq!(report.meta.skipped, vec!["thema"]);
    let skipped = report
        .diagnostics
        .iter()
        .find_map(|d| match d {
            Diagnostic::SourceSkipped { source, error } if source == "thema" => Some(error.clone()),
            _ => None,
        })
        .unwrap();
    assert!(skipped.contains("Title"));
}

#[test]
fn missing_column_in_anchor_fails_run() {
    let config = wires_config();
    let input = RunInput {
        anchor: SourceLoad::new(
            "ellada24",
            Ok(RawTable::from_strings(&["Link", "Title"], &[&["u", "x"]])),
        ),
        candidates: vec![SourceLoad::new("amna", table(&[&["u", "x", "01/03/2025"]]))],
    };
    match run(&config, input) {
        Err(MatchError::Schema { source, missing }) => {
            assert_eq!(source, "ellada24");
            assert_eq!(missing, vec!["URL", "Date"]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn lenient_backfill_never_matches() {
    let mut config = with(0, 0.0);
    config.loader.date_policy = DatePolicy::Lenient;
    config.comparison.date_range = newsmatch_engine::DateRange::unbounded();
    let report = run_pair(
        &config,
        &[&["u", "ίδιος τίτλος", "κάποτε"], &["u", "άλλος", "01/03/2025"]],
        &[&["u", "ίδιος τίτλος", "ποτέ"]],
    );
    assert_eq!(report.outcome(), Outcome::NoMatches);
    assert_eq!(report.loads[0].backfilled, 1);
    assert_eq!(report.loads[0].valid_dates, 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::DatesBackfilled { source, .. } if source == "amna")));
}

#[test]
fn results_sorted_across_sources() {
    let config = with(0, 0.5);
    let input = RunInput {
        anchor: SourceLoad::new(
            "ellada24",
            table(&[
                &["u", "new york mets", "01/03/2025"],
                &["u", "σεισμός στην κρήτη", "02/03/2025"],
            ]),
        ),
        candidates: vec![
            SourceLoad::new("amna", table(&[&["u", "new york yankees", "01/03/2025"]])),
            SourceLoad::new("thema", table(&[&["u", "Σεισμός στην Κρήτη", "02/03/2025"]])),
        ],
    };
    let report = run(&config, input).unwrap();
    let sources: Vec<&str> = report.result.matches.iter().map(|m| m.source2_id.as_str()).collect();
    assert_eq!(sources, vec!["thema", "amna"]);
    let amna = report.result.summary.per_source.iter().find(|c| c.source == "amna");
    assert_eq!(amna.map(|c| c.matches), Some(1));
    assert_eq!(report.result.summary.exact_matches, 1);
}

#[test]
fn load_report_counts() {
    let report = run_pair(
        &with(0, 0.75),
        &[&["u", "α", "01/03/2025"], &["u", "", "bad"], &["u", "γ", ""]],
        &[&["u", "α", "01/03/2025"]],
    );
    let anchor = &report.loads[0];
    assert_eq!(anchor.source, "ellada24");
    assert_eq!(anchor.rows, 3);
    assert_eq!(anchor.valid_titles, 2);
    assert_eq!(anchor.valid_dates, 1);
    assert_eq!(anchor.date_failures, 1);
    assert_eq!(anchor.missing_dates, 1);
    assert_eq!(anchor.failed_rows_sample, vec![2]);
}

#[test]
fn report_serializes_to_json() {
    let report = run_pair(
        &with(0, 0.75),
        &[&["u", "Σεισμός στην Κρήτη", "01/03/2025"]],
        &[&["u", "σεισμός στην κρήτη", "01/03/2025"]],
    );
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["meta"]["anchor"], "ellada24");
    assert_eq!(json["result"]["summary"]["total"], 1);
    assert_eq!(json["result"]["matches"][0]["source1_date"], "2025-03-01");
    assert_eq!(json["diagnostics"][0]["event"], "source_loaded");
}

// -------------------------------------------------------------------------
// Properties
// -------------------------------------------------------------------------

fn record(tag: usize, similarity: f64) -> MatchRecord {
    MatchRecord {
        source1_id: "a".into(),
        source1_title: tag.to_string(),
        source1_date: d("2025-03-01"),
        source2_id: "b".into(),
        source2_title: String::new(),
        source2_date: d("2025-03-01"),
        similarity,
        date_diff_days: 0,
    }
}

proptest! {
    #[test]
    fn normalize_is_idempotent(s in "[ a-zA-Zα-ωΑ-Ωάέήίόύώ0-9.,!?-]{0,40}") {
        let once = normalize_text(&s);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn date_diff_is_order_independent(a in 0i32..40_000, b in 0i32..40_000) {
        let base = d("1990-01-01");
        let da = base + chrono::Duration::days(i64::from(a));
        let db = base + chrono::Duration::days(i64::from(b));
        prop_assert_eq!(date_diff_days(da, db), date_diff_days(db, da));
        prop_assert_eq!(date_diff_days(da, db), a.abs_diff(b));
    }

    #[test]
    fn similarity_is_bounded_and_symmetric(
        a in "[αβγ ]{0,20}",
        b in "[αβγ ]{0,20}",
    ) {
        let ab = token_set_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert_eq!(ab, token_set_ratio(&b, &a));
    }

    #[test]
    fn aggregation_is_stable(scores in proptest::collection::vec(0u8..4, 0..30)) {
        let matches: Vec<MatchRecord> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| record(i, f64::from(*s) / 4.0))
            .collect();
        let pair = PairOutput {
            anchor: "a".into(),
            candidate: "b".into(),
            stats: PairStats::default(),
            matches,
        };
        let set = aggregate(vec![pair]);
        for w in set.matches.windows(2) {
            prop_assert!(w[0].similarity >= w[1].similarity);
            if w[0].similarity == w[1].similarity {
                let i: usize = w[0].source1_title.parse().unwrap();
                let j: usize = w[1].source1_title.parse().unwrap();
                prop_assert!(i < j);
            }
        }
        prop_assert_eq!(set.summary.total, scores.len());
    }

    #[test]
    fn identical_titles_always_match(title in "[α-ω]{1,8}( [α-ω]{1,8}){0,4}", threshold in 0.0f64..=1.0) {
        let mut config = with(0, 0.75);
        config.comparison.similarity_threshold = threshold;
        let report = run_pair(&config, &[&["u", title.as_str(), "05/03/2025"]], &[&["u", title.as_str(), "05/03/2025"]]);
        prop_assert_eq!(report.outcome(), Outcome::Matches(1));
        prop_assert_eq!(report.result.matches[0].similarity, 1.0);
    }
}

#[test]
fn date_status_of_loaded_records() {
    let loaded = newsmatch_engine::loader::load_collection(
        "amna",
        &RawTable::from_strings(&["URL", "Title", "Date"], &[&["u", "x", "05/03/2025"]]),
        &LoaderConfig::default(),
    )
    .unwrap();
    assert_eq!(loaded.collection.records[0].date, DateStatus::Known(d("2025-03-05")));
}
