use std::thread;

use crate::aggregate::aggregate;
use crate::config::{ComparisonConfig, RunConfig};
use crate::diagnostics::Diagnostic;
use crate::error::MatchError;
use crate::loader::load_collection;
use crate::matcher::match_collections;
use crate::model::{ArticleCollection, LoadReport, PairOutput, RunMeta, RunReport};
use crate::table::RawTable;

/// A source as handed over by the reader: its id and the table, or the
/// reason it could not be read.
#[derive(Debug)]
pub struct SourceLoad {
    pub id: String,
    pub table: Result<RawTable, MatchError>,
}

impl SourceLoad {
    pub fn new(id: impl Into<String>, table: Result<RawTable, MatchError>) -> Self {
        Self {
            id: id.into(),
            table,
        }
    }
}

#[derive(Debug)]
pub struct RunInput {
    pub anchor: SourceLoad,
    pub candidates: Vec<SourceLoad>,
}

struct Collector {
    loads: Vec<LoadReport>,
    diagnostics: Vec<Diagnostic>,
}

impl Collector {
    fn push(&mut self, event: Diagnostic) {
        event.log();
        self.diagnostics.push(event);
    }
}

/// Load every source, compare the anchor with each candidate and aggregate.
///
/// The anchor must load; candidates that fail are skipped and reported. If
/// no candidate is left the run fails.
pub fn run(config: &RunConfig, input: RunInput) -> Result<RunReport, MatchError> {
    let mut out = Collector {
        loads: Vec::new(),
        diagnostics: Vec::new(),
    };
    let sentinel = config.loader.sentinel_date;

    let anchor_id = input.anchor.id;
    let anchor = load_collection(&anchor_id, &input.anchor.table?, &config.loader)?;
    for event in Diagnostic::from_load(&anchor.report, sentinel) {
        out.push(event);
    }
    out.loads.push(anchor.report);
    let anchor = anchor.collection;

    let attempted: Vec<String> = input.candidates.iter().map(|c| c.id.clone()).collect();
    let mut collections = Vec::new();
    let mut skipped = Vec::new();

    for source in input.candidates {
        let loaded = source
            .table
            .and_then(|table| load_collection(&source.id, &table, &config.loader));
        match loaded {
            Ok(loaded) => {
                for event in Diagnostic::from_load(&loaded.report, sentinel) {
                    out.push(event);
                }
                out.loads.push(loaded.report);
                collections.push(loaded.collection);
            }
            Err(e) => {
                out.push(Diagnostic::SourceSkipped {
                    source: source.id.clone(),
                    error: e.to_string(),
                });
                skipped.push(source.id);
            }
        }
    }

    if collections.is_empty() {
        return Err(MatchError::NoCandidateSources { attempted });
    }

    let pairs = if config.parallel {
        match_parallel(&anchor, &collections, &config.comparison)
    } else {
        collections
            .iter()
            .map(|candidate| match_collections(&anchor, candidate, &config.comparison))
            .collect()
    };

    for pair in &pairs {
        out.push(Diagnostic::from_pair(&pair.anchor, &pair.candidate, &pair.stats));
    }

    let result = aggregate(pairs);
    if result.matches.is_empty() {
        out.push(Diagnostic::NoMatches);
    }

    Ok(RunReport {
        meta: RunMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            anchor: anchor_id,
            compared: collections.iter().map(|c| c.source.clone()).collect(),
            skipped,
            comparison: config.comparison,
        },
        loads: out.loads,
        diagnostics: out.diagnostics,
        result,
    })
}

/// One scoped worker per candidate. Results are joined in candidate order, so
/// the output is identical to the sequential path.
fn match_parallel(
    anchor: &ArticleCollection,
    candidates: &[ArticleCollection],
    config: &ComparisonConfig,
) -> Vec<PairOutput> {
    thread::scope(|scope| {
        let handles: Vec<_> = candidates
            .iter()
            .map(|candidate| scope.spawn(move || match_collections(anchor, candidate, config)))
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(output) => output,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceConfig;
    use crate::model::Outcome;

    fn config(parallel: bool) -> RunConfig {
        let mut config = RunConfig::new(
            SourceConfig { id: "ellada24".into(), file: "e.csv".into() },
            vec![
                SourceConfig { id: "amna".into(), file: "a.csv".into() },
                SourceConfig { id: "thema".into(), file: "t.csv".into() },
            ],
            ComparisonConfig::default(),
        );
        config.parallel = parallel;
        config
    }

    fn table(rows: &[&[&str]]) -> Result<RawTable, MatchError> {
        Ok(RawTable::from_strings(&["URL", "Title", "Date"], rows))
    }

    fn input() -> RunInput {
        RunInput {
            anchor: SourceLoad::new(
                "ellada24",
                table(&[
                    &["u1", "Σεισμός στην Κρήτη", "01/03/2025"],
                    &["u2", "Βροχές στην Αθήνα", "02/03/2025"],
                ]),
            ),
            candidates: vec![
                SourceLoad::new("amna", table(&[&["u", "σεισμός στην κρήτη τώρα", "01/03/2025"]])),
                SourceLoad::new("thema", table(&[&["u", "Βροχές στην Αθήνα", "02/03/2025"]])),
            ],
        }
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let seq = run(&config(false), input()).unwrap();
        let par = run(&config(true), input()).unwrap();
        assert_eq!(seq.result, par.result);
        assert_eq!(seq.outcome(), Outcome::Matches(2));
        assert_eq!(seq.meta.compared, vec!["amna", "thema"]);
        assert_eq!(seq.loads.len(), 3);
    }

    #[test]
    fn anchor_failure_is_fatal() {
        let mut input = input();
        input.anchor.table = Ok(RawTable::from_strings(&["URL", "Title"], &[]));
        let err = run(&config(false), input).unwrap_err();
        assert_eq!(err.source_id(), Some("ellada24"));
    }

    #[test]
    fn failed_candidate_is_skipped() {
        let mut input = input();
        input.candidates[1].table = Err(MatchError::Load {
            source: "thema".into(),
            message: "not a spreadsheet".into(),
        });
        let report = run(&config(false), input).unwrap();
        assert_eq!(report.meta.skipped, vec!["thema"]);
        assert_eq!(report.meta.compared, vec!["amna"]);
        assert_eq!(report.result.summary.per_source.len(), 1);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::SourceSkipped { source, .. } if source == "thema")));
    }

    #[test]
    fn no_candidate_loaded() {
        let mut input = input();
        for c in &mut input.candidates {
            c.table = Ok(RawTable::from_strings(&["Title"], &[]));
        }
        match run(&config(false), input) {
            Err(MatchError::NoCandidateSources { attempted }) => {
                assert_eq!(attempted, vec!["amna", "thema"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_matches_is_an_outcome() {
        let mut input = input();
        input.candidates = vec![SourceLoad::new(
            "amna",
            table(&[&["u", "ποδόσφαιρο απόψε", "01/03/2025"]]),
        )];
        let report = run(&config(false), input).unwrap();
        assert_eq!(report.outcome(), Outcome::NoMatches);
        assert!(matches!(report.diagnostics.last(), Some(Diagnostic::NoMatches)));
    }
}
