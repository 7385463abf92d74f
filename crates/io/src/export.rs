// Result export: the wide comparison table and format dispatch

use std::path::Path;

use chrono::NaiveDate;
use newsmatch_engine::{MatchError, MatchRecord, RunReport};

/// A cell of the result table.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Blank,
    Text(String),
    Date(NaiveDate),
    Number(f64),
    Days(u32),
}

/// One column pair per source, then `Similarity` and `Date_Diff_Days`.
///
/// Each row fills the anchor's columns and the columns of the candidate it
/// matched; the other sources' columns stay blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ExportCell>>,
}

/// Similarity as written to exports.
pub fn round_similarity(similarity: f64) -> f64 {
    (similarity * 100.0).round() / 100.0
}

impl ExportTable {
    pub fn from_report(report: &RunReport) -> Self {
        let sources: Vec<&str> = std::iter::once(report.meta.anchor.as_str())
            .chain(report.meta.compared.iter().map(String::as_str))
            .collect();

        let mut headers: Vec<String> = sources
            .iter()
            .flat_map(|s| [format!("{s}_Title"), format!("{s}_Date")])
            .collect();
        headers.push("Similarity".to_string());
        headers.push("Date_Diff_Days".to_string());

        let rows = report
            .result
            .matches
            .iter()
            .map(|m| Self::row(&sources, m))
            .collect();

        Self { headers, rows }
    }

    fn row(sources: &[&str], m: &MatchRecord) -> Vec<ExportCell> {
        let mut row = Vec::with_capacity(sources.len() * 2 + 2);
        for (i, source) in sources.iter().enumerate() {
            // Column 0 is always the anchor (side 1)
            let side = if i == 0 && *source == m.source1_id {
                Some((&m.source1_title, m.source1_date))
            } else if i > 0 && *source == m.source2_id {
                Some((&m.source2_title, m.source2_date))
            } else {
                None
            };
            match side {
                Some((title, date)) => {
                    row.push(ExportCell::Text(title.clone()));
                    row.push(ExportCell::Date(date));
                }
                None => {
                    row.push(ExportCell::Blank);
                    row.push(ExportCell::Blank);
                }
            }
        }
        row.push(ExportCell::Number(round_similarity(m.similarity)));
        row.push(ExportCell::Days(m.date_diff_days));
        row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Tsv,
    Json,
}

/// Write a run's results in the given format.
pub fn write_report(report: &RunReport, path: &Path, format: ExportFormat) -> Result<(), MatchError> {
    let result = match format {
        ExportFormat::Json => crate::json::export(report, path),
        ExportFormat::Xlsx => crate::xlsx::export(&ExportTable::from_report(report), path),
        ExportFormat::Csv => crate::csv::export(&ExportTable::from_report(report), path),
        ExportFormat::Tsv => crate::csv::export_tsv(&ExportTable::from_report(report), path),
    };

    result.map_err(|message| MatchError::Export {
        path: path.display().to_string(),
        message,
    })?;

    tracing::info!(path = %path.display(), ?format, rows = report.result.matches.len(), "results written");
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use newsmatch_engine::config::SourceConfig;
    use newsmatch_engine::{run, ComparisonConfig, RawTable, RunConfig, RunInput, SourceLoad};
    use tempfile::tempdir;

    pub(crate) fn sample_report() -> RunReport {
        let config = RunConfig::new(
            SourceConfig { id: "ellada24".into(), file: "e.csv".into() },
            vec![
                SourceConfig { id: "amna".into(), file: "a.csv".into() },
                SourceConfig { id: "thema".into(), file: "t.csv".into() },
            ],
            ComparisonConfig::default(),
        );
        let table = |rows: &[&[&str]]| Ok(RawTable::from_strings(&["URL", "Title", "Date"], rows));
        let input = RunInput {
            anchor: SourceLoad::new(
                "ellada24",
                table(&[
                    &["u", "New York Mets", "01/03/2025"],
                    &["u", "Σεισμός στην Κρήτη", "02/03/2025"],
                ]),
            ),
            candidates: vec![
                SourceLoad::new("amna", table(&[&["u", "new york yankees", "01/03/2025"]])),
                SourceLoad::new("thema", table(&[&["u", "Σεισμός στην Κρήτη τώρα", "02/03/2025"]])),
            ],
        };
        run(&config, input).unwrap()
    }

    #[test]
    fn headers_follow_source_order() {
        let table = ExportTable::from_report(&sample_report());
        assert_eq!(
            table.headers,
            vec![
                "ellada24_Title",
                "ellada24_Date",
                "amna_Title",
                "amna_Date",
                "thema_Title",
                "thema_Date",
                "Similarity",
                "Date_Diff_Days",
            ]
        );
    }

    #[test]
    fn rows_fill_only_their_pair() {
        let table = ExportTable::from_report(&sample_report());
        assert_eq!(table.rows.len(), 2);

        // Sorted by similarity: the thema match (1.0) comes first
        let first = &table.rows[0];
        assert_eq!(first[0], ExportCell::Text("Σεισμός στην Κρήτη".into()));
        assert_eq!(first[2], ExportCell::Blank);
        assert_eq!(first[3], ExportCell::Blank);
        assert_eq!(first[4], ExportCell::Text("Σεισμός στην Κρήτη τώρα".into()));
        assert_eq!(first[6], ExportCell::Number(1.0));
        assert_eq!(first[7], ExportCell::Days(0));

        let second = &table.rows[1];
        assert_eq!(second[2], ExportCell::Text("new york yankees".into()));
        assert_eq!(second[4], ExportCell::Blank);
        assert_eq!(second[6], ExportCell::Number(0.76));
    }

    #[test]
    fn similarity_rounding() {
        assert_eq!(round_similarity(16.0 / 21.0), 0.76);
        assert_eq!(round_similarity(1.0), 1.0);
        assert_eq!(round_similarity(0.755), 0.76);
    }

    #[test]
    fn export_failure_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.csv");
        let err = write_report(&sample_report(), &path, ExportFormat::Csv).unwrap_err();
        assert!(matches!(err, MatchError::Export { .. }));
        assert!(err.to_string().contains("out.csv"));
    }
}
