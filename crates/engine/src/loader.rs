use chrono::NaiveDate;

use crate::config::{DatePolicy, LoaderConfig};
use crate::error::MatchError;
use crate::model::{ArticleCollection, ArticleRecord, DateStatus, LoadReport};
use crate::normalize::{normalize_title, parse_generic_date, parse_primary_date};
use crate::table::{Cell, RawTable};

/// Rows listed in `LoadReport::failed_rows_sample`.
const FAILED_ROWS_SAMPLE: usize = 5;

#[derive(Debug, Clone)]
pub struct LoadedCollection {
    pub collection: ArticleCollection,
    pub report: LoadReport,
}

struct Columns {
    url: usize,
    title: usize,
    date: usize,
}

fn resolve_columns(source: &str, table: &RawTable, config: &LoaderConfig) -> Result<Columns, MatchError> {
    let names = &config.columns;
    let url = table.column_index(&names.url);
    let title = table.column_index(&names.title);
    let date = table.column_index(&names.date);

    match (url, title, date) {
        (Some(url), Some(title), Some(date)) => Ok(Columns { url, title, date }),
        _ => {
            let missing = [(url, &names.url), (title, &names.title), (date, &names.date)]
                .into_iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name.trim().to_string())
                .collect();
            Err(MatchError::Schema {
                source: source.to_string(),
                missing,
            })
        }
    }
}

/// Parse the date column, retrying the whole column with the generic parser
/// when the primary format accepted none of its values.
fn parse_date_column(cells: &[&Cell], format: &str) -> (Vec<Option<NaiveDate>>, bool) {
    let primary: Vec<Option<NaiveDate>> = cells
        .iter()
        .map(|cell| parse_primary_date(cell, format))
        .collect();

    let any_value = cells.iter().any(|cell| !cell.is_blank());
    if primary.iter().any(Option::is_some) || !any_value {
        return (primary, false);
    }

    let generic = cells.iter().map(|cell| parse_generic_date(cell)).collect();
    (generic, true)
}

/// Turn a raw table into a normalized collection.
///
/// Only schema problems are errors. Unparseable dates are counted in the
/// report and, under the lenient policy, replaced by the sentinel.
pub fn load_collection(
    source: &str,
    table: &RawTable,
    config: &LoaderConfig,
) -> Result<LoadedCollection, MatchError> {
    let cols = resolve_columns(source, table, config)?;

    let date_cells: Vec<&Cell> = (0..table.len()).map(|r| table.cell(r, cols.date)).collect();
    let (dates, used_fallback_parser) = parse_date_column(&date_cells, &config.date_format);

    let mut report = LoadReport {
        source: source.to_string(),
        rows: table.len(),
        used_fallback_parser,
        ..LoadReport::default()
    };
    let mut records = Vec::with_capacity(table.len());

    for (r, parsed) in dates.into_iter().enumerate() {
        let row = r + 1;
        let title_cell = table.cell(r, cols.title);
        let normalized_title = normalize_title(title_cell);
        if !normalized_title.is_empty() {
            report.valid_titles += 1;
        }

        let date = match parsed {
            Some(date) => {
                report.valid_dates += 1;
                DateStatus::Known(date)
            }
            None => {
                if date_cells[r].is_blank() {
                    report.missing_dates += 1;
                } else {
                    report.date_failures += 1;
                    if report.failed_rows_sample.len() < FAILED_ROWS_SAMPLE {
                        report.failed_rows_sample.push(row);
                    }
                }
                match config.date_policy {
                    DatePolicy::Strict => DateStatus::Unknown,
                    DatePolicy::Lenient => {
                        report.backfilled += 1;
                        DateStatus::Backfilled(config.sentinel_date)
                    }
                }
            }
        };

        let url = table
            .cell(r, cols.url)
            .as_text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(ArticleRecord {
            row,
            url,
            title: title_cell.as_text().unwrap_or_default().to_string(),
            normalized_title,
            date,
        });
    }

    tracing::debug!(
        %source,
        rows = report.rows,
        valid_dates = report.valid_dates,
        date_failures = report.date_failures,
        fallback = report.used_fallback_parser,
        "collection loaded"
    );

    Ok(LoadedCollection {
        collection: ArticleCollection::new(source, records),
        report,
    })
}
