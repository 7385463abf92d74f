// Spreadsheet import (calamine: xlsx, xlsm, xls, xlsb, ods) and xlsx export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use newsmatch_engine::{Cell, RawTable};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};

use crate::export::{ExportCell, ExportTable};

/// Excel's row limit, header included.
const MAX_ROWS: usize = 1_048_576;

const SHEET_NAME: &str = "Comparison";

/// Import the first worksheet. Its first row holds the headers.
pub fn import(path: &Path) -> Result<RawTable, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| format!("Failed to open spreadsheet: {}", e))?;

    let sheet_names = workbook.sheet_names();
    let first = sheet_names
        .first()
        .ok_or_else(|| "Spreadsheet contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_text).collect(),
        None => return Err(format!("Sheet '{}' is empty, expected a header row", first)),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(to_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    tracing::debug!(path = %path.display(), sheet = %first, rows = rows.len(), "spreadsheet imported");
    Ok(RawTable::new(headers, rows))
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // Resolved through the workbook's date system, so 1904 files land on the right day
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => Cell::DateSerial(datetime_serial(datetime)),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Days since 1899-12-30 (the 1900 date system) as written to exports.
fn excel_serial(date: NaiveDate) -> f64 {
    (date - serial_epoch()).num_days() as f64
}

/// Fractional 1900-system serial of a cell's date and time.
fn datetime_serial(datetime: NaiveDateTime) -> f64 {
    let epoch = serial_epoch().and_hms_opt(0, 0, 0).unwrap_or_default();
    (datetime - epoch).num_milliseconds() as f64 / 86_400_000.0
}

fn column_width(header: &str) -> f64 {
    if header.ends_with("_Title") {
        60.0
    } else if header.ends_with("_Date") {
        12.0
    } else {
        16.0
    }
}

/// Write the result table to a single-sheet xlsx workbook.
pub fn export(table: &ExportTable, path: &Path) -> Result<(), String> {
    if table.rows.len() >= MAX_ROWS {
        return Err(format!(
            "{} result rows exceed the xlsx limit of {} rows",
            table.rows.len(),
            MAX_ROWS - 1
        ));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .map_err(|e| format!("Failed to create sheet '{}': {}", SHEET_NAME, e))?;

    write_table(worksheet, table)?;

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

fn write_table(worksheet: &mut Worksheet, table: &ExportTable) -> Result<(), String> {
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("dd/mm/yyyy").set_align(FormatAlign::Left);
    let score_format = Format::new().set_num_format("0.00");
    let text_format = Format::new();

    for (col, header) in table.headers.iter().enumerate() {
        let col16 = u16::try_from(col).map_err(|_| format!("Too many columns: {}", table.headers.len()))?;
        worksheet
            .write_string_with_format(0, col16, header, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", header, e))?;
        worksheet
            .set_column_width(col16, column_width(header))
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        // Bounded by MAX_ROWS above
        let row32 = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col16 = u16::try_from(col).map_err(|_| format!("Too many columns: {}", row.len()))?;
            let written = match cell {
                ExportCell::Blank => continue,
                ExportCell::Text(s) => worksheet.write_string_with_format(row32, col16, s, &text_format),
                ExportCell::Date(d) => {
                    worksheet.write_number_with_format(row32, col16, excel_serial(*d), &date_format)
                }
                ExportCell::Number(n) => worksheet.write_number_with_format(row32, col16, *n, &score_format),
                ExportCell::Days(n) => worksheet.write_number(row32, col16, f64::from(*n)),
            };
            written.map_err(|e| format!("Failed to write cell ({}, {}): {}", row32, col16, e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("Failed to set freeze panes: {}", e))?;
    Ok(())
}
