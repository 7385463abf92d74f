// CSV/TSV import/export

use std::path::Path;

use encoding_rs::Encoding;
use newsmatch_engine::{Cell, RawTable};

use crate::export::{ExportCell, ExportTable};

pub fn import(path: &Path, fallback: &'static Encoding) -> Result<RawTable, String> {
    let content = read_file_as_utf8(path, fallback)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path, fallback: &'static Encoding) -> Result<RawTable, String> {
    let content = read_file_as_utf8(path, fallback)?;
    import_from_string(&content, b'\t')
}

/// Pick the delimiter whose first records agree with the header's field count.
///
/// Records are read whole, so a quoted title spanning lines counts once. Each
/// candidate scores the share of agreeing records times the header's field count;
/// candidates that leave the header in one field are skipped.
fn sniff_delimiter(content: &str) -> u8 {
    const SAMPLE_RECORDS: usize = 10;
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];

    let mut best = b',';
    let mut best_score = 0.0;

    for &delim in candidates {
        let counts: Vec<usize> = csv::ReaderBuilder::new()
            .delimiter(delim)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes())
            .records()
            .take(SAMPLE_RECORDS)
            .map(|r| r.map_or(1, |r| r.len()))
            .collect();

        let Some(&target) = counts.first() else {
            return b',';
        };
        if target <= 1 {
            continue;
        }

        let consistent = counts.iter().filter(|&&c| c == target).count();
        let score = consistent as f64 / counts.len() as f64 * target as f64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read a file as text. Bytes that are not valid UTF-8 are decoded with the
/// fallback encoding (Greek sites commonly export Windows-1253).
pub fn read_file_as_utf8(path: &Path, fallback: &'static Encoding) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            tracing::debug!(path = %path.display(), encoding = fallback.name(), "not UTF-8, decoding with fallback");
            let (decoded, _, _) = fallback.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

fn import_from_string(content: &str, delimiter: u8) -> Result<RawTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| e.to_string())?
            .iter()
            .map(str::to_string)
            .collect(),
        None => return Err("file is empty, expected a header row".to_string()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| if field.is_empty() { Cell::Empty } else { Cell::text(field) })
            .collect();
        // Blank lines in the middle of a file are not articles
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

/// Write a result table as comma-separated text. Dates use day/month/year.
pub fn export(table: &ExportTable, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

pub fn export_tsv(table: &ExportTable, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b'\t')
}

fn export_with_delimiter(table: &ExportTable, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(&table.headers).map_err(|e| e.to_string())?;

    for row in &table.rows {
        let record: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                ExportCell::Blank => String::new(),
                ExportCell::Text(s) => s.clone(),
                ExportCell::Date(d) => d.format("%d/%m/%Y").to_string(),
                ExportCell::Number(n) => n.to_string(),
                ExportCell::Days(n) => n.to_string(),
            })
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "URL;Title;Date\nu1;Σεισμός;01/03/2025\nu2;Βροχές;02/03/2025\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "URL,Title,Date\nu1,Σεισμός,01/03/2025\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "URL\tTitle\tDate\nu1\tΣεισμός\t01/03/2025\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_titles() {
        let content = "URL;Title;Date\nu1;\"Σεισμός, ζημιές στην Κρήτη\";01/03/2025\nu2;Βροχές;02/03/2025\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_counts_multiline_titles_once() {
        // Split by line, the comma reads two fields everywhere and the semicolon does not
        let content = "URL;Title, lead;Date\n\
            u1;\"Σεισμός, ζημιές\nστην Κρήτη, Χανιά\";01/03/2025\n\
            u2;\"Βροχές, πλημμύρες\nστην Αττική, Πειραιάς\";02/03/2025\n";
        assert_eq!(sniff_delimiter(content), b';');

        let table = import_from_string(content, sniff_delimiter(content)).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), &Cell::text("Σεισμός, ζημιές\nστην Κρήτη, Χανιά"));
    }

    #[test]
    fn test_import_headers_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amna.csv");
        fs::write(
            &path,
            "URL,Title,Date\nhttps://amna.gr/1,\"Σεισμός, ζημιές\",01/03/2025\n,Βροχές,\n\n",
        )
        .unwrap();

        let table = import(&path, encoding_rs::WINDOWS_1253).unwrap();
        assert_eq!(table.headers, vec!["URL", "Title", "Date"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), &Cell::text("Σεισμός, ζημιές"));
        assert_eq!(table.cell(1, 0), &Cell::Empty);
        assert_eq!(table.cell(1, 2), &Cell::Empty);
    }

    #[test]
    fn test_windows_1253_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        let (bytes, _, had_errors) =
            encoding_rs::WINDOWS_1253.encode("URL,Title,Date\nu,Σεισμός στην Κρήτη,01/03/2025\n");
        assert!(!had_errors);
        fs::write(&path, &bytes).unwrap();

        let table = import(&path, encoding_rs::WINDOWS_1253).unwrap();
        assert_eq!(table.cell(0, 1), &Cell::text("Σεισμός στην Κρήτη"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}URL,Title,Date\nu,t,01/03/2025\n").unwrap();
        let table = import(&path, encoding_rs::WINDOWS_1253).unwrap();
        assert_eq!(table.column_index("URL"), Some(0));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(import(&path, encoding_rs::WINDOWS_1253).is_err());
    }

    #[test]
    fn test_export_renders_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let table = ExportTable {
            headers: vec!["a_Title".into(), "a_Date".into(), "Similarity".into(), "Date_Diff_Days".into()],
            rows: vec![vec![
                ExportCell::Text("Σεισμός, τώρα".into()),
                ExportCell::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
                ExportCell::Number(0.76),
                ExportCell::Days(2),
            ]],
        };
        export(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("a_Title,a_Date,Similarity,Date_Diff_Days"));
        assert_eq!(lines.next(), Some("\"Σεισμός, τώρα\",01/03/2025,0.76,2"));
    }

    #[test]
    fn test_tsv_export_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let table = ExportTable {
            headers: vec!["x_Title".into(), "y_Title".into()],
            rows: vec![vec![ExportCell::Text("α".into()), ExportCell::Blank]],
        };
        export_tsv(&table, &path).unwrap();

        let imported = import_tsv(&path, encoding_rs::WINDOWS_1253).unwrap();
        assert_eq!(imported.headers, vec!["x_Title", "y_Title"]);
        assert_eq!(imported.cell(0, 0), &Cell::text("α"));
        assert_eq!(imported.cell(0, 1), &Cell::Empty);
    }
}
