// Source table reading: dispatch on file extension

use std::path::Path;

use encoding_rs::Encoding;
use newsmatch_engine::{MatchError, RawTable};

/// Encoding assumed for text files that are not valid UTF-8.
pub const DEFAULT_FALLBACK_ENCODING: &str = "windows-1253";

#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub fallback_encoding: &'static Encoding,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            fallback_encoding: encoding_rs::WINDOWS_1253,
        }
    }
}

impl ReadOptions {
    /// Options for an optional encoding label (`None` = Greek Windows code page).
    pub fn with_encoding(label: Option<&str>) -> Result<Self, String> {
        let label = label.unwrap_or(DEFAULT_FALLBACK_ENCODING);
        let fallback_encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| format!("unknown text encoding '{label}'"))?;
        Ok(Self { fallback_encoding })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    Delimited,
    Tsv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "csv" | "txt" => Some(Self::Delimited),
            "tsv" => Some(Self::Tsv),
            _ => None,
        }
    }
}

/// Read a file into a raw table. The first row holds the headers.
pub fn read_table(path: &Path, options: &ReadOptions) -> Result<RawTable, String> {
    let format = SourceFormat::from_path(path).ok_or_else(|| {
        format!(
            "unsupported file type '{}' (expected xlsx, xls, xlsb, ods, csv, tsv or txt)",
            path.display()
        )
    })?;

    tracing::debug!(path = %path.display(), ?format, "reading source table");

    match format {
        SourceFormat::Spreadsheet => crate::xlsx::import(path),
        SourceFormat::Delimited => crate::csv::import(path, options.fallback_encoding),
        SourceFormat::Tsv => crate::csv::import_tsv(path, options.fallback_encoding),
    }
}

/// Read the table of one named source. Failures name the source and file.
pub fn load_source(id: &str, path: &Path, options: &ReadOptions) -> Result<RawTable, MatchError> {
    read_table(path, options).map_err(|message| MatchError::Load {
        source: id.to_string(),
        message: format!("{}: {message}", path.display()),
    })
}
