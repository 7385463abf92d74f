use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Run candidate comparisons on worker threads.
    #[serde(default)]
    pub parallel: bool,
    pub anchor: SourceConfig,
    #[serde(default)]
    pub candidates: Vec<SourceConfig>,
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "newsmatch".into()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub file: String,
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Parameters of one matching run. Immutable once validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    #[serde(default)]
    pub date_range: DateRange,
    /// 0 = same calendar day only.
    #[serde(default)]
    pub date_proximity_days: u32,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
}

fn default_threshold() -> f64 {
    0.75
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            date_range: DateRange::default(),
            date_proximity_days: 0,
            similarity_threshold: default_threshold(),
        }
    }
}

impl ComparisonConfig {
    pub fn new(
        date_range: DateRange,
        date_proximity_days: u32,
        similarity_threshold: f64,
    ) -> Result<Self, MatchError> {
        let config = Self {
            date_range,
            date_proximity_days,
            similarity_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.date_range.start > self.date_range.end {
            return Err(MatchError::ConfigValidation(format!(
                "date range start {} is after end {}",
                self.date_range.start, self.date_range.end
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MatchError::ConfigValidation(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }

    /// Inclusive proximity window around an anchor date, clamped to the calendar.
    pub fn window(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let p = Duration::days(i64::from(self.date_proximity_days));
        (
            date.checked_sub_signed(p).unwrap_or(NaiveDate::MIN),
            date.checked_add_signed(p).unwrap_or(NaiveDate::MAX),
        )
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// What happens to dates no parser accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePolicy {
    /// Leave the date unknown.
    #[default]
    Strict,
    /// Fill in `sentinel_date`. The record still never matches.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_url_column")]
    pub url: String,
    #[serde(default = "default_title_column")]
    pub title: String,
    #[serde(default = "default_date_column")]
    pub date: String,
}

fn default_url_column() -> String {
    "URL".into()
}

fn default_title_column() -> String {
    "Title".into()
}

fn default_date_column() -> String {
    "Date".into()
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            url: default_url_column(),
            title: default_title_column(),
            date: default_date_column(),
        }
    }
}

pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoaderConfig {
    #[serde(default)]
    pub columns: ColumnMapping,
    /// chrono format of the primary (day/month/year) date layout.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub date_policy: DatePolicy,
    #[serde(default = "default_sentinel_date")]
    pub sentinel_date: NaiveDate,
    /// Encoding label for text files that are not valid UTF-8.
    #[serde(default)]
    pub fallback_encoding: Option<String>,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.into()
}

fn default_sentinel_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            date_format: default_date_format(),
            date_policy: DatePolicy::default(),
            sentinel_date: default_sentinel_date(),
            fallback_encoding: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub xlsx: Option<String>,
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub tsv: Option<String>,
    #[serde(default)]
    pub json: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RunConfig {
    /// Config for an ad-hoc run with default loader and output settings.
    pub fn new(anchor: SourceConfig, candidates: Vec<SourceConfig>, comparison: ComparisonConfig) -> Self {
        Self {
            name: default_name(),
            parallel: false,
            anchor,
            candidates,
            comparison,
            loader: LoaderConfig::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, MatchError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| MatchError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.candidates.is_empty() {
            return Err(MatchError::ConfigValidation(
                "at least one candidate source is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for source in std::iter::once(&self.anchor).chain(&self.candidates) {
            if source.id.trim().is_empty() {
                return Err(MatchError::ConfigValidation("source id must not be empty".into()));
            }
            if source.file.trim().is_empty() {
                return Err(MatchError::ConfigValidation(format!(
                    "source '{}': file must not be empty",
                    source.id
                )));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(MatchError::ConfigValidation(format!(
                    "duplicate source id '{}'",
                    source.id
                )));
            }
        }

        if self.loader.date_format.trim().is_empty() {
            return Err(MatchError::ConfigValidation("loader.date_format must not be empty".into()));
        }

        self.comparison.validate()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
