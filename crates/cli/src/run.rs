//! `newsmatch run` and `newsmatch validate`: config-driven or ad-hoc matching runs.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use newsmatch_engine::config::{ColumnMapping, OutputConfig};
use newsmatch_engine::{
    ComparisonConfig, DatePolicy, DateRange, LoaderConfig, Outcome, RunConfig, RunInput, SourceConfig, SourceLoad,
};
use newsmatch_io::{load_source, write_report, ExportFormat, ReadOptions};

use crate::exit_codes::{EXIT_INVALID_CONFIG, EXIT_NO_MATCHES, EXIT_USAGE};
use crate::report;
use crate::CliError;

/// Loader overrides shared by `run` and `inspect`.
#[derive(Args, Debug, Default)]
pub struct LoaderArgs {
    /// Header of the URL column
    #[arg(long, value_name = "HEADER")]
    pub url: Option<String>,

    /// Header of the title column
    #[arg(long, value_name = "HEADER")]
    pub title: Option<String>,

    /// Header of the date column
    #[arg(long, value_name = "HEADER")]
    pub date: Option<String>,

    /// chrono format of the primary date layout (default %d/%m/%Y)
    #[arg(long, value_name = "FMT")]
    pub date_format: Option<String>,

    /// Backfill unparseable dates with the sentinel date instead of leaving them unknown
    #[arg(long)]
    pub lenient: bool,

    /// Encoding for text files that are not UTF-8 (default windows-1253)
    #[arg(long, value_name = "LABEL", env = "NEWSMATCH_ENCODING")]
    pub encoding: Option<String>,
}

impl LoaderArgs {
    pub fn apply(&self, loader: &mut LoaderConfig) {
        let ColumnMapping { url, title, date } = &mut loader.columns;
        if let Some(header) = &self.url {
            *url = header.clone();
        }
        if let Some(header) = &self.title {
            *title = header.clone();
        }
        if let Some(header) = &self.date {
            *date = header.clone();
        }
        if let Some(fmt) = &self.date_format {
            loader.date_format = fmt.clone();
        }
        if self.lenient {
            loader.date_policy = DatePolicy::Lenient;
        }
        if let Some(label) = &self.encoding {
            loader.fallback_encoding = Some(label.clone());
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a .newsmatch.toml config file
    #[arg(required_unless_present = "anchor")]
    pub config: Option<PathBuf>,

    /// Anchor source for an ad-hoc run
    #[arg(long, value_name = "ID=PATH", value_parser = parse_source, conflicts_with = "config", requires = "candidate")]
    pub anchor: Option<SourceConfig>,

    /// Candidate source for an ad-hoc run (repeatable)
    #[arg(long, value_name = "ID=PATH", value_parser = parse_source, requires = "anchor")]
    pub candidate: Vec<SourceConfig>,

    /// Minimum similarity in [0, 1] for a pair to match
    #[arg(long, value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Days either side of the anchor date a candidate may fall (0 = same day)
    #[arg(long, value_name = "DAYS")]
    pub proximity: Option<u32>,

    /// First anchor date to consider (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last anchor date to consider (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Compare candidates on worker threads
    #[arg(long)]
    pub parallel: bool,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Write the comparison table to an xlsx workbook
    #[arg(long, value_name = "PATH")]
    pub xlsx: Option<PathBuf>,

    /// Write the comparison table as CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Write the comparison table as tab-separated text
    #[arg(long, value_name = "PATH")]
    pub tsv: Option<PathBuf>,

    /// Write the full JSON report to a file
    #[arg(long, value_name = "PATH")]
    pub json_file: Option<PathBuf>,

    /// Print the full JSON report to stdout instead of the human summary
    #[arg(long)]
    pub json: bool,
}

/// Parse `id=path`.
fn parse_source(s: &str) -> Result<SourceConfig, String> {
    let (id, file) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=PATH, got '{s}'"))?;
    let (id, file) = (id.trim(), file.trim());
    if id.is_empty() || file.is_empty() {
        return Err(format!("expected ID=PATH, got '{s}'"));
    }
    Ok(SourceConfig { id: id.to_string(), file: file.to_string() })
}

/// A config ready to run, with the directory its relative paths resolve against.
struct Prepared {
    config: RunConfig,
    base_dir: PathBuf,
}

impl Prepared {
    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

fn read_config(path: &Path) -> Result<RunConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_USAGE, format!("cannot read config {}: {e}", path.display()))
            .with_hint("pass a .newsmatch.toml file, or --anchor id=path --candidate id=path")
    })?;
    Ok(RunConfig::from_toml(&text)?)
}

fn prepare(args: &RunArgs) -> Result<Prepared, CliError> {
    let (mut config, base_dir) = match (&args.config, &args.anchor) {
        (Some(path), _) => {
            let config = read_config(path)?;
            let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            (config, base_dir)
        }
        (None, Some(anchor)) => {
            let config = RunConfig::new(anchor.clone(), args.candidate.clone(), ComparisonConfig::default());
            (config, PathBuf::from("."))
        }
        (None, None) => return Err(CliError::args("either a config file or --anchor is required")),
    };

    let comparison = &mut config.comparison;
    if let Some(threshold) = args.threshold {
        comparison.similarity_threshold = threshold;
    }
    if let Some(days) = args.proximity {
        comparison.date_proximity_days = days;
    }
    if args.from.is_some() || args.to.is_some() {
        let current = comparison.date_range;
        comparison.date_range = DateRange::new(
            args.from.unwrap_or(current.start),
            args.to.unwrap_or(current.end),
        );
    }
    config.parallel |= args.parallel;
    args.loader.apply(&mut config.loader);

    // Flags win over the file; a flagged output replaces the configured one
    // and is taken relative to the working directory.
    let cwd = std::env::current_dir().unwrap_or_default();
    let flagged = |p: &Option<PathBuf>| p.as_ref().map(|p| path_string(&cwd.join(p)));
    let OutputConfig { xlsx, csv, tsv, json } = &mut config.output;
    if args.xlsx.is_some() {
        *xlsx = flagged(&args.xlsx);
    }
    if args.csv.is_some() {
        *csv = flagged(&args.csv);
    }
    if args.tsv.is_some() {
        *tsv = flagged(&args.tsv);
    }
    if args.json_file.is_some() {
        *json = flagged(&args.json_file);
    }

    config.validate().map_err(CliError::engine)?;
    Ok(Prepared { config, base_dir })
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn read_options(loader: &LoaderConfig) -> Result<ReadOptions, CliError> {
    ReadOptions::with_encoding(loader.fallback_encoding.as_deref())
        .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e))
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let prepared = prepare(&args)?;
    let config = &prepared.config;
    let options = read_options(&config.loader)?;

    let load = |source: &SourceConfig| {
        let path = prepared.resolve(&source.file);
        SourceLoad::new(source.id.clone(), load_source(&source.id, &path, &options))
    };
    let input = RunInput {
        anchor: load(&config.anchor),
        candidates: config.candidates.iter().map(load).collect(),
    };

    let report = newsmatch_engine::run(config, input)?;

    let outputs = [
        (&config.output.xlsx, ExportFormat::Xlsx),
        (&config.output.csv, ExportFormat::Csv),
        (&config.output.tsv, ExportFormat::Tsv),
        (&config.output.json, ExportFormat::Json),
    ];
    let mut written = Vec::new();
    for (path, format) in outputs {
        if let Some(path) = path {
            let path = prepared.resolve(path);
            write_report(&report, &path, format).map_err(CliError::engine)?;
            written.push(path);
        }
    }

    if args.json {
        let json = newsmatch_io::json::to_string(&report)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{json}");
    } else {
        eprint!("{}", report::render_summary(&report, &written));
    }

    match report.outcome() {
        Outcome::Matches(_) => Ok(()),
        Outcome::NoMatches => Err(CliError::silent(EXIT_NO_MATCHES)),
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    read_options(&config.loader)?;

    let prepared = Prepared {
        base_dir: config_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf(),
        config,
    };
    let config = &prepared.config;

    eprintln!("config '{}' is valid", config.name);
    for (role, source) in std::iter::once(("anchor", &config.anchor))
        .chain(config.candidates.iter().map(|c| ("candidate", c)))
    {
        let path = prepared.resolve(&source.file);
        let state = if path.is_file() { "" } else { "  (missing)" };
        eprintln!("  {role:<9} {:<12} {}{state}", source.id, path.display());
        if !path.is_file() {
            tracing::warn!(source = %source.id, path = %path.display(), "source file not found");
        }
    }

    let c = &config.comparison;
    eprintln!(
        "  threshold {} | proximity {} day(s) | range {}",
        c.similarity_threshold,
        c.date_proximity_days,
        report::render_range(&c.date_range),
    );
    Ok(())
}
