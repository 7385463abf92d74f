//! `newsmatch inspect`: load a single article file the way a run would.

use std::path::PathBuf;

use clap::Args;
use newsmatch_engine::loader::load_collection;
use newsmatch_engine::{ArticleRecord, Diagnostic, LoaderConfig, RunConfig};
use newsmatch_io::{load_source, ReadOptions};
use serde_json::json;

use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::report;
use crate::run::LoaderArgs;
use crate::CliError;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Article file (.xlsx, .xls, .ods, .csv, .tsv, .txt)
    pub file: PathBuf,

    /// Source id used in messages (default: file name without extension)
    #[arg(long)]
    pub id: Option<String>,

    /// Take loader settings from this run config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub loader: LoaderArgs,

    /// Records to show
    #[arg(long, default_value_t = 5)]
    pub sample: usize,

    /// Output JSON to stdout
    #[arg(long)]
    pub json: bool,
}

fn loader_config(args: &InspectArgs) -> Result<LoaderConfig, CliError> {
    let mut loader = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::args(format!("cannot read config {}: {e}", path.display())))?;
            RunConfig::from_toml(&text).map_err(CliError::engine)?.loader
        }
        None => LoaderConfig::default(),
    };
    args.loader.apply(&mut loader);
    if loader.date_format.trim().is_empty() {
        return Err(CliError::new(EXIT_INVALID_CONFIG, "date format must not be empty"));
    }
    Ok(loader)
}

fn source_id(args: &InspectArgs) -> String {
    args.id.clone().unwrap_or_else(|| {
        args.file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string())
    })
}

pub fn cmd_inspect(args: InspectArgs) -> Result<(), CliError> {
    let loader = loader_config(&args)?;
    let options = ReadOptions::with_encoding(loader.fallback_encoding.as_deref())
        .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e))?;
    let id = source_id(&args);

    let table = load_source(&id, &args.file, &options).map_err(CliError::engine)?;
    let loaded = load_collection(&id, &table, &loader).map_err(CliError::engine)?;
    let diagnostics = Diagnostic::from_load(&loaded.report, loader.sentinel_date);
    for event in &diagnostics {
        event.log();
    }

    let sample: Vec<&ArticleRecord> = loaded.collection.records.iter().take(args.sample).collect();

    if args.json {
        let span = report::date_span(&loaded.collection.records)
            .map(|(first, last)| json!({ "first": first, "last": last }));
        let out = json!({
            "headers": table.headers,
            "report": loaded.report,
            "date_span": span,
            "diagnostics": diagnostics,
            "sample": sample,
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", report::render_load(&loaded.report, &loaded.collection.records));
    for event in diagnostics.iter().filter(|e| !matches!(e, Diagnostic::SourceLoaded { .. })) {
        println!("  {}", report::describe(event));
    }
    if !sample.is_empty() {
        println!();
        for record in sample {
            println!("{}", report::render_record(record));
        }
    }
    Ok(())
}
