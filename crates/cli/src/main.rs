// newsmatch CLI - find the same story across news outlets by headline

mod exit_codes;
mod inspect;
mod report;
mod run;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use newsmatch_engine::MatchError;
use tracing_subscriber::EnvFilter;

use exit_codes::{exit_code_for, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

/// Env var holding a tracing filter; `RUST_LOG` is read when it is unset.
const LOG_ENV: &str = "NEWSMATCH_LOG";

const DEFAULT_LOG_FILTER: &str = "newsmatch_engine=info,newsmatch_io=info,newsmatch_cli=info";

#[derive(Parser)]
#[command(name = "newsmatch")]
#[command(about = "Match news headlines across outlets by date and title similarity")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Only log errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug detail (file formats, encodings, windows)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an anchor outlet against one or more candidate outlets
    #[command(after_help = "\
Examples:
  newsmatch run wires.newsmatch.toml
  newsmatch run wires.newsmatch.toml --json > report.json
  newsmatch run --anchor ellada24=ellada24.xlsx --candidate amna=amna.xlsx --xlsx out.xlsx
  newsmatch run wires.newsmatch.toml --from 2025-03-01 --to 2025-03-31 --proximity 1

Exit codes:
  0  matches found       3  no matches
  4  invalid config      5  anchor source failed
  6  no candidate loaded 7  export failed")]
    Run(run::RunArgs),

    /// Check a run config without reading any article
    #[command(after_help = "\
Examples:
  newsmatch validate wires.newsmatch.toml")]
    Validate {
        /// Path to the .newsmatch.toml config file
        config: std::path::PathBuf,
    },

    /// Load one article file and report what the loader sees in it
    #[command(after_help = "\
Examples:
  newsmatch inspect amna_articles.xlsx
  newsmatch inspect thema.csv --title Τίτλος --lenient --json")]
    Inspect(inspect::InspectArgs),
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  newsmatch-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  newsmatch-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

/// Logs go to stderr so `--json` output on stdout stays a single document.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("newsmatch_engine=debug,newsmatch_io=debug,newsmatch_cli=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run::cmd_run(args),
        Commands::Validate { config } => run::cmd_validate(config),
        Commands::Inspect(args) => inspect::cmd_inspect(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Exit with `code` and print nothing; the command already reported.
    pub fn silent(code: u8) -> Self {
        Self::new(code, "")
    }

    /// Create error from an engine error with the matching exit code.
    pub fn engine(err: MatchError) -> Self {
        let code = exit_code_for(&err);
        let hint = match &err {
            MatchError::Schema { .. } => {
                Some("map header names under [loader.columns] or pass --url/--title/--date".to_string())
            }
            MatchError::NoCandidateSources { .. } => {
                Some("every candidate failed to load; see the warnings above".to_string())
            }
            MatchError::Load { message, .. } if message.contains("unsupported file type") => {
                Some("supported inputs: .xlsx .xlsm .xls .xlsb .ods .csv .tsv .txt".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<MatchError> for CliError {
    fn from(err: MatchError) -> Self {
        Self::engine(err)
    }
}
