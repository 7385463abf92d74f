//! `newsmatch-engine`: near-duplicate headline matching across news outlets.
//!
//! Pure engine crate: receives raw tables, returns scored title matches.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod similarity;
pub mod table;

pub use config::{ComparisonConfig, DatePolicy, DateRange, LoaderConfig, RunConfig, SourceConfig};
pub use diagnostics::{Diagnostic, Severity};
pub use error::MatchError;
pub use model::{ArticleCollection, ArticleRecord, DateStatus, MatchRecord, MatchSet, Outcome, RunReport};
pub use pipeline::{run, RunInput, SourceLoad};
pub use table::{Cell, RawTable};
