// File I/O: reading source tables, writing match results

pub mod csv;
pub mod export;
pub mod json;
pub mod source;
pub mod xlsx;

pub use export::{write_report, ExportFormat, ExportTable};
pub use source::{load_source, read_table, ReadOptions};
