use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, duplicate source id, etc.).
    ConfigValidation(String),
    /// Required columns missing from a source table.
    Schema { source: String, missing: Vec<String> },
    /// Source could not be read or parsed as a table at all.
    Load { source: String, message: String },
    /// Every candidate source failed to load.
    NoCandidateSources { attempted: Vec<String> },
    /// Writing an export artifact failed.
    Export { path: String, message: String },
}

impl MatchError {
    /// Source id the error is attributed to, if any.
    pub fn source_id(&self) -> Option<&str> {
        match self {
            Self::Schema { source, .. } | Self::Load { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Schema { source, missing } => {
                write!(f, "source '{source}': missing required column(s): {}", missing.join(", "))
            }
            Self::Load { source, message } => write!(f, "source '{source}': cannot load table: {message}"),
            Self::NoCandidateSources { attempted } => {
                if attempted.is_empty() {
                    write!(f, "no candidate sources to compare against the anchor")
                } else {
                    write!(
                        f,
                        "none of the candidate sources could be loaded ({})",
                        attempted.join(", ")
                    )
                }
            }
            Self::Export { path, message } => write!(f, "cannot write {path}: {message}"),
        }
    }
}

impl std::error::Error for MatchError {}
