//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success, at least one match                              |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args, unreadable config file)       |
//! | 3    | Run completed, no matches found                          |
//! | 4    | Invalid configuration                                    |
//! | 5    | Source failed to load (the anchor in `run`, the file in `inspect`) |
//! | 6    | No candidate source could be loaded                      |
//! | 7    | Writing an export failed                                 |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `exit_code_for` or the relevant command

use newsmatch_engine::MatchError;

/// Success - command completed and found matches.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options, unreadable config.
pub const EXIT_USAGE: u8 = 2;

/// The run completed but no pair scored at or above the threshold.
/// Not a failure of the tool; scripts can tell it apart from errors.
pub const EXIT_NO_MATCHES: u8 = 3;

/// Config parse or validation error.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// The anchor source (or the inspected file) could not be loaded.
pub const EXIT_SOURCE_FAILED: u8 = 5;

/// Every candidate source failed to load.
pub const EXIT_NO_CANDIDATES: u8 = 6;

/// An export file could not be written.
pub const EXIT_EXPORT_FAILED: u8 = 7;

/// Map an engine error to its exit code.
pub fn exit_code_for(err: &MatchError) -> u8 {
    match err {
        MatchError::ConfigParse(_) | MatchError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        MatchError::Schema { .. } | MatchError::Load { .. } => EXIT_SOURCE_FAILED,
        MatchError::NoCandidateSources { .. } => EXIT_NO_CANDIDATES,
        MatchError::Export { .. } => EXIT_EXPORT_FAILED,
    }
}
