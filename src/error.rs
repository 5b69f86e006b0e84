//! Load-time error taxonomy.
//!
//! These errors are fatal to the current load only; the process stays up
//! and the user can retry with a corrected input. Empty filter results are
//! deliberately not represented here: they are a warning, not an error.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    /// Required column(s) absent after header aliasing. `missing` is
    /// sorted so the message is stable and easy to compare against.
    #[error(
        "input is missing required network columns.\nMissing: {missing:?}\nExpected at least: {required:?}"
    )]
    Schema {
        missing: Vec<String>,
        required: Vec<String>,
    },

    /// Zero rows parsed as valid timestamps. Per-row parse noise is
    /// tolerated; a completely unparseable column is not.
    #[error(
        "could not parse any valid datetimes in 'timestamp'; use ISO-like formats (e.g., 2025-08-22 19:05:00)"
    )]
    Timestamps,

    /// `DB_DIALECT` named something other than postgresql or mysql.
    #[error("unsupported DB_DIALECT: {0}")]
    UnsupportedDialect(String),
}
