//! Input-boundary collaborators: where a raw usage table comes from.
//!
//! Both sources produce the same untyped [`RawTable`], so CSV files and
//! database results flow through one validation path downstream.

mod csv_file;
mod db;

pub use csv_file::{CsvSource, read_raw_table};
pub use db::{DbConfig, DbDialect, DbSource};

use anyhow::Result;
use async_trait::async_trait;

use crate::records::RawTable;

/// Whether this build carries the database collaborator.
pub const DATABASE_SUPPORTED: bool = true;

#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn fetch(&self) -> Result<RawTable>;
}

/// Picks the collaborator for this refresh.
///
/// `db_supported` is an explicit capability flag: when false, asking for
/// the database path is refused up front instead of failing later, and
/// the CSV path remains usable regardless.
pub fn select_source(
    use_db: bool,
    db_supported: bool,
    csv_path: &str,
) -> Result<Box<dyn UsageSource>> {
    if use_db {
        if !db_supported {
            anyhow::bail!("database source requested but database support is not available");
        }
        let config = DbConfig::from_env()?;
        Ok(Box::new(DbSource::new(config)))
    } else {
        Ok(Box::new(CsvSource::new(csv_path)))
    }
}
