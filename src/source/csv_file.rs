//! CSV file source.

use anyhow::Result;
use async_trait::async_trait;
use std::fs::File;
use tracing::info;

use super::UsageSource;
use crate::records::RawTable;

pub struct CsvSource {
    path: String,
}

impl CsvSource {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl UsageSource for CsvSource {
    async fn fetch(&self) -> Result<RawTable> {
        info!(path = %self.path, "Reading usage CSV");
        read_raw_table(&self.path)
    }
}

/// Reads a CSV file into an untyped table. Header names are kept verbatim
/// (the validator resolves aliases); empty cells become `None`.
pub fn read_raw_table(path: &str) -> Result<RawTable> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells: Vec<Option<String>> = (0..columns.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|cell| !cell.trim().is_empty())
                    .map(str::to_string)
            })
            .collect();
        rows.push(cells);
    }

    Ok(RawTable { columns, rows })
}
