//! Output formatting and persistence for derived tables.
//!
//! Each derived table exports as UTF-8 CSV with a header row, comma
//! separated, no index column. Headers are written explicitly so an empty
//! table still produces its header line, and so column names stay exactly
//! the contract strings regardless of serde field names.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::summary::Kpis;
use crate::analyzers::tables::{Aggregations, CongestedCellRow};
use csv::WriterBuilder;
use std::path::Path;

pub const SITE_HOUR_HEADERS: [&str; 6] =
    ["site_id", "hour", "avg_util", "p95_util", "avg_latency", "users"];
pub const SITE_DAY_HEADERS: [&str; 6] =
    ["site_id", "date", "avg_util", "peak_util", "avg_latency", "users"];
pub const BUSY_HOUR_HEADERS: [&str; 3] = ["site_id", "hour", "hour_avg_util"];
pub const CONGESTED_HEADERS: [&str; 8] = [
    "timestamp",
    "region",
    "city",
    "site_id",
    "cell_id",
    "tech",
    "utilization_pct",
    "latency_ms",
];
pub const HOUR_OF_DAY_HEADERS: [&str; 3] = ["hour", "tech", "avg_util"];

/// Logs the KPI summary as pretty-printed JSON.
pub fn print_json(kpis: &Kpis) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(kpis)?);
    Ok(())
}

/// Writes one derived table as CSV with the given header row.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Exports the five canonical tables plus the prime-time view into `dir`.
pub fn export_all(
    dir: &Path,
    tables: &Aggregations,
    prime_time: &[CongestedCellRow],
) -> Result<()> {
    write_csv(&dir.join("site_hour.csv"), &SITE_HOUR_HEADERS, &tables.site_hour)?;
    write_csv(&dir.join("site_day.csv"), &SITE_DAY_HEADERS, &tables.site_day)?;
    write_csv(&dir.join("busy_hour.csv"), &BUSY_HOUR_HEADERS, &tables.busy_hour)?;
    write_csv(
        &dir.join("congested_cells.csv"),
        &CONGESTED_HEADERS,
        &tables.congested_cells,
    )?;
    write_csv(
        &dir.join("hour_of_day.csv"),
        &HOUR_OF_DAY_HEADERS,
        &tables.hour_of_day,
    )?;
    write_csv(&dir.join("prime_time.csv"), &CONGESTED_HEADERS, prime_time)?;

    info!(dir = %dir.display(), "Exported derived tables");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::tables::HourOfDayRow;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let kpis = Kpis::from_records(&[]);
        print_json(&kpis).unwrap();
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let path = temp_path("netutil_test_hour_of_day.csv");
        let _ = fs::remove_file(&path);

        let rows = vec![
            HourOfDayRow {
                hour: 10,
                tech: "4G".to_string(),
                avg_util: Some(52.5),
            },
            HourOfDayRow {
                hour: 10,
                tech: "5G".to_string(),
                avg_util: None,
            },
        ];
        write_csv(&path, &HOUR_OF_DAY_HEADERS, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "hour,tech,avg_util");
        assert_eq!(lines[1], "10,4G,52.5");
        // Null aggregates serialize as empty cells.
        assert_eq!(lines[2], "10,5G,");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_empty_table_keeps_header() {
        let path = temp_path("netutil_test_empty.csv");
        let _ = fs::remove_file(&path);

        let rows: Vec<HourOfDayRow> = Vec::new();
        write_csv(&path, &HOUR_OF_DAY_HEADERS, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "hour,tech,avg_util");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_creates_parent_dir() {
        let dir = temp_path("netutil_test_tables_dir");
        let _ = fs::remove_dir_all(&dir);

        let rows: Vec<HourOfDayRow> = Vec::new();
        write_csv(&dir.join("hour_of_day.csv"), &HOUR_OF_DAY_HEADERS, &rows).unwrap();

        assert!(dir.join("hour_of_day.csv").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
