//! Core domain types for network usage analytics.
//!
//! Defines the untyped tabular input boundary, the normalized row produced
//! by validation, and the fully-typed usage record consumed by the filter
//! layer and the aggregation engine.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// Columns every input table must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "timestamp",
    "region",
    "city",
    "site_id",
    "cell_id",
    "tech",
    "capacity_mbps",
    "throughput_mbps",
    "utilization_pct",
    "latency_ms",
    "packet_loss_pct",
    "users_active",
];

/// Accepted header names for the timestamp column, tried in order.
/// The first match is renamed to the canonical `timestamp`.
pub const TIMESTAMP_ALIASES: [&str; 5] =
    ["timestamp", "time", "datetime", "event_time", "date_time"];

/// Fixed utilization threshold (%) for the `congested_cells` table.
///
/// Independent of the adjustable prime-time threshold; the two are
/// intentionally distinct.
pub const CONGESTION_THRESHOLD_PCT: f64 = 80.0;

/// Inclusive hour-of-day window for the prime-time congestion view.
pub const PRIME_TIME_HOURS: (u32, u32) = (19, 23);

/// An untyped table as read from a CSV file or a database result.
///
/// One cell per column per row; `None` marks an empty or absent cell.
/// Header names are preserved verbatim so the validator can resolve
/// aliases itself.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One row after validation and normalization.
///
/// The timestamp is still nullable here: rows whose timestamp failed to
/// parse survive validation and are dropped by the caller via
/// [`drop_unparsed`] before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub timestamp: Option<NaiveDateTime>,
    pub region: String,
    pub city: String,
    pub site_id: String,
    pub cell_id: String,
    pub tech: String,
    pub capacity_mbps: Option<f64>,
    pub throughput_mbps: Option<f64>,
    pub utilization_pct: Option<f64>,
    pub latency_ms: Option<f64>,
    pub packet_loss_pct: Option<f64>,
    pub users_active: Option<f64>,
}

/// One observation of a cell/site at one timestamp.
///
/// The six numeric fields are independently nullable; aggregation excludes
/// nulls rather than treating them as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    pub timestamp: NaiveDateTime,
    pub region: String,
    pub city: String,
    pub site_id: String,
    pub cell_id: String,
    pub tech: String,
    pub capacity_mbps: Option<f64>,
    pub throughput_mbps: Option<f64>,
    pub utilization_pct: Option<f64>,
    pub latency_ms: Option<f64>,
    pub packet_loss_pct: Option<f64>,
    pub users_active: Option<f64>,
}

impl UsageRecord {
    /// Hour-of-day component (0-23) of the timestamp.
    pub fn hour(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Calendar date component of the timestamp.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Drops rows whose timestamp failed to parse, returning the surviving
/// records and the number of rows discarded.
pub fn drop_unparsed(rows: Vec<NormalizedRow>) -> (Vec<UsageRecord>, usize) {
    let total = rows.len();
    let records: Vec<UsageRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let timestamp = row.timestamp?;
            Some(UsageRecord {
                timestamp,
                region: row.region,
                city: row.city,
                site_id: row.site_id,
                cell_id: row.cell_id,
                tech: row.tech,
                capacity_mbps: row.capacity_mbps,
                throughput_mbps: row.throughput_mbps,
                utilization_pct: row.utilization_pct,
                latency_ms: row.latency_ms,
                packet_loss_pct: row.packet_loss_pct,
                users_active: row.users_active,
            })
        })
        .collect();
    let dropped = total - records.len();
    (records, dropped)
}
