//! Record validation and normalization.
//!
//! Turns an untyped [`RawTable`] into normalized rows: resolves timestamp
//! header aliases, checks the required-column set, parses timestamps
//! leniently, coerces the numeric fields cell by cell, and backfills
//! `utilization_pct` from capacity and throughput where it is missing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::LoadError;
use crate::records::{NormalizedRow, RawTable, REQUIRED_COLUMNS, TIMESTAMP_ALIASES};

/// Timestamp formats tried in order. `%.f` also matches an absent
/// fractional part, so each entry covers the with- and without-subsecond
/// spellings.
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_ONLY_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Validates `table` against the required-field set and normalizes every
/// row.
///
/// # Errors
///
/// - [`LoadError::Schema`] when required columns are absent after aliasing.
/// - [`LoadError::Timestamps`] when not a single row yields a valid
///   timestamp (a fundamentally wrong format, not per-row noise).
pub fn normalize(table: &RawTable) -> Result<Vec<NormalizedRow>, LoadError> {
    let columns = resolve_aliases(&table.columns);

    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        let mut required: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        required.sort();
        return Err(LoadError::Schema { missing, required });
    }

    let index = |name: &str| -> usize {
        // Safe: the required-column check above guarantees presence.
        columns.iter().position(|c| c == name).unwrap_or_default()
    };
    let ts_idx = index("timestamp");
    let region_idx = index("region");
    let city_idx = index("city");
    let site_idx = index("site_id");
    let cell_idx = index("cell_id");
    let tech_idx = index("tech");
    let capacity_idx = index("capacity_mbps");
    let throughput_idx = index("throughput_mbps");
    let util_idx = index("utilization_pct");
    let latency_idx = index("latency_ms");
    let loss_idx = index("packet_loss_pct");
    let users_idx = index("users_active");

    let cell = |row: &Vec<Option<String>>, idx: usize| -> Option<String> {
        row.get(idx).and_then(|c| c.clone())
    };
    let text = |row: &Vec<Option<String>>, idx: usize| -> String {
        cell(row, idx).map(|s| s.trim().to_string()).unwrap_or_default()
    };
    let number = |row: &Vec<Option<String>>, idx: usize| -> Option<f64> {
        cell(row, idx).as_deref().and_then(parse_number)
    };

    let mut rows = Vec::with_capacity(table.rows.len());
    for raw in &table.rows {
        let throughput_mbps = number(raw, throughput_idx);
        let capacity_mbps = number(raw, capacity_idx);
        let utilization_pct = number(raw, util_idx)
            .or_else(|| derive_utilization(throughput_mbps, capacity_mbps));

        rows.push(NormalizedRow {
            timestamp: cell(raw, ts_idx).as_deref().and_then(parse_timestamp),
            region: text(raw, region_idx),
            city: text(raw, city_idx),
            site_id: text(raw, site_idx),
            cell_id: text(raw, cell_idx),
            tech: text(raw, tech_idx),
            capacity_mbps,
            throughput_mbps,
            utilization_pct,
            latency_ms: number(raw, latency_idx),
            packet_loss_pct: number(raw, loss_idx),
            users_active: number(raw, users_idx),
        });
    }

    if rows.iter().all(|r| r.timestamp.is_none()) {
        return Err(LoadError::Timestamps);
    }

    Ok(rows)
}

/// Renames the first matching timestamp alias to the canonical name.
/// Leaves the header set untouched when `timestamp` is already present.
pub fn resolve_aliases(columns: &[String]) -> Vec<String> {
    let mut resolved: Vec<String> = columns.to_vec();
    if resolved.iter().any(|c| c == "timestamp") {
        return resolved;
    }
    for alias in TIMESTAMP_ALIASES {
        if let Some(pos) = resolved.iter().position(|c| c == alias) {
            resolved[pos] = "timestamp".to_string();
            break;
        }
    }
    resolved
}

/// Lenient timestamp parser. Returns `None` rather than an error so that
/// per-row noise never aborts a load.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    for format in DATE_ONLY_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.and_hms_opt(0, 0, 0)?);
        }
    }
    // Offset-carrying inputs keep their wall-clock reading.
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    None
}

/// Coerces one numeric cell; unparseable values become `None` without
/// dropping the row.
pub fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok()
}

/// Utilization from the throughput/capacity ratio, clamped to [0, 100].
/// Missing or zero capacity yields `None`, never an error.
pub fn derive_utilization(throughput: Option<f64>, capacity: Option<f64>) -> Option<f64> {
    let throughput = throughput?;
    let capacity = capacity?;
    if capacity == 0.0 {
        return None;
    }
    Some((throughput / capacity * 100.0).clamp(0.0, 100.0))
}
