//! Row types for the derived summary tables.
//!
//! Field order matches the CSV export contract: each struct serializes in
//! declaration order, so the columns below are the columns on disk. Null
//! cells serialize as empty fields.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Per-(site, hour-of-day) utilization profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteHourRow {
    pub site_id: String,
    pub hour: u32,
    pub avg_util: Option<f64>,
    pub p95_util: Option<f64>,
    pub avg_latency: Option<f64>,
    pub users: Option<f64>,
}

/// Per-(site, calendar date) utilization profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDayRow {
    pub site_id: String,
    pub date: NaiveDate,
    pub avg_util: Option<f64>,
    pub peak_util: Option<f64>,
    pub avg_latency: Option<f64>,
    pub users: Option<f64>,
}

/// The hour with the highest mean utilization for one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusyHourRow {
    pub site_id: String,
    pub hour: u32,
    pub hour_avg_util: Option<f64>,
}

/// One congested observation, projected for display.
///
/// `utilization_pct` is non-null by construction: only rows at or above
/// the congestion threshold make it into this table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CongestedCellRow {
    pub timestamp: NaiveDateTime,
    pub region: String,
    pub city: String,
    pub site_id: String,
    pub cell_id: String,
    pub tech: String,
    pub utilization_pct: f64,
    pub latency_ms: Option<f64>,
}

/// Mean utilization per (hour-of-day, tech) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourOfDayRow {
    pub hour: u32,
    pub tech: String,
    pub avg_util: Option<f64>,
}

/// The five canonical derived tables, regenerated in full on every
/// aggregation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregations {
    pub site_hour: Vec<SiteHourRow>,
    pub site_day: Vec<SiteDayRow>,
    pub busy_hour: Vec<BusyHourRow>,
    pub congested_cells: Vec<CongestedCellRow>,
    pub hour_of_day: Vec<HourOfDayRow>,
}
