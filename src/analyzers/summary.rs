//! Headline KPIs for one refresh.

use serde::Serialize;

use crate::analyzers::stats::{max, mean, percentile};
use crate::records::UsageRecord;

/// The dashboard's metric row: row count plus four null-safe aggregates
/// over the filtered table. `None` where no non-null values exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub rows: usize,
    pub p95_util: Option<f64>,
    pub peak_util: Option<f64>,
    pub avg_latency_ms: Option<f64>,
    pub avg_users_active: Option<f64>,
}

impl Kpis {
    pub fn from_records(records: &[UsageRecord]) -> Self {
        let util: Vec<Option<f64>> = records.iter().map(|r| r.utilization_pct).collect();
        let latency: Vec<Option<f64>> = records.iter().map(|r| r.latency_ms).collect();
        let users: Vec<Option<f64>> = records.iter().map(|r| r.users_active).collect();

        Kpis {
            rows: records.len(),
            p95_util: percentile(&util, 95.0),
            peak_util: max(&util),
            avg_latency_ms: mean(&latency),
            avg_users_active: mean(&users),
        }
    }
}
