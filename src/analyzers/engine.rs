//! The aggregation engine.
//!
//! A deterministic, side-effect-free transformation from a flat slice of
//! usage records into the five derived tables. Grouping is explicit
//! key-extraction plus fold into `BTreeMap`s, so grouped tables come out
//! in ascending key order and identical input always yields identical
//! output.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analyzers::stats::{max, mean, percentile};
use crate::analyzers::tables::{
    Aggregations, BusyHourRow, CongestedCellRow, HourOfDayRow, SiteDayRow, SiteHourRow,
};
use crate::records::{CONGESTION_THRESHOLD_PCT, PRIME_TIME_HOURS, UsageRecord};

/// Per-group series of the three aggregated metrics. Nulls are kept so
/// the stats helpers can exclude them per column.
#[derive(Default)]
struct MetricSeries {
    util: Vec<Option<f64>>,
    latency: Vec<Option<f64>>,
    users: Vec<Option<f64>>,
}

impl MetricSeries {
    fn push(&mut self, record: &UsageRecord) {
        self.util.push(record.utilization_pct);
        self.latency.push(record.latency_ms);
        self.users.push(record.users_active);
    }
}

/// Derives the five summary tables from a normalized, filtered table.
///
/// Pure: allocates fresh output structures and never mutates its input.
/// The engine assumes validation already ran; it never raises for missing
/// data, only yields null aggregates.
pub fn compute_aggregations(rows: &[UsageRecord]) -> Aggregations {
    let mut by_site_hour: BTreeMap<(String, u32), MetricSeries> = BTreeMap::new();
    let mut by_site_day: BTreeMap<(String, NaiveDate), MetricSeries> = BTreeMap::new();
    let mut by_hour_tech: BTreeMap<(u32, String), Vec<Option<f64>>> = BTreeMap::new();

    for record in rows {
        by_site_hour
            .entry((record.site_id.clone(), record.hour()))
            .or_default()
            .push(record);
        by_site_day
            .entry((record.site_id.clone(), record.date()))
            .or_default()
            .push(record);
        by_hour_tech
            .entry((record.hour(), record.tech.clone()))
            .or_default()
            .push(record.utilization_pct);
    }

    let site_hour: Vec<SiteHourRow> = by_site_hour
        .iter()
        .map(|((site_id, hour), series)| SiteHourRow {
            site_id: site_id.clone(),
            hour: *hour,
            avg_util: mean(&series.util),
            p95_util: percentile(&series.util, 95.0),
            avg_latency: mean(&series.latency),
            users: mean(&series.users),
        })
        .collect();

    let site_day: Vec<SiteDayRow> = by_site_day
        .iter()
        .map(|((site_id, date), series)| SiteDayRow {
            site_id: site_id.clone(),
            date: *date,
            avg_util: mean(&series.util),
            peak_util: max(&series.util),
            avg_latency: mean(&series.latency),
            users: mean(&series.users),
        })
        .collect();

    let busy_hour = busy_hours(&site_hour);
    let congested_cells = congested_view(rows, CONGESTION_THRESHOLD_PCT);

    let hour_of_day: Vec<HourOfDayRow> = by_hour_tech
        .iter()
        .map(|((hour, tech), util)| HourOfDayRow {
            hour: *hour,
            tech: tech.clone(),
            avg_util: mean(util),
        })
        .collect();

    Aggregations {
        site_hour,
        site_day,
        busy_hour,
        congested_cells,
        hour_of_day,
    }
}

/// One row per site: the hour whose mean utilization is highest.
///
/// `site_hour` arrives sorted ascending by (site_id, hour), so keeping a
/// candidate only on a strictly greater mean resolves ties to the lowest
/// hour. A site whose utilization is entirely null still gets a row, with
/// its first hour and a null mean.
fn busy_hours(site_hour: &[SiteHourRow]) -> Vec<BusyHourRow> {
    let mut best: BTreeMap<&str, (u32, Option<f64>)> = BTreeMap::new();
    for row in site_hour {
        match best.get(row.site_id.as_str()) {
            Some((_, current)) if !exceeds(row.avg_util, *current) => {}
            _ => {
                best.insert(row.site_id.as_str(), (row.hour, row.avg_util));
            }
        }
    }
    best.into_iter()
        .map(|(site_id, (hour, hour_avg_util))| BusyHourRow {
            site_id: site_id.to_string(),
            hour,
            hour_avg_util,
        })
        .collect()
}

/// Whether `candidate` beats `current`. Any value beats null; null never
/// beats anything; equal values do not displace the incumbent.
fn exceeds(candidate: Option<f64>, current: Option<f64>) -> bool {
    match (candidate, current) {
        (Some(c), Some(b)) => c > b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

/// The shared congestion primitive: rows whose utilization meets or
/// exceeds `threshold`, projected for display and sorted descending by
/// utilization then latency (null latency last).
///
/// Both the fixed `congested_cells` table and the parameterized
/// prime-time view are expressed through this one function.
pub fn congested_view<'a, I>(rows: I, threshold: f64) -> Vec<CongestedCellRow>
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    let mut out: Vec<CongestedCellRow> = rows
        .into_iter()
        .filter_map(|r| match r.utilization_pct {
            Some(util) if util >= threshold => Some(CongestedCellRow {
                timestamp: r.timestamp,
                region: r.region.clone(),
                city: r.city.clone(),
                site_id: r.site_id.clone(),
                cell_id: r.cell_id.clone(),
                tech: r.tech.clone(),
                utilization_pct: util,
                latency_ms: r.latency_ms,
            }),
            _ => None,
        })
        .collect();

    // Stable sort keeps input order among full ties.
    out.sort_by(|a, b| {
        b.utilization_pct
            .total_cmp(&a.utilization_pct)
            .then_with(|| cmp_desc_nulls_last(a.latency_ms, b.latency_ms))
    });
    out
}

/// Restricts to the 19:00-23:00 window, then applies the caller-supplied
/// congestion threshold. Distinct from the fixed 80% threshold used by
/// `congested_cells`.
pub fn prime_time_congestion(rows: &[UsageRecord], threshold: f64) -> Vec<CongestedCellRow> {
    let (first, last) = PRIME_TIME_HOURS;
    congested_view(
        rows.iter().filter(|r| (first..=last).contains(&r.hour())),
        threshold,
    )
}

fn cmp_desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: &str, site_id: &str, tech: &str, util: Option<f64>) -> UsageRecord {
        UsageRecord {
            timestamp: timestamp.parse().unwrap(),
            region: "North".to_string(),
            city: "Springfield".to_string(),
            site_id: site_id.to_string(),
            cell_id: "C1".to_string(),
            tech: tech.to_string(),
            capacity_mbps: Some(100.0),
            throughput_mbps: None,
            utilization_pct: util,
            latency_ms: Some(20.0),
            packet_loss_pct: Some(0.1),
            users_active: Some(100.0),
        }
    }

    #[test]
    fn test_busy_hour_picks_highest_mean() {
        // S1 at hour 10: {40, 60} (avg 50); at hour 11: {90}.
        let rows = vec![
            record("2025-01-01T10:00:00", "S1", "4G", Some(40.0)),
            record("2025-01-01T10:30:00", "S1", "4G", Some(60.0)),
            record("2025-01-01T11:00:00", "S1", "4G", Some(90.0)),
        ];

        let tables = compute_aggregations(&rows);

        assert_eq!(tables.busy_hour.len(), 1);
        assert_eq!(tables.busy_hour[0].site_id, "S1");
        assert_eq!(tables.busy_hour[0].hour, 11);
        assert_eq!(tables.busy_hour[0].hour_avg_util, Some(90.0));
    }

    #[test]
    fn test_busy_hour_tie_resolves_to_earliest_hour() {
        let rows = vec![
            record("2025-01-01T14:00:00", "S1", "4G", Some(70.0)),
            record("2025-01-01T09:00:00", "S1", "4G", Some(70.0)),
        ];

        let tables = compute_aggregations(&rows);

        assert_eq!(tables.busy_hour[0].hour, 9);
    }

    #[test]
    fn test_busy_hour_one_row_per_site() {
        let rows = vec![
            record("2025-01-01T10:00:00", "S1", "4G", Some(40.0)),
            record("2025-01-01T11:00:00", "S1", "4G", Some(60.0)),
            record("2025-01-01T10:00:00", "S2", "5G", Some(30.0)),
            record("2025-01-01T12:00:00", "S3", "5G", None),
        ];

        let tables = compute_aggregations(&rows);

        let sites: Vec<&str> = tables
            .busy_hour
            .iter()
            .map(|r| r.site_id.as_str())
            .collect();
        assert_eq!(sites, vec!["S1", "S2", "S3"]);
        // An all-null site still yields a row, with a null mean.
        assert_eq!(tables.busy_hour[2].hour_avg_util, None);
    }

    #[test]
    fn test_site_hour_counts_distinct_pairs() {
        let rows = vec![
            record("2025-01-01T10:00:00", "S1", "4G", Some(40.0)),
            record("2025-01-01T10:30:00", "S1", "4G", Some(60.0)),
            record("2025-01-02T10:00:00", "S1", "4G", Some(20.0)),
            record("2025-01-01T11:00:00", "S2", "5G", Some(10.0)),
        ];

        let tables = compute_aggregations(&rows);

        // Distinct (site, hour) pairs: (S1,10), (S2,11). Distinct
        // (site, date) pairs: (S1, 01-01), (S1, 01-02), (S2, 01-01).
        assert_eq!(tables.site_hour.len(), 2);
        assert_eq!(tables.site_day.len(), 3);

        // Hour 10 for S1 pools both days: mean(40, 60, 20) = 40.
        assert_eq!(tables.site_hour[0].avg_util, Some(40.0));
    }

    #[test]
    fn test_site_hour_all_null_group_has_null_aggregates() {
        let rows = vec![record("2025-01-01T10:00:00", "S1", "4G", None)];

        let tables = compute_aggregations(&rows);

        assert_eq!(tables.site_hour.len(), 1);
        assert_eq!(tables.site_hour[0].avg_util, None);
        assert_eq!(tables.site_hour[0].p95_util, None);
        // Latency is present, so its mean is not null.
        assert_eq!(tables.site_hour[0].avg_latency, Some(20.0));
    }

    #[test]
    fn test_site_day_peak_util() {
        let rows = vec![
            record("2025-01-01T10:00:00", "S1", "4G", Some(40.0)),
            record("2025-01-01T18:00:00", "S1", "4G", Some(88.0)),
        ];

        let tables = compute_aggregations(&rows);

        assert_eq!(tables.site_day[0].peak_util, Some(88.0));
        assert_eq!(tables.site_day[0].avg_util, Some(64.0));
    }

    #[test]
    fn test_congested_cells_threshold_and_order() {
        let mut low_latency = record("2025-01-01T10:00:00", "S1", "4G", Some(85.0));
        low_latency.latency_ms = Some(10.0);
        let mut high_latency = record("2025-01-01T11:00:00", "S2", "4G", Some(85.0));
        high_latency.latency_ms = Some(50.0);
        let mut no_latency = record("2025-01-01T12:00:00", "S3", "4G", Some(85.0));
        no_latency.latency_ms = None;
        let rows = vec![
            record("2025-01-01T09:00:00", "S4", "4G", Some(79.9)),
            low_latency,
            record("2025-01-01T08:00:00", "S5", "4G", Some(80.0)),
            high_latency,
            no_latency,
            record("2025-01-01T07:00:00", "S6", "4G", Some(95.0)),
            record("2025-01-01T06:00:00", "S7", "4G", None),
        ];

        let tables = compute_aggregations(&rows);
        let utils: Vec<f64> = tables
            .congested_cells
            .iter()
            .map(|r| r.utilization_pct)
            .collect();

        // 79.9 and the null row are excluded; order is util desc, then
        // latency desc with null latency last.
        assert_eq!(utils, vec![95.0, 85.0, 85.0, 85.0, 80.0]);
        assert_eq!(tables.congested_cells[1].site_id, "S2");
        assert_eq!(tables.congested_cells[2].site_id, "S1");
        assert_eq!(tables.congested_cells[3].site_id, "S3");
    }

    #[test]
    fn test_hour_of_day_groups_by_hour_and_tech() {
        let rows = vec![
            record("2025-01-01T10:00:00", "S1", "4G", Some(40.0)),
            record("2025-01-02T10:00:00", "S2", "4G", Some(60.0)),
            record("2025-01-01T10:00:00", "S1", "5G", Some(90.0)),
        ];

        let tables = compute_aggregations(&rows);

        assert_eq!(tables.hour_of_day.len(), 2);
        assert_eq!(tables.hour_of_day[0].tech, "4G");
        assert_eq!(tables.hour_of_day[0].avg_util, Some(50.0));
        assert_eq!(tables.hour_of_day[1].tech, "5G");
        assert_eq!(tables.hour_of_day[1].avg_util, Some(90.0));
    }

    #[test]
    fn test_prime_time_window_and_threshold() {
        let rows = vec![
            record("2025-01-01T18:59:00", "S1", "4G", Some(99.0)),
            record("2025-01-01T19:00:00", "S2", "4G", Some(75.0)),
            record("2025-01-01T23:59:00", "S3", "4G", Some(91.0)),
        ];

        // Caller-supplied threshold, distinct from the fixed 80%.
        let view = prime_time_congestion(&rows, 70.0);

        let sites: Vec<&str> = view.iter().map(|r| r.site_id.as_str()).collect();
        // 18:59 is outside the window despite its high utilization.
        assert_eq!(sites, vec!["S3", "S2"]);

        assert!(prime_time_congestion(&rows, 92.0).is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_tables() {
        let tables = compute_aggregations(&[]);

        assert!(tables.site_hour.is_empty());
        assert!(tables.site_day.is_empty());
        assert!(tables.busy_hour.is_empty());
        assert!(tables.congested_cells.is_empty());
        assert!(tables.hour_of_day.is_empty());
    }

    #[test]
    fn test_deterministic_output() {
        let rows = vec![
            record("2025-01-01T10:00:00", "S2", "4G", Some(84.0)),
            record("2025-01-01T10:00:00", "S1", "5G", Some(91.0)),
            record("2025-01-01T11:00:00", "S1", "4G", Some(55.0)),
        ];

        assert_eq!(compute_aggregations(&rows), compute_aggregations(&rows));
    }
}
