//! Filter/query layer.
//!
//! Narrows a validated table by date range and categorical dimensions
//! before it reaches the aggregation engine. All active predicates are
//! conjoined; omitted dimensions pass every row.

use chrono::NaiveDate;

use crate::records::UsageRecord;

/// One refresh's worth of filter predicates.
///
/// An empty categorical list means "no restriction", not "match nothing".
/// The date range is inclusive on both ends and covers the entire last
/// calendar day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub tech: Vec<String>,
    pub region: Vec<String>,
    pub city: Vec<String>,
    pub site: Vec<String>,
}

impl FilterSpec {
    /// Returns the subset of rows satisfying every active predicate.
    /// A pure subset operation: the input is untouched and re-applying
    /// the same spec to its own output is a no-op.
    pub fn apply(&self, rows: &[UsageRecord]) -> Vec<UsageRecord> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    fn matches(&self, record: &UsageRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            // Comparing calendar dates gives inclusive end-of-day
            // semantics without boundary arithmetic.
            let date = record.date();
            if date < start || date > end {
                return false;
            }
        }
        passes(&self.tech, &record.tech)
            && passes(&self.region, &record.region)
            && passes(&self.city, &record.city)
            && passes(&self.site, &record.site_id)
    }
}

fn passes(allowed: &[String], value: &str) -> bool {
    allowed.is_empty() || allowed.iter().any(|v| v == value)
}
