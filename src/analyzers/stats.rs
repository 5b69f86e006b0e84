//! Null-aware numeric helpers for grouped aggregation.
//!
//! Null values are excluded from every computation, never treated as
//! zero; an empty or all-null input yields `None` rather than an error.

/// Arithmetic mean of the non-null values.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Maximum of the non-null values.
pub fn max(values: &[Option<f64>]) -> Option<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .fold(None, |acc, v| match acc {
            Some(m) => Some(f64::max(m, v)),
            None => Some(v),
        })
}

/// Continuous percentile (linear interpolation) of the non-null values.
/// `p` is in percent, e.g. 95.0 for the 95th percentile.
pub fn percentile(values: &[Option<f64>], p: f64) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(f64::total_cmp);

    let n = present.len();
    if n == 1 {
        return Some(present[0]);
    }
    let fraction = (p / 100.0).clamp(0.0, 1.0);
    let rank = fraction * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        Some(present[lower])
    } else {
        let weight = rank - lower as f64;
        Some(present[lower] * (1.0 - weight) + present[upper] * weight)
    }
}
