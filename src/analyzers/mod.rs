//! Usage-table aggregation.
//!
//! This module derives the five summary tables (per-site hourly and daily
//! trends, busy hours, congested cells, hour-of-day profiles), the
//! prime-time congestion view, and the headline KPI summary from a
//! filtered table of usage records.

pub mod engine;
pub mod stats;
pub mod summary;
pub mod tables;
