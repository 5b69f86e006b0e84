//! CLI entry point for the network-utilization analytics tool.
//!
//! One invocation performs one dashboard refresh: load a usage table from
//! a CSV file or the configured database, validate and normalize it,
//! apply the sidebar-style filters, run the aggregation engine, and
//! export the derived tables as CSV.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use netutil_analytics::analyzers::engine::{compute_aggregations, prime_time_congestion};
use netutil_analytics::analyzers::summary::Kpis;
use netutil_analytics::filter::FilterSpec;
use netutil_analytics::output::{export_all, print_json};
use netutil_analytics::records::drop_unparsed;
use netutil_analytics::source::{DATABASE_SUPPORTED, select_source};
use netutil_analytics::validate;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "netutil_analytics")]
#[command(about = "Network utilization analytics for infrastructure planning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis pass over a usage table and export the derived tables
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Path to the usage CSV
    #[arg(short, long, default_value = "data/network_usage_sample.csv")]
    input: String,

    /// Fetch the usage table from the configured database instead of CSV
    /// (set DB_DIALECT, DB_HOST, DB_PORT, DB_NAME, DB_USER, DB_PASS)
    #[arg(long, default_value_t = false)]
    db: bool,

    /// Inclusive start of the date range (YYYY-MM-DD)
    #[arg(long, requires = "end_date")]
    start_date: Option<NaiveDate>,

    /// Inclusive end of the date range (YYYY-MM-DD)
    #[arg(long, requires = "start_date")]
    end_date: Option<NaiveDate>,

    /// Restrict to these technologies (repeatable)
    #[arg(long)]
    tech: Vec<String>,

    /// Restrict to these regions (repeatable)
    #[arg(long)]
    region: Vec<String>,

    /// Restrict to these cities (repeatable)
    #[arg(long)]
    city: Vec<String>,

    /// Restrict to these sites (repeatable)
    #[arg(long)]
    site: Vec<String>,

    /// Utilization threshold (%) for the prime-time congestion view
    #[arg(short, long, default_value_t = 80.0)]
    threshold: f64,

    /// Directory to write the derived CSV tables into
    #[arg(short, long, default_value = "tables")]
    output_dir: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/netutil_analytics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("netutil_analytics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_refresh(args).await?,
    }

    Ok(())
}

/// One refresh cycle: load, validate, filter, aggregate, export.
#[tracing::instrument(skip(args), fields(db = args.db, output_dir = %args.output_dir))]
async fn run_refresh(args: AnalyzeArgs) -> Result<()> {
    let source = select_source(args.db, DATABASE_SUPPORTED, &args.input)?;
    let raw = source.fetch().await?;
    info!(
        rows = raw.rows.len(),
        columns = raw.columns.len(),
        "Loaded raw usage table"
    );

    let normalized = validate::normalize(&raw)?;
    let (records, dropped) = drop_unparsed(normalized);
    if dropped > 0 {
        warn!(dropped, "Dropped rows with unparseable timestamps");
    }

    let spec = FilterSpec {
        date_range: match (args.start_date, args.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        },
        tech: args.tech,
        region: args.region,
        city: args.city,
        site: args.site,
    };
    let filtered = spec.apply(&records);
    if filtered.is_empty() {
        // Non-fatal: the session stays usable with different filters.
        warn!("No data after applying filters");
        return Ok(());
    }
    info!(rows = filtered.len(), "Filtered usage table ready");

    let kpis = Kpis::from_records(&filtered);
    print_json(&kpis)?;

    let tables = compute_aggregations(&filtered);
    let prime_time = prime_time_congestion(&filtered, args.threshold);
    info!(
        site_hour = tables.site_hour.len(),
        site_day = tables.site_day.len(),
        busy_hour = tables.busy_hour.len(),
        congested = tables.congested_cells.len(),
        hour_of_day = tables.hour_of_day.len(),
        prime_time = prime_time.len(),
        threshold = args.threshold,
        "Aggregation complete"
    );

    export_all(Path::new(&args.output_dir), &tables, &prime_time)?;
    Ok(())
}
