//! Economic calendar panel — binary entrypoint.
//! Fetches the configured source once, keeps high-impact events for today and
//! tomorrow in the major regions, and regenerates the static HTML panel.

use std::path::Path;

use econ_calendar_panel::ingest::{self, providers::SourceKind, types::DayWindow, MAJOR_REGIONS};
use econ_calendar_panel::render;
use tracing_subscriber::EnvFilter;

// Run configuration is fixed in source: one active adapter, the built-in
// allow-list, one output path. No flags or environment variables are read
// (the log filter below is the diagnostics-only exception).
const SOURCE: SourceKind = SourceKind::JsonFeed;
const OUTPUT_PATH: &str = "index.html";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let window = DayWindow::current_utc();
    let allowlist: Vec<String> = MAJOR_REGIONS.iter().map(|s| s.to_string()).collect();
    let source = SOURCE.build();

    tracing::info!(
        source = source.name(),
        today = %window.today,
        tomorrow = %window.tomorrow,
        regions = allowlist.len(),
        "fetching calendar"
    );

    // A fetch-level failure propagates here: non-zero exit, previous panel
    // file left untouched.
    let (events, stats) = ingest::run_once(source.as_ref(), &window, &allowlist).await?;

    tracing::info!(
        kept = events.len(),
        fetched = stats.fetched,
        skipped = stats.skipped,
        filtered = stats.filtered,
        dedup = stats.deduped,
        "calendar ingest finished"
    );

    let html = render::render_panel(&events);
    render::write_panel(Path::new(OUTPUT_PATH), &html)?;
    tracing::info!(path = OUTPUT_PATH, events = events.len(), "panel written");

    Ok(())
}
