// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::ingest::types::{CalendarSource, DayWindow, EconomicEvent, Impact, RawRecord, ALL_DAY};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration (facade only; nothing is exported in a
/// one-shot run, but the series are named consistently for embedders).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "calendar_records_total",
            "Raw records parsed from the source."
        );
        describe_counter!(
            "calendar_kept_total",
            "Events kept after normalization + filtering."
        );
        describe_counter!(
            "calendar_skipped_total",
            "Records dropped because a field failed to parse."
        );
        describe_counter!(
            "calendar_filtered_total",
            "Events filtered out by window/impact/region."
        );
        describe_counter!("calendar_dedup_total", "Events removed by id dedup.");
        describe_counter!("calendar_source_errors_total", "Source fetch/parse errors.");
        describe_histogram!("calendar_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!("calendar_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Canonical region codes the panel covers by default.
pub const MAJOR_REGIONS: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "AUD", "NZD", "CAD", "CHF"];

/// Normalize a free-text title: decode entities, strip tags, fold whitespace.
pub fn normalize_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Normalize curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 300 chars is plenty for an event name
    if out.chars().count() > 300 {
        out = out.chars().take(300).collect();
    }

    out
}

/// Map a source-reported region (country name or currency code) to the
/// canonical currency code. Unrecognized country names pass through
/// title-cased; an empty/absent region becomes "Unknown".
pub fn canonical_region(raw: &str) -> String {
    let t = raw.trim();
    if t.is_empty() {
        return "Unknown".to_string();
    }
    if t.len() == 3 && t.chars().all(|c| c.is_ascii_alphabetic()) {
        return t.to_ascii_uppercase();
    }
    match t.to_ascii_lowercase().as_str() {
        "united states" | "usa" | "u.s." | "us" => "USD".to_string(),
        "euro zone" | "eurozone" | "euro area" => "EUR".to_string(),
        "united kingdom" | "uk" | "u.k." | "great britain" => "GBP".to_string(),
        "japan" => "JPY".to_string(),
        "australia" => "AUD".to_string(),
        "new zealand" => "NZD".to_string(),
        "canada" => "CAD".to_string(),
        "switzerland" => "CHF".to_string(),
        _ => title_case(t),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &cs.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the date shapes the sources emit. Returns None on anything else;
/// the caller skips the record.
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let t = s.trim();
    for fmt in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    None
}

/// Normalize a clock time to zero-padded "HH:MM"; anything that is not a
/// clock time ("All Day", "Tentative", empty) becomes the all-day sentinel.
pub fn normalize_time(raw: Option<&str>) -> String {
    static RE_TIME: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_TIME.get_or_init(|| regex::Regex::new(r"^(\d{1,2}):(\d{2})(?::\d{2})?$").unwrap());
    let Some(t) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return ALL_DAY.to_string();
    };
    match re.captures(t) {
        Some(caps) => format!("{:0>2}:{}", &caps[1], &caps[2]),
        None => ALL_DAY.to_string(),
    }
}

/// Impact from the explicit field when the source has one, otherwise from the
/// textual cue (the word "high" in the record's free-text detail).
pub fn derive_impact(raw: &RawRecord) -> Impact {
    if let Some(field) = raw.impact.as_deref() {
        let parsed = Impact::parse(field);
        if parsed != Impact::Unknown {
            return parsed;
        }
    }
    static RE_HIGH: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_HIGH.get_or_init(|| regex::Regex::new(r"(?i)\bhigh\b").unwrap());
    match raw.detail.as_deref() {
        Some(detail) if re.is_match(detail) => Impact::High,
        _ => Impact::Unknown,
    }
}

/// Map one raw record to the common event shape. Returns None (record is
/// skipped, run continues) when the date does not parse or the title is empty.
pub fn normalize_record(raw: &RawRecord) -> Option<EconomicEvent> {
    let date = parse_event_date(&raw.date)?;
    let title = normalize_title(&raw.title);
    if title.is_empty() {
        return None;
    }
    Some(EconomicEvent {
        date,
        time: normalize_time(raw.time.as_deref()),
        region: canonical_region(raw.region.as_deref().unwrap_or_default()),
        title,
        impact: derive_impact(raw),
        source_id: raw.id.clone(),
    })
}

pub fn is_major_region<S: AsRef<str>>(region: S, allowlist: &[String]) -> bool {
    let r = region.as_ref();
    allowlist.iter().any(|a| a.eq_ignore_ascii_case(r))
}

/// Per-run pipeline counters, logged at the end of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub fetched: usize,
    pub skipped: usize,
    pub filtered: usize,
    pub deduped: usize,
}

/// Normalize, filter to the window/impact/allow-list, and dedup by source id.
/// Source order is preserved; no resort by time happens here or later.
pub fn normalize_filter_dedup(
    raw_records: Vec<RawRecord>,
    window: &DayWindow,
    allowlist: &[String],
) -> (Vec<EconomicEvent>, RunStats) {
    let mut stats = RunStats {
        fetched: raw_records.len(),
        ..RunStats::default()
    };

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(raw_records.len());

    for raw in &raw_records {
        let Some(ev) = normalize_record(raw) else {
            stats.skipped += 1;
            tracing::debug!(date = %raw.date, title = %raw.title, "record skipped: unparseable");
            continue;
        };
        let keep = window.contains(ev.date)
            && ev.impact == Impact::High
            && is_major_region(&ev.region, allowlist);
        if !keep {
            stats.filtered += 1;
            continue;
        }
        if let Some(id) = &ev.source_id {
            if !seen_ids.insert(id.clone()) {
                stats.deduped += 1;
                continue;
            }
        }
        kept.push(ev);
    }

    (kept, stats)
}

/// Run the pipeline once against the configured source. A fetch-level failure
/// propagates (the caller aborts without touching the output file); record
/// level failures only bump the skip counter.
pub async fn run_once(
    source: &dyn CalendarSource,
    window: &DayWindow,
    allowlist: &[String],
) -> Result<(Vec<EconomicEvent>, RunStats)> {
    ensure_metrics_described();

    let raw = match source.fetch_events(window).await {
        Ok(v) => v,
        Err(e) => {
            counter!("calendar_source_errors_total").increment(1);
            return Err(e).with_context(|| format!("fetching events from {}", source.name()));
        }
    };
    tracing::info!(source = source.name(), raw = raw.len(), "source fetch finished");

    let (kept, stats) = normalize_filter_dedup(raw, window, allowlist);

    counter!("calendar_kept_total").increment(kept.len() as u64);
    counter!("calendar_skipped_total").increment(stats.skipped as u64);
    counter!("calendar_filtered_total").increment(stats.filtered as u64);
    counter!("calendar_dedup_total").increment(stats.deduped as u64);
    gauge!("calendar_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    Ok((kept, stats))
}
