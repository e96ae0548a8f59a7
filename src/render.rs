// src/render.rs
//! Renders the filtered events into the fixed-size widget document and writes
//! it out. Rendering is deterministic; the file write is the run's only
//! durable side effect.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::ingest::types::{EconomicEvent, ALL_DAY};

pub const EMPTY_MESSAGE: &str = "No high-impact events for today or tomorrow.";

const PANEL_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>High-Impact Economic Events</title>
  <style>
    body { background: #1e1e1e; color: #fff; font-family: Arial; margin: 0; padding: 1rem; width: 250px; height: 500px; overflow-y: auto; }
    h3 { color: #f0ad4e; }
    .event { margin-bottom: 12px; border-bottom: 1px solid #444; padding-bottom: 6px; }
    .event .time { color: #999; font-size: 14px; }
    .event .title { font-weight: bold; font-size: 16px; }
    .event .impact { font-size: 12px; color: #f44336; }
  </style>
</head>
<body>
  <h3>High-Impact Economic Events</h3>
"#;

/// Build the complete panel document for the given (possibly empty) sequence.
pub fn render_panel(events: &[EconomicEvent]) -> String {
    let mut out = String::with_capacity(PANEL_HEAD.len() + events.len() * 160 + 64);
    out.push_str(PANEL_HEAD);
    if events.is_empty() {
        out.push_str("  <p>");
        out.push_str(EMPTY_MESSAGE);
        out.push_str("</p>\n");
    } else {
        for ev in events {
            push_event(&mut out, ev);
        }
    }
    out.push_str("</body></html>\n");
    out
}

/// "Wed Jun 05 — 12:30 UTC"; all-day events carry no zone suffix.
fn event_stamp(ev: &EconomicEvent) -> String {
    let day = ev.date.format("%a %b %d");
    if ev.time == ALL_DAY {
        format!("{day} — {ALL_DAY}")
    } else {
        format!("{day} — {} UTC", ev.time)
    }
}

fn push_event(out: &mut String, ev: &EconomicEvent) {
    let stamp = event_stamp(ev);
    let _ = write!(
        out,
        r#"  <div class="event">
    <div class="time">{}</div>
    <div class="title">{}: {}</div>
    <div class="impact">Impact: High</div>
  </div>
"#,
        html_escape::encode_text(&stamp),
        html_escape::encode_text(&ev.region),
        html_escape::encode_text(&ev.title),
    );
}

/// Write the document, truncating any previous panel at the same path.
pub fn write_panel(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).with_context(|| format!("writing panel to {}", path.display()))
}
