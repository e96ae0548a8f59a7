// src/ingest/providers/ics_feed.rs
//! ICS calendar feed adapter. The feed has no structured impact field; the
//! "high" cue lives in each VEVENT's DESCRIPTION text.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;

use crate::ingest::providers::{fetch_text, DEFAULT_USER_AGENT};
use crate::ingest::types::{CalendarSource, DayWindow, RawRecord};

const FEED_URL: &str = "https://ics.forexprostools.com/economic-calendar.ics";

pub struct IcsFeedSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl IcsFeedSource {
    pub fn from_fixture(content: &str) -> Self {
        Self {
            mode: Mode::Fixture(content.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_default_url() -> Self {
        Self::from_url(FEED_URL)
    }

    fn parse_calendar_from_str(s: &str) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();
        if !s.contains("BEGIN:VCALENDAR") {
            return Err(anyhow!("not an iCalendar document"));
        }

        let mut out = Vec::new();
        let mut current: Option<VEventFields> = None;

        for line in unfold_lines(s) {
            let upper = line.to_ascii_uppercase();
            if upper == "BEGIN:VEVENT" {
                current = Some(VEventFields::default());
                continue;
            }
            if upper == "END:VEVENT" {
                if let Some(ev) = current.take() {
                    out.push(ev.into_raw_record());
                }
                continue;
            }
            let Some(ev) = current.as_mut() else { continue };
            let Some((prop, value)) = line.split_once(':') else { continue };
            let name = prop.split(';').next().unwrap_or(prop).to_ascii_uppercase();
            match name.as_str() {
                "UID" => ev.uid = Some(value.to_string()),
                "DTSTART" => ev.dtstart = Some(value.to_string()),
                "SUMMARY" => ev.summary = Some(unescape_text(value)),
                "DESCRIPTION" => ev.description = Some(unescape_text(value)),
                _ => {}
            }
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("calendar_parse_ms").record(ms);
        counter!("calendar_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[derive(Default)]
struct VEventFields {
    uid: Option<String>,
    dtstart: Option<String>,
    summary: Option<String>,
    description: Option<String>,
}

impl VEventFields {
    fn into_raw_record(self) -> RawRecord {
        let (date, time) = split_dtstart(self.dtstart.as_deref().unwrap_or_default());
        let (region, title) = split_summary(self.summary.as_deref().unwrap_or_default());
        RawRecord {
            id: self.uid,
            date,
            time,
            region,
            title,
            impact: None,
            detail: self.description,
        }
    }
}

/// "20240605T123000Z" -> ("20240605", Some("12:30")); a bare date means all-day.
fn split_dtstart(v: &str) -> (String, Option<String>) {
    match v.split_once('T') {
        Some((date, clock)) => {
            let time = match (clock.get(0..2), clock.get(2..4)) {
                (Some(h), Some(m)) => Some(format!("{h}:{m}")),
                _ => None,
            };
            (date.to_string(), time)
        }
        None => (v.to_string(), None),
    }
}

/// The feed prefixes summaries with the currency code: "USD Non-Farm Payrolls".
fn split_summary(summary: &str) -> (Option<String>, String) {
    static RE: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"^([A-Z]{3})\s+(.+)$").unwrap());
    match re.captures(summary.trim()) {
        Some(caps) => (Some(caps[1].to_string()), caps[2].to_string()),
        None => (None, summary.trim().to_string()),
    }
}

/// Join folded lines (continuations start with a space or tab, RFC 5545 §3.1).
fn unfold_lines(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in s.lines() {
        if let Some(rest) = line.strip_prefix([' ', '\t']) {
            if let Some(last) = out.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        out.push(line.trim_end_matches('\r').to_string());
    }
    out
}

fn unescape_text(v: &str) -> String {
    v.replace("\\n", " ")
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\\\", "\\")
}

#[async_trait]
impl CalendarSource for IcsFeedSource {
    async fn fetch_events(&self, _window: &DayWindow) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_calendar_from_str(s),
            Mode::Http { url, client } => {
                let body = fetch_text(client, url, DEFAULT_USER_AGENT).await?;
                Self::parse_calendar_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "ics-feed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dtstart_shapes() {
        assert_eq!(
            split_dtstart("20240605T123000Z"),
            ("20240605".to_string(), Some("12:30".to_string()))
        );
        assert_eq!(split_dtstart("20240606"), ("20240606".to_string(), None));
    }

    #[test]
    fn summary_region_prefix() {
        let (region, title) = split_summary("USD Non-Farm Payrolls");
        assert_eq!(region.as_deref(), Some("USD"));
        assert_eq!(title, "Non-Farm Payrolls");

        let (region, title) = split_summary("Bank Holiday");
        assert!(region.is_none());
        assert_eq!(title, "Bank Holiday");
    }

    #[test]
    fn folded_lines_rejoin() {
        let s = "SUMMARY:USD Non-Farm\r\n  Payrolls\r\nUID:x";
        let lines = unfold_lines(s);
        assert_eq!(lines[0], "SUMMARY:USD Non-Farm Payrolls");
        assert_eq!(lines[1], "UID:x");
    }
}
