// src/ingest/providers/investing_html.rs
//! Scraped calendar-table adapter. Event rows carry their datetime in a
//! `data-event-datetime` attribute; the impact cue is the sentiment cell's
//! `title` text ("High Volatility Expected"). Scanning stays local to each
//! row block rather than regexing the whole document at once.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::normalize_title;
use crate::ingest::providers::{fetch_text, BROWSER_USER_AGENT};
use crate::ingest::types::{CalendarSource, DayWindow, RawRecord};

const PAGE_URL: &str = "https://www.investing.com/economic-calendar/";
const TABLE_MARKER: &str = "economicCalendarData";

pub struct InvestingHtmlSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl InvestingHtmlSource {
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
        Self::from_url(PAGE_URL)
    }

    fn parse_page_from_str(s: &str) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();

        static RE_ROW: OnceCell<Regex> = OnceCell::new();
        let re_row = RE_ROW.get_or_init(|| Regex::new(r"(?is)<tr([^>]*)>(.*?)</tr>").unwrap());

        let mut out = Vec::new();
        for row in re_row.captures_iter(s) {
            let attrs = &row[1];
            if !attrs.contains("js-event-item") {
                continue; // day-header and spacer rows
            }
            if let Some(rec) = parse_event_row(attrs, &row[2]) {
                out.push(rec);
            }
        }

        if out.is_empty() && !s.contains(TABLE_MARKER) {
            return Err(anyhow!("calendar table not found in page"));
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("calendar_parse_ms").record(ms);
        counter!("calendar_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

fn parse_event_row(attrs: &str, body: &str) -> Option<RawRecord> {
    static RE_DATETIME: OnceCell<Regex> = OnceCell::new();
    static RE_ROW_ID: OnceCell<Regex> = OnceCell::new();
    static RE_CUR: OnceCell<Regex> = OnceCell::new();
    static RE_SENTIMENT: OnceCell<Regex> = OnceCell::new();
    static RE_EVENT: OnceCell<Regex> = OnceCell::new();

    let re_datetime = RE_DATETIME
        .get_or_init(|| Regex::new(r#"data-event-datetime="([^"]+)""#).unwrap());
    let re_row_id = RE_ROW_ID.get_or_init(|| Regex::new(r#"id="eventRowId_(\d+)""#).unwrap());
    let re_cur =
        RE_CUR.get_or_init(|| Regex::new(r#"(?is)<td[^>]*flagCur[^>]*>(.*?)</td>"#).unwrap());
    let re_sentiment = RE_SENTIMENT
        .get_or_init(|| Regex::new(r#"(?is)<td[^>]*sentiment[^>]*title="([^"]*)""#).unwrap());
    let re_event = RE_EVENT
        .get_or_init(|| Regex::new(r#"(?is)<td[^>]*class="[^"]*event[^"]*"[^>]*>(.*?)</td>"#).unwrap());

    // Rows without a datetime attribute are not event rows.
    let stamp = re_datetime.captures(attrs)?.get(1)?.as_str().to_string();
    let (date, time) = match stamp.split_once(' ') {
        Some((d, t)) => (d.to_string(), Some(t.to_string())),
        None => (stamp, None),
    };

    let region = re_cur
        .captures(body)
        .map(|c| normalize_title(&c[1]))
        .filter(|r| !r.is_empty());
    let detail = re_sentiment.captures(body).map(|c| c[1].to_string());
    let title = re_event
        .captures(body)
        .map(|c| c[1].to_string())
        .unwrap_or_default();

    Some(RawRecord {
        id: re_row_id.captures(attrs).map(|c| c[1].to_string()),
        date,
        time,
        region,
        title,
        impact: None,
        detail,
    })
}

#[async_trait]
impl CalendarSource for InvestingHtmlSource {
    async fn fetch_events(&self, _window: &DayWindow) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_page_from_str(s),
            Mode::Http { url, client } => {
                let body = fetch_text(client, url, BROWSER_USER_AGENT).await?;
                Self::parse_page_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "investing-html"
    }
}
