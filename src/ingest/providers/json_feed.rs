// src/ingest/providers/json_feed.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::providers::{fetch_text, DEFAULT_USER_AGENT};
use crate::ingest::types::{CalendarSource, DayWindow, RawRecord};

const FEED_URL: &str = "https://nfs.faireconomy.media/ff_calendar_thisweek.json";

/// One item of the weekly JSON feed. The feed reports currency codes directly
/// and carries an explicit impact field.
#[derive(Debug, Deserialize)]
struct FeedItem {
    title: Option<String>,
    country: Option<String>,
    // "2024-06-05T12:30:00Z", "2024-06-05 12:30" or a bare date
    date: Option<String>,
    impact: Option<String>,
    id: Option<i64>,
}

pub struct JsonFeedSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl JsonFeedSource {
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

    fn parse_items_from_str(s: &str) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();
        let items: Vec<FeedItem> = serde_json::from_str(s).context("parsing json feed")?;

        let mut out = Vec::with_capacity(items.len());
        for it in items {
            let (date, time) = split_date_time(it.date.as_deref().unwrap_or_default());
            out.push(RawRecord {
                id: it.id.map(|n| n.to_string()),
                date,
                time,
                region: it.country,
                title: it.title.unwrap_or_default(),
                impact: it.impact,
                detail: None,
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("calendar_parse_ms").record(ms);
        counter!("calendar_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

/// Split a feed timestamp into its date part and an "HH:MM" time part.
/// Any zone suffix is dropped; the pipeline labels clock times UTC.
fn split_date_time(stamp: &str) -> (String, Option<String>) {
    let stamp = stamp.trim();
    let Some((date, rest)) = stamp.split_once(['T', ' ']) else {
        return (stamp.to_string(), None);
    };
    let time = rest.get(0..5).map(str::to_string);
    (date.to_string(), time)
}

#[async_trait]
impl CalendarSource for JsonFeedSource {
    async fn fetch_events(&self, _window: &DayWindow) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = fetch_text(client, url, DEFAULT_USER_AGENT).await?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "json-feed"
    }
}
