// src/ingest/providers/api_v2.rs
//! Two-step JSON API adapter: one call for the date index, then one call per
//! returned day. Calls run sequentially; the index bounds how many follow.
//! Day pages can overlap, so records carry ids and the shared pipeline dedups.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::ingest::providers::{fetch_text, DEFAULT_USER_AGENT};
use crate::ingest::types::{CalendarSource, DayWindow, RawRecord};

const BASE_URL: &str = "https://api.econoday.net/v2";

#[derive(Debug, Deserialize)]
struct DayIndex {
    days: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EventsPage {
    events: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: Option<String>,
    time: Option<String>,
    currency: Option<String>,
    name: Option<String>,
    importance: Option<String>,
}

pub struct ApiV2Source {
    mode: Mode,
}

enum Mode {
    Fixture {
        days: String,
        pages: HashMap<String, String>,
    },
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

impl ApiV2Source {
    pub fn from_fixture(days: &str, pages: &[(&str, &str)]) -> Self {
        Self {
            mode: Mode::Fixture {
                days: days.to_string(),
                pages: pages
                    .iter()
                    .map(|(d, body)| (d.to_string(), body.to_string()))
                    .collect(),
            },
        }
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http {
                base_url: base_url.into(),
                client: reqwest::Client::new(),
            },
        }
    }

    pub fn from_default_base() -> Self {
        Self::from_base_url(BASE_URL)
    }

    fn parse_days(s: &str) -> Result<Vec<String>> {
        let idx: DayIndex = serde_json::from_str(s).context("parsing date index")?;
        Ok(idx.days)
    }

    fn parse_events_page(day: &str, s: &str) -> Result<Vec<RawRecord>> {
        let page: EventsPage =
            serde_json::from_str(s).with_context(|| format!("parsing events page for {day}"))?;
        let mut out = Vec::with_capacity(page.events.len());
        for ev in page.events {
            out.push(RawRecord {
                id: ev.id,
                date: day.to_string(),
                time: ev.time,
                region: ev.currency,
                title: ev.name.unwrap_or_default(),
                impact: ev.importance,
                detail: None,
            });
        }
        Ok(out)
    }
}

#[async_trait]
impl CalendarSource for ApiV2Source {
    async fn fetch_events(&self, window: &DayWindow) -> Result<Vec<RawRecord>> {
        let t0 = std::time::Instant::now();

        let mut out = Vec::new();
        match &self.mode {
            Mode::Fixture { days, pages } => {
                for day in Self::parse_days(days)? {
                    let body = pages
                        .get(&day)
                        .ok_or_else(|| anyhow!("no fixture page for {day}"))?;
                    out.append(&mut Self::parse_events_page(&day, body)?);
                }
            }
            Mode::Http { base_url, client } => {
                let index_url = format!(
                    "{base_url}/days?from={}&to={}",
                    window.today, window.tomorrow
                );
                let index_body = fetch_text(client, &index_url, DEFAULT_USER_AGENT).await?;
                for day in Self::parse_days(&index_body)? {
                    let page_url = format!("{base_url}/events?day={day}");
                    let page_body = fetch_text(client, &page_url, DEFAULT_USER_AGENT).await?;
                    out.append(&mut Self::parse_events_page(&day, &page_body)?);
                    tracing::debug!(day = %day, total = out.len(), "events page fetched");
                }
            }
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("calendar_parse_ms").record(ms);
        counter!("calendar_records_total").increment(out.len() as u64);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "api-v2"
    }
}
