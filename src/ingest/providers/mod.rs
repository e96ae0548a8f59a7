// src/ingest/providers/mod.rs
pub mod api_v2;
pub mod ics_feed;
pub mod investing_html;
pub mod json_feed;

use anyhow::{Context, Result};

use crate::ingest::types::CalendarSource;

pub(crate) const DEFAULT_USER_AGENT: &str =
    "econ-calendar-panel/0.1 (+https://github.com/lumlich/econ-calendar-panel)";

// The scraped site serves a stripped page to non-browser agents.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
) -> Result<String> {
    let resp = client
        .get(url)
        .header(reqwest::header::USER_AGENT, user_agent)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("non-success status from {url}"))?;
    resp.text().await.with_context(|| format!("reading body of {url}"))
}

/// Which upstream the run uses. Exactly one source is active per invocation;
/// the variants are alternatives, not an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    JsonFeed,
    IcsFeed,
    InvestingHtml,
    ApiV2,
}

impl SourceKind {
    /// Build the adapter at its fixed upstream URL.
    pub fn build(self) -> Box<dyn CalendarSource> {
        match self {
            SourceKind::JsonFeed => Box::new(json_feed::JsonFeedSource::from_default_url()),
            SourceKind::IcsFeed => Box::new(ics_feed::IcsFeedSource::from_default_url()),
            SourceKind::InvestingHtml => {
                Box::new(investing_html::InvestingHtmlSource::from_default_url())
            }
            SourceKind::ApiV2 => Box::new(api_v2::ApiV2Source::from_default_base()),
        }
    }
}
