// src/ingest/types.rs
use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};

/// Sentinel for events without a clock time.
pub const ALL_DAY: &str = "All Day";

/// The two-day window the panel covers, anchored to the run's reference clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub today: NaiveDate,
    pub tomorrow: NaiveDate,
}

impl DayWindow {
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            today,
            tomorrow: today + Duration::days(1),
        }
    }

    /// Window anchored to the UTC wall clock at run start.
    pub fn current_utc() -> Self {
        Self::starting(Utc::now().date_naive())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date == self.today || date == self.tomorrow
    }
}

/// One record as fetched from a source, before normalization.
/// Field shapes vary by upstream; absent fields stay `None` and are resolved
/// during normalization.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawRecord {
    pub id: Option<String>,     // source-native id, dedup only
    pub date: String,           // source-specific date string
    pub time: Option<String>,   // clock time, or None for all-day
    pub region: Option<String>, // country name or currency code
    pub title: String,
    pub impact: Option<String>, // explicit impact field, if the source has one
    pub detail: Option<String>, // free text scanned for the impact cue
}

/// Impact level as reported (or inferred) from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
    Unknown,
}

impl Impact {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "3" => Impact::High,
            "medium" | "moderate" | "2" => Impact::Medium,
            "low" | "1" => Impact::Low,
            _ => Impact::Unknown,
        }
    }
}

/// Normalized calendar entry, ready for filtering and rendering.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EconomicEvent {
    pub date: NaiveDate,
    pub time: String,   // "HH:MM" (UTC) or ALL_DAY
    pub region: String, // canonical currency code, or "Unknown"
    pub title: String,
    pub impact: Impact,
    pub source_id: Option<String>,
}

#[async_trait::async_trait]
pub trait CalendarSource {
    /// Fetch the raw records the source reports for the given window.
    async fn fetch_events(&self, window: &DayWindow) -> Result<Vec<RawRecord>>;
    fn name(&self) -> &'static str;
}
