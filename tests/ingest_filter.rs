// tests/ingest_filter.rs
use chrono::NaiveDate;
use econ_calendar_panel::ingest::{normalize_filter_dedup, MAJOR_REGIONS};
use econ_calendar_panel::{DayWindow, RawRecord};

fn window() -> DayWindow {
    DayWindow::starting(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap())
}

fn allowlist() -> Vec<String> {
    MAJOR_REGIONS.iter().map(|s| s.to_string()).collect()
}

fn rec(date: &str, region: &str, impact: &str, title: &str) -> RawRecord {
    RawRecord {
        id: None,
        date: date.to_string(),
        time: Some("12:30".to_string()),
        region: Some(region.to_string()),
        title: title.to_string(),
        impact: Some(impact.to_string()),
        detail: None,
    }
}

#[test]
fn regions_outside_allowlist_are_dropped() {
    let base = vec![rec("2024-06-05", "USD", "High", "Non-Farm Payrolls")];
    let (kept_before, _) = normalize_filter_dedup(base.clone(), &window(), &allowlist());

    let mut with_brl = base;
    with_brl.push(rec("2024-06-05", "BRL", "High", "Copom Meeting Minutes"));
    let (kept_after, stats) = normalize_filter_dedup(with_brl, &window(), &allowlist());

    // Same-day BRL record is excluded; the event count does not change.
    assert_eq!(kept_before.len(), kept_after.len());
    assert_eq!(stats.filtered, 1);
    assert!(kept_after.iter().all(|e| e.region != "BRL"));
}

#[test]
fn dates_outside_window_are_dropped() {
    let raw = vec![
        rec("2024-06-04", "USD", "High", "yesterday"),
        rec("2024-06-05", "USD", "High", "today"),
        rec("2024-06-06", "USD", "High", "tomorrow"),
        rec("2024-06-07", "USD", "High", "day after"),
        rec("2024-06-12", "USD", "High", "next week"),
    ];
    let (kept, stats) = normalize_filter_dedup(raw, &window(), &allowlist());
    let titles: Vec<_> = kept.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["today", "tomorrow"]);
    assert_eq!(stats.filtered, 3);
}

#[test]
fn non_high_impact_is_dropped() {
    let mut low = rec("2024-06-05", "USD", "Low", "MBA Mortgage Applications");
    low.detail = Some("High Volatility Expected".to_string()); // explicit field wins
    let mut unknown = rec("2024-06-05", "USD", "", "Fed Chatter");
    unknown.impact = None;
    let raw = vec![
        low,
        unknown,
        rec("2024-06-05", "USD", "High", "Non-Farm Payrolls"),
        rec("2024-06-05", "USD", "Medium", "Factory Orders"),
    ];
    let (kept, stats) = normalize_filter_dedup(raw, &window(), &allowlist());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].title, "Non-Farm Payrolls");
    assert_eq!(stats.filtered, 3);
}

#[test]
fn source_order_is_preserved() {
    // Deliberately not chronological; the pipeline must not resort.
    let raw = vec![
        rec("2024-06-06", "EUR", "High", "ECB Press Conference"),
        rec("2024-06-05", "USD", "High", "Non-Farm Payrolls"),
        rec("2024-06-05", "GBP", "High", "BoE Gov Speech"),
    ];
    let (kept, _) = normalize_filter_dedup(raw, &window(), &allowlist());
    let titles: Vec<_> = kept.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["ECB Press Conference", "Non-Farm Payrolls", "BoE Gov Speech"]
    );
}

#[test]
fn duplicate_ids_within_a_run_collapse_to_first() {
    let mut a = rec("2024-06-05", "USD", "High", "Non-Farm Payrolls");
    a.id = Some("nfp-227".to_string());
    let mut b = rec("2024-06-06", "USD", "High", "Non-Farm Payrolls (repeat)");
    b.id = Some("nfp-227".to_string());
    let (kept, stats) = normalize_filter_dedup(vec![a, b], &window(), &allowlist());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].title, "Non-Farm Payrolls");
    assert_eq!(stats.deduped, 1);
}

#[test]
fn records_without_ids_are_never_deduped() {
    let raw = vec![
        rec("2024-06-05", "USD", "High", "Fed Speech"),
        rec("2024-06-05", "USD", "High", "Fed Speech"),
    ];
    let (kept, stats) = normalize_filter_dedup(raw, &window(), &allowlist());
    assert_eq!(kept.len(), 2);
    assert_eq!(stats.deduped, 0);
}
