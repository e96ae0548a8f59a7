// tests/render_html.rs
use chrono::NaiveDate;
use econ_calendar_panel::{render_panel, EconomicEvent, Impact, ALL_DAY, EMPTY_MESSAGE};

fn event(title: &str) -> EconomicEvent {
    EconomicEvent {
        date: NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
        time: "12:30".to_string(),
        region: "USD".to_string(),
        title: title.to_string(),
        impact: Impact::High,
        source_id: None,
    }
}

fn event_blocks(html: &str) -> usize {
    html.matches(r#"<div class="event">"#).count()
}

#[test]
fn empty_sequence_renders_the_no_events_message() {
    let html = render_panel(&[]);
    assert!(html.contains(EMPTY_MESSAGE));
    assert_eq!(event_blocks(&html), 0);
}

#[test]
fn single_event_block_has_stamp_title_and_impact_label() {
    let html = render_panel(&[event("Non-Farm Payrolls")]);
    assert_eq!(event_blocks(&html), 1);
    // 2024-06-05 is a Wednesday.
    assert!(html.contains("Wed Jun 05 — 12:30 UTC"));
    assert!(html.contains("USD: Non-Farm Payrolls"));
    assert!(html.contains("Impact: High"));
}

#[test]
fn all_day_events_carry_no_zone_suffix() {
    let mut ev = event("Bank Holiday");
    ev.time = ALL_DAY.to_string();
    let html = render_panel(&[ev]);
    assert!(html.contains("Wed Jun 05 — All Day"));
    assert!(!html.contains("All Day UTC"));
}

#[test]
fn titles_are_escaped_never_raw_markup() {
    let html = render_panel(&[event("<script>alert('x')</script> & more")]);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("&amp; more"));
}

#[test]
fn rendering_is_byte_identical_across_calls() {
    let events = vec![event("Non-Farm Payrolls"), event("ISM Services PMI")];
    assert_eq!(render_panel(&events), render_panel(&events));
}

#[test]
fn document_shape_is_the_fixed_panel() {
    let html = render_panel(&[event("Non-Farm Payrolls")]);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h3>High-Impact Economic Events</h3>"));
    assert!(html.contains("width: 250px; height: 500px;"));
    assert!(html.trim_end().ends_with("</body></html>"));
}
