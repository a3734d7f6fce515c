use chrono::{DateTime, FixedOffset, TimeDelta};
use std::collections::BTreeSet;
use thread_latency::*;

const ME: &str = "me@example.com";

fn message(id: &str, from: &str, minutes: i64) -> NormalizedMessage {
    NormalizedMessage {
        id: MessageId::new(id),
        sender: EmailAddress::parse(from).unwrap(),
        recipients: BTreeSet::new(),
        timestamp: DateTime::<FixedOffset>::parse_from_rfc3339("2025-01-01T09:00:00+00:00")
            .unwrap()
            + TimeDelta::minutes(minutes),
        subject: None,
        body: String::new(),
    }
}

#[test]
fn test_render_answered_and_unanswered() {
    let thread = Thread::from_messages(vec![
        message("1", "a@example.com", 0),
        message("2", "b@example.com", 1),
        message("3", ME, 90),
    ]);
    let records = compute_reply_times(&thread, ME);

    let report = render_report(&records, ME);

    assert_eq!(
        report,
        "1. reply to a@example.com - 1.50 h (at 2025-01-01 10:30)\n\
         2. b@example.com - no reply\n"
    );
}

#[test]
fn test_render_flags_skew() {
    let thread = Thread::from_ordered(vec![
        message("1", "a@example.com", 60),
        message("2", ME, 30),
    ]);
    let records = compute_reply_times(&thread, ME);

    let report = render_report(&records, ME);

    assert!(report.contains("-0.50 h"));
    assert!(report.trim_end().ends_with("[non-monotonic timestamp]"));
}

#[test]
fn test_render_without_replies() {
    let thread = Thread::from_messages(vec![message("1", "a@example.com", 0)]);
    let records = compute_reply_times(&thread, ME);

    let report = render_report(&records, ME);

    assert!(report.contains("1. a@example.com - no reply"));
    assert!(report.contains("No replies by me@example.com found in this thread."));
}

#[test]
fn test_render_empty() {
    assert_eq!(
        render_report(&[], ME),
        "No incoming messages in this thread.\n"
    );
}

#[test]
fn test_summary_figures() {
    let thread = Thread::from_messages(vec![
        message("1", "a@example.com", 0),
        message("2", ME, 10),
        message("3", "b@example.com", 20),
        message("4", ME, 50),
        message("5", "c@example.com", 60),
        message("6", ME, 80),
        message("7", "d@example.com", 90),
    ]);
    let records = compute_reply_times(&thread, ME);

    let summary = ReplySummary::from_records(&records);

    assert_eq!(summary.incoming, 4);
    assert_eq!(summary.answered, 3);
    assert_eq!(summary.unanswered, 1);
    assert_eq!(summary.flagged, 0);
    assert_eq!(summary.mean_latency, Some(TimeDelta::minutes(20)));
    assert_eq!(summary.median_latency, Some(TimeDelta::minutes(20)));
    assert_eq!(summary.longest_latency, Some(TimeDelta::minutes(30)));
}

#[test]
fn test_summary_median_of_even_count() {
    let thread = Thread::from_messages(vec![
        message("1", "a@example.com", 0),
        message("2", ME, 10),
        message("3", "b@example.com", 20),
        message("4", ME, 60),
    ]);
    let records = compute_reply_times(&thread, ME);

    let summary = ReplySummary::from_records(&records);

    assert_eq!(summary.median_latency, Some(TimeDelta::minutes(25)));
}

#[test]
fn test_summary_of_nothing() {
    let summary = ReplySummary::from_records(&[]);
    assert_eq!(summary, ReplySummary::default());
}

#[test]
fn test_latency_hours() {
    assert!((latency_hours(TimeDelta::minutes(45)) - 0.75).abs() < f64::EPSILON);
}
