use chrono::{DateTime, FixedOffset};
use std::collections::BTreeSet;
use thread_latency::*;

fn message(id: &str, from: &str, rfc3339: &str) -> NormalizedMessage {
    NormalizedMessage {
        id: MessageId::new(id),
        sender: EmailAddress::parse(from).unwrap(),
        recipients: BTreeSet::from(["me@example.com".to_string()]),
        timestamp: DateTime::<FixedOffset>::parse_from_rfc3339(rfc3339).unwrap(),
        subject: None,
        body: String::new(),
    }
}

// --- MessageId ---

#[test]
fn test_message_id_new() {
    let id = MessageId::new("test@example.com");
    assert_eq!(id.as_str(), "test@example.com");
}

#[test]
fn test_message_id_synthetic() {
    let id = MessageId::synthetic(42);
    assert_eq!(id.as_str(), "<synthetic-42@local>");
}

#[test]
fn test_message_id_display() {
    let id = MessageId::new("<abc@example.com>");
    assert_eq!(id.to_string(), "<abc@example.com>");
}

// --- EmailAddress ---

#[test]
fn test_email_address_parse_with_name() {
    let addr = EmailAddress::parse("John Doe <john@example.com>").unwrap();
    assert_eq!(addr.address, "john@example.com");
    assert_eq!(addr.domain(), "example.com");
    assert_eq!(addr.name.as_deref(), Some("John Doe"));
}

#[test]
fn test_email_address_parse_plain() {
    let addr = EmailAddress::parse("alice@company.org").unwrap();
    assert_eq!(addr.address, "alice@company.org");
    assert!(addr.name.is_none());
}

#[test]
fn test_email_address_parse_angle_no_name() {
    let addr = EmailAddress::parse("<bob@test.io>").unwrap();
    assert_eq!(addr.address, "bob@test.io");
    assert!(addr.name.is_none());
}

#[test]
fn test_email_address_parse_quoted_name() {
    let addr = EmailAddress::parse("\"Jane Smith\" <jane@mail.com>").unwrap();
    assert_eq!(addr.name.as_deref(), Some("Jane Smith"));
    assert_eq!(addr.address, "jane@mail.com");
}

#[test]
fn test_email_address_parse_invalid() {
    assert!(EmailAddress::parse("not an address").is_none());
    assert!(EmailAddress::parse("").is_none());
}

#[test]
fn test_email_address_matches_case_insensitively() {
    let addr = EmailAddress::parse("Alice <Alice@Example.COM>").unwrap();
    assert!(addr.matches("alice@example.com"));
    assert!(addr.matches("  ALICE@EXAMPLE.COM "));
    assert!(!addr.matches("bob@example.com"));
    assert_eq!(addr.normalized(), "alice@example.com");
}

#[test]
fn test_email_address_matches_non_ascii_case() {
    let addr = EmailAddress::parse("ÉLODIE@example.com").unwrap();
    assert!(addr.matches("élodie@example.com"));
    assert!(addr.matches(&addr.normalized()));
}

#[test]
fn test_email_address_display() {
    let named = EmailAddress::parse("Alice <alice@example.com>").unwrap();
    let bare = EmailAddress::parse("bob@example.com").unwrap();
    assert_eq!(named.to_string(), "Alice <alice@example.com>");
    assert_eq!(bare.to_string(), "bob@example.com");
}

// --- Thread ---

#[test]
fn test_thread_from_messages_sorts() {
    let thread = Thread::from_messages(vec![
        message("2", "b@example.com", "2025-01-01T12:00:00+02:00"),
        message("1", "a@example.com", "2025-01-01T09:00:00+00:00"),
    ]);

    assert_eq!(thread.messages()[0].id.as_str(), "1");
    assert!(thread.is_chronological());
}

#[test]
fn test_thread_from_ordered_keeps_order() {
    let thread = Thread::from_ordered(vec![
        message("late", "b@example.com", "2025-01-01T12:00:00+00:00"),
        message("early", "a@example.com", "2025-01-01T09:00:00+00:00"),
    ]);

    assert_eq!(thread.messages()[0].id.as_str(), "late");
    assert!(!thread.is_chronological());
}

#[test]
fn test_thread_participants() {
    let thread = Thread::from_messages(vec![
        message("1", "A@example.com", "2025-01-01T09:00:00+00:00"),
        message("2", "b@example.com", "2025-01-01T10:00:00+00:00"),
    ]);

    let participants: Vec<String> = thread.participants().into_iter().collect();
    assert_eq!(participants, ["a@example.com", "b@example.com", "me@example.com"]);
}

#[test]
fn test_thread_serde_round_trip_keeps_offset() {
    let thread = Thread::from_messages(vec![message(
        "1",
        "a@example.com",
        "2025-01-01T09:00:00-05:00",
    )]);

    let json = serde_json::to_string(&thread).unwrap();
    let back: Thread = serde_json::from_str(&json).unwrap();

    assert_eq!(back, thread);
    assert_eq!(
        back.messages()[0].timestamp.offset().local_minus_utc(),
        -5 * 3600
    );
}
