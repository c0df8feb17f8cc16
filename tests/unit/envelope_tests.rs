//! Unit tests for the envelope data model and its header map.

use pipe_courier::envelope::ORIGINATING_SYSTEM_HEADER;
use pipe_courier::{Envelope, Headers};

// ── Headers ──────────────────────────────────────────────────────────────────

/// Headers iterate in insertion order.
#[test]
fn headers_preserve_insertion_order() {
    let mut headers = Headers::new();
    headers.insert("c", "3");
    headers.insert("a", "1");
    headers.insert("b", "2");

    let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["c", "a", "b"]);
}

/// Re-inserting an existing key replaces the value in place without moving
/// the key to the end.
#[test]
fn insert_existing_key_replaces_in_place() {
    let mut headers = Headers::new();
    headers.insert("first", "1");
    headers.insert("second", "old");
    headers.insert("third", "3");
    headers.insert("second", "new");

    assert_eq!(headers.len(), 3, "keys must stay unique");
    assert_eq!(headers.get("second"), Some("new"));
    let keys: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec!["first", "second", "third"],
        "replaced key must keep its original position"
    );
}

/// Lookup and emptiness accessors behave as expected.
#[test]
fn header_lookup_accessors() {
    let mut headers = Headers::new();
    assert!(headers.is_empty());
    assert_eq!(headers.get("missing"), None);
    assert!(!headers.contains_key("missing"));

    headers.insert("k", "v");
    assert!(!headers.is_empty());
    assert_eq!(headers.len(), 1);
    assert!(headers.contains_key("k"));
    assert_eq!(headers.get("k"), Some("v"));
}

/// `FromIterator` collects pairs with the same uniqueness rules as `insert`.
#[test]
fn headers_from_iterator_deduplicates() {
    let headers: Headers = [
        ("a".to_owned(), "1".to_owned()),
        ("b".to_owned(), "2".to_owned()),
        ("a".to_owned(), "3".to_owned()),
    ]
    .into_iter()
    .collect();

    assert_eq!(headers.len(), 2);
    assert_eq!(headers.get("a"), Some("3"));
}

// ── Envelope ─────────────────────────────────────────────────────────────────

/// `new` carries a payload, `empty` carries none — the distinction is
/// preserved at the data-model level.
#[test]
fn body_distinguishes_none_from_empty() {
    assert_eq!(Envelope::new("").body(), Some(""));
    assert_eq!(Envelope::empty().body(), None);
    assert_ne!(Envelope::new(""), Envelope::empty());
}

/// The builder-style `with_header` accumulates headers.
#[test]
fn with_header_builds_up_headers() {
    let envelope = Envelope::new("payload")
        .with_header("a", "1")
        .with_header("b", "2");

    assert_eq!(envelope.header("a"), Some("1"));
    assert_eq!(envelope.header("b"), Some("2"));
    assert_eq!(envelope.headers().len(), 2);
}

/// `from_parts` reassembles an envelope from its components.
#[test]
fn from_parts_reassembles() {
    let mut headers = Headers::new();
    headers.insert(ORIGINATING_SYSTEM_HEADER, "tests");
    let envelope = Envelope::from_parts(Some("p".to_owned()), headers);

    assert_eq!(envelope.body(), Some("p"));
    assert_eq!(envelope.header(ORIGINATING_SYSTEM_HEADER), Some("tests"));
}
