//! Message envelope and header map exchanged between senders and receivers.

/// Header key carrying the logical system a message originated from.
///
/// Senders insert this header with their configured origin value when the
/// caller has not already set one.
pub const ORIGINATING_SYSTEM_HEADER: &str = "OriginatingSystem";

/// Insertion-ordered map of unique header keys to values.
///
/// Header order is not significant for correctness but is preserved for
/// natural iteration and deterministic wire output. Inserting an existing
/// key replaces its value in place, keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing the value in place when the key exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a header value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a header with the given key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate headers in insertion order.
    #[must_use]
    pub fn iter(&self) -> HeadersIter<'_> {
        HeadersIter {
            inner: self.entries.iter(),
        }
    }
}

/// Iterator over header pairs in insertion order.
pub struct HeadersIter<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for HeadersIter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = HeadersIter<'a>;

    fn into_iter(self) -> HeadersIter<'a> {
        self.iter()
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (key, value) in iter {
            headers.insert(key, value);
        }
        headers
    }
}

/// The unit exchanged between a sender and a receiver: a text payload plus
/// arbitrary string metadata.
///
/// `body` distinguishes `None` from `Some("")` at construction time; the wire
/// format collapses `None` to the empty string, so a round trip through the
/// codec yields `Some("")` for an envelope built with no body. Envelopes have
/// no persisted identity — they are created at send time, decoded at receive
/// time, and discarded after the handler returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    body: Option<String>,
    headers: Headers,
}

impl Envelope {
    /// Create an envelope with the given payload and no headers.
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            headers: Headers::new(),
        }
    }

    /// Create an envelope with no payload (`body: None`).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an envelope from an optional payload and a header map.
    #[must_use]
    pub fn from_parts(body: Option<String>, headers: Headers) -> Self {
        Self { body, headers }
    }

    /// Add a header, builder style.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// The payload, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The header map.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the header map.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Look up a single header value.
    #[must_use]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }
}
