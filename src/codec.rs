//! Hand-rolled wire codec for the envelope's on-pipe representation.
//!
//! One message is exactly one fixed-shape JSON-like record:
//!
//! ```text
//! {"StringValue":"<escaped>","MessageFormat":"Text","Priority":null,"Headers":{"<k>":"<v>",…}}
//! ```
//!
//! The `MessageFormat` and `Priority` fields are legacy placeholders kept for
//! wire compatibility with existing readers of this format: always written as
//! `"Text"` and `null`, always skipped on read. There is no length prefix —
//! the message boundary is the pipe connection's close.
//!
//! The codec deliberately does not use a general-purpose serialization
//! library. Its value is producing and consuming exactly the record shape the
//! interoperable peers expect, character by character, with the five escape
//! sequences below and nothing else.
//!
//! Escaping: `\` and `"` are escaped; CR, LF, and TAB become `\r`, `\n`,
//! `\t`. Every other character, including other control characters and
//! non-ASCII, passes through unchanged.
//!
//! A `body` of `None` is written as the empty string, so decoding always
//! yields `Some(_)` — the null-to-empty round trip is an accepted limitation
//! of the format, not a defect.

use crate::envelope::{Envelope, Headers};
use crate::{CourierError, Result};

/// Encode an envelope into its wire text.
#[must_use]
pub fn serialize(envelope: &Envelope) -> String {
    let mut out = String::with_capacity(96);
    out.push_str("{\"StringValue\":\"");
    escape_into(envelope.body().unwrap_or(""), &mut out);
    out.push_str("\",\"MessageFormat\":\"Text\",\"Priority\":null,\"Headers\":{");
    let mut first = true;
    for (key, value) in envelope.headers() {
        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        escape_into(key, &mut out);
        out.push_str("\":\"");
        escape_into(value, &mut out);
        out.push('"');
    }
    out.push_str("}}");
    out
}

/// Decode wire text into an envelope.
///
/// The scanner walks the fixed-shape record character by character and fails
/// fast on any deviation: every step is bounds-checked, so malformed input
/// returns [`CourierError::Decode`] rather than running past the end of the
/// buffer. Trailing whitespace after the closing brace is tolerated; any
/// other trailing content is an error.
///
/// # Errors
///
/// Returns [`CourierError::Decode`] when the input does not match the record
/// shape, contains an unsupported escape sequence, or ends mid-record.
pub fn deserialize(text: &str) -> Result<Envelope> {
    let mut scanner = Scanner::new(text);
    scanner.expect_literal("{\"StringValue\":")?;
    let body = scanner.read_quoted()?;
    scanner.expect_literal(",\"MessageFormat\":")?;
    scanner.skip_scalar()?;
    scanner.expect_literal(",\"Priority\":")?;
    scanner.skip_scalar()?;
    scanner.expect_literal(",\"Headers\":{")?;
    let headers = read_headers(&mut scanner)?;
    scanner.expect_literal("}")?;
    scanner.expect_end()?;
    Ok(Envelope::from_parts(Some(body), headers))
}

fn read_headers(scanner: &mut Scanner) -> Result<Headers> {
    let mut headers = Headers::new();
    if scanner.peek() == Some('}') {
        scanner.advance();
        return Ok(headers);
    }
    loop {
        let key = scanner.read_quoted()?;
        scanner.expect_literal(":")?;
        let value = scanner.read_quoted()?;
        headers.insert(key, value);
        match scanner.next_char()? {
            ',' => {}
            '}' => break,
            other => {
                return Err(CourierError::Decode(format!(
                    "expected ',' or '}}' after header pair, found '{other}'"
                )))
            }
        }
    }
    Ok(headers)
}

/// Append `value` to `out` with the wire escape rules applied.
fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
}

/// Cursor over the decoded characters of one wire record.
struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consume and return the next character.
    fn next_char(&mut self) -> Result<char> {
        let ch = self
            .peek()
            .ok_or_else(|| CourierError::Decode("unexpected end of input".into()))?;
        self.advance();
        Ok(ch)
    }

    /// Consume an exact literal sequence.
    fn expect_literal(&mut self, literal: &str) -> Result<()> {
        for expected in literal.chars() {
            let found = self.next_char().map_err(|_| {
                CourierError::Decode(format!(
                    "unexpected end of input while expecting '{literal}'"
                ))
            })?;
            if found != expected {
                return Err(CourierError::Decode(format!(
                    "expected '{literal}', found '{found}' at position {}",
                    self.pos - 1
                )));
            }
        }
        Ok(())
    }

    /// Consume a double-quoted string, unescaping the five wire sequences.
    fn read_quoted(&mut self) -> Result<String> {
        if self.next_char()? != '"' {
            return Err(CourierError::Decode(format!(
                "expected opening quote at position {}",
                self.pos - 1
            )));
        }
        let mut value = String::new();
        loop {
            match self.next_char().map_err(|_| {
                CourierError::Decode("unterminated string in wire record".into())
            })? {
                '"' => return Ok(value),
                '\\' => {
                    let escaped = self.next_char().map_err(|_| {
                        CourierError::Decode("dangling escape at end of input".into())
                    })?;
                    match escaped {
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        'r' => value.push('\r'),
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        other => {
                            return Err(CourierError::Decode(format!(
                                "unsupported escape sequence '\\{other}'"
                            )))
                        }
                    }
                }
                other => value.push(other),
            }
        }
    }

    /// Skip a placeholder scalar: either a quoted string or the `null` token.
    fn skip_scalar(&mut self) -> Result<()> {
        if self.peek() == Some('"') {
            self.read_quoted()?;
            Ok(())
        } else {
            self.expect_literal("null")
        }
    }

    /// Require that only whitespace remains.
    fn expect_end(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                return Err(CourierError::Decode(format!(
                    "trailing content after record at position {}",
                    self.pos
                )));
            }
            self.advance();
        }
        Ok(())
    }
}
