//! Case-insensitive header collection shared by requests, responses and trailers.
//!
//! Names are normalized to lower case on every write and lookup. Setting a name
//! that already exists appends the new value to the stored one, joined by a bare
//! comma, so `A: x`, `A: y`, `a: z` end up as `a: x,y,z`.
//!
//! The merge is not aware of quoted strings: a value such as `"a,b"` cannot be
//! told apart from two merged values afterwards.
//!
//! Iteration follows first-insertion order of names.

use indexmap::IndexMap;

use crate::ensure;
use crate::protocol::ParseError;

const CRLF: &[u8] = b"\r\n";

/// Ordered, case-insensitive `name -> value` store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: IndexMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, or appends it as `old,value` when the name is present.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.inner.get_mut(&name) {
            Some(existing) => {
                existing.push(',');
                existing.push_str(value);
            }
            None => {
                self.inner.insert(name, value.to_string());
            }
        }
    }

    /// Overwrites any value stored under `name`.
    pub fn replace(&mut self, name: &str, value: &str) {
        self.inner.insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Removes `name`, returning the value it held.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.shift_remove(&name.to_ascii_lowercase())
    }

    /// Returns the value for `name`, or `""` when absent.
    ///
    /// Use [`Headers::contains`] when an empty value must be told apart from a missing one.
    pub fn get(&self, name: &str) -> &str {
        self.inner.get(&name.to_ascii_lowercase()).map_or("", String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates `(name, value)` pairs, names lower-cased.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parses at most one CRLF-terminated field line from the start of `buf`.
    ///
    /// Returns `(consumed, done)`:
    /// - `(0, false)` when no CRLF is available yet; retry with more bytes
    /// - `(2, true)` when the line is empty, which ends the header section
    /// - `(line_len + 2, false)` after storing one field through [`Headers::set`]
    ///
    /// # Errors
    ///
    /// - [`ParseError::MalformedFieldLine`] when the line has no colon
    /// - [`ParseError::MalformedFieldName`] when whitespace precedes the colon, or the
    ///   name is empty or contains a non-token character
    pub fn parse(&mut self, buf: &[u8]) -> Result<(usize, bool), ParseError> {
        let Some(line_end) = find_crlf(buf) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            return Ok((CRLF.len(), true));
        }

        let (name, value) = split_field_line(&buf[..line_end])?;
        self.set(&name, &value);

        Ok((line_end + CRLF.len(), false))
    }
}

fn split_field_line(line: &[u8]) -> Result<(String, String), ParseError> {
    let colon = line.iter().position(|b| *b == b':').ok_or(ParseError::MalformedFieldLine)?;
    let (raw_name, raw_value) = (&line[..colon], &line[colon + 1..]);

    // "Host : x" is rejected rather than trimmed
    ensure!(!raw_name.last().is_some_and(u8::is_ascii_whitespace), ParseError::MalformedFieldName);

    let name = raw_name.trim_ascii();
    ensure!(!name.is_empty() && name.iter().copied().all(is_token_char), ParseError::MalformedFieldName);

    Ok((String::from_utf8_lossy(name).into_owned(), String::from_utf8_lossy(raw_value.trim_ascii()).into_owned()))
}

/// Position of the first CRLF in `buf`.
pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|window| window == CRLF)
}

/// `tchar` from RFC 9110: letters, digits and ``!#$%&'*+-.^_`|~``.
pub(crate) fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}
