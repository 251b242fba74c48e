//! Non-owning byte views and delimiter splitting.
//!
//! A span is just `&[u8]` borrowed from the connection's read buffer. The
//! borrow checker keeps every span from outliving the buffer it points into,
//! so spans are released automatically at the end of each request cycle.

use std::collections::TryReserveError;
use std::ops::Deref;

/// A borrowed view into a longer-lived buffer.
pub type ByteSpan<'a> = &'a [u8];

/// Failure to allocate the span array itself.
#[derive(Debug)]
pub enum SplitError {
    Alloc(TryReserveError),
}

/// Ordered spans produced by [`split_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanList<'a> {
    spans: Vec<ByteSpan<'a>>,
}

impl<'a> SpanList<'a> {
    pub fn first(&self) -> Option<ByteSpan<'a>> {
        self.spans.first().copied()
    }

    /// Reassembles the original bytes by reinserting `delimiter` between spans.
    pub fn join(&self, delimiter: &[u8]) -> Vec<u8> {
        self.spans.join(delimiter)
    }
}

impl<'a> Deref for SpanList<'a> {
    type Target = [ByteSpan<'a>];

    fn deref(&self) -> &Self::Target {
        &self.spans
    }
}

/// Finds the first occurrence of `needle` in `haystack`.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|w| w == needle)
}

/// Splits `buffer` on every non-overlapping occurrence of `delimiter`.
///
/// Always yields `occurrences + 1` spans; adjacent delimiters produce empty
/// spans. An empty delimiter never matches, so the whole buffer comes back as
/// one span. No bytes are copied.
pub fn split_by<'a>(buffer: &'a [u8], delimiter: &[u8]) -> Result<SpanList<'a>, SplitError> {
    let mut count = 1;
    let mut rest = buffer;
    while let Some(at) = find(rest, delimiter) {
        count += 1;
        rest = &rest[at + delimiter.len()..];
    }

    let mut spans = Vec::new();
    spans.try_reserve_exact(count).map_err(SplitError::Alloc)?;

    let mut rest = buffer;
    while let Some(at) = find(rest, delimiter) {
        spans.push(&rest[..at]);
        rest = &rest[at + delimiter.len()..];
    }
    spans.push(rest);

    Ok(SpanList { spans })
}
