//! Chunk Buffer and Span Scanner
//!
//! Accumulates chunks that have been fetched but not consumed yet, and shaves
//! `<...>` spans off the front of it. Scanning state survives appends so a
//! span split over several chunks is resumed where the previous search gave
//! up instead of being searched again from the start.

use memchr::{memchr, memmem};

use super::tags::{literal_gt_marker, TagMarker};

/// A span shaved off the front of the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShavedSpan<'a> {
    /// Skipped data followed by the tag itself
    data: &'a [u8],
    /// Offset of the tag's `<` inside `data`
    tag_start: usize,
}

impl<'a> ShavedSpan<'a> {
    /// The isolated tag
    #[inline]
    pub fn tag(&self) -> &'a [u8] {
        &self.data[self.tag_start..]
    }

    /// Everything since the previous span, up to and including the tag
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Data skipped before the tag
    #[inline]
    pub fn preceding(&self) -> &'a [u8] {
        &self.data[..self.tag_start]
    }
}

/// Where the span search stopped. Offsets are relative to the unconsumed start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for `<` from `from`
    Seek { from: usize },
    /// Found `<` at `lt`, looking for `>` from `from`
    Tag { lt: usize, from: usize },
    /// Inside a comment or CDATA section, looking for its real closer from `from`
    Special { lt: usize, marker: &'static TagMarker, from: usize },
}

impl Default for ScanState {
    fn default() -> Self {
        ScanState::Seek { from: 0 }
    }
}

/// Byte accumulator shared by both parser strategies
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    data: Vec<u8>,
    /// Absolute offset of the first unconsumed byte
    head: usize,
    scan: ScanState,
}

impl ChunkBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        ChunkBuffer {
            data: Vec::with_capacity(8192),
            head: 0,
            scan: ScanState::default(),
        }
    }

    /// Append a chunk, compacting consumed bytes first
    pub fn append(&mut self, chunk: &[u8]) {
        if self.head > 0 {
            self.data.drain(..self.head);
            self.head = 0;
        }
        self.data.extend_from_slice(chunk);
    }

    /// Unconsumed bytes
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[self.head..]
    }

    /// Number of unconsumed bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when only XML whitespace is left
    pub fn is_blank(&self) -> bool {
        self.as_slice()
            .iter()
            .all(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
    }

    /// Drop everything, including scan progress
    pub fn clear(&mut self) {
        self.data.clear();
        self.head = 0;
        self.scan = ScanState::default();
    }

    /// Consume `n` bytes from the front and return them.
    /// Scan progress is relative to the old front, so it is discarded.
    pub fn consume(&mut self, n: usize) -> &[u8] {
        let start = self.head;
        let n = n.min(self.len());
        self.head += n;
        self.scan = ScanState::default();
        &self.data[start..start + n]
    }

    /// Find `needle` in the unconsumed bytes at or after `from`
    #[inline]
    pub fn find(&self, needle: &[u8], from: usize) -> Option<usize> {
        let haystack = self.as_slice();
        if from > haystack.len() {
            return None;
        }
        memmem::find(&haystack[from..], needle).map(|i| from + i)
    }

    /// Shave the next tag span off the front of the buffer.
    ///
    /// Returns `None` when more data is needed. With `allow_literal_gt`, a
    /// comment or CDATA section is only returned once its real closer has
    /// arrived, even if a `>` shows up inside it earlier.
    pub fn next_span(&mut self, allow_literal_gt: bool) -> Option<ShavedSpan<'_>> {
        loop {
            let buf = &self.data[self.head..];
            match self.scan {
                ScanState::Seek { from } => match memchr(b'<', &buf[from..]) {
                    Some(i) => {
                        let lt = from + i;
                        self.scan = ScanState::Tag { lt, from: lt + 1 };
                    }
                    None => {
                        self.scan = ScanState::Seek { from: buf.len() };
                        return None;
                    }
                },
                ScanState::Tag { lt, from } => {
                    let gt = match memchr(b'>', &buf[from..]) {
                        Some(i) => from + i,
                        None => {
                            self.scan = ScanState::Tag { lt, from: buf.len() };
                            return None;
                        }
                    };

                    // "<>" is not a span, the search moves on to the next '<'
                    if gt == lt + 1 {
                        self.scan = ScanState::Seek { from: lt + 1 };
                        continue;
                    }

                    let end = gt + 1;
                    if allow_literal_gt {
                        let candidate = &buf[lt..end];
                        if let Some(marker) = literal_gt_marker(candidate) {
                            if !candidate.ends_with(marker.close) {
                                log::trace!(
                                    target: "xml_node_streamer::scanner",
                                    "'>' inside {:?} at {}, searching for real closer",
                                    marker.kind,
                                    gt
                                );
                                self.scan = ScanState::Special {
                                    lt,
                                    marker,
                                    from: lt + marker.open.len(),
                                };
                                continue;
                            }
                        }
                    }
                    return Some(self.shave(lt, end));
                }
                ScanState::Special { lt, marker, from } => {
                    match memmem::find(&buf[from..], marker.close) {
                        Some(i) => {
                            let end = from + i + marker.close.len();
                            return Some(self.shave(lt, end));
                        }
                        None => {
                            // The closer may already be partially buffered
                            let resume = buf.len().saturating_sub(marker.close.len() - 1).max(from);
                            self.scan = ScanState::Special { lt, marker, from: resume };
                            return None;
                        }
                    }
                }
            }
        }
    }

    fn shave(&mut self, tag_start: usize, end: usize) -> ShavedSpan<'_> {
        let start = self.head;
        self.head += end;
        self.scan = ScanState::default();
        ShavedSpan {
            data: &self.data[start..start + end],
            tag_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer(input: &[u8]) -> ChunkBuffer {
        let mut buf = ChunkBuffer::new();
        buf.append(input);
        buf
    }

    #[test]
    fn test_next_span_returns_tag_and_preceding_data() {
        let mut buf = buffer(b"  text <child>rest");
        let span = buf.next_span(false).unwrap();
        assert_eq!(span.tag(), b"<child>");
        assert_eq!(span.preceding(), b"  text ");
        assert_eq!(span.data(), b"  text <child>");
        assert_eq!(buf.as_slice(), b"rest");
    }

    #[test]
    fn test_span_split_over_chunks() {
        let mut buf = buffer(b"<ro");
        assert!(buf.next_span(false).is_none());
        buf.append(b"ot attr=");
        assert!(buf.next_span(false).is_none());
        buf.append(b"\"1\">tail");
        assert_eq!(buf.next_span(false).unwrap().tag(), b"<root attr=\"1\">");
        assert_eq!(buf.as_slice(), b"tail");
    }

    #[test]
    fn test_empty_angle_brackets_are_skipped() {
        let mut buf = buffer(b"a <> b <x>");
        let span = buf.next_span(false).unwrap();
        assert_eq!(span.tag(), b"<x>");
        assert_eq!(span.preceding(), b"a <> b ");
    }

    #[test]
    fn test_nearest_gt_after_nearest_lt() {
        let mut buf = buffer(b"<a<b>");
        assert_eq!(buf.next_span(false).unwrap().tag(), b"<a<b>");
    }

    #[test]
    fn test_comment_with_gt_without_literal_mode() {
        let mut buf = buffer(b"<!-- a > b -->");
        assert_eq!(buf.next_span(false).unwrap().tag(), b"<!-- a >");
    }

    #[test]
    fn test_comment_with_gt_in_literal_mode() {
        let mut buf = buffer(b"<!-- contains > and < chars --><next>");
        assert_eq!(
            buf.next_span(true).unwrap().tag(),
            b"<!-- contains > and < chars -->"
        );
        assert_eq!(buf.next_span(true).unwrap().tag(), b"<next>");
    }

    #[test]
    fn test_truncated_cdata_waits_for_closer() {
        let mut buf = buffer(b"<![CDATA[ >>><> ]");
        assert!(buf.next_span(true).is_none());
        buf.append(b"]");
        assert!(buf.next_span(true).is_none());
        buf.append(b"> after");
        assert_eq!(buf.next_span(true).unwrap().tag(), b"<![CDATA[ >>><> ]]>");
        assert_eq!(buf.as_slice(), b" after");
    }

    #[test]
    fn test_consume_and_find() {
        let mut buf = buffer(b"abc<item>def");
        assert_eq!(buf.find(b"<item", 0), Some(3));
        assert_eq!(buf.find(b"<item", 4), None);
        assert_eq!(buf.consume(3), b"abc");
        assert_eq!(buf.find(b"<item", 0), Some(0));
        buf.append(b"<item>");
        assert_eq!(buf.as_slice(), b"<item>def<item>");
    }

    #[test]
    fn test_is_blank() {
        assert!(buffer(b" \n\t\r").is_blank());
        assert!(!buffer(b" x ").is_blank());
        assert!(ChunkBuffer::new().is_blank());
    }
}
