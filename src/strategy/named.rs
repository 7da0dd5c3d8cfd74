//! Named-Element Parser
//!
//! Finds `<name` followed by a boundary byte, then the matching `</name>` (or,
//! optionally, a balanced `/>`), and returns everything in between verbatim.
//! All other structure is ignored, so no depth is tracked.
//!
//! Every search remembers how far it got without a match, and bytes that can
//! no longer start an opening tag are dropped while looking for one, so input
//! is scanned a bounded number of times and memory stays flat between nodes.

use memchr::memchr_iter;

use super::NodeParser;
use crate::config::ParserOptions;
use crate::core::buffer::ChunkBuffer;
use crate::error::{Error, Result};

const SHORT_CLOSE: &[u8] = b"/>";

/// What the parser is looking for next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    FindOpening,
    FindClosing,
}

/// Stateful parser emitting every element with a given name
#[derive(Debug)]
pub struct NamedElementParser {
    options: ParserOptions,
    /// `<name`
    opening: Vec<u8>,
    /// `</name>`
    closing: Vec<u8>,
    /// Unconsumed input. While looking for a closer it starts at the opening tag.
    buffer: ChunkBuffer,
    action: NextAction,
    /// Offsets below this are known not to start what the current action looks for
    searched_until: usize,
    /// Offsets below this are known not to hold a `/>`
    short_from: usize,
    /// The first `/>` after the opening tag belongs to a child
    short_ruled_out: bool,
    /// No opening tag has been found yet
    pre_capture: bool,
    container: Vec<u8>,
    /// Bytes dropped since the last node, kept for the container until the next opening tag
    tail: Vec<u8>,
}

impl NamedElementParser {
    /// Create a parser for `options.element_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingElementName`] when no non-empty name is configured.
    pub fn new(options: &ParserOptions) -> Result<Self> {
        let name = options
            .element_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(Error::MissingElementName)?;

        let mut opening = Vec::with_capacity(name.len() + 1);
        opening.push(b'<');
        opening.extend_from_slice(name.as_bytes());

        let mut closing = Vec::with_capacity(name.len() + 3);
        closing.extend_from_slice(b"</");
        closing.extend_from_slice(name.as_bytes());
        closing.push(b'>');

        Ok(NamedElementParser {
            options: options.clone(),
            opening,
            closing,
            buffer: ChunkBuffer::new(),
            action: NextAction::FindOpening,
            searched_until: 0,
            short_from: 0,
            short_ruled_out: false,
            pre_capture: true,
            container: Vec::new(),
            tail: Vec::new(),
        })
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn next_action(&self) -> NextAction {
        self.action
    }

    /// How far the current search got without a match
    pub fn searched_until(&self) -> usize {
        self.searched_until
    }

    /// Bytes that may follow the name in an opening tag.
    ///
    /// Any XML whitespace counts, not only a space, and `/` counts when short
    /// closing is enabled. None of these can continue a longer name.
    #[inline]
    fn is_boundary(&self, b: u8) -> bool {
        matches!(b, b'>' | b' ' | b'\t' | b'\n' | b'\r')
            || (b == b'/' && self.options.check_short_closing)
    }

    /// Offset of the next opening tag, or `None` with `searched_until` updated
    fn find_opening(&mut self) -> Option<usize> {
        let mut from = self.searched_until;
        loop {
            let Some(pos) = self.buffer.find(&self.opening, from) else {
                // A partial "<nam" may sit at the very end
                self.searched_until = self
                    .buffer
                    .len()
                    .saturating_sub(self.opening.len() - 1)
                    .max(from);
                return None;
            };
            match self.buffer.as_slice().get(pos + self.opening.len()) {
                Some(&b) if self.is_boundary(b) => return Some(pos),
                // A longer name sharing our prefix
                Some(_) => from = pos + 1,
                None => {
                    self.searched_until = pos;
                    return None;
                }
            }
        }
    }

    /// End of the balanced `/>` closing the element at the buffer front, if it
    /// comes before `limit`
    fn find_short_close(&mut self, limit: Option<usize>) -> Option<usize> {
        if self.short_ruled_out {
            return None;
        }
        let Some(pos) = self.buffer.find(SHORT_CLOSE, self.short_from.max(1)) else {
            self.short_from = self.buffer.len().saturating_sub(SHORT_CLOSE.len() - 1);
            return None;
        };
        if limit.is_some_and(|closing| pos > closing) {
            return None;
        }

        // Balanced means one '<' and one "/>" from the element start to the candidate.
        // This is the first "/>", so only the '<' count needs checking.
        let opens = memchr_iter(b'<', &self.buffer.as_slice()[..pos]).count();
        if opens == 1 {
            Some(pos + SHORT_CLOSE.len())
        } else {
            self.short_ruled_out = true;
            None
        }
    }

    /// End offset (exclusive) of the element at the buffer front
    fn find_closing(&mut self) -> Option<usize> {
        let closing = self.buffer.find(&self.closing, self.searched_until);
        let short = if self.options.check_short_closing {
            self.find_short_close(closing)
        } else {
            None
        };

        match (closing, short) {
            (_, Some(end)) => Some(end),
            (Some(pos), None) => Some(pos + self.closing.len()),
            (None, None) => {
                self.searched_until = self
                    .buffer
                    .len()
                    .saturating_sub(self.closing.len() - 1)
                    .max(self.searched_until);
                None
            }
        }
    }

    /// Drop the bytes in front of the opening tag at `pos`
    fn skip_to_opening(&mut self, pos: usize) {
        let skipped = self.buffer.consume(pos);
        if self.options.extract_container {
            if self.pre_capture {
                self.container.extend_from_slice(skipped);
            }
            self.tail.clear();
        }
        self.pre_capture = false;
        self.action = NextAction::FindClosing;
        self.searched_until = 0;
        self.short_from = 0;
        self.short_ruled_out = false;
    }

    /// Drop bytes already known not to start an opening tag
    fn discard_searched(&mut self) {
        if self.searched_until == 0 {
            return;
        }
        let dropped = self.buffer.consume(self.searched_until);
        if self.options.extract_container {
            if self.pre_capture {
                self.container.extend_from_slice(dropped);
            } else {
                self.tail.extend_from_slice(dropped);
            }
        }
        self.searched_until = 0;
    }

    fn flush(&mut self, end: usize) -> Vec<u8> {
        let node = self.buffer.consume(end).to_vec();
        self.action = NextAction::FindOpening;
        self.searched_until = 0;
        self.short_from = 0;
        self.short_ruled_out = false;
        log::debug!(
            target: "xml_node_streamer::named",
            "flushed <{}> node of {} bytes",
            String::from_utf8_lossy(&self.opening[1..]),
            node.len()
        );
        node
    }
}

impl NodeParser for NamedElementParser {
    fn feed(&mut self, chunk: &[u8]) {
        self.buffer.append(chunk);
    }

    fn poll_node(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            match self.action {
                NextAction::FindOpening => match self.find_opening() {
                    Some(pos) => {
                        log::trace!(target: "xml_node_streamer::named", "opening tag at {}", pos);
                        self.skip_to_opening(pos);
                    }
                    None => {
                        self.discard_searched();
                        return Ok(None);
                    }
                },
                NextAction::FindClosing => {
                    return Ok(self.find_closing().map(|end| self.flush(end)));
                }
            }
        }
    }

    fn finish(&mut self) {
        if !self.options.extract_container {
            return;
        }
        let rest = self.buffer.len();
        let rest = self.buffer.consume(rest);
        self.container.append(&mut self.tail);
        self.container.extend_from_slice(rest);
        self.action = NextAction::FindOpening;
        self.searched_until = 0;
    }

    fn extracted_container(&self) -> Result<&[u8]> {
        if !self.options.extract_container {
            return Err(Error::ContainerNotEnabled);
        }
        Ok(&self.container)
    }

    fn working_blob(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    fn reset(&mut self) {
        log::debug!(target: "xml_node_streamer::named", "parser reset");
        self.buffer.clear();
        self.action = NextAction::FindOpening;
        self.searched_until = 0;
        self.short_from = 0;
        self.short_ruled_out = false;
        self.pre_capture = true;
        self.container.clear();
        self.tail.clear();
    }
}
