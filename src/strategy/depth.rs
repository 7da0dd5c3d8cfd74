//! Depth-Capture Parser
//!
//! Walks tag spans while keeping a running depth sum and captures whatever
//! lies between entering and leaving the configured depth window. The sum is
//! never checked against an element stack, so unbalanced input may leave it
//! negative or stuck; the parser then just stops producing nodes.

use super::NodeParser;
use crate::config::ParserOptions;
use crate::core::buffer::ChunkBuffer;
use crate::core::tags::{classify, TagKind};
use crate::error::{Error, Result};

/// Stateful parser emitting every element at a fixed nesting depth
#[derive(Debug)]
pub struct DepthCaptureParser {
    options: ParserOptions,
    buffer: ChunkBuffer,
    /// Running sum of depth deltas
    depth: i64,
    /// Whether spans are currently appended to `shaved`
    capturing: bool,
    /// Node in the making
    shaved: Vec<u8>,
    /// Tags seen outside the capture window
    container: Vec<u8>,
}

impl DepthCaptureParser {
    /// Create a parser. The options are copied and never change afterwards.
    pub fn new(options: &ParserOptions) -> Self {
        DepthCaptureParser {
            options: options.clone(),
            buffer: ChunkBuffer::new(),
            depth: 0,
            capturing: false,
            shaved: Vec::new(),
            container: Vec::new(),
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Current depth sum
    pub fn depth(&self) -> i64 {
        self.depth
    }

    /// Whether a node is being captured right now
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Depth an opening tag brings the sum to when it starts a node.
    /// Saturates, so an absurd `capture_depth` just never captures.
    #[inline]
    fn window(&self) -> i64 {
        i64::try_from(self.options.capture_depth).map_or(i64::MAX, |depth| depth.saturating_add(1))
    }

    fn flush(&mut self) -> Vec<u8> {
        self.capturing = false;
        let node = std::mem::take(&mut self.shaved);
        log::debug!(
            target: "xml_node_streamer::depth",
            "flushed node of {} bytes at depth {}",
            node.len(),
            self.depth
        );
        node
    }
}

impl NodeParser for DepthCaptureParser {
    fn feed(&mut self, chunk: &[u8]) {
        self.buffer.append(chunk);
    }

    fn poll_node(&mut self) -> Result<Option<Vec<u8>>> {
        let window = self.window();
        let allow_literal_gt = self.options.allow_literal_gt;
        let extract_container = self.options.extract_container;

        while let Some(span) = self.buffer.next_span(allow_literal_gt) {
            let tag = span.tag();
            let marker = match classify(tag) {
                Some(marker) => marker,
                None => {
                    log::warn!(target: "xml_node_streamer::depth", "unclassifiable span {:?}", tag);
                    return Err(Error::unclassified(tag));
                }
            };
            let delta = marker.depth_delta;
            self.depth += delta;

            log::trace!(
                target: "xml_node_streamer::depth",
                "{:?} span of {} bytes, depth now {}",
                marker.kind,
                tag.len(),
                self.depth
            );

            if self.depth == window && delta > 0 {
                // Entered the window: the node starts at this tag
                self.capturing = true;
                self.shaved.extend_from_slice(tag);
            } else if self.depth == window - 1 && delta < 0 && self.capturing {
                // Left the window: this closing tag ends the node
                self.shaved.extend_from_slice(span.data());
                return Ok(Some(self.flush()));
            } else if marker.kind == TagKind::SelfClosing && self.depth == window - 1 {
                // A self-closing element right where nodes live is a node by itself
                self.shaved.clear();
                self.shaved.extend_from_slice(tag);
                return Ok(Some(self.flush()));
            } else if self.capturing {
                self.shaved.extend_from_slice(span.data());
            } else if extract_container && self.depth < window {
                self.container.extend_from_slice(tag);
            }
        }

        Ok(None)
    }

    fn finish(&mut self) {
        if !self.buffer.is_blank() {
            log::debug!(
                target: "xml_node_streamer::depth",
                "end of stream with {} unconsumed bytes",
                self.buffer.len()
            );
        }
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
        log::debug!(target: "xml_node_streamer::depth", "parser reset");
        self.buffer.clear();
        self.depth = 0;
        self.capturing = false;
        self.shaved.clear();
        self.container.clear();
    }
}
