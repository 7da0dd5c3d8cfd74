//! Node Selection Strategies
//!
//! Two ways of deciding which element is "the node":
//! - DepthCapture: every element at a fixed nesting depth
//! - NamedElement: every element with a given name, at any depth
//!
//! Both sit on the shared [`ChunkBuffer`](crate::core::buffer::ChunkBuffer)
//! and are driven through [`NodeParser`].

pub mod depth;
pub mod named;

pub use depth::DepthCaptureParser;
pub use named::{NamedElementParser, NextAction};

use crate::config::{ParserOptions, Strategy};
use crate::error::Result;

/// A push-fed node extractor
///
/// Callers alternate between [`feed`](NodeParser::feed) and
/// [`poll_node`](NodeParser::poll_node) until the byte source runs dry, then
/// call [`finish`](NodeParser::finish) once.
pub trait NodeParser {
    /// Append a chunk from the byte source
    fn feed(&mut self, chunk: &[u8]);

    /// Return the next complete node if the buffered data holds one
    fn poll_node(&mut self) -> Result<Option<Vec<u8>>>;

    /// Signal end of input. Safe to call repeatedly.
    fn finish(&mut self);

    /// Markup collected outside the captured nodes. Complete only after `finish`.
    fn extracted_container(&self) -> Result<&[u8]>;

    /// Bytes buffered but not consumed yet
    fn working_blob(&self) -> &[u8];

    /// Return to the initial state, dropping all buffered data
    fn reset(&mut self);
}

impl<P: NodeParser + ?Sized> NodeParser for &mut P {
    fn feed(&mut self, chunk: &[u8]) {
        (**self).feed(chunk)
    }

    fn poll_node(&mut self) -> Result<Option<Vec<u8>>> {
        (**self).poll_node()
    }

    fn finish(&mut self) {
        (**self).finish()
    }

    fn extracted_container(&self) -> Result<&[u8]> {
        (**self).extracted_container()
    }

    fn working_blob(&self) -> &[u8] {
        (**self).working_blob()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Either strategy, picked from [`ParserOptions::strategy`]
#[derive(Debug)]
pub enum Parser {
    DepthCapture(DepthCaptureParser),
    NamedElement(NamedElementParser),
}

impl Parser {
    /// Build the parser the options ask for.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingElementName`](crate::error::Error::MissingElementName)
    /// for the named strategy without a name.
    pub fn new(options: &ParserOptions) -> Result<Self> {
        Ok(match options.strategy {
            Strategy::DepthCapture => Parser::DepthCapture(DepthCaptureParser::new(options)),
            Strategy::NamedElement => Parser::NamedElement(NamedElementParser::new(options)?),
        })
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Parser::DepthCapture(_) => Strategy::DepthCapture,
            Parser::NamedElement(_) => Strategy::NamedElement,
        }
    }

    fn inner(&self) -> &dyn NodeParser {
        match self {
            Parser::DepthCapture(p) => p,
            Parser::NamedElement(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn NodeParser {
        match self {
            Parser::DepthCapture(p) => p,
            Parser::NamedElement(p) => p,
        }
    }
}

impl NodeParser for Parser {
    fn feed(&mut self, chunk: &[u8]) {
        self.inner_mut().feed(chunk)
    }

    fn poll_node(&mut self) -> Result<Option<Vec<u8>>> {
        self.inner_mut().poll_node()
    }

    fn finish(&mut self) {
        self.inner_mut().finish()
    }

    fn extracted_container(&self) -> Result<&[u8]> {
        self.inner().extracted_container()
    }

    fn working_blob(&self) -> &[u8] {
        self.inner().working_blob()
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::NodeParser;

    /// Feed `input` in fixed-size chunks and collect every node
    pub(crate) fn collect_nodes<P: NodeParser>(mut parser: P, input: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
        let mut nodes = Vec::new();
        for chunk in input.chunks(chunk_size.max(1)) {
            parser.feed(chunk);
            while let Some(node) = parser.poll_node().unwrap() {
                nodes.push(node);
            }
        }
        parser.finish();
        nodes
    }

    pub(crate) fn lossy(nodes: &[Vec<u8>]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| String::from_utf8_lossy(node).into_owned())
            .collect()
    }
}
