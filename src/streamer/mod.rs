//! Node Streamer
//!
//! Ties one chunk provider to one parser and pulls chunks until a node
//! comes out or the provider runs dry.
//!
//! ```text
//! provider ──chunk──> parser.feed ──> parser.poll_node ──node──> caller
//!     └── end of input ──> parser.finish ──> None
//! ```

pub mod rewind;

pub use rewind::{RewindMode, RewindableStreamer};

use std::path::Path;

use crate::config::{ParserOptions, Strategy};
use crate::error::Result;
use crate::provider::{ChunkProvider, FileProvider};
use crate::strategy::{NodeParser, Parser};

/// Pull-based node stream over a chunk provider
#[derive(Debug)]
pub struct XmlStreamer<P, N = Parser> {
    provider: P,
    parser: N,
}

impl<P: ChunkProvider, N: NodeParser> XmlStreamer<P, N> {
    pub fn new(provider: P, parser: N) -> Self {
        XmlStreamer { provider, parser }
    }

    /// Next complete node, or `None` once the input is exhausted.
    ///
    /// A provider handing out empty chunks keeps the loop pulling; only its
    /// end-of-input marker stops it.
    pub fn get_node(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(node) = self.parser.poll_node()? {
                return Ok(Some(node));
            }
            match self.provider.next_chunk()? {
                Some(chunk) => self.parser.feed(chunk),
                None => {
                    self.parser.finish();
                    return Ok(None);
                }
            }
        }
    }

    /// Container markup of the parser. Complete after the stream is drained.
    pub fn extracted_container(&self) -> Result<&[u8]> {
        self.parser.extracted_container()
    }

    /// Reset the parser, rewinding the provider first when asked to.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotSeekable`](crate::error::Error::NotSeekable)
    /// when `rewind_source` is set and the provider cannot seek. The parser
    /// is left untouched in that case.
    pub fn reset(&mut self, rewind_source: bool) -> Result<()> {
        if rewind_source {
            self.provider.rewind()?;
        }
        self.parser.reset();
        Ok(())
    }

    pub fn parser(&self) -> &N {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut N {
        &mut self.parser
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn into_parts(self) -> (P, N) {
        (self.provider, self.parser)
    }
}

impl<P: ChunkProvider> XmlStreamer<P, Parser> {
    /// Build the parser described by `options` on top of `provider`
    pub fn with_options(provider: P, options: &ParserOptions) -> Result<Self> {
        Ok(Self::new(provider, Parser::new(options)?))
    }
}

impl XmlStreamer<FileProvider, Parser> {
    /// Stream every element at `options.capture_depth` from a file
    pub fn depth_capture_file<T: AsRef<Path>>(path: T, options: &ParserOptions) -> Result<Self> {
        let options = options.clone().with_strategy(Strategy::DepthCapture);
        let provider = FileProvider::open(path, options.chunk_size)?;
        Self::with_options(provider, &options)
    }

    /// Stream every `options.element_name` element from a file
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingElementName`](crate::error::Error::MissingElementName)
    /// before touching the file when no name is set.
    pub fn named_element_file<T: AsRef<Path>>(path: T, options: &ParserOptions) -> Result<Self> {
        let options = options.clone().with_strategy(Strategy::NamedElement);
        let parser = Parser::new(&options)?;
        let provider = FileProvider::open(path, options.chunk_size)?;
        Ok(Self::new(provider, parser))
    }
}

impl<P: ChunkProvider, N: NodeParser> Iterator for XmlStreamer<P, N> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_node().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::testing::ScriptedProvider;
    use crate::provider::MemoryProvider;
    use crate::strategy::testing::lossy;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io::Write;

    const SIMPLE: &str = "<root><child>1</child><child>2</child><child>3</child></root>";

    const MIXED: &str = "<?xml version=\"1.0\"?>\n<!-- a > b -->\n<root>\n  \
                         <child a=\"1\">x<!-- y > z --></child>\n  \
                         <child/>\n  \
                         <child><![CDATA[ <> ]]><n>2</n></child>\n\
                         </root>\n";

    const ITEMS: &str = "<root>\n  <item id=\"1\">a<b/>c</item>\n  <item/>\n  \
                         <itemized>x</itemized>\n  <group><item>nested</item></group>\n</root>\n";

    fn drain<P: ChunkProvider, N: NodeParser>(streamer: &mut XmlStreamer<P, N>) -> Vec<Vec<u8>> {
        let mut nodes = Vec::new();
        while let Some(node) = streamer.get_node().unwrap() {
            nodes.push(node);
        }
        nodes
    }

    fn mixed_options() -> ParserOptions {
        ParserOptions::depth_capture(1).with_literal_gt(true)
    }

    fn items_options() -> ParserOptions {
        ParserOptions::named_element("item").with_short_closing(true)
    }

    #[test]
    fn test_depth_capture_children() {
        let provider = MemoryProvider::with_chunk_size(SIMPLE, 5);
        let mut streamer = XmlStreamer::with_options(provider, &ParserOptions::depth_capture(1)).unwrap();
        assert_eq!(
            lossy(&drain(&mut streamer)),
            vec!["<child>1</child>", "<child>2</child>", "<child>3</child>"]
        );
        assert!(streamer.get_node().unwrap().is_none());
    }

    #[test]
    fn test_named_element_matches_depth_capture() {
        let by_depth = drain(&mut XmlStreamer::with_options(
            MemoryProvider::with_chunk_size(SIMPLE, 3),
            &ParserOptions::depth_capture(1),
        )
        .unwrap());
        let by_name = drain(&mut XmlStreamer::with_options(
            MemoryProvider::with_chunk_size(SIMPLE, 3),
            &ParserOptions::named_element("child"),
        )
        .unwrap());
        assert_eq!(by_depth, by_name);
    }

    #[test]
    fn test_self_closing_node_at_boundary() {
        let xml = "<root><child foo=\"x\"/><child>2</child></root>";
        let opts = ParserOptions::depth_capture(1).with_container(true);
        let mut streamer = XmlStreamer::with_options(MemoryProvider::with_chunk_size(xml, 4), &opts).unwrap();
        assert_eq!(lossy(&drain(&mut streamer)), vec!["<child foo=\"x\"/>", "<child>2</child>"]);
        assert_eq!(streamer.extracted_container().unwrap(), b"<root></root>");
    }

    #[test]
    fn test_literal_gt_comment_is_not_truncated() {
        let mut streamer = XmlStreamer::with_options(MemoryProvider::with_chunk_size(MIXED, 7), &mixed_options()).unwrap();
        assert_eq!(
            lossy(&drain(&mut streamer)),
            vec![
                "<child a=\"1\">x<!-- y > z --></child>",
                "<child/>",
                "<child><![CDATA[ <> ]]><n>2</n></child>",
            ]
        );
    }

    #[test]
    fn test_stray_closing_before_first_opening() {
        let xml = "<root></child><child>1</child></root>";
        let mut streamer = XmlStreamer::with_options(
            MemoryProvider::with_chunk_size(xml, 2),
            &ParserOptions::named_element("child"),
        )
        .unwrap();
        assert_eq!(lossy(&drain(&mut streamer)), vec!["<child>1</child>"]);
    }

    #[test]
    fn test_named_items_with_short_closing() {
        let mut streamer = XmlStreamer::with_options(MemoryProvider::with_chunk_size(ITEMS, 6), &items_options()).unwrap();
        assert_eq!(
            lossy(&drain(&mut streamer)),
            vec!["<item id=\"1\">a<b/>c</item>", "<item/>", "<item>nested</item>"]
        );
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        for opts in [ParserOptions::depth_capture(1), ParserOptions::named_element("child")] {
            let mut streamer = XmlStreamer::with_options(MemoryProvider::new(Vec::new()), &opts).unwrap();
            assert!(streamer.get_node().unwrap().is_none());
        }
    }

    #[test]
    fn test_empty_chunks_do_not_stall() {
        let provider = ScriptedProvider::new(["", "<root><chi", "", "", "ld>1</child>", "", "</root>"]);
        let mut streamer = XmlStreamer::with_options(provider, &ParserOptions::depth_capture(1)).unwrap();
        assert_eq!(lossy(&drain(&mut streamer)), vec!["<child>1</child>"]);
        // Seven chunks plus the end marker
        assert_eq!(streamer.provider().calls, 8);
    }

    #[test]
    fn test_container_is_idempotent_after_exhaustion() {
        let xml = "<?xml version=\"1.0\"?><root><child>1</child><child>2</child></root>";
        for opts in [
            ParserOptions::depth_capture(1).with_container(true),
            ParserOptions::named_element("child").with_container(true),
        ] {
            let mut streamer = XmlStreamer::with_options(MemoryProvider::with_chunk_size(xml, 5), &opts).unwrap();
            assert_eq!(drain(&mut streamer).len(), 2);
            let first = streamer.extracted_container().unwrap().to_vec();
            assert!(streamer.get_node().unwrap().is_none());
            assert_eq!(streamer.extracted_container().unwrap(), &first[..]);
            assert_eq!(first, b"<?xml version=\"1.0\"?><root></root>");
        }
    }

    #[test]
    fn test_container_not_enabled() {
        let streamer = XmlStreamer::with_options(MemoryProvider::new(SIMPLE), &ParserOptions::default()).unwrap();
        assert!(matches!(streamer.extracted_container(), Err(Error::ContainerNotEnabled)));
    }

    #[test]
    fn test_reset_with_source_rewind() {
        let mut streamer = XmlStreamer::with_options(
            MemoryProvider::with_chunk_size(SIMPLE, 4),
            &ParserOptions::named_element("child"),
        )
        .unwrap();
        assert_eq!(streamer.get_node().unwrap().unwrap(), b"<child>1</child>");
        assert_eq!(streamer.get_node().unwrap().unwrap(), b"<child>2</child>");

        streamer.reset(true).unwrap();
        assert_eq!(
            lossy(&drain(&mut streamer)),
            vec!["<child>1</child>", "<child>2</child>", "<child>3</child>"]
        );
    }

    #[test]
    fn test_reset_on_unseekable_source() {
        let provider = ScriptedProvider::new([SIMPLE]);
        let mut streamer = XmlStreamer::with_options(provider, &ParserOptions::default()).unwrap();
        assert!(matches!(streamer.reset(true), Err(Error::NotSeekable)));
        streamer.reset(false).unwrap();
    }

    #[test]
    fn test_iterator() {
        let streamer = XmlStreamer::with_options(MemoryProvider::with_chunk_size(SIMPLE, 8), &ParserOptions::default()).unwrap();
        let nodes: Result<Vec<_>> = streamer.collect();
        assert_eq!(nodes.unwrap().len(), 3);
    }

    #[test]
    fn test_file_constructors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ITEMS.as_bytes()).unwrap();

        let opts = items_options().with_chunk_size(5);
        let named = XmlStreamer::named_element_file(file.path(), &opts).unwrap();
        assert_eq!(named.count(), 3);

        // Strategy is forced by the constructor, the element name is ignored
        let depth: Vec<Vec<u8>> = XmlStreamer::depth_capture_file(file.path(), &opts)
            .unwrap()
            .map(|node| node.unwrap())
            .collect();
        assert_eq!(
            lossy(&depth),
            vec![
                "<item id=\"1\">a<b/>c</item>",
                "<item/>",
                "<itemized>x</itemized>",
                "<group><item>nested</item></group>",
            ]
        );
    }

    #[test]
    fn test_named_file_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let result = XmlStreamer::named_element_file(dir.path().join("missing.xml"), &ParserOptions::default());
        assert!(matches!(result, Err(Error::MissingElementName)));
    }

    proptest! {
        #[test]
        fn test_depth_capture_is_chunk_independent(cuts in prop::collection::vec(0..MIXED.len(), 0..12)) {
            let provider = ScriptedProvider::split_at(MIXED.as_bytes(), &cuts);
            let mut streamer = XmlStreamer::with_options(provider, &mixed_options()).unwrap();
            prop_assert_eq!(
                lossy(&drain(&mut streamer)),
                vec![
                    "<child a=\"1\">x<!-- y > z --></child>",
                    "<child/>",
                    "<child><![CDATA[ <> ]]><n>2</n></child>",
                ]
            );
        }

        #[test]
        fn test_named_element_is_chunk_independent(cuts in prop::collection::vec(0..ITEMS.len(), 0..12)) {
            let provider = ScriptedProvider::split_at(ITEMS.as_bytes(), &cuts);
            let mut streamer = XmlStreamer::with_options(provider, &items_options()).unwrap();
            prop_assert_eq!(
                lossy(&drain(&mut streamer)),
                vec!["<item id=\"1\">a<b/>c</item>", "<item/>", "<item>nested</item>"]
            );
        }

        #[test]
        fn test_whole_input_matches_byte_at_a_time(chunk_size in 1usize..64) {
            let whole = drain(&mut XmlStreamer::with_options(
                MemoryProvider::new(SIMPLE),
                &ParserOptions::default(),
            ).unwrap());
            let split = drain(&mut XmlStreamer::with_options(
                MemoryProvider::with_chunk_size(SIMPLE, chunk_size),
                &ParserOptions::default(),
            ).unwrap());
            prop_assert_eq!(whole, split);
        }
    }
}
