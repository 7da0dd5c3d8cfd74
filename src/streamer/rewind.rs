//! Rewindable Streamer
//!
//! Records the nodes produced after a rewind point so they can be handed out
//! again. Replay never touches the byte source: once the recorded nodes run
//! out, live fetching resumes and keeps recording.

use super::XmlStreamer;
use crate::error::Result;
use crate::provider::ChunkProvider;
use crate::strategy::{NodeParser, Parser};

/// What [`RewindableStreamer::get_node`] does next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewindMode {
    /// Live nodes, nothing recorded
    #[default]
    Idle,
    /// Live nodes, each one recorded
    Buffering,
    /// Recorded nodes first, then back to `Buffering`
    Replaying,
}

/// [`XmlStreamer`] with a replay buffer
#[derive(Debug)]
pub struct RewindableStreamer<P, N = Parser> {
    streamer: XmlStreamer<P, N>,
    mode: RewindMode,
    /// Nodes produced since the rewind point
    recorded: Vec<Vec<u8>>,
    /// Next recorded node to replay
    cursor: usize,
}

impl<P: ChunkProvider, N: NodeParser> RewindableStreamer<P, N> {
    pub fn new(streamer: XmlStreamer<P, N>) -> Self {
        RewindableStreamer {
            streamer,
            mode: RewindMode::Idle,
            recorded: Vec::new(),
            cursor: 0,
        }
    }

    /// Forget recorded nodes and start recording from here
    pub fn set_rewind_point(&mut self) {
        self.recorded.clear();
        self.cursor = 0;
        self.mode = RewindMode::Buffering;
    }

    /// Forget recorded nodes and stop recording
    pub fn remove_rewind_point(&mut self) {
        self.recorded.clear();
        self.cursor = 0;
        self.mode = RewindMode::Idle;
    }

    /// Replay from the rewind point.
    ///
    /// Always enters `Replaying`. With nothing recorded the next call falls
    /// straight through to live nodes, which are recorded from then on.
    pub fn rewind(&mut self) {
        log::debug!(
            target: "xml_node_streamer::rewind",
            "replaying {} recorded nodes",
            self.recorded.len()
        );
        self.cursor = 0;
        self.mode = RewindMode::Replaying;
    }

    /// Next node, replayed or live depending on [`mode`](Self::mode)
    pub fn get_node(&mut self) -> Result<Option<Vec<u8>>> {
        if self.mode == RewindMode::Replaying {
            if let Some(node) = self.recorded.get(self.cursor) {
                self.cursor += 1;
                return Ok(Some(node.clone()));
            }
            self.mode = RewindMode::Buffering;
        }

        let node = self.streamer.get_node()?;
        if let (RewindMode::Buffering, Some(node)) = (self.mode, node.as_ref()) {
            self.recorded.push(node.clone());
        }
        Ok(node)
    }

    /// Drop the rewind point and reset the parser, optionally rewinding the source
    pub fn reset(&mut self, rewind_source: bool) -> Result<()> {
        self.streamer.reset(rewind_source)?;
        self.remove_rewind_point();
        Ok(())
    }

    pub fn mode(&self) -> RewindMode {
        self.mode
    }

    /// Number of recorded nodes
    pub fn recorded_len(&self) -> usize {
        self.recorded.len()
    }

    /// Total size of the recorded nodes
    pub fn buffered_bytes(&self) -> usize {
        self.recorded.iter().map(Vec::len).sum()
    }

    pub fn inner(&self) -> &XmlStreamer<P, N> {
        &self.streamer
    }

    pub fn inner_mut(&mut self) -> &mut XmlStreamer<P, N> {
        &mut self.streamer
    }

    pub fn into_inner(self) -> XmlStreamer<P, N> {
        self.streamer
    }
}

impl<P: ChunkProvider, N: NodeParser> From<XmlStreamer<P, N>> for RewindableStreamer<P, N> {
    fn from(streamer: XmlStreamer<P, N>) -> Self {
        Self::new(streamer)
    }
}

impl<P: ChunkProvider, N: NodeParser> Iterator for RewindableStreamer<P, N> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.get_node().transpose()
    }
}
