//! ResourceArc Wrappers
//!
//! Persistent streamer state handed to Elixir as an opaque reference.

use std::sync::Mutex;

use rustler::ResourceArc;

use crate::error::Result;
use crate::provider::{ChunkProvider, FileProvider, MemoryProvider};
use crate::streamer::RewindableStreamer;

/// Byte sources a native streamer can be opened over
pub enum NativeSource {
    File(FileProvider),
    Memory(MemoryProvider),
}

impl ChunkProvider for NativeSource {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        match self {
            NativeSource::File(p) => p.next_chunk(),
            NativeSource::Memory(p) => p.next_chunk(),
        }
    }

    fn is_seekable(&self) -> bool {
        match self {
            NativeSource::File(p) => p.is_seekable(),
            NativeSource::Memory(p) => p.is_seekable(),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        match self {
            NativeSource::File(p) => p.rewind(),
            NativeSource::Memory(p) => p.rewind(),
        }
    }
}

pub type NativeStreamer = RewindableStreamer<NativeSource>;

/// Wrapper for a rewindable streamer that can be stored in a ResourceArc
pub struct StreamerResource {
    pub inner: Mutex<NativeStreamer>,
}

impl StreamerResource {
    pub fn new(streamer: NativeStreamer) -> Self {
        StreamerResource {
            inner: Mutex::new(streamer),
        }
    }

    /// Run `f` with exclusive access to the streamer.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if a previous call panicked while holding the lock.
    pub fn with_streamer<F, R>(&self, f: F) -> std::result::Result<R, &'static str>
    where
        F: FnOnce(&mut NativeStreamer) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&mut guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for StreamerResource {}

/// Type alias for the ResourceArc
pub type StreamerRef = ResourceArc<StreamerResource>;
