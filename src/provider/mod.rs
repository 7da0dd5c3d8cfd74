//! Chunk Providers
//!
//! Byte sources the streamer pulls from:
//! - ReaderProvider: any `Read`, standard input included
//! - SeekableProvider / FileProvider: a `Read + Seek` source that can restart
//! - MemoryProvider: bytes already in memory

pub mod memory;
pub mod reader;

pub use memory::MemoryProvider;
pub use reader::{FileProvider, ProgressCallback, ReaderProvider, SeekableProvider};

use crate::error::{Error, Result};

/// Source of raw byte chunks
///
/// `next_chunk` returns `Ok(None)` once the source is exhausted, and keeps
/// returning it on later calls without side effects.
pub trait ChunkProvider {
    /// Next slice of input, or `None` at end of input
    fn next_chunk(&mut self) -> Result<Option<&[u8]>>;

    /// Whether [`rewind`](ChunkProvider::rewind) can succeed
    fn is_seekable(&self) -> bool {
        false
    }

    /// Restart the source from its first byte
    fn rewind(&mut self) -> Result<()> {
        Err(Error::NotSeekable)
    }
}

impl<P: ChunkProvider + ?Sized> ChunkProvider for Box<P> {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        (**self).next_chunk()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }
}

impl<P: ChunkProvider + ?Sized> ChunkProvider for &mut P {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        (**self).next_chunk()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }
}
