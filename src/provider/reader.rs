//! Reader-backed Chunk Providers
//!
//! Reads fixed-size chunks from any `Read` source into a reusable buffer.
//! Seekable sources additionally support restarting from the first byte.

use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use super::ChunkProvider;
use crate::config::{DEFAULT_CHUNK_SIZE, DEFAULT_STDIN_CHUNK_SIZE};
use crate::error::{Error, Result};

/// Called after every read with the chunk and the running byte count
pub type ProgressCallback = Box<dyn FnMut(&[u8], u64) + Send>;

/// Shared read loop
struct ChunkReader<R> {
    reader: R,
    buffer: Vec<u8>,
    read_bytes: u64,
    eof: bool,
    callback: Option<ProgressCallback>,
}

impl<R: Read> ChunkReader<R> {
    fn new(reader: R, chunk_size: usize) -> Self {
        ChunkReader {
            reader,
            buffer: vec![0u8; chunk_size.max(1)],
            read_bytes: 0,
            eof: false,
            callback: None,
        }
    }

    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.eof {
            return Ok(None);
        }

        let read = loop {
            match self.reader.read(&mut self.buffer) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };

        if read == 0 {
            self.eof = true;
            return Ok(None);
        }

        self.read_bytes += read as u64;
        let chunk = &self.buffer[..read];
        if let Some(callback) = self.callback.as_mut() {
            callback(chunk, self.read_bytes);
        }
        Ok(Some(chunk))
    }
}

/// Provider over any reader. Cannot rewind.
pub struct ReaderProvider<R> {
    inner: ChunkReader<R>,
}

impl<R: Read> ReaderProvider<R> {
    /// Read in chunks of [`DEFAULT_CHUNK_SIZE`] bytes
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        ReaderProvider {
            inner: ChunkReader::new(reader, chunk_size),
        }
    }

    /// Report every chunk read
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.inner.callback = Some(callback);
        self
    }

    /// Total bytes read so far
    pub fn read_bytes(&self) -> u64 {
        self.inner.read_bytes
    }

    pub fn into_inner(self) -> R {
        self.inner.reader
    }
}

impl ReaderProvider<io::Stdin> {
    /// Standard input, read in chunks of [`DEFAULT_STDIN_CHUNK_SIZE`] bytes
    pub fn stdin() -> Self {
        Self::with_chunk_size(io::stdin(), DEFAULT_STDIN_CHUNK_SIZE)
    }
}

impl<R: Read> ChunkProvider for ReaderProvider<R> {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        self.inner.next_chunk()
    }
}

/// Provider over a `Read + Seek` source
///
/// Seekability is probed once at construction: a pipe opened as a file
/// reports `false` and refuses to rewind.
pub struct SeekableProvider<R> {
    inner: ChunkReader<R>,
    seekable: bool,
}

/// File-backed provider
pub type FileProvider = SeekableProvider<File>;

impl<R: Read + Seek> SeekableProvider<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(mut reader: R, chunk_size: usize) -> Self {
        let seekable = reader.stream_position().is_ok();
        SeekableProvider {
            inner: ChunkReader::new(reader, chunk_size),
            seekable,
        }
    }

    /// Report every chunk read
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.inner.callback = Some(callback);
        self
    }

    /// Bytes read since construction or the last rewind
    pub fn read_bytes(&self) -> u64 {
        self.inner.read_bytes
    }

    pub fn into_inner(self) -> R {
        self.inner.reader
    }
}

impl FileProvider {
    /// Open `path` for reading
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        log::debug!(
            target: "xml_node_streamer::provider",
            "opened {} with {} byte chunks",
            path.as_ref().display(),
            chunk_size
        );
        Ok(Self::with_chunk_size(file, chunk_size))
    }
}

impl<R: Read + Seek> ChunkProvider for SeekableProvider<R> {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        self.inner.next_chunk()
    }

    fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn rewind(&mut self) -> Result<()> {
        if !self.seekable {
            return Err(Error::NotSeekable);
        }
        self.inner.reader.seek(SeekFrom::Start(0))?;
        self.inner.read_bytes = 0;
        self.inner.eof = false;
        log::debug!(target: "xml_node_streamer::provider", "rewound source");
        Ok(())
    }
}
