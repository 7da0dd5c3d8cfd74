//! In-memory chunk provider

use super::ChunkProvider;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::Result;

/// Serves an owned byte buffer in fixed-size slices
///
/// Always seekable: rewinding just moves the cursor back to zero.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    data: Vec<u8>,
    pos: usize,
    chunk_size: usize,
}

impl MemoryProvider {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self::with_chunk_size(data, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(data: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        MemoryProvider {
            data: data.into(),
            pos: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Bytes handed out so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ChunkProvider for MemoryProvider {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }
        let start = self.pos;
        let end = (start + self.chunk_size).min(self.data.len());
        self.pos = end;
        Ok(Some(&self.data[start..end]))
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn rewind(&mut self) -> Result<()> {
        self.pos = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_and_rewind() {
        let mut provider = MemoryProvider::with_chunk_size("<a>1</a>", 3);
        assert_eq!(provider.next_chunk().unwrap(), Some(&b"<a>"[..]));
        assert_eq!(provider.next_chunk().unwrap(), Some(&b"1</"[..]));
        assert_eq!(provider.next_chunk().unwrap(), Some(&b"a>"[..]));
        assert_eq!(provider.next_chunk().unwrap(), None);
        assert_eq!(provider.next_chunk().unwrap(), None);
        assert_eq!(provider.position(), 8);

        assert!(provider.is_seekable());
        provider.rewind().unwrap();
        assert_eq!(provider.next_chunk().unwrap(), Some(&b"<a>"[..]));
    }

    #[test]
    fn test_empty() {
        let mut provider = MemoryProvider::new(Vec::new());
        assert!(provider.is_empty());
        assert_eq!(provider.next_chunk().unwrap(), None);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let mut provider = MemoryProvider::with_chunk_size("ab", 0);
        assert_eq!(provider.next_chunk().unwrap(), Some(&b"a"[..]));
    }
}
