//! Random-access, read-only byte stream over a sparse cache
//!
//! [`LazyFile`] behaves like a binary file opened for reading: it has a
//! cursor, clamps every seek into `[0, len]`, and truncates reads at the end
//! instead of failing. Bytes come from the cache, so only the ranges that
//! are actually read are ever fetched.

use crate::error::Result;
use crate::provider::RangeProvider;
use crate::sparse::SparseByteCache;
use bytes::Bytes;
use std::io::{self, Read, Seek, SeekFrom};
use tracing::{debug, trace};

/// Read/seek/tell adapter owning one [`SparseByteCache`]
pub struct LazyFile<P> {
    cache: SparseByteCache<P>,
    pos: u64,
    end: u64,
}

impl<P> LazyFile<P> {
    pub const READABLE: bool = true;
    pub const WRITABLE: bool = false;
    pub const SEEKABLE: bool = true;

    pub fn readable(&self) -> bool {
        Self::READABLE
    }

    pub fn writable(&self) -> bool {
        Self::WRITABLE
    }

    pub fn seekable(&self) -> bool {
        Self::SEEKABLE
    }

    /// Current cursor position
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Logical length of the stream
    pub fn len(&self) -> u64 {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    /// Bytes between the cursor and the end
    pub fn remaining(&self) -> u64 {
        self.end - self.pos
    }

    /// Move the cursor, saturating at the start and end of the stream
    ///
    /// Returns the new position. Never fails.
    pub fn seek_clamped(&mut self, target: SeekFrom) -> u64 {
        let target = match target {
            SeekFrom::Start(offset) => offset.min(self.end),
            SeekFrom::Current(offset) => self.offset_from(self.pos, offset),
            SeekFrom::End(offset) => self.offset_from(self.end, offset),
        };
        trace!("Seek {} -> {}", self.pos, target);
        self.pos = target;
        self.pos
    }

    fn offset_from(&self, origin: u64, offset: i64) -> u64 {
        if offset < 0 {
            origin.saturating_sub(offset.unsigned_abs())
        } else {
            origin.saturating_add(offset as u64).min(self.end)
        }
    }

    pub fn cache(&self) -> &SparseByteCache<P> {
        &self.cache
    }

    pub fn into_cache(self) -> SparseByteCache<P> {
        self.cache
    }
}

impl<P: RangeProvider> LazyFile<P> {
    /// Open a stream over a provider, querying its size once
    pub fn new(provider: P) -> Result<Self> {
        Ok(Self::from_cache(SparseByteCache::new(provider)?))
    }

    /// Open a stream over a provider of known size
    pub fn with_size(size: u64, provider: P) -> Self {
        Self::from_cache(SparseByteCache::with_size(size, provider))
    }

    pub fn from_cache(cache: SparseByteCache<P>) -> Self {
        let end = cache.len();
        debug!("Opening lazy file: len={}", end);
        LazyFile { cache, pos: 0, end }
    }

    /// Read up to `n` bytes from the cursor
    ///
    /// Returns fewer bytes when the end is near and nothing once it is
    /// reached. The cursor only advances if the read succeeds.
    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes> {
        let target = self.pos.saturating_add(n as u64).min(self.end);
        self.read_to(target)
    }

    /// Read everything from the cursor to the end
    pub fn read_all(&mut self) -> Result<Bytes> {
        self.read_to(self.end)
    }

    fn read_to(&mut self, target: u64) -> Result<Bytes> {
        let data = self.cache.read_range(self.pos, target)?;
        trace!("Read {}..{} ({} bytes)", self.pos, target, data.len());
        self.pos = target;
        Ok(data)
    }
}

impl<P: RangeProvider> Read for LazyFile<P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.read_bytes(buf.len())?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }
}

impl<P> Seek for LazyFile<P> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.seek_clamped(pos))
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LazyError;
    use crate::provider::{FnProvider, MemoryProvider};

    const DATA: &[u8] = b"Hello, world!";

    fn file() -> LazyFile<MemoryProvider> {
        LazyFile::new(MemoryProvider::new(DATA)).unwrap()
    }

    #[test]
    fn test_capabilities() {
        let f = file();
        assert!(f.readable());
        assert!(!f.writable());
        assert!(f.seekable());
    }

    #[test]
    fn test_read_all() {
        let mut f = file();
        assert_eq!(f.read_all().unwrap().as_ref(), DATA);
        assert_eq!(f.tell(), 13);
        assert!(f.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_past_end_truncates() {
        let mut f = file();
        f.seek_clamped(SeekFrom::Start(10));
        assert_eq!(f.read_bytes(100).unwrap().as_ref(), b"ld!");
        assert_eq!(f.tell(), 13);
        assert_eq!(f.remaining(), 0);
    }

    #[test]
    fn test_seek_clamps() {
        let mut f = file();
        assert_eq!(f.seek_clamped(SeekFrom::Start(100)), 13);
        assert_eq!(f.seek_clamped(SeekFrom::Current(-100)), 0);
        assert_eq!(f.seek_clamped(SeekFrom::End(5)), 13);
        assert_eq!(f.seek_clamped(SeekFrom::End(-20)), 0);
        assert_eq!(f.seek_clamped(SeekFrom::Current(i64::MAX)), 13);
        assert_eq!(f.seek_clamped(SeekFrom::Current(i64::MIN)), 0);
    }

    #[test]
    fn test_io_read_and_seek() {
        let mut f = file();
        let mut buf = [0u8; 5];
        f.seek(SeekFrom::Start(7)).unwrap();
        assert_eq!(Read::read(&mut f, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");
        assert_eq!(f.stream_position().unwrap(), 12);

        let mut rest = Vec::new();
        f.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"!");
    }

    #[test]
    fn test_read_error_leaves_cursor() {
        let provider = FnProvider::new(4, |_lo, _hi| Ok(Bytes::from_static(b"x")));
        let mut f = LazyFile::new(provider).unwrap();
        assert!(matches!(
            f.read_bytes(3),
            Err(LazyError::InvalidGetter { .. })
        ));
        assert_eq!(f.tell(), 0);

        let mut buf = [0u8; 2];
        let err = Read::read(&mut f, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
