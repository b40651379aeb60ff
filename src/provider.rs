//! Range-fetch providers
//!
//! A provider is the capability the cache needs from the outside world: the
//! total length of the byte sequence, and the bytes of any sub-range of it.

use crate::error::{LazyError, Result};
use bytes::Bytes;

/// Source of a fixed-length byte sequence that can be fetched by range
pub trait RangeProvider {
    /// Total length of the sequence in bytes
    ///
    /// Queried once, when a cache is built from the provider.
    fn size(&mut self) -> Result<u64>;

    /// Fetch the bytes of `[lo, hi)`
    ///
    /// Only called with `0 <= lo < hi <= size`. Must return exactly
    /// `hi - lo` bytes; the cache rejects anything else.
    fn fetch(&mut self, lo: u64, hi: u64) -> Result<Bytes>;
}

impl<P: RangeProvider + ?Sized> RangeProvider for Box<P> {
    fn size(&mut self) -> Result<u64> {
        (**self).size()
    }

    fn fetch(&mut self, lo: u64, hi: u64) -> Result<Bytes> {
        (**self).fetch(lo, hi)
    }
}

impl<P: RangeProvider + ?Sized> RangeProvider for &mut P {
    fn size(&mut self) -> Result<u64> {
        (**self).size()
    }

    fn fetch(&mut self, lo: u64, hi: u64) -> Result<Bytes> {
        (**self).fetch(lo, hi)
    }
}

/// Provider built from a known size and a getter closure
pub struct FnProvider<F> {
    size: u64,
    getter: F,
}

impl<F> FnProvider<F>
where
    F: FnMut(u64, u64) -> Result<Bytes>,
{
    pub fn new(size: u64, getter: F) -> Self {
        FnProvider { size, getter }
    }
}

impl<F> RangeProvider for FnProvider<F>
where
    F: FnMut(u64, u64) -> Result<Bytes>,
{
    fn size(&mut self) -> Result<u64> {
        Ok(self.size)
    }

    fn fetch(&mut self, lo: u64, hi: u64) -> Result<Bytes> {
        (self.getter)(lo, hi)
    }
}

/// Provider serving an in-memory buffer
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    data: Bytes,
}

impl MemoryProvider {
    pub fn new(data: impl Into<Bytes>) -> Self {
        MemoryProvider { data: data.into() }
    }

    /// The full backing buffer
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl RangeProvider for MemoryProvider {
    fn size(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn fetch(&mut self, lo: u64, hi: u64) -> Result<Bytes> {
        let len = self.data.len() as u64;
        if lo > hi || hi > len {
            return Err(LazyError::InvalidRange(format!(
                "{}..{} outside buffer of {} bytes",
                lo, hi, len
            )));
        }
        Ok(self.data.slice(lo as usize..hi as usize))
    }
}
