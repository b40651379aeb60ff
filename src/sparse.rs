//! Sparse byte cache
//!
//! Holds the already-fetched parts of a fixed-length byte sequence as a sorted
//! list of disjoint, non-adjacent blocks. A read computes which parts of the
//! requested range are missing, asks the provider for exactly those gaps, and
//! merges the new data into the neighbouring blocks.

use crate::error::{LazyError, Result};
use crate::metrics::FetchMetrics;
use crate::provider::RangeProvider;
use crate::ranges::{missing_ranges, SliceIndices};
use bytes::Bytes;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, error, trace, warn};

/// A contiguous fetched span `[lo, hi)` and its bytes
#[derive(Debug)]
struct Block {
    lo: u64,
    hi: u64,
    data: Vec<u8>,
}

impl Block {
    fn range(&self) -> Range<u64> {
        self.lo..self.hi
    }

    fn slice(&self, lo: u64, hi: u64) -> &[u8] {
        &self.data[(lo - self.lo) as usize..(hi - self.lo) as usize]
    }
}

/// Interval-addressed cache over a fixed-length byte sequence
///
/// Between public calls the blocks are sorted by start, pairwise disjoint,
/// and never adjacent. Blocks are only ever added or merged; a byte is
/// fetched from the provider at most once per cache.
pub struct SparseByteCache<P> {
    size: u64,
    blocks: Vec<Block>,
    provider: P,
    metrics: FetchMetrics,
}

impl<P: RangeProvider> SparseByteCache<P> {
    /// Create a cache, asking the provider for the total size once
    pub fn new(mut provider: P) -> Result<Self> {
        let size = provider.size()?;
        Ok(Self::with_size(size, provider))
    }

    /// Create a cache for a sequence of known size
    pub fn with_size(size: u64, provider: P) -> Self {
        debug!("Creating sparse cache: size={}", size);
        SparseByteCache {
            size,
            blocks: Vec::new(),
            provider,
            metrics: FetchMetrics::new(),
        }
    }

    /// Logical length of the sequence
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Make sure every byte of `[lo, hi)` is cached
    ///
    /// Calls the provider once per maximal missing sub-range and returns the
    /// number of calls made; a fully cached range costs nothing. If a fetch
    /// fails, gaps fetched earlier in the same call stay cached.
    pub fn ensure(&mut self, lo: u64, hi: u64) -> Result<usize> {
        self.check_range(lo, hi)?;

        let gaps = missing_ranges(lo, hi, self.blocks.iter().map(Block::range));
        if gaps.is_empty() {
            trace!("Range {}..{} already cached", lo, hi);
            return Ok(0);
        }

        debug!(
            "Ensuring {}..{}: {} gap(s) to fetch: {:?}",
            lo,
            hi,
            gaps.len(),
            gaps
        );

        let result = self.fetch_gaps(&gaps);
        self.coalesce();
        result
    }

    fn fetch_gaps(&mut self, gaps: &[Range<u64>]) -> Result<usize> {
        for gap in gaps {
            let expected = gap.end - gap.start;
            let started = Instant::now();

            let data = match self.provider.fetch(gap.start, gap.end) {
                Ok(data) => data,
                Err(e) => {
                    self.metrics.record_fetch(0, started.elapsed(), false);
                    warn!("Fetch failed for {}..{}: {}", gap.start, gap.end, e);
                    return Err(e);
                }
            };

            let actual = data.len() as u64;
            if actual != expected {
                self.metrics.record_fetch(0, started.elapsed(), false);
                self.metrics.record_invalid_getter();
                warn!(
                    "Getter returned {} bytes for {}..{}, expected {}",
                    actual, gap.start, gap.end, expected
                );
                return Err(LazyError::InvalidGetter {
                    lo: gap.start,
                    hi: gap.end,
                    expected,
                    actual,
                });
            }

            self.metrics.record_fetch(expected, started.elapsed(), true);
            self.blocks.push(Block {
                lo: gap.start,
                hi: gap.end,
                data: data.to_vec(),
            });
        }

        Ok(gaps.len())
    }

    /// Sort the blocks and merge every pair that touches end-to-start
    pub fn coalesce(&mut self) {
        if self.blocks.len() < 2 {
            return;
        }

        self.blocks.sort_by_key(|block| block.lo);

        let before = self.blocks.len();
        let mut merged: Vec<Block> = Vec::with_capacity(before);
        for block in std::mem::take(&mut self.blocks) {
            match merged.last_mut() {
                Some(last) if last.hi == block.lo => {
                    last.hi = block.hi;
                    last.data.extend_from_slice(&block.data);
                }
                _ => merged.push(block),
            }
        }
        self.blocks = merged;

        if self.blocks.len() != before {
            debug!("Coalesced {} blocks into {}", before, self.blocks.len());
        }
    }

    /// Bytes of `[lo, hi)`, fetching whatever is missing
    ///
    /// An empty range returns immediately without touching the provider.
    pub fn read_range(&mut self, lo: u64, hi: u64) -> Result<Bytes> {
        self.check_range(lo, hi)?;
        if lo == hi {
            return Ok(Bytes::new());
        }

        let fetches = self.ensure(lo, hi)?;
        self.metrics.record_read(fetches);

        let block = self.covering_block(lo, hi)?;
        let data = Bytes::copy_from_slice(block.slice(lo, hi));
        self.metrics.record_bytes_served(data.len() as u64);
        Ok(data)
    }

    /// Sequence-style slice `[start:stop:step]`
    ///
    /// Negative bounds count from the end and out-of-range bounds clamp. The
    /// forward range spanning the selection is fetched first; the stride or
    /// reversal is applied to the cached bytes afterwards.
    pub fn read_slice(&mut self, start: Option<i64>, stop: Option<i64>, step: i64) -> Result<Bytes> {
        let indices = SliceIndices::resolve(start, stop, step, self.size)
            .ok_or_else(|| LazyError::InvalidRange("slice step cannot be zero".to_string()))?;

        let Some(range) = indices.covering_range() else {
            return Ok(Bytes::new());
        };

        if step == 1 {
            return self.read_range(range.start, range.end);
        }

        let fetches = self.ensure(range.start, range.end)?;
        self.metrics.record_read(fetches);

        let block = self.covering_block(range.start, range.end)?;
        let data: Vec<u8> = (0..indices.count())
            .map(|k| block.data[(indices.index(k) - block.lo) as usize])
            .collect();

        self.metrics.record_bytes_served(data.len() as u64);
        Ok(Bytes::from(data))
    }

    /// The byte at `index`; negative indices count back from the end
    pub fn read_one(&mut self, index: i64) -> Result<u8> {
        let normalized = if index < 0 {
            self.size.checked_sub(index.unsigned_abs())
        } else {
            Some(index as u64)
        };
        let Some(position) = normalized.filter(|&position| position < self.size) else {
            debug!("Index {} out of range for size {}", index, self.size);
            return Err(LazyError::IndexOutOfRange {
                index,
                size: self.size,
            });
        };

        let fetches = self.ensure(position, position + 1)?;
        self.metrics.record_read(fetches);

        let block = self.covering_block(position, position + 1)?;
        let byte = block.data[(position - block.lo) as usize];
        self.metrics.record_bytes_served(1);
        Ok(byte)
    }

    fn check_range(&self, lo: u64, hi: u64) -> Result<()> {
        if lo > hi || hi > self.size {
            return Err(LazyError::InvalidRange(format!(
                "{}..{} is not within 0..{}",
                lo, hi, self.size
            )));
        }
        Ok(())
    }

    /// The single block containing `[lo, hi)`; only valid right after `ensure`
    fn covering_block(&self, lo: u64, hi: u64) -> Result<&Block> {
        let idx = self.blocks.partition_point(|block| block.hi <= lo);
        match self.blocks.get(idx) {
            Some(block) if block.lo <= lo && hi <= block.hi => Ok(block),
            _ => {
                error!(
                    "No single block covers {}..{} after ensure; blocks={:?}",
                    lo,
                    hi,
                    self.block_ranges()
                );
                debug_assert!(false, "no single block covers {}..{}", lo, hi);
                Err(LazyError::InternalError(format!(
                    "failed to ensure {}..{} as a single block",
                    lo, hi
                )))
            }
        }
    }
}

impl<P> SparseByteCache<P> {
    /// Ranges of all cached blocks, in ascending order
    pub fn block_ranges(&self) -> Vec<Range<u64>> {
        self.blocks.iter().map(Block::range).collect()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of bytes currently held
    pub fn cached_bytes(&self) -> u64 {
        self.blocks.iter().map(|block| block.hi - block.lo).sum()
    }

    pub fn is_fully_cached(&self) -> bool {
        self.cached_bytes() == self.size
    }

    pub fn metrics(&self) -> &FetchMetrics {
        &self.metrics
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }
}
