//! Interval arithmetic over closed-open byte ranges
//!
//! Covers the two operations the sparse cache needs: subtracting a sorted,
//! disjoint set of covered ranges from a request, and resolving
//! sequence-style slice bounds (negative indices, clamping, negative steps)
//! against a fixed length.

use std::ops::Range;
use tracing::trace;

/// Compute the parts of `[lo, hi)` not covered by `covered`
///
/// # Arguments
/// * `lo`, `hi` - The requested closed-open range
/// * `covered` - Covered ranges, sorted by start and pairwise disjoint
///
/// # Returns
/// The maximal missing sub-ranges in ascending order. Each returned range is
/// non-empty and cannot be extended without overlapping coverage or leaving
/// the request.
pub fn missing_ranges<I>(lo: u64, hi: u64, covered: I) -> Vec<Range<u64>>
where
    I: IntoIterator<Item = Range<u64>>,
{
    let mut gaps = Vec::new();
    if lo >= hi {
        return gaps;
    }

    let mut cursor = lo;
    for block in covered {
        if block.end <= cursor {
            continue;
        }
        if block.start >= hi {
            break;
        }
        if block.start > cursor {
            gaps.push(cursor..block.start);
        }
        cursor = cursor.max(block.end);
        if cursor >= hi {
            break;
        }
    }

    if cursor < hi {
        gaps.push(cursor..hi);
    }

    trace!("Missing ranges for {}..{}: {:?}", lo, hi, gaps);
    gaps
}

/// Resolved bounds of a sequence slice over a fixed length
///
/// Mirrors how a `[start:stop:step]` subscript is normalized: negative
/// bounds count from the end, out-of-range bounds clamp, and a negative step
/// walks backwards from `start` (inclusive) to `stop` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceIndices {
    /// First selected index; `-1` or `len` when the selection is empty
    pub start: i128,
    /// Exclusive bound; `-1` means "before index 0" for a negative step
    pub stop: i128,
    pub step: i64,
}

impl SliceIndices {
    /// Resolve optional bounds against `len`
    ///
    /// Returns `None` when `step` is zero. Bounds are held as `i128` so every
    /// `u64` length and the `-1` sentinel fit without clamping.
    pub fn resolve(start: Option<i64>, stop: Option<i64>, step: i64, len: u64) -> Option<Self> {
        if step == 0 {
            return None;
        }
        let len = i128::from(len);

        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let clamp = |value: i64| {
            let value = i128::from(value);
            if value < 0 {
                (value + len).max(lower)
            } else {
                value.min(upper)
            }
        };

        let start = match start {
            Some(value) => clamp(value),
            None if step > 0 => lower,
            None => upper,
        };
        let stop = match stop {
            Some(value) => clamp(value),
            None if step > 0 => upper,
            None => lower,
        };

        Some(SliceIndices { start, stop, step })
    }

    /// Number of elements the slice selects
    pub fn count(&self) -> u64 {
        let span = if self.step > 0 {
            self.stop - self.start
        } else {
            self.start - self.stop
        };
        if span <= 0 {
            return 0;
        }
        ((span - 1) as u128 / u128::from(self.step.unsigned_abs()) + 1) as u64
    }

    /// Index of the `k`-th selected element
    pub fn index(&self, k: u64) -> u64 {
        (self.start + i128::from(k) * i128::from(self.step)) as u64
    }

    /// Smallest forward range containing every selected element
    ///
    /// `None` for an empty selection.
    pub fn covering_range(&self) -> Option<Range<u64>> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        let (first, last) = (self.index(0), self.index(count - 1));
        let (lo, hi) = if self.step > 0 { (first, last) } else { (last, first) };
        Some(lo..hi + 1)
    }
}
