//! Intensity histograms.
//!
//! [`Histogram`] is a plain value: cheap to copy, built from a slice or a
//! sub-range of one, and merged by element-wise addition. Because addition is
//! commutative and associative, partial histograms can be built in any order
//! and combined into the same result.
//!
//! [`AtomicHistogram`] is the lock-free shared counter array used when all
//! workers count into a single histogram.

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

/// Number of intensity levels for 8-bit channels.
pub const LEVELS: usize = 256;

// ============================================================================
// Histogram
// ============================================================================

/// Pixel counts for each of the 256 intensity levels of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Histogram {
    counts: [u32; LEVELS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    /// Empty histogram.
    pub fn new() -> Self {
        Self {
            counts: [0; LEVELS],
        }
    }

    /// Count every value of `values`.
    pub fn build(values: &[u8]) -> Self {
        let mut hist = Self::new();
        hist.accumulate(values);
        hist
    }

    /// Count the values at indices `range` of `values`.
    ///
    /// # Panics
    /// If `range` is not within `values`.
    pub fn build_range(values: &[u8], range: Range<usize>) -> Self {
        Self::build(&values[range])
    }

    /// Add `values` to the existing counts.
    #[inline]
    pub fn accumulate(&mut self, values: &[u8]) {
        for &v in values {
            self.counts[v as usize] += 1;
        }
    }

    /// Element-wise add `other` into `self`.
    pub fn merge(&mut self, other: &Histogram) {
        for (dst, &src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst += src;
        }
    }

    /// Element-wise sum of `parts`, in iteration order.
    pub fn reduce<'a>(parts: impl IntoIterator<Item = &'a Histogram>) -> Histogram {
        parts.into_iter().fold(Histogram::new(), |mut acc, part| {
            acc.merge(part);
            acc
        })
    }

    #[inline]
    pub fn count(&self, level: u8) -> u32 {
        self.counts[level as usize]
    }

    #[inline]
    pub fn counts(&self) -> &[u32; LEVELS] {
        &self.counts
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Lowest intensity with a non-zero count.
    pub fn min_level(&self) -> Option<u8> {
        self.counts.iter().position(|&c| c > 0).map(|i| i as u8)
    }
}

impl From<[u32; LEVELS]> for Histogram {
    fn from(counts: [u32; LEVELS]) -> Self {
        Self { counts }
    }
}

// ============================================================================
// AtomicHistogram
// ============================================================================

/// Histogram whose counters can be incremented concurrently through `&self`.
///
/// Increments are `Relaxed`: no ordering between counters is needed, and the
/// join at the end of the counting phase makes every increment visible to
/// [`AtomicHistogram::snapshot`].
#[derive(Debug)]
pub struct AtomicHistogram {
    counts: [AtomicU32; LEVELS],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicHistogram {
    pub fn new() -> Self {
        Self {
            counts: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    /// Count one pixel of intensity `value`.
    #[inline]
    pub fn record(&self, value: u8) {
        self.counts[value as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Count every value of `values`.
    pub fn record_all(&self, values: &[u8]) {
        for &v in values {
            self.record(v);
        }
    }

    /// Zero all counters.
    pub fn reset(&self) {
        for counter in &self.counts {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Copy the current counts into a plain [`Histogram`].
    pub fn snapshot(&self) -> Histogram {
        Histogram {
            counts: std::array::from_fn(|i| self.counts[i].load(Ordering::Relaxed)),
        }
    }
}
