//! Cumulative distribution and equalization lookup tables.
//!
//! ## Mapping
//!
//! ```text
//! cdf[0]    = hist[0]
//! cdf[i]    = cdf[i - 1] + hist[i]
//! lookup[i] = trunc((cdf[i] - cdf[0]) * 255 / (total - cdf[0])), clamped to 0..=255
//! ```
//!
//! A channel with a single occupied level is flat and maps every level to 0,
//! whatever that level is. This also covers `total == cdf[0]`, so the
//! division never sees a zero denominator.

use super::histogram::{Histogram, LEVELS};

const MAX_INTENSITY: u64 = 255;

// ============================================================================
// Cdf
// ============================================================================

/// Running sum of a histogram. Non-decreasing; the last entry is the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cdf {
    values: [u64; LEVELS],
}

impl Cdf {
    pub fn from_histogram(hist: &Histogram) -> Self {
        let counts = hist.counts();
        let mut values = [0u64; LEVELS];
        values[0] = counts[0] as u64;
        for i in 1..LEVELS {
            values[i] = values[i - 1] + counts[i] as u64;
        }
        Self { values }
    }

    #[inline]
    pub fn get(&self, level: u8) -> u64 {
        self.values[level as usize]
    }

    #[inline]
    pub fn values(&self) -> &[u64; LEVELS] {
        &self.values
    }

    /// Number of pixels counted.
    #[inline]
    pub fn total(&self) -> u64 {
        self.values[LEVELS - 1]
    }

    /// Base of the mapping, `cdf[0]`.
    #[inline]
    pub fn base(&self) -> u64 {
        self.values[0]
    }

    /// Number of intensity levels with a non-zero count.
    pub fn occupied_levels(&self) -> usize {
        let first = usize::from(self.values[0] > 0);
        first + self.values.windows(2).filter(|w| w[1] > w[0]).count()
    }
}

// ============================================================================
// LookupTable
// ============================================================================

/// Old intensity to equalized intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTable {
    table: [u8; LEVELS],
}

impl LookupTable {
    /// Derive the equalization table for a complete channel histogram.
    ///
    /// # Arguments
    /// * `hist` - Histogram of the whole channel
    /// * `total_pixels` - Number of pixels in the channel
    pub fn from_histogram(hist: &Histogram, total_pixels: u32) -> Self {
        Self::from_cdf(&Cdf::from_histogram(hist), total_pixels)
    }

    pub fn from_cdf(cdf: &Cdf, total_pixels: u32) -> Self {
        let base = cdf.base();
        let denom = (total_pixels as u64).saturating_sub(base);

        let mut table = [0u8; LEVELS];
        if denom == 0 || cdf.occupied_levels() <= 1 {
            // flat channel
            return Self { table };
        }

        for (entry, &c) in table.iter_mut().zip(cdf.values().iter()) {
            let scaled = c.saturating_sub(base) * MAX_INTENSITY / denom;
            *entry = scaled.min(MAX_INTENSITY) as u8;
        }
        Self { table }
    }

    /// Wrap a precomputed table.
    pub fn from_table(table: [u8; LEVELS]) -> Self {
        Self { table }
    }

    #[inline]
    pub fn map(&self, value: u8) -> u8 {
        self.table[value as usize]
    }

    #[inline]
    pub fn as_array(&self) -> &[u8; LEVELS] {
        &self.table
    }

    /// Remap `src` into `dst`. Both slices must have the same length.
    pub fn apply(&self, src: &[u8], dst: &mut [u8]) {
        debug_assert_eq!(src.len(), dst.len());
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = self.table[s as usize];
        }
    }

    /// `true` if every entry is 0 (the flat channel result).
    pub fn is_zero(&self) -> bool {
        self.table.iter().all(|&v| v == 0)
    }
}

/// Equalization table for `hist` over `total_pixels` pixels.
pub fn compute_lookup(hist: &Histogram, total_pixels: u32) -> LookupTable {
    LookupTable::from_histogram(hist, total_pixels)
}
