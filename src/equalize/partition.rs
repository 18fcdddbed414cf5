//! Contiguous row partitions for the spatial strategies.
//!
//! `height` rows are split into `workers` ranges of `height / workers` rows;
//! the last range absorbs the remainder. Ranges never overlap and always
//! cover every row, including the one-row-per-worker case.

use std::ops::Range;

use super::error::{EqualizeError, Result};

/// Validate a worker count against the image height.
///
/// Zero workers, or more workers than rows (which would leave a partition
/// empty), are rejected rather than clamped.
pub fn validate_workers(workers: u32, height: u32) -> Result<usize> {
    if workers == 0 || workers > height {
        return Err(EqualizeError::InvalidWorkerCount { workers, height });
    }
    Ok(workers as usize)
}

/// Row ranges for `workers` workers over `height` rows.
pub fn row_ranges(height: u32, workers: u32) -> Result<Vec<Range<usize>>> {
    let n = validate_workers(workers, height)?;
    let height = height as usize;
    let rows_per_worker = height / n;

    Ok((0..n)
        .map(|i| {
            let start = i * rows_per_worker;
            let end = if i == n - 1 {
                height
            } else {
                (i + 1) * rows_per_worker
            };
            start..end
        })
        .collect())
}

/// Split a row-major plane into one mutable slice per row range.
///
/// `ranges` must be contiguous and start at row 0, as produced by
/// [`row_ranges`].
pub fn split_rows_mut<'a>(
    mut plane: &'a mut [u8],
    width: usize,
    ranges: &[Range<usize>],
) -> Vec<&'a mut [u8]> {
    let mut parts = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut plane).split_at_mut(range.len() * width);
        parts.push(head);
        plane = tail;
    }
    parts
}
