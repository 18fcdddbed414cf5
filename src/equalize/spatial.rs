//! Row-partitioned strategies.
//!
//! Both strategies split the image into `workers` contiguous row ranges and
//! process the channels one at a time:
//!
//! | Strategy | Counting | Combining |
//! |----------|----------|-----------|
//! | [`SpatialSharedHistogramEqualizer`] | every worker increments one [`AtomicHistogram`] | snapshot after join |
//! | [`SpatialLocalHistogramEqualizer`] | every worker returns its own [`Histogram`] | element-wise reduction after join |
//!
//! The remap is applied with the same partitioning; each worker owns a
//! disjoint `&mut` row slice of the output plane.

use std::ops::Range;

use rayon::prelude::*;
use tracing::{debug, trace};

use super::buffer::{Channel, PixelBuffer};
use super::channel::ChannelView;
use super::error::Result;
use super::histogram::{AtomicHistogram, Histogram};
use super::lookup::{compute_lookup, LookupTable};
use super::partition::{row_ranges, split_rows_mut};
use super::workers::{run_phase, Phase};
use super::{validate_output, Equalize};

// ============================================================================
// Counting
// ============================================================================

/// Count `view` into `shared`, one task per row range.
pub fn count_shared(view: ChannelView<'_>, ranges: &[Range<usize>], shared: &AtomicHistogram) {
    ranges.par_iter().for_each(|rows| {
        trace!(channel = %view.channel(), start = rows.start, end = rows.end, "counting rows");
        shared.record_all(view.rows(rows));
    });
}

/// Private histogram of every row range, in range order.
pub fn count_local(view: ChannelView<'_>, ranges: &[Range<usize>]) -> Vec<Histogram> {
    ranges
        .par_iter()
        .map(|rows| {
            trace!(channel = %view.channel(), start = rows.start, end = rows.end, "counting rows");
            Histogram::build(view.rows(rows))
        })
        .collect()
}

/// Whole-channel histogram built by `workers` tasks sharing one atomic
/// counter array.
pub fn shared_histogram(view: ChannelView<'_>, workers: u32) -> Result<Histogram> {
    let ranges = row_ranges(view.height(), workers)?;
    let shared = AtomicHistogram::new();
    run_phase(Phase::Counting, || count_shared(view, &ranges, &shared))?;
    Ok(shared.snapshot())
}

/// Whole-channel histogram built by `workers` tasks with private histograms
/// and a final reduction.
pub fn local_histogram(view: ChannelView<'_>, workers: u32) -> Result<Histogram> {
    let ranges = row_ranges(view.height(), workers)?;
    let parts = run_phase(Phase::Counting, || count_local(view, &ranges))?;
    Ok(Histogram::reduce(&parts))
}

// ============================================================================
// Applying
// ============================================================================

/// Remap `view` into `dst`, one task per row range.
pub fn apply_partitioned(
    lut: &LookupTable,
    view: ChannelView<'_>,
    dst: &mut [u8],
    ranges: &[Range<usize>],
) {
    split_rows_mut(dst, view.width(), ranges)
        .into_par_iter()
        .zip(ranges.par_iter())
        .for_each(|(dst_rows, rows)| lut.apply(view.rows(rows), dst_rows));
}

// ============================================================================
// Shared histogram strategy
// ============================================================================

/// Row-partitioned workers incrementing one lock-free histogram per channel.
#[derive(Debug, Clone, Copy)]
pub struct SpatialSharedHistogramEqualizer {
    workers: u32,
}

impl SpatialSharedHistogramEqualizer {
    pub fn new(workers: u32) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }
}

impl Equalize for SpatialSharedHistogramEqualizer {
    fn name(&self) -> &'static str {
        "spatial-shared"
    }

    fn equalize_into(&self, input: &PixelBuffer, output: &mut PixelBuffer) -> Result<()> {
        let total = validate_output(input, output)?;
        let ranges = row_ranges(input.height(), self.workers)?;
        debug!(strategy = self.name(), workers = self.workers, width = input.width(), height = input.height(), "equalizing");

        let shared = AtomicHistogram::new();
        for channel in Channel::ALL {
            let view = ChannelView::extract(input, channel);

            shared.reset();
            run_phase(Phase::Counting, || count_shared(view, &ranges, &shared))?;

            trace!(%channel, phase = %Phase::MappingLookup, "building lookup");
            let lut = compute_lookup(&shared.snapshot(), total);

            let dst = output.plane_mut(channel);
            run_phase(Phase::Applying, || apply_partitioned(&lut, view, dst, &ranges))?;
        }

        debug!(strategy = self.name(), phase = %Phase::Done, "equalized");
        Ok(())
    }
}

// ============================================================================
// Local histogram strategy
// ============================================================================

/// Row-partitioned workers with private histograms merged by reduction.
#[derive(Debug, Clone, Copy)]
pub struct SpatialLocalHistogramEqualizer {
    workers: u32,
}

impl SpatialLocalHistogramEqualizer {
    pub fn new(workers: u32) -> Self {
        Self { workers }
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }
}

impl Equalize for SpatialLocalHistogramEqualizer {
    fn name(&self) -> &'static str {
        "spatial-local"
    }

    fn equalize_into(&self, input: &PixelBuffer, output: &mut PixelBuffer) -> Result<()> {
        let total = validate_output(input, output)?;
        let ranges = row_ranges(input.height(), self.workers)?;
        debug!(strategy = self.name(), workers = self.workers, width = input.width(), height = input.height(), "equalizing");

        for channel in Channel::ALL {
            let view = ChannelView::extract(input, channel);

            let parts = run_phase(Phase::Counting, || count_local(view, &ranges))?;

            trace!(%channel, phase = %Phase::Reducing, parts = parts.len(), "merging histograms");
            let hist = Histogram::reduce(&parts);

            trace!(%channel, phase = %Phase::MappingLookup, "building lookup");
            let lut = compute_lookup(&hist, total);

            let dst = output.plane_mut(channel);
            run_phase(Phase::Applying, || apply_partitioned(&lut, view, dst, &ranges))?;
        }

        debug!(strategy = self.name(), phase = %Phase::Done, "equalized");
        Ok(())
    }
}
