//! Per-channel histogram equalization of RGB images.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGB8 | (H, W, 3) | u8 | Red, green, blue, 0-255 |
//!
//! Each channel is equalized independently: histogram, cumulative
//! distribution, a 256-entry lookup table, then a remap of every pixel.
//!
//! ## Strategies
//!
//! | Strategy | Workers | Histogram |
//! |----------|---------|-----------|
//! | [`SequentialEqualizer`] | calling thread | one per channel |
//! | [`ChannelParallelEqualizer`] | one per channel | one per worker |
//! | [`SpatialSharedHistogramEqualizer`] | row partitions | one atomic array per channel |
//! | [`SpatialLocalHistogramEqualizer`] | row partitions | private per worker, then reduced |
//!
//! All strategies produce byte-identical output for every valid worker count.
//! The input buffer is never modified.

pub mod buffer;
pub mod channel;
pub mod channel_parallel;
pub mod config;
pub mod error;
pub mod histogram;
pub mod lookup;
pub mod partition;
pub mod sequential;
pub mod spatial;
pub mod workers;

pub use buffer::{Channel, PixelBuffer, CHANNELS};
pub use channel::{insert_channel, ChannelView};
pub use channel_parallel::ChannelParallelEqualizer;
pub use config::{Equalizer, EqualizerConfig, Strategy};
pub use error::{EqualizeError, Result};
pub use histogram::{AtomicHistogram, Histogram, LEVELS};
pub use lookup::{compute_lookup, Cdf, LookupTable};
pub use sequential::SequentialEqualizer;
pub use spatial::{SpatialLocalHistogramEqualizer, SpatialSharedHistogramEqualizer};
pub use workers::Phase;

/// An equalization engine.
///
/// Implementations validate everything before writing to `output`; on error
/// the output buffer is left as it was.
pub trait Equalize: Send + Sync {
    /// Stable strategy name, as accepted by [`Strategy`]'s `FromStr`.
    fn name(&self) -> &'static str;

    /// Equalize `input` into `output`, which must have the same dimensions.
    fn equalize_into(&self, input: &PixelBuffer, output: &mut PixelBuffer) -> Result<()>;

    /// Equalize `input` into a newly allocated buffer.
    fn equalize(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        let mut output = input.allocate_like();
        self.equalize_into(input, &mut output)?;
        Ok(output)
    }
}

/// Check `output` against `input` and return the pixel count per channel.
pub(crate) fn validate_output(input: &PixelBuffer, output: &PixelBuffer) -> Result<u32> {
    input.ensure_same_dimensions(output)?;
    u32::try_from(input.pixel_count()).map_err(|_| {
        EqualizeError::dimensions(
            input.width(),
            input.height(),
            "pixel count exceeds the 32-bit histogram range",
        )
    })
}

// ============================================================================
// Convenience entry points
// ============================================================================

/// Equalize on the calling thread.
pub fn equalize_sequential(input: &PixelBuffer) -> Result<PixelBuffer> {
    SequentialEqualizer.equalize(input)
}

/// Equalize with one worker per channel.
pub fn equalize_channel_parallel(input: &PixelBuffer) -> Result<PixelBuffer> {
    ChannelParallelEqualizer.equalize(input)
}

/// Equalize with `num_workers` row partitions sharing an atomic histogram.
///
/// # Arguments
/// * `input` - Source image
/// * `num_workers` - Row partitions, `1..=height`
pub fn equalize_spatial_shared_histogram(
    input: &PixelBuffer,
    num_workers: u32,
) -> Result<PixelBuffer> {
    SpatialSharedHistogramEqualizer::new(num_workers).equalize(input)
}

/// Equalize with `num_workers` row partitions and reduced private histograms.
///
/// # Arguments
/// * `input` - Source image
/// * `num_workers` - Row partitions, `1..=height`
pub fn equalize_spatial_local_histogram(
    input: &PixelBuffer,
    num_workers: u32,
) -> Result<PixelBuffer> {
    SpatialLocalHistogramEqualizer::new(num_workers).equalize(input)
}
