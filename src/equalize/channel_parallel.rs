//! One worker per color channel.
//!
//! Each worker reads its input plane, builds the histogram and lookup for
//! that channel and writes its own output plane. Output planes are separate
//! allocations, so each worker holds an exclusive `&mut` to its plane and the
//! three writers never contend for a pixel.
//!
//! The three workers are rayon tasks. They run concurrently when the pool has
//! at least three threads; on a smaller pool (for example `threads = 1`) rayon
//! runs them one after another. The result is the same either way.

use rayon::prelude::*;
use tracing::{debug, trace};

use super::buffer::{Channel, PixelBuffer};
use super::error::Result;
use super::histogram::Histogram;
use super::lookup::{compute_lookup, LookupTable};
use super::workers::{run_phase, Phase};
use super::{validate_output, Equalize};

/// Spawns exactly three tasks, one per channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelParallelEqualizer;

impl ChannelParallelEqualizer {
    /// Equalize all channels concurrently and return each worker's lookup
    /// table in channel order.
    pub fn equalize_with_tables(
        &self,
        input: &PixelBuffer,
        output: &mut PixelBuffer,
    ) -> Result<Vec<(Channel, LookupTable)>> {
        let total = validate_output(input, output)?;
        debug!(strategy = self.name(), width = input.width(), height = input.height(), "equalizing");

        let tables = equalize_planes(input, output, total, Histogram::build)?;

        debug!(strategy = self.name(), phase = %Phase::Done, "equalized");
        Ok(tables)
    }
}

/// One task per channel: count with `count`, map, apply.
///
/// Each stage runs under its own [`Phase`], so a failing worker is reported
/// with the stage it failed in.
fn equalize_planes<F>(
    input: &PixelBuffer,
    output: &mut PixelBuffer,
    total: u32,
    count: F,
) -> Result<Vec<(Channel, LookupTable)>>
where
    F: Fn(&[u8]) -> Histogram + Sync,
{
    let src_planes = input.planes();
    let dst_planes = output.planes_mut();

    Channel::ALL
        .par_iter()
        .zip(src_planes.par_iter())
        .zip(dst_planes.par_iter_mut())
        .map(|((&channel, src), dst)| {
            trace!(%channel, phase = %Phase::Counting, "channel worker started");
            let hist = run_phase(Phase::Counting, || count(src))?;
            let lut = run_phase(Phase::MappingLookup, || compute_lookup(&hist, total))?;
            run_phase(Phase::Applying, || lut.apply(src, dst))?;
            Ok((channel, lut))
        })
        .collect()
}

impl Equalize for ChannelParallelEqualizer {
    fn name(&self) -> &'static str {
        "channel-parallel"
    }

    fn equalize_into(&self, input: &PixelBuffer, output: &mut PixelBuffer) -> Result<()> {
        self.equalize_with_tables(input, output).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equalize::sequential::SequentialEqualizer;
    use crate::equalize::EqualizeError;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let data: Vec<u8> = (0..width * height)
            .flat_map(|i| [(i % 200) as u8, (i * 7 % 256) as u8, (255 - i % 97) as u8])
            .collect();
        PixelBuffer::from_interleaved(width, height, &data).unwrap()
    }

    #[test]
    fn test_matches_sequential() {
        let input = gradient(37, 23);

        let expected = SequentialEqualizer.equalize(&input).unwrap();
        let result = ChannelParallelEqualizer.equalize(&input).unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn test_returns_one_table_per_channel() {
        let input = gradient(8, 8);
        let mut output = input.allocate_like();

        let tables = ChannelParallelEqualizer
            .equalize_with_tables(&input, &mut output)
            .unwrap();

        let channels: Vec<Channel> = tables.iter().map(|(c, _)| *c).collect();
        assert_eq!(channels, Channel::ALL.to_vec());
        for (channel, lut) in &tables {
            let src = input.plane(*channel);
            let dst = output.plane(*channel);
            assert!(src.iter().zip(dst).all(|(&s, &d)| lut.map(s) == d));
        }
    }

    #[test]
    fn test_counting_panic_reports_counting_phase() {
        let input = gradient(6, 4);
        let mut output = input.allocate_like();

        let result = equalize_planes(&input, &mut output, 24, |values| {
            if std::ptr::eq(values.as_ptr(), input.plane(Channel::Green).as_ptr()) {
                panic!("green histogram failed");
            }
            Histogram::build(values)
        });

        match result {
            Err(EqualizeError::WorkerFailed { phase, message }) => {
                assert_eq!(phase, Phase::Counting);
                assert_eq!(message, "green histogram failed");
            }
            other => panic!("expected a counting failure, got {other:?}"),
        }
    }

    #[test]
    fn test_single_thread_pool_matches_sequential() {
        let input = gradient(17, 9);
        let expected = SequentialEqualizer.equalize(&input).unwrap();

        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let result = pool.install(|| ChannelParallelEqualizer.equalize(&input)).unwrap();

        assert_eq!(result, expected);
    }

    #[test]
    fn test_single_pixel_image() {
        let input = PixelBuffer::from_interleaved(1, 1, &[10, 200, 0]).unwrap();
        let output = ChannelParallelEqualizer.equalize(&input).unwrap();
        assert_eq!(output.get(0, 0), Some([0, 0, 0]));
    }
}
