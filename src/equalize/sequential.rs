//! Single-threaded equalization. Every other strategy must match its output
//! byte for byte.

use tracing::{debug, trace};

use super::buffer::{Channel, PixelBuffer};
use super::channel::{insert_channel, ChannelView};
use super::error::Result;
use super::histogram::Histogram;
use super::lookup::{compute_lookup, LookupTable};
use super::workers::Phase;
use super::{validate_output, Equalize};

/// Processes the three channels one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialEqualizer;

/// Histogram, lookup and remap of one whole channel.
///
/// # Returns
/// The lookup table and the remapped intensities
pub fn equalize_channel(values: &[u8], total_pixels: u32) -> (LookupTable, Vec<u8>) {
    let hist = Histogram::build(values);
    let lut = compute_lookup(&hist, total_pixels);
    let equalized = values.iter().map(|&v| lut.map(v)).collect();
    (lut, equalized)
}

impl Equalize for SequentialEqualizer {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn equalize_into(&self, input: &PixelBuffer, output: &mut PixelBuffer) -> Result<()> {
        let total = validate_output(input, output)?;
        debug!(strategy = self.name(), width = input.width(), height = input.height(), "equalizing");

        for channel in Channel::ALL {
            trace!(%channel, phase = %Phase::Extracting, "channel view");
            let view = ChannelView::extract(input, channel);

            let (lut, equalized) = equalize_channel(view.as_slice(), total);
            trace!(%channel, phase = %Phase::Applying, flat = lut.is_zero(), "remapped channel");
            insert_channel(output, channel, &equalized)?;
        }

        debug!(strategy = self.name(), phase = %Phase::Done, "equalized");
        Ok(())
    }
}
