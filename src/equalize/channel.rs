//! Flat single-channel views into a [`PixelBuffer`].
//!
//! A channel is the unit of work for every strategy. Because the buffer is
//! planar, extraction is a borrow of the plane, not a copy.

use std::ops::Range;

use super::buffer::{Channel, PixelBuffer};
use super::error::{EqualizeError, Result};

/// Read-only, row-major intensities of one channel.
///
/// Index `i` corresponds to pixel `(i / width, i % width)`.
#[derive(Debug, Clone, Copy)]
pub struct ChannelView<'a> {
    channel: Channel,
    width: usize,
    height: u32,
    values: &'a [u8],
}

impl<'a> ChannelView<'a> {
    /// View `channel` of `buffer`.
    pub fn extract(buffer: &'a PixelBuffer, channel: Channel) -> Self {
        Self {
            channel,
            width: buffer.width() as usize,
            height: buffer.height(),
            values: buffer.plane(channel),
        }
    }

    #[inline]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        self.values
    }

    /// `(row, col)` of flat index `i`.
    #[inline]
    pub fn position(&self, i: usize) -> (usize, usize) {
        (i / self.width, i % self.width)
    }

    /// Flat index range covering `rows`.
    #[inline]
    pub fn row_span(&self, rows: &Range<usize>) -> Range<usize> {
        rows.start * self.width..rows.end * self.width
    }

    /// Intensities of the pixels in `rows`.
    #[inline]
    pub fn rows(&self, rows: &Range<usize>) -> &'a [u8] {
        &self.values[self.row_span(rows)]
    }

    /// Owned copy of the channel.
    pub fn to_vec(&self) -> Vec<u8> {
        self.values.to_vec()
    }
}

/// Write a flat channel array back into `buffer`.
///
/// Fails with `InvalidDimensions` if `values` is not exactly one plane long.
pub fn insert_channel(buffer: &mut PixelBuffer, channel: Channel, values: &[u8]) -> Result<()> {
    if values.len() != buffer.pixel_count() {
        return Err(EqualizeError::dimensions(
            buffer.width(),
            buffer.height(),
            format!(
                "{channel} channel has {} values, expected {}",
                values.len(),
                buffer.pixel_count()
            ),
        ));
    }
    buffer.plane_mut(channel).copy_from_slice(values);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelBuffer {
        // 3x2 image, red = 0..6, green = 10..16, blue = 20..26
        let data: Vec<u8> = (0..6u8).flat_map(|i| [i, 10 + i, 20 + i]).collect();
        PixelBuffer::from_interleaved(3, 2, &data).unwrap()
    }

    #[test]
    fn test_extract_is_row_major() {
        let buffer = sample();
        let view = ChannelView::extract(&buffer, Channel::Green);

        assert_eq!(view.channel(), Channel::Green);
        assert_eq!(view.as_slice(), &[10, 11, 12, 13, 14, 15]);
        assert_eq!(view.position(4), (1, 1));
        assert_eq!(buffer.get(1, 1).unwrap()[1], view.as_slice()[4]);
    }

    #[test]
    fn test_rows_slice() {
        let buffer = sample();
        let view = ChannelView::extract(&buffer, Channel::Blue);

        assert_eq!(view.rows(&(1..2)), &[23, 24, 25]);
        assert_eq!(view.row_span(&(0..2)), 0..6);
    }

    #[test]
    fn test_insert_round_trips_one_channel() {
        let mut buffer = sample();
        insert_channel(&mut buffer, Channel::Red, &[9, 9, 9, 8, 8, 8]).unwrap();

        assert_eq!(buffer.get(0, 0), Some([9, 10, 20]));
        assert_eq!(buffer.get(1, 2), Some([8, 15, 25]));
    }

    #[test]
    fn test_insert_rejects_wrong_length() {
        let mut buffer = sample();
        let result = insert_channel(&mut buffer, Channel::Red, &[1, 2, 3]);
        assert!(matches!(result, Err(EqualizeError::InvalidDimensions { .. })));
        // untouched on failure
        assert_eq!(buffer, sample());
    }
}
