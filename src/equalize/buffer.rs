//! Planar RGB pixel buffer.
//!
//! Pixels are stored as three independent intensity planes rather than packed
//! RGB triples. Each plane is a row-major `width * height` array, so workers
//! that own different channels (or different row ranges of one channel)
//! borrow disjoint memory and never need a lock.
//!
//! ## Conversions
//!
//! | Source | Layout | Function |
//! |--------|--------|----------|
//! | Packed bytes | `[r, g, b, r, g, b, ...]` | [`PixelBuffer::from_interleaved`] |
//! | ndarray | `(height, width, 3)` u8 | [`PixelBuffer::from_array`] |
//! | Planes | three `Vec<u8>` | [`PixelBuffer::from_planes`] |

use std::fmt;

use ndarray::{Array3, ArrayView3};

use super::error::{EqualizeError, Result};

/// Number of color channels in a [`PixelBuffer`].
pub const CHANNELS: usize = 3;

// ============================================================================
// Channel
// ============================================================================

/// One of the three independently equalized color planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in plane order.
    pub const ALL: [Channel; CHANNELS] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Plane index of this channel (0 = red, 1 = green, 2 = blue).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Channel {
    type Error = EqualizeError;

    fn try_from(index: usize) -> Result<Self> {
        Channel::ALL
            .get(index)
            .copied()
            .ok_or(EqualizeError::ChannelIndexOutOfRange { index })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// An RGB image with 8-bit intensities held in separate channel planes.
///
/// Width and height are always non-zero and every plane holds exactly
/// `width * height` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    planes: [Vec<u8>; CHANNELS],
}

impl PixelBuffer {
    /// Allocate a black image.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            planes: [vec![0; len], vec![0; len], vec![0; len]],
        })
    }

    /// Build from three row-major planes in red, green, blue order.
    pub fn from_planes(width: u32, height: u32, planes: [Vec<u8>; CHANNELS]) -> Result<Self> {
        let len = checked_len(width, height)?;
        for (channel, plane) in Channel::ALL.iter().zip(planes.iter()) {
            if plane.len() != len {
                return Err(EqualizeError::dimensions(
                    width,
                    height,
                    format!("{channel} plane has {} values, expected {len}", plane.len()),
                ));
            }
        }
        Ok(Self {
            width,
            height,
            planes,
        })
    }

    /// Build from packed `[r, g, b]` bytes in row-major order.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `data` - Packed RGB bytes (length = width * height * 3)
    pub fn from_interleaved(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let len = checked_len(width, height)?;
        if data.len() != len * CHANNELS {
            return Err(EqualizeError::dimensions(
                width,
                height,
                format!("expected {} packed RGB bytes, got {}", len * CHANNELS, data.len()),
            ));
        }

        let mut planes = [
            Vec::with_capacity(len),
            Vec::with_capacity(len),
            Vec::with_capacity(len),
        ];
        for pixel in data.chunks_exact(CHANNELS) {
            planes[0].push(pixel[0]);
            planes[1].push(pixel[1]);
            planes[2].push(pixel[2]);
        }

        Ok(Self {
            width,
            height,
            planes,
        })
    }

    /// Build from an ndarray image of shape (height, width, 3).
    pub fn from_array(input: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = input.dim();
        if channels != CHANNELS {
            return Err(EqualizeError::UnsupportedChannels { channels });
        }
        let (width, height) = match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => (w, h),
            (w, h) => {
                return Err(EqualizeError::dimensions(
                    w.unwrap_or(u32::MAX),
                    h.unwrap_or(u32::MAX),
                    format!("array of {width}x{height} pixels exceeds the u32 dimension range"),
                ))
            }
        };

        let mut buffer = Self::new(width, height)?;
        let row_len = width as usize;
        for ((y, x, c), &v) in input.indexed_iter() {
            buffer.planes[c][y * row_len + x] = v;
        }
        Ok(buffer)
    }

    /// Convert to an ndarray image of shape (height, width, 3).
    pub fn to_array(&self) -> Array3<u8> {
        let width = self.width as usize;
        Array3::from_shape_fn(
            (self.height as usize, width, CHANNELS),
            |(y, x, c)| self.planes[c][y * width + x],
        )
    }

    /// Convert to packed `[r, g, b]` bytes in row-major order.
    pub fn to_interleaved(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixel_count() * CHANNELS);
        for i in 0..self.pixel_count() {
            data.push(self.planes[0][i]);
            data.push(self.planes[1][i]);
            data.push(self.planes[2][i]);
        }
        data
    }

    /// Allocate a black image with the same dimensions.
    pub fn allocate_like(&self) -> Self {
        let len = self.pixel_count();
        Self {
            width: self.width,
            height: self.height,
            planes: [vec![0; len], vec![0; len], vec![0; len]],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (length of every plane).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.planes[0].len()
    }

    /// RGB value at `(row, col)`, or `None` outside the image.
    pub fn get(&self, row: u32, col: u32) -> Option<[u8; CHANNELS]> {
        let i = self.offset(row, col)?;
        Some([self.planes[0][i], self.planes[1][i], self.planes[2][i]])
    }

    /// Overwrite the RGB value at `(row, col)`. Returns `false` outside the image.
    pub fn set(&mut self, row: u32, col: u32, rgb: [u8; CHANNELS]) -> bool {
        match self.offset(row, col) {
            Some(i) => {
                for (plane, value) in self.planes.iter_mut().zip(rgb) {
                    plane[i] = value;
                }
                true
            }
            None => false,
        }
    }

    /// Row-major intensities of one channel.
    #[inline]
    pub fn plane(&self, channel: Channel) -> &[u8] {
        &self.planes[channel.index()]
    }

    #[inline]
    pub(crate) fn plane_mut(&mut self, channel: Channel) -> &mut [u8] {
        &mut self.planes[channel.index()]
    }

    #[inline]
    pub(crate) fn planes(&self) -> &[Vec<u8>; CHANNELS] {
        &self.planes
    }

    #[inline]
    pub(crate) fn planes_mut(&mut self) -> &mut [Vec<u8>; CHANNELS] {
        &mut self.planes
    }

    /// Fail unless `other` has the same width and height.
    pub fn ensure_same_dimensions(&self, other: &PixelBuffer) -> Result<()> {
        if self.width == other.width && self.height == other.height {
            Ok(())
        } else {
            Err(EqualizeError::dimensions(
                other.width,
                other.height,
                format!("output must match input size {}x{}", self.width, self.height),
            ))
        }
    }

    fn offset(&self, row: u32, col: u32) -> Option<usize> {
        if row < self.height && col < self.width {
            Some(row as usize * self.width as usize + col as usize)
        } else {
            None
        }
    }
}

fn checked_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(EqualizeError::dimensions(
            width,
            height,
            "width and height must be non-zero",
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| EqualizeError::dimensions(width, height, "pixel count overflows usize"))
}
