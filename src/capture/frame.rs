//! Frame type representing a captured RGBA image with metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Aspect ratio assumed when the native stream size cannot be read.
const FALLBACK_ASPECT: f64 = 4.0 / 3.0;

/// Errors raised while building a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("pixel buffer holds {actual} bytes, expected {expected} for the given dimensions")]
    BufferLength { expected: usize, actual: usize },
}

/// A single RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Creates a pixel from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Reads a pixel from a 4-byte RGBA chunk.
    #[inline]
    pub(crate) fn from_chunk(chunk: &[u8]) -> Self {
        Self {
            r: chunk[0],
            g: chunk[1],
            b: chunk[2],
            a: chunk[3],
        }
    }

    /// Returns the channels as an RGBA byte array.
    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Creates a new set of dimensions.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales a native stream size down (or up) to `target_width`,
    /// keeping the aspect ratio.
    ///
    /// Falls back to a 4:3 aspect when the native size has a zero side.
    pub fn fit_to_width(native: Dimensions, target_width: u32) -> Self {
        let height = if native.is_empty() {
            f64::from(target_width) / FALLBACK_ASPECT
        } else {
            f64::from(native.height) * f64::from(target_width) / f64::from(native.width)
        };

        Self {
            width: target_width,
            height: height.round() as u32,
        }
    }

    /// True when either side is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns the RGBA buffer length for these dimensions.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    /// Returns the length of one RGBA row in bytes.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single captured frame.
///
/// Row-major RGBA with the origin at the top-left. A frame is never
/// mutated once built; the engine takes ownership of it and either drops
/// it or keeps it as the reference for the next temporal diff.
#[derive(Clone)]
pub struct Frame {
    /// Raw RGBA bytes, `dimensions.byte_len()` long.
    pixels: Vec<u8>,
    dimensions: Dimensions,
    /// Capture timestamp.
    timestamp: Instant,
    /// Monotonic sequence number assigned by the source.
    sequence: u64,
}

impl Frame {
    /// Builds a frame from an RGBA buffer.
    ///
    /// Fails if the buffer length doesn't match `width * height * 4`.
    pub fn from_rgba(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        sequence: u64,
    ) -> Result<Self, FrameError> {
        let dimensions = Dimensions::new(width, height);
        if pixels.len() != dimensions.byte_len() {
            return Err(FrameError::BufferLength {
                expected: dimensions.byte_len(),
                actual: pixels.len(),
            });
        }

        Ok(Self {
            pixels,
            dimensions,
            timestamp: Instant::now(),
            sequence,
        })
    }

    /// Builds a frame where every pixel has the same colour.
    pub fn filled(dimensions: Dimensions, pixel: Rgba, sequence: u64) -> Self {
        Self {
            pixels: pixel.to_array().repeat(dimensions.pixel_count()),
            dimensions,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Returns the raw RGBA bytes.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let offset = (y as usize * self.dimensions.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some(Rgba::from_chunk(&self.pixels[offset..offset + BYTES_PER_PIXEL]))
    }

    /// Iterates over the frame's rows as RGBA byte slices.
    pub(crate) fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.dimensions.row_len().max(1))
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Returns the sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("dimensions", &self.dimensions)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
