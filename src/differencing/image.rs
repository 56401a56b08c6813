//! Grayscale difference image handed to the sink.

use crate::capture::{Dimensions, BYTES_PER_PIXEL};

/// Value of an output pixel that received no computed magnitude.
pub const DEFAULT_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// An RGBA raster where R, G and B of each pixel carry a magnitude and
/// alpha is always fully opaque.
///
/// Every pixel starts out as [`DEFAULT_PIXEL`]. Owned by the engine while
/// it is computed, then moved into the sink.
#[derive(Clone, PartialEq, Eq)]
pub struct DiffImage {
    data: Vec<u8>,
    dimensions: Dimensions,
    /// Sequence number of the frame this image was computed from.
    source_sequence: u64,
}

impl DiffImage {
    /// Creates an all-default image.
    pub fn new(dimensions: Dimensions, source_sequence: u64) -> Self {
        Self {
            data: DEFAULT_PIXEL.repeat(dimensions.pixel_count()),
            dimensions,
            source_sequence,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[inline]
    pub fn source_sequence(&self) -> u64 {
        self.source_sequence
    }

    /// Magnitude stored at `(x, y)`, or `None` outside the image.
    pub fn magnitude_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }
        let offset = (y as usize * self.dimensions.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some(self.data[offset])
    }

    /// Writes `(m, m, m, 255)` at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn set_magnitude(&mut self, x: u32, y: u32, magnitude: u8) {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return;
        }
        let offset = (y as usize * self.dimensions.width as usize + x as usize) * BYTES_PER_PIXEL;
        write_pixel(&mut self.data[offset..offset + BYTES_PER_PIXEL], magnitude);
    }

    /// Magnitudes in row-major order.
    pub fn magnitudes(&self) -> impl Iterator<Item = u8> + '_ {
        self.data.chunks_exact(BYTES_PER_PIXEL).map(|p| p[0])
    }

    /// Returns the raw RGBA bytes.
    #[inline]
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image, returning the RGBA bytes.
    pub fn into_rgba(self) -> Vec<u8> {
        self.data
    }

    /// True when no pixel was touched since creation.
    pub fn is_default(&self) -> bool {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .all(|p| p == DEFAULT_PIXEL)
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data
            .chunks_exact_mut(self.dimensions.row_len().max(1))
    }

    pub(crate) fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(BYTES_PER_PIXEL)
    }
}

/// Writes a computed magnitude into a 4-byte output pixel.
#[inline]
pub(crate) fn write_pixel(out: &mut [u8], magnitude: u8) {
    out[0] = magnitude;
    out[1] = magnitude;
    out[2] = magnitude;
    out[3] = 255;
}

impl std::fmt::Debug for DiffImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffImage")
            .field("dimensions", &self.dimensions)
            .field("source_sequence", &self.source_sequence)
            .finish()
    }
}
