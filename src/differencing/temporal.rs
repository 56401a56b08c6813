//! Temporal differencing between consecutive frames.
//!
//! Static content cancels out; only what changed since the retained frame
//! lights up in the output.

use super::{image::write_pixel, kernel::magnitude_of_chunks, DiffImage, DimensionMismatch};
use crate::capture::{Frame, BYTES_PER_PIXEL};

/// Computes the motion image between `current` and `previous`.
///
/// With no previous frame there is no motion data yet and the result is
/// an all-default image of `current`'s dimensions.
pub fn compute_motion(
    current: &Frame,
    previous: Option<&Frame>,
) -> Result<DiffImage, DimensionMismatch> {
    let mut image = DiffImage::new(current.dimensions(), current.sequence());

    let Some(previous) = previous else {
        return Ok(image);
    };

    if previous.dimensions() != current.dimensions() {
        return Err(DimensionMismatch {
            expected: previous.dimensions(),
            actual: current.dimensions(),
        });
    }

    current
        .pixels()
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(previous.pixels().chunks_exact(BYTES_PER_PIXEL))
        .zip(image.pixels_mut())
        .for_each(|((c, p), out)| write_pixel(out, magnitude_of_chunks(c, p)));

    Ok(image)
}

/// Holds the previous frame across ticks.
pub struct TemporalDifferencer {
    /// Previous frame for differencing.
    previous: Option<Frame>,
}

impl TemporalDifferencer {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Diffs `current` against the retained frame, then retains `current`.
    ///
    /// On a dimension mismatch the retained frame is left untouched.
    pub fn difference(&mut self, current: Frame) -> Result<DiffImage, DimensionMismatch> {
        let image = compute_motion(&current, self.previous.as_ref())?;

        self.previous = Some(current);

        Ok(image)
    }

    /// Drops the retained frame.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Returns true if a frame is retained.
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Returns the retained frame, if any.
    pub fn previous(&self) -> Option<&Frame> {
        self.previous.as_ref()
    }
}

impl Default for TemporalDifferencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Dimensions, Rgba};

    fn gray(level: u8, sequence: u64) -> Frame {
        Frame::filled(
            Dimensions::new(8, 8),
            Rgba::new(level, level, level, 255),
            sequence,
        )
    }

    #[test]
    fn test_no_previous_is_default() {
        let frame = gray(100, 1);
        let image = compute_motion(&frame, None).unwrap();

        assert_eq!(image.dimensions(), Dimensions::new(8, 8));
        assert!(image.is_default());
    }

    #[test]
    fn test_same_frame_is_zero() {
        let pixels: Vec<u8> = (0..64u32).flat_map(|i| [i as u8, (i * 3) as u8, 7, 255]).collect();
        let frame = Frame::from_rgba(pixels, 8, 8, 1).unwrap();
        let image = compute_motion(&frame, Some(&frame)).unwrap();

        assert!(image
            .as_rgba()
            .chunks_exact(4)
            .all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let current = gray(10, 2);
        let previous = Frame::filled(Dimensions::new(4, 4), Rgba::default(), 1);

        let err = compute_motion(&current, Some(&previous)).unwrap_err();
        assert_eq!(err.expected, Dimensions::new(4, 4));
        assert_eq!(err.actual, Dimensions::new(8, 8));
    }

    #[test]
    fn test_first_frame_primes() {
        let mut diff = TemporalDifferencer::new();

        let image = diff.difference(gray(100, 1)).unwrap();
        assert!(image.is_default());
        assert!(diff.is_primed());
    }

    #[test]
    fn test_second_frame_returns_difference() {
        let mut diff = TemporalDifferencer::new();

        diff.difference(gray(100, 1)).unwrap();
        let image = diff.difference(gray(150, 2)).unwrap();

        // All pixels should have difference of 50
        assert!(image.magnitudes().all(|m| m == 50));
        assert_eq!(diff.previous().map(Frame::sequence), Some(2));
    }

    #[test]
    fn test_mismatch_keeps_retained_frame() {
        let mut diff = TemporalDifferencer::new();
        diff.difference(gray(100, 1)).unwrap();

        let odd = Frame::filled(Dimensions::new(2, 2), Rgba::default(), 2);
        assert!(diff.difference(odd).is_err());
        assert_eq!(diff.previous().map(Frame::sequence), Some(1));
    }

    #[test]
    fn test_reset_requires_new_prime() {
        let mut diff = TemporalDifferencer::new();

        diff.difference(gray(100, 1)).unwrap();
        assert!(diff.is_primed());

        diff.reset();
        assert!(!diff.is_primed());
        assert!(diff.difference(gray(200, 2)).unwrap().is_default());
    }
}
