//! Spatial contour detection.
//!
//! Each pixel is compared with its right-hand neighbour in the same row.
//! The last column has no neighbour and keeps the default value; rows
//! never wrap into one another.

use super::{image::write_pixel, kernel::magnitude_of_chunks, DiffImage};
use crate::capture::{Frame, BYTES_PER_PIXEL};

/// Computes the horizontal edge image of a single frame.
pub fn compute_contour(frame: &Frame) -> DiffImage {
    let mut image = DiffImage::new(frame.dimensions(), frame.sequence());

    for (row, out_row) in frame.rows().zip(image.rows_mut()) {
        let left = row.chunks_exact(BYTES_PER_PIXEL);
        let right = row.chunks_exact(BYTES_PER_PIXEL).skip(1);

        // `right` is one pixel shorter, so the last column is never written.
        left.zip(right)
            .zip(out_row.chunks_exact_mut(BYTES_PER_PIXEL))
            .for_each(|((a, b), out)| write_pixel(out, magnitude_of_chunks(a, b)));
    }

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Dimensions, Rgba};

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn frame_from(pixels: &[[u8; 4]], width: u32, height: u32) -> Frame {
        Frame::from_rgba(pixels.concat(), width, height, 1).unwrap()
    }

    #[test]
    fn test_single_row_edges() {
        let frame = frame_from(&[BLACK, WHITE, BLACK, BLACK], 4, 1);
        let image = compute_contour(&frame);

        assert_eq!(image.magnitude_at(0, 0), Some(255));
        assert_eq!(image.magnitude_at(1, 0), Some(255));
        assert_eq!(image.magnitude_at(2, 0), Some(0));
        // Last column keeps the default pixel
        assert_eq!(&image.as_rgba()[12..16], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_uniform_frame_is_zero() {
        let frame = Frame::filled(Dimensions::new(5, 3), Rgba::new(90, 40, 200, 255), 1);
        let image = compute_contour(&frame);

        assert!(image.magnitudes().all(|m| m == 0));
        assert!(image.as_rgba().chunks_exact(4).all(|p| p[3] == 255));
    }

    #[test]
    fn test_no_wrap_between_rows() {
        // Row 0 ends white, row 1 starts black. Wrapping would leave a
        // non-default value in row 0's last column.
        let frame = frame_from(&[BLACK, WHITE, BLACK, WHITE], 2, 2);
        let image = compute_contour(&frame);

        assert_eq!(image.magnitude_at(0, 0), Some(255));
        assert_eq!(image.magnitude_at(1, 0), Some(0));
        assert_eq!(image.magnitude_at(0, 1), Some(255));
        assert_eq!(image.magnitude_at(1, 1), Some(0));
    }

    #[test]
    fn test_single_column_is_default() {
        let frame = frame_from(&[WHITE, BLACK, WHITE], 1, 3);
        assert!(compute_contour(&frame).is_default());
    }
}
