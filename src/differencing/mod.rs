//! Frame differencing.
//!
//! Both modes run the same luminance-difference kernel and differ only in
//! which pixel pairs they feed it: the same coordinate in two consecutive
//! frames (temporal), or horizontal neighbours in one frame (contour).

mod contour;
mod image;
mod kernel;
mod temporal;

pub use contour::compute_contour;
pub use image::{DiffImage, DEFAULT_PIXEL};
pub use kernel::{luminance, magnitude};
pub use temporal::{compute_motion, TemporalDifferencer};

use crate::capture::Dimensions;
use thiserror::Error;

/// A frame did not have the dimensions it was expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("frame dimensions {actual} do not match expected {expected}")]
pub struct DimensionMismatch {
    pub expected: Dimensions,
    pub actual: Dimensions,
}
