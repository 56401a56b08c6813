//! Difference-image analysis.
//!
//! Statistics computed over each output image, used for logging and
//! metrics. They describe the image; they never alter it.

mod statistics;

pub use statistics::{DiffStatistics, DEFAULT_ACTIVITY_THRESHOLD};
