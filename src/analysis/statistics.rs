//! Summary statistics over a difference image.
//!
//! Cheap enough to run every tick; feeds the log lines and the metrics
//! gauges.

use crate::differencing::DiffImage;

/// Default magnitude above which a pixel counts as changed.
pub const DEFAULT_ACTIVITY_THRESHOLD: u8 = 16;

/// Per-image statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiffStatistics {
    /// Mean magnitude over all pixels.
    pub mean_magnitude: f64,
    /// Largest magnitude seen.
    pub peak_magnitude: u8,
    /// Fraction of pixels whose magnitude exceeds the threshold.
    pub active_fraction: f64,
    /// Number of pixels analyzed.
    pub pixel_count: usize,
}

impl DiffStatistics {
    /// Computes statistics for an image.
    pub fn analyze(image: &DiffImage, activity_threshold: u8) -> Self {
        let mut sum: u64 = 0;
        let mut peak: u8 = 0;
        let mut active: usize = 0;
        let mut count: usize = 0;

        for m in image.magnitudes() {
            sum += u64::from(m);
            peak = peak.max(m);
            if m > activity_threshold {
                active += 1;
            }
            count += 1;
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            mean_magnitude: sum as f64 / count as f64,
            peak_magnitude: peak,
            active_fraction: active as f64 / count as f64,
            pixel_count: count,
        }
    }

    /// True when no pixel crossed the threshold.
    pub fn is_quiet(&self) -> bool {
        self.active_fraction == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Dimensions;

    #[test]
    fn test_default_image_is_quiet() {
        let image = DiffImage::new(Dimensions::new(4, 4), 1);
        let stats = DiffStatistics::analyze(&image, DEFAULT_ACTIVITY_THRESHOLD);

        assert_eq!(stats.mean_magnitude, 0.0);
        assert_eq!(stats.peak_magnitude, 0);
        assert_eq!(stats.pixel_count, 16);
        assert!(stats.is_quiet());
    }

    #[test]
    fn test_partial_activity() {
        let mut image = DiffImage::new(Dimensions::new(2, 2), 1);
        image.set_magnitude(0, 0, 200);
        image.set_magnitude(1, 0, 10);

        let stats = DiffStatistics::analyze(&image, 16);

        assert_eq!(stats.peak_magnitude, 200);
        assert!((stats.mean_magnitude - 52.5).abs() < 1e-9);
        assert!((stats.active_fraction - 0.25).abs() < 1e-9);
        assert!(!stats.is_quiet());
    }

    #[test]
    fn test_empty_image() {
        let image = DiffImage::new(Dimensions::new(0, 0), 0);
        let stats = DiffStatistics::analyze(&image, 16);
        assert_eq!(stats, DiffStatistics::default());
    }
}
