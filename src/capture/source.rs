//! Frame source abstraction.
//!
//! The engine never talks to a camera. Whatever hosts it supplies frames
//! through [`FrameSource`]; a deterministic synthetic source is bundled
//! for the CLI demo, tests and benches.

use super::{config::SourceConfig, Dimensions, Frame, Rgba};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use thiserror::Error;

/// Errors reported by a frame source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("frame source unavailable: {0}")]
    Unavailable(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
}

/// Supplies the most recent frame on demand.
///
/// Called at most once per tick, always from the scheduler's thread.
/// Returned frames must have the dimensions the engine was configured
/// with; anything else fails the tick.
pub trait FrameSource {
    /// Returns the most recent frame.
    fn next_frame(&mut self) -> Result<Frame, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        (**self).next_frame()
    }
}

/// Generates synthetic frames: a bright square sliding across a dim,
/// noisy background.
///
/// The noise comes from a seeded ChaCha stream so runs are reproducible.
pub struct SyntheticSource {
    dimensions: Dimensions,
    rng: ChaCha8Rng,
    noise: u8,
    square_size: u32,
    speed: u32,
    sequence: u64,
}

const BACKGROUND: u8 = 48;
const FOREGROUND: Rgba = Rgba::new(230, 230, 220, 255);

impl SyntheticSource {
    pub fn new(dimensions: Dimensions, config: &SourceConfig) -> Self {
        tracing::info!(
            %dimensions,
            seed = config.seed,
            noise = config.noise,
            "Synthetic frame source ready"
        );
        Self {
            dimensions,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            noise: config.noise,
            square_size: config.square_size,
            speed: config.speed,
            sequence: 0,
        }
    }

    /// Left edge of the square for the given frame.
    fn square_x(&self, sequence: u64) -> u32 {
        let travel = u64::from(self.dimensions.width.max(1));
        // Both factors are below 2^32 once reduced, so the product fits.
        ((sequence % travel) * u64::from(self.speed) % travel) as u32
    }

    fn background_pixel(&mut self) -> Rgba {
        let jitter = if self.noise == 0 {
            0
        } else {
            (self.rng.next_u32() % (u32::from(self.noise) + 1)) as u8
        };
        let level = BACKGROUND.saturating_add(jitter);
        Rgba::new(level, level, level, 255)
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        let Dimensions { width, height } = self.dimensions;
        let left = self.square_x(self.sequence);
        let top = height.saturating_sub(self.square_size) / 2;

        let mut pixels = Vec::with_capacity(self.dimensions.byte_len());
        for y in 0..height {
            for x in 0..width {
                let inside = x >= left
                    && x < left.saturating_add(self.square_size)
                    && y >= top
                    && y < top.saturating_add(self.square_size);
                let pixel = if inside {
                    FOREGROUND
                } else {
                    self.background_pixel()
                };
                pixels.extend_from_slice(&pixel.to_array());
            }
        }

        self.sequence += 1;
        Frame::from_rgba(pixels, width, height, self.sequence)
            .map_err(|e| SourceError::CaptureFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceConfig {
        SourceConfig {
            seed: 7,
            noise: 8,
            square_size: 4,
            speed: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_frames_have_requested_dimensions() {
        let mut source = SyntheticSource::new(Dimensions::new(16, 12), &config());

        let frame = source.next_frame().unwrap();
        assert_eq!(frame.dimensions(), Dimensions::new(16, 12));
        assert_eq!(frame.sequence(), 1);

        let frame2 = source.next_frame().unwrap();
        assert_eq!(frame2.sequence(), 2);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = SyntheticSource::new(Dimensions::new(8, 8), &config());
        let mut b = SyntheticSource::new(Dimensions::new(8, 8), &config());

        for _ in 0..3 {
            assert_eq!(
                a.next_frame().unwrap().pixels(),
                b.next_frame().unwrap().pixels()
            );
        }
    }

    #[test]
    fn test_square_moves_between_frames() {
        let config = SourceConfig {
            noise: 0,
            ..config()
        };
        let mut source = SyntheticSource::new(Dimensions::new(16, 8), &config);

        let first = source.next_frame().unwrap();
        let second = source.next_frame().unwrap();
        assert_ne!(first.pixels(), second.pixels());
    }

    #[test]
    fn test_square_position_survives_long_runs() {
        let config = SourceConfig {
            speed: u32::MAX,
            ..config()
        };
        let source = SyntheticSource::new(Dimensions::new(640, 480), &config);

        assert!(source.square_x(u64::MAX) < 640);
        assert_eq!(source.square_x(3), ((3 * u64::from(u32::MAX)) % 640) as u32);
    }

    #[test]
    fn test_noise_free_background_is_flat() {
        let config = SourceConfig {
            noise: 0,
            square_size: 0,
            ..config()
        };
        let mut source = SyntheticSource::new(Dimensions::new(4, 4), &config);

        let frame = source.next_frame().unwrap();
        assert!(frame
            .pixels()
            .chunks_exact(4)
            .all(|p| p == [BACKGROUND, BACKGROUND, BACKGROUND, 255]));
    }
}
