//! Sink abstraction for computed images.

use crate::analysis::DiffStatistics;
use crate::differencing::DiffImage;
use std::collections::VecDeque;
use thiserror::Error;

/// Errors reported by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),
    #[error("failed to present image: {0}")]
    PresentFailed(String),
}

/// Receives each computed image for display or storage.
///
/// Invoked at most once per tick and never concurrently.
pub trait Sink {
    /// Takes ownership of the tick's image.
    fn present(&mut self, image: DiffImage) -> Result<(), SinkError>;
}

impl<K: Sink + ?Sized> Sink for Box<K> {
    fn present(&mut self, image: DiffImage) -> Result<(), SinkError> {
        (**self).present(image)
    }
}

/// Discards every image, counting them.
#[derive(Debug, Default)]
pub struct NullSink {
    presented: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of images received.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Sink for NullSink {
    fn present(&mut self, _image: DiffImage) -> Result<(), SinkError> {
        self.presented += 1;
        Ok(())
    }
}

/// Keeps the most recent images in memory.
#[derive(Debug)]
pub struct CollectingSink {
    images: VecDeque<DiffImage>,
    capacity: usize,
    presented: u64,
}

impl CollectingSink {
    /// Creates a sink retaining at most `capacity` images (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            images: VecDeque::with_capacity(capacity),
            capacity,
            presented: 0,
        }
    }

    /// Retained images, oldest first.
    pub fn images(&self) -> impl Iterator<Item = &DiffImage> {
        self.images.iter()
    }

    /// The most recently presented image.
    pub fn latest(&self) -> Option<&DiffImage> {
        self.images.back()
    }

    /// Number of images received, including evicted ones.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Removes and returns the retained images.
    pub fn drain(&mut self) -> Vec<DiffImage> {
        self.images.drain(..).collect()
    }
}

impl Default for CollectingSink {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl Sink for CollectingSink {
    fn present(&mut self, image: DiffImage) -> Result<(), SinkError> {
        if self.images.len() == self.capacity {
            self.images.pop_front();
        }
        self.images.push_back(image);
        self.presented += 1;
        Ok(())
    }
}

/// Logs a statistics line for every `log_every`-th image.
///
/// Statistics are only computed for the images that get logged.
#[derive(Debug)]
pub struct LoggingSink {
    log_every: u64,
    activity_threshold: u8,
    presented: u64,
    logged: u64,
}

impl LoggingSink {
    pub fn new(log_every: u64, activity_threshold: u8) -> Self {
        Self {
            log_every: log_every.max(1),
            activity_threshold,
            presented: 0,
            logged: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Number of statistics lines written.
    pub fn logged(&self) -> u64 {
        self.logged
    }
}

impl Sink for LoggingSink {
    fn present(&mut self, image: DiffImage) -> Result<(), SinkError> {
        self.presented += 1;

        if self.presented % self.log_every != 0 {
            tracing::trace!(frame = image.source_sequence(), "Presented difference image");
            return Ok(());
        }

        let stats = DiffStatistics::analyze(&image, self.activity_threshold);
        self.logged += 1;
        tracing::info!(
            frame = image.source_sequence(),
            dimensions = %image.dimensions(),
            mean = stats.mean_magnitude,
            peak = stats.peak_magnitude,
            active = stats.active_fraction,
            "Presented difference image"
        );
        Ok(())
    }
}
