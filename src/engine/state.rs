//! Engine state machine and the per-tick computation.

use super::EngineError;
use crate::analysis::{DiffStatistics, DEFAULT_ACTIVITY_THRESHOLD};
use crate::capture::{Dimensions, FrameSource};
use crate::differencing::{compute_contour, DimensionMismatch, TemporalDifferencer};
use crate::output::Sink;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing mode. Only one runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Current frame against the previously retained frame.
    Temporal,
    /// Each pixel against its right neighbour in the same frame.
    Spatial,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporal => f.write_str("temporal"),
            Self::Spatial => f.write_str("spatial"),
        }
    }
}

/// Whether the engine is producing images, and in which mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    #[default]
    Idle,
    Running(Mode),
}

/// Result of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing ran: the engine is idle or has no usable dimensions.
    Idle,
    /// An image was computed and handed to the sink.
    Presented(DiffStatistics),
}

/// The frame-differencing engine.
///
/// Owns the only state that survives between ticks: the mode, the
/// established dimensions and, in temporal mode, the previous frame.
pub struct Engine {
    mode: EngineMode,
    dimensions: Option<Dimensions>,
    temporal: TemporalDifferencer,
    activity_threshold: u8,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            mode: EngineMode::Idle,
            dimensions: None,
            temporal: TemporalDifferencer::new(),
            activity_threshold: DEFAULT_ACTIVITY_THRESHOLD,
        }
    }

    /// Creates an idle engine with dimensions already established.
    pub fn with_dimensions(dimensions: Dimensions) -> Self {
        Self {
            dimensions: Some(dimensions),
            ..Self::new()
        }
    }

    /// Sets the magnitude threshold used for tick statistics.
    pub fn set_activity_threshold(&mut self, threshold: u8) {
        self.activity_threshold = threshold;
    }

    /// Establishes the frame dimensions. Rejected while a mode is running.
    pub fn set_dimensions(&mut self, dimensions: Dimensions) -> Result<(), EngineError> {
        if let EngineMode::Running(mode) = self.mode {
            tracing::warn!(%mode, requested = %dimensions, "Refusing to resize while running");
            return Err(EngineError::Running);
        }
        self.dimensions = Some(dimensions);
        tracing::debug!(%dimensions, "Engine dimensions set");
        Ok(())
    }

    /// Starts producing images in `mode`.
    ///
    /// Enabling the mode that already runs does nothing. Enabling another
    /// mode stops the current one first, dropping any retained frame.
    pub fn enable(&mut self, mode: Mode) -> Result<(), EngineError> {
        match self.mode {
            EngineMode::Running(current) if current == mode => return Ok(()),
            EngineMode::Running(_) => self.disable(),
            EngineMode::Idle => {}
        }

        match self.dimensions {
            Some(dims) if !dims.is_empty() => {
                self.mode = EngineMode::Running(mode);
                tracing::info!(%mode, dimensions = %dims, "Engine enabled");
                Ok(())
            }
            _ => Err(EngineError::ZeroDimension),
        }
    }

    /// Stops producing images and drops the retained frame.
    pub fn disable(&mut self) {
        self.temporal.reset();
        if let EngineMode::Running(mode) = self.mode {
            self.mode = EngineMode::Idle;
            tracing::info!(%mode, "Engine disabled");
        }
    }

    #[inline]
    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.mode, EngineMode::Running(_))
    }

    #[inline]
    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// True while a previous frame is retained for temporal differencing.
    pub fn has_previous_frame(&self) -> bool {
        self.temporal.is_primed()
    }

    /// Runs one tick: pulls a frame, computes the active mode's image and
    /// presents it.
    ///
    /// Does nothing while idle. Any error aborts only this tick; the sink
    /// is never handed a partial image.
    pub fn tick<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<TickOutcome, EngineError>
    where
        S: FrameSource + ?Sized,
        K: Sink + ?Sized,
    {
        let EngineMode::Running(mode) = self.mode else {
            return Ok(TickOutcome::Idle);
        };
        let dims = match self.dimensions {
            Some(dims) if !dims.is_empty() => dims,
            _ => return Ok(TickOutcome::Idle),
        };

        let frame = source.next_frame()?;
        if frame.dimensions() != dims {
            return Err(DimensionMismatch {
                expected: dims,
                actual: frame.dimensions(),
            }
            .into());
        }

        let sequence = frame.sequence();
        let image = match mode {
            Mode::Temporal => self.temporal.difference(frame)?,
            Mode::Spatial => compute_contour(&frame),
        };

        let stats = DiffStatistics::analyze(&image, self.activity_threshold);
        sink.present(image)?;

        tracing::trace!(
            %mode,
            frame = sequence,
            mean = stats.mean_magnitude,
            "Tick complete"
        );

        Ok(TickOutcome::Presented(stats))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Frame, Rgba, SourceError};
    use crate::output::CollectingSink;

    /// Hands out a fixed list of frames.
    struct ScriptedSource(Vec<Frame>);

    impl FrameSource for ScriptedSource {
        fn next_frame(&mut self) -> Result<Frame, SourceError> {
            if self.0.is_empty() {
                return Err(SourceError::Unavailable("script exhausted".into()));
            }
            Ok(self.0.remove(0))
        }
    }

    fn gray(level: u8, sequence: u64) -> Frame {
        Frame::filled(
            Dimensions::new(2, 2),
            Rgba::new(level, level, level, 255),
            sequence,
        )
    }

    #[test]
    fn test_starts_idle() {
        let engine = Engine::new();
        assert_eq!(engine.mode(), EngineMode::Idle);
        assert_eq!(engine.dimensions(), None);
    }

    #[test]
    fn test_enable_without_dimensions_fails() {
        let mut engine = Engine::new();
        assert_eq!(engine.enable(Mode::Temporal), Err(EngineError::ZeroDimension));
        assert_eq!(engine.mode(), EngineMode::Idle);

        engine.set_dimensions(Dimensions::new(0, 10)).unwrap();
        assert_eq!(engine.enable(Mode::Spatial), Err(EngineError::ZeroDimension));
        assert_eq!(engine.mode(), EngineMode::Idle);
    }

    #[test]
    fn test_set_dimensions_while_running_fails() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        engine.enable(Mode::Temporal).unwrap();

        assert_eq!(
            engine.set_dimensions(Dimensions::new(4, 4)),
            Err(EngineError::Running)
        );
        assert_eq!(engine.dimensions(), Some(Dimensions::new(2, 2)));
        assert_eq!(engine.mode(), EngineMode::Running(Mode::Temporal));
    }

    #[test]
    fn test_idle_tick_touches_nothing() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        let mut source = ScriptedSource(vec![gray(1, 1)]);
        let mut sink = CollectingSink::default();

        assert_eq!(engine.tick(&mut source, &mut sink), Ok(TickOutcome::Idle));
        assert_eq!(source.0.len(), 1);
        assert_eq!(sink.presented(), 0);
    }

    #[test]
    fn test_enable_same_mode_keeps_previous_frame() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        let mut source = ScriptedSource(vec![gray(10, 1)]);
        let mut sink = CollectingSink::default();

        engine.enable(Mode::Temporal).unwrap();
        engine.tick(&mut source, &mut sink).unwrap();
        assert!(engine.has_previous_frame());

        engine.enable(Mode::Temporal).unwrap();
        assert!(engine.has_previous_frame());
    }

    #[test]
    fn test_mode_switch_clears_previous_frame() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        let mut source = ScriptedSource(vec![gray(10, 1)]);
        let mut sink = CollectingSink::default();

        engine.enable(Mode::Temporal).unwrap();
        engine.tick(&mut source, &mut sink).unwrap();

        engine.enable(Mode::Spatial).unwrap();
        assert_eq!(engine.mode(), EngineMode::Running(Mode::Spatial));
        assert!(!engine.has_previous_frame());
    }

    #[test]
    fn test_spatial_mode_retains_nothing() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        let mut source = ScriptedSource(vec![gray(10, 1), gray(99, 2)]);
        let mut sink = CollectingSink::default();

        engine.enable(Mode::Spatial).unwrap();
        engine.tick(&mut source, &mut sink).unwrap();
        engine.tick(&mut source, &mut sink).unwrap();

        assert!(!engine.has_previous_frame());
        assert!(sink.images().all(|img| img.magnitude_at(0, 0) == Some(0)));
    }

    #[test]
    fn test_source_failure_reported() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        let mut source = ScriptedSource(Vec::new());
        let mut sink = CollectingSink::default();

        engine.enable(Mode::Spatial).unwrap();
        let err = engine.tick(&mut source, &mut sink).unwrap_err();
        assert_eq!(err.kind(), "source_unavailable");
        assert_eq!(sink.presented(), 0);
    }

    #[test]
    fn test_mismatched_frame_aborts_tick() {
        let mut engine = Engine::with_dimensions(Dimensions::new(2, 2));
        let odd = Frame::filled(Dimensions::new(3, 2), Rgba::default(), 2);
        let mut source = ScriptedSource(vec![gray(10, 1), odd, gray(40, 3)]);
        let mut sink = CollectingSink::default();

        engine.enable(Mode::Temporal).unwrap();
        engine.tick(&mut source, &mut sink).unwrap();

        let err = engine.tick(&mut source, &mut sink).unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch(_)));

        // Next good frame still diffs against frame 1
        engine.tick(&mut source, &mut sink).unwrap();
        assert_eq!(sink.presented(), 2);
        assert_eq!(sink.latest().and_then(|img| img.magnitude_at(1, 1)), Some(30));
    }
}
