//! Engine error types.

use crate::capture::SourceError;
use crate::differencing::DimensionMismatch;
use crate::output::SinkError;
use thiserror::Error;

/// Errors raised by the engine's control surface and by individual ticks.
///
/// Tick errors are never fatal: the scheduler logs them and moves on to
/// the next tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    DimensionMismatch(#[from] DimensionMismatch),
    #[error("dimensions must be set to a non-zero size before enabling a mode")]
    ZeroDimension,
    #[error("dimensions cannot change while a mode is running")]
    Running,
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl EngineError {
    /// Short label for logs and the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DimensionMismatch(_) => "dimension_mismatch",
            Self::ZeroDimension => "zero_dimension",
            Self::Running => "running",
            Self::Source(_) => "source_unavailable",
            Self::Sink(_) => "sink_unavailable",
        }
    }
}

/// Errors returned by a [`ControlHandle`](super::ControlHandle).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("scheduler is no longer running")]
    Disconnected,
    #[error(transparent)]
    Rejected(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Dimensions;

    #[test]
    fn test_kind_labels() {
        let mismatch = EngineError::from(DimensionMismatch {
            expected: Dimensions::new(2, 2),
            actual: Dimensions::new(3, 3),
        });
        assert_eq!(mismatch.kind(), "dimension_mismatch");
        assert_eq!(
            EngineError::from(SourceError::Unavailable("gone".into())).kind(),
            "source_unavailable"
        );
        assert_eq!(
            EngineError::from(SinkError::Unavailable("gone".into())).kind(),
            "sink_unavailable"
        );
    }

    #[test]
    fn test_messages_carry_detail() {
        let err = EngineError::from(DimensionMismatch {
            expected: Dimensions::new(2, 2),
            actual: Dimensions::new(3, 1),
        });
        assert_eq!(
            err.to_string(),
            "frame dimensions 3x1 do not match expected 2x2"
        );
    }
}
