//! Frame input and capture configuration.
//!
//! Frames arrive from an external [`FrameSource`]; the engine only ever
//! sees immutable RGBA [`Frame`]s of the configured [`Dimensions`].

mod config;
mod frame;
mod source;

pub use config::{ConfigError, EngineConfig, FileConfig, OutputConfig, SourceConfig};
pub use frame::{Dimensions, Frame, FrameError, Rgba, BYTES_PER_PIXEL};
pub use source::{FrameSource, SourceError, SyntheticSource};
