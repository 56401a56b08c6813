//! Output side of the engine.
//!
//! Computed images leave the engine through a [`Sink`]. What the sink does
//! with them (draw, store, discard) is the host's business.

mod sink;

pub use sink::{CollectingSink, LoggingSink, NullSink, Sink, SinkError};
