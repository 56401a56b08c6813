//! Motion Contour Library
//!
//! Real-time frame differencing for live video. Each tick takes the latest
//! RGBA frame from a host-supplied source and produces a grayscale image
//! highlighting change, either over time (motion) or across neighbouring
//! pixels (contours).
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → differencing → engine → output
//!                 ↓           ↓
//!             analysis     metrics
//! ```
//!
//! # Design Principles
//!
//! - **Pure kernel**: one luminance-difference function shared by both modes
//! - **Injected collaborators**: frames in through `FrameSource`, images out through `Sink`
//! - **No overlapping ticks**: the scheduler owns the engine and applies commands between ticks
//! - **Degrade, don't die**: a failed tick is logged and skipped
//!
//! # Example
//!
//! ```no_run
//! use motion_contour::{
//!     capture::{Dimensions, SourceConfig, SyntheticSource},
//!     engine::{Engine, Mode, TickOutcome},
//!     output::CollectingSink,
//! };
//!
//! let dims = Dimensions::new(320, 240);
//! let mut source = SyntheticSource::new(dims, &SourceConfig::default());
//! let mut sink = CollectingSink::default();
//!
//! let mut engine = Engine::with_dimensions(dims);
//! engine.enable(Mode::Temporal).unwrap();
//!
//! for _ in 0..10 {
//!     if let Ok(TickOutcome::Presented(stats)) = engine.tick(&mut source, &mut sink) {
//!         println!("mean change {:.2}", stats.mean_magnitude);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod capture;
pub mod differencing;
pub mod engine;
pub mod metrics;
pub mod output;

// Re-export commonly used types at crate root
pub use analysis::DiffStatistics;
pub use capture::{Dimensions, EngineConfig, FileConfig, Frame, FrameSource, Rgba, SyntheticSource};
pub use differencing::{compute_contour, compute_motion, magnitude, DiffImage};
pub use engine::{ControlHandle, Engine, EngineError, EngineMode, Mode, RunSummary, Scheduler};
pub use output::{CollectingSink, LoggingSink, NullSink, Sink};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
