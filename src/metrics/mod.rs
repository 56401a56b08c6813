//! Prometheus metrics exporter for the differencing engine.
//!
//! # Metrics Exposed
//!
//! ## Tick Metrics
//! - `motion_contour_ticks_total` - Ticks that presented an image
//! - `motion_contour_ticks_failed_total{kind}` - Aborted ticks by error kind
//! - `motion_contour_tick_duration_seconds` - Duration of the last successful tick
//!
//! ## Engine Metrics
//! - `motion_contour_engine_mode` - 0=idle, 1=temporal, 2=spatial
//!
//! ## Image Metrics
//! - `motion_contour_mean_magnitude` - Mean magnitude of the last image
//! - `motion_contour_peak_magnitude` - Peak magnitude of the last image
//! - `motion_contour_active_fraction` - Fraction of changed pixels in the last image
//!
//! # Example
//!
//! ```no_run
//! use motion_contour::metrics::MetricsRegistry;
//! use motion_contour::engine::{EngineMode, Mode};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.set_mode(EngineMode::Running(Mode::Temporal));
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
