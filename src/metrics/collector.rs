//! Metrics collection and registry.

use crate::analysis::DiffStatistics;
use crate::engine::{EngineMode, Mode};
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for the differencing engine.
///
/// Cloning is cheap and every clone updates the same series, so the
/// scheduler and the HTTP exporter can each hold one.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,

    // Tick metrics
    ticks_total: IntCounter,
    ticks_failed_total: IntCounterVec,
    tick_duration_seconds: Gauge,

    // Engine state
    engine_mode: IntGauge,

    // Image metrics
    mean_magnitude: Gauge,
    peak_magnitude: IntGauge,
    active_fraction: Gauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all engine metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        // Tick metrics
        let ticks_total = IntCounter::new(
            "motion_contour_ticks_total",
            "Total number of ticks that presented an image",
        )?;
        let ticks_failed_total = IntCounterVec::new(
            Opts::new(
                "motion_contour_ticks_failed_total",
                "Total number of ticks aborted by an error",
            ),
            &["kind"],
        )?;
        let tick_duration_seconds = Gauge::new(
            "motion_contour_tick_duration_seconds",
            "Wall-clock duration of the last successful tick",
        )?;

        // Engine state
        let engine_mode = IntGauge::new(
            "motion_contour_engine_mode",
            "Active mode (0=idle, 1=temporal, 2=spatial)",
        )?;

        // Image metrics
        let mean_magnitude = Gauge::new(
            "motion_contour_mean_magnitude",
            "Mean magnitude of the last presented image",
        )?;
        let peak_magnitude = IntGauge::new(
            "motion_contour_peak_magnitude",
            "Peak magnitude of the last presented image",
        )?;
        let active_fraction = Gauge::new(
            "motion_contour_active_fraction",
            "Fraction of pixels above the activity threshold in the last image",
        )?;

        // Register all metrics
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(ticks_failed_total.clone()))?;
        registry.register(Box::new(tick_duration_seconds.clone()))?;
        registry.register(Box::new(engine_mode.clone()))?;
        registry.register(Box::new(mean_magnitude.clone()))?;
        registry.register(Box::new(peak_magnitude.clone()))?;
        registry.register(Box::new(active_fraction.clone()))?;

        Ok(Self {
            registry,
            ticks_total,
            ticks_failed_total,
            tick_duration_seconds,
            engine_mode,
            mean_magnitude,
            peak_magnitude,
            active_fraction,
        })
    }

    /// Records a tick that presented an image.
    pub fn record_tick(&self, duration: Duration, stats: &DiffStatistics) {
        self.ticks_total.inc();
        self.tick_duration_seconds.set(duration.as_secs_f64());
        self.mean_magnitude.set(stats.mean_magnitude);
        self.peak_magnitude.set(i64::from(stats.peak_magnitude));
        self.active_fraction.set(stats.active_fraction);
    }

    /// Records a failed tick under the given error kind.
    pub fn record_failure(&self, kind: &str) {
        self.ticks_failed_total.with_label_values(&[kind]).inc();
    }

    /// Publishes the engine's current mode.
    pub fn set_mode(&self, mode: EngineMode) {
        let value = match mode {
            EngineMode::Idle => 0,
            EngineMode::Running(Mode::Temporal) => 1,
            EngineMode::Running(Mode::Spatial) => 2,
        };
        self.engine_mode.set(value);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
