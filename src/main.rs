//! Motion Contour CLI
//!
//! Runs the differencing engine against a synthetic frame source and logs
//! statistics about each produced image.

use clap::{Parser, ValueEnum};
use motion_contour::{
    capture::{FileConfig, SyntheticSource},
    engine::{Engine, Mode, Scheduler},
    metrics::MetricsRegistry,
    output::LoggingSink,
};
use std::path::PathBuf;
use std::process;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Difference against the previous frame
    Temporal,
    /// Difference against the right-hand neighbour
    Spatial,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Temporal => Mode::Temporal,
            CliMode::Spatial => Mode::Spatial,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "motion-contour", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Processing mode
    #[arg(short, long, value_enum)]
    mode: Option<CliMode>,

    /// Processing width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Processing height in pixels (0 = derive from the source aspect ratio)
    #[arg(long)]
    height: Option<u32>,

    /// Delay between ticks in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many ticks (0 = run until Ctrl-C)
    #[arg(long)]
    ticks: Option<u64>,

    /// Serve Prometheus metrics on this port (0 = disabled)
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Seed for the synthetic source's noise
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    apply_overrides(&mut config, &args);

    if let Err(e) = config.engine.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    info!("Motion Contour v{}", motion_contour::VERSION);
    info!("This is a demonstration using a synthetic frame source");

    let dims = config.engine.dimensions(config.source.native_dimensions());
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            process::exit(1);
        }
    };
    start_metrics_server(config.output.metrics_port, &registry);

    let mut engine = Engine::new();
    engine.set_activity_threshold(config.engine.activity_threshold);
    let started = engine
        .set_dimensions(dims)
        .and_then(|()| engine.enable(config.engine.mode));
    if let Err(e) = started {
        eprintln!("Failed to start engine at {}: {}", dims, e);
        process::exit(1);
    }

    let source = SyntheticSource::new(dims, &config.source);
    let sink = LoggingSink::new(config.output.log_every, config.engine.activity_threshold);

    let (scheduler, control) =
        Scheduler::new(engine, source, sink, config.engine.tick_interval());
    let mut scheduler = scheduler.with_metrics(registry);
    if config.output.ticks > 0 {
        scheduler = scheduler.with_tick_limit(config.output.ticks);
    }

    let interrupt = control.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt.shutdown();
    }) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    info!(
        mode = %config.engine.mode,
        dimensions = %dims,
        interval_ms = config.engine.tick_interval_ms,
        "Processing frames..."
    );

    let summary = scheduler.run();
    drop(control);

    info!(
        "Processed {} ticks: {} presented, {} failed ({} → {})",
        summary.ticks,
        summary.presented,
        summary.failed,
        summary.started_at.format("%H:%M:%S%.3f"),
        summary.finished_at.format("%H:%M:%S%.3f"),
    );
    if let Some(e) = summary.last_error {
        warn!("Last tick error: {}", e);
    }
}

fn apply_overrides(config: &mut FileConfig, args: &Args) {
    if let Some(mode) = args.mode {
        config.engine.mode = mode.into();
    }
    if let Some(width) = args.width {
        config.engine.width = width;
    }
    if let Some(height) = args.height {
        config.engine.height = height;
    }
    if let Some(interval) = args.interval_ms {
        config.engine.tick_interval_ms = interval;
    }
    if let Some(ticks) = args.ticks {
        config.output.ticks = ticks;
    }
    if let Some(port) = args.metrics_port {
        config.output.metrics_port = port;
    }
    if let Some(seed) = args.seed {
        config.source.seed = seed;
    }
}

#[cfg(feature = "metrics")]
fn start_metrics_server(port: u16, registry: &MetricsRegistry) {
    use motion_contour::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return;
    }

    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry.clone());
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Failed to start metrics runtime: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });
}

#[cfg(not(feature = "metrics"))]
fn start_metrics_server(port: u16, _registry: &MetricsRegistry) {
    if port != 0 {
        warn!(
            port,
            "Metrics port configured but this build lacks the `metrics` feature"
        );
    }
}
