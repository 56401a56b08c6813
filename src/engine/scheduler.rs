//! Fixed-cadence tick loop.
//!
//! Runs on the calling thread. Ticks never overlap: the next one is only
//! scheduled once the current one has finished, and commands are applied
//! strictly between ticks.

use super::control::{Action, Command, ControlHandle};
use super::{Engine, EngineError, TickOutcome};
use crate::capture::FrameSource;
use crate::metrics::MetricsRegistry;
use crate::output::Sink;
use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

/// Default tick period (~25 Hz).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(40);

/// What happened during one call to [`Scheduler::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Ticks attempted while a mode was running.
    pub ticks: u64,
    /// Ticks that presented an image.
    pub presented: u64,
    /// Ticks aborted by an error.
    pub failed: u64,
    /// Most recent tick error.
    pub last_error: Option<EngineError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    fn started_now() -> Self {
        let now = Utc::now();
        Self {
            ticks: 0,
            presented: 0,
            failed: 0,
            last_error: None,
            started_at: now,
            finished_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Drives an [`Engine`] at a fixed period, pulling frames from `S` and
/// pushing images into `K`.
///
/// `run` returns on a shutdown command, once the tick limit is reached, or
/// once every [`ControlHandle`] has been dropped. It closes the command
/// channel on the way out, so a scheduler runs only once.
pub struct Scheduler<S, K> {
    engine: Engine,
    source: S,
    sink: K,
    period: Duration,
    commands: Option<Receiver<Command>>,
    tick_limit: Option<u64>,
    metrics: Option<MetricsRegistry>,
}

impl<S: FrameSource, K: Sink> Scheduler<S, K> {
    /// Creates a scheduler and the handle that controls it.
    pub fn new(engine: Engine, source: S, sink: K, period: Duration) -> (Self, ControlHandle) {
        let (tx, rx) = unbounded();
        let scheduler = Self {
            engine,
            source,
            sink,
            period,
            commands: Some(rx),
            tick_limit: None,
            metrics: None,
        };
        (scheduler, ControlHandle::new(tx))
    }

    /// Stops `run` after `limit` ticks.
    pub fn with_tick_limit(mut self, limit: u64) -> Self {
        self.tick_limit = Some(limit);
        self
    }

    /// Records tick results into `metrics`.
    pub fn with_metrics(mut self, metrics: MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Direct access to the engine, for setup before `run`.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Consumes the scheduler, returning its parts.
    pub fn into_parts(self) -> (Engine, S, K) {
        (self.engine, self.source, self.sink)
    }

    /// Runs the loop until shut down.
    ///
    /// While idle it blocks on the command channel. While running it ticks
    /// once per period; a tick that overruns its period makes the next one
    /// start immediately rather than trying to catch up. Once the deadline
    /// is due, only the commands already queued are applied before ticking.
    ///
    /// On return every queued request is answered with
    /// [`ControlError::Disconnected`](super::ControlError::Disconnected),
    /// as is every later one. Calling `run` again returns straight away.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::started_now();
        let Some(commands) = self.commands.take() else {
            tracing::warn!("Scheduler already ran, its control channel is closed");
            return summary;
        };
        let mut deadline: Option<Instant> = None;
        self.publish_mode();

        tracing::info!(
            period_ms = self.period.as_millis() as u64,
            tick_limit = ?self.tick_limit,
            "Scheduler started"
        );

        loop {
            if !self.engine.is_running() {
                deadline = None;
                match commands.recv() {
                    Ok(command) => {
                        if self.apply(command) == Flow::Stop {
                            break;
                        }
                    }
                    Err(_) => break,
                }
                continue;
            }

            let due = *deadline.get_or_insert_with(Instant::now);
            if Instant::now() < due {
                match commands.recv_deadline(due) {
                    Ok(command) => {
                        if self.apply(command) == Flow::Stop {
                            break;
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            if self.apply_queued(&commands) == Flow::Stop {
                break;
            }
            if !self.engine.is_running() {
                continue;
            }

            self.tick(&mut summary);
            deadline = Some((due + self.period).max(Instant::now()));

            if self.tick_limit.is_some_and(|limit| summary.ticks >= limit) {
                tracing::debug!(ticks = summary.ticks, "Tick limit reached");
                break;
            }
        }

        close(commands);
        summary.finished_at = Utc::now();
        tracing::info!(
            ticks = summary.ticks,
            presented = summary.presented,
            failed = summary.failed,
            "Scheduler stopped"
        );
        summary
    }

    /// Applies at most the commands queued right now.
    fn apply_queued(&mut self, commands: &Receiver<Command>) -> Flow {
        for _ in 0..commands.len().max(1) {
            match commands.try_recv() {
                Ok(command) => {
                    if self.apply(command) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Flow::Stop,
            }
        }
        Flow::Continue
    }

    fn tick(&mut self, summary: &mut RunSummary) {
        let started = Instant::now();
        let result = self.engine.tick(&mut self.source, &mut self.sink);
        let elapsed = started.elapsed();

        summary.ticks += 1;
        match result {
            Ok(TickOutcome::Presented(stats)) => {
                summary.presented += 1;
                if let Some(metrics) = &self.metrics {
                    metrics.record_tick(elapsed, &stats);
                }
            }
            Ok(TickOutcome::Idle) => {}
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(kind = e.kind(), error = %e, "Tick failed, skipping");
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure(e.kind());
                }
                summary.last_error = Some(e);
            }
        }

        if elapsed > self.period {
            tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Tick overran its period"
            );
        }
    }

    fn apply(&mut self, command: Command) -> Flow {
        let result = match command.action {
            Action::Enable(mode) => self.engine.enable(mode),
            Action::Disable => {
                self.engine.disable();
                Ok(())
            }
            Action::SetDimensions(dimensions) => self.engine.set_dimensions(dimensions),
            Action::Shutdown => {
                tracing::info!("Scheduler shutdown requested");
                return Flow::Stop;
            }
        };

        if let Err(e) = &result {
            tracing::warn!(action = ?command.action, error = %e, "Control command rejected");
        }
        self.publish_mode();

        if let Some(reply) = command.reply {
            // The caller may have given up waiting; nothing to do then.
            let _ = reply.send(result);
        }
        Flow::Continue
    }

    fn publish_mode(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.set_mode(self.engine.mode());
        }
    }
}

/// Drops the receiving end, discarding whatever is still queued.
///
/// A dropped reply sender wakes its waiting caller with `Disconnected`.
fn close(commands: Receiver<Command>) {
    let discarded = commands.try_iter().count();
    if discarded > 0 {
        tracing::debug!(discarded, "Discarded commands queued after stop");
    }
}
