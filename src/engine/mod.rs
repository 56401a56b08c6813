//! The differencing engine and the scheduler that drives it.
//!
//! [`Engine`] is the state machine (`Idle` / `Running(mode)`) plus the
//! per-tick computation. [`Scheduler`] re-invokes it at a fixed period and
//! accepts commands through a [`ControlHandle`].
//!
//! ```text
//! Idle ──enable(mode)──▶ Running(mode) ──disable──▶ Idle
//!                          │    ▲
//!                          └────┘ enable(other): disable, then enable
//! ```

mod control;
mod error;
mod scheduler;
mod state;

pub use control::ControlHandle;
pub use error::{ControlError, EngineError};
pub use scheduler::{RunSummary, Scheduler, DEFAULT_TICK_PERIOD};
pub use state::{Engine, EngineMode, Mode, TickOutcome};
