//! Control surface for an engine owned by a running scheduler.
//!
//! Commands travel over a channel and are applied by the scheduler between
//! ticks, so the engine itself never needs a lock.

use super::{ControlError, EngineError, Mode};
use crate::capture::Dimensions;
use crossbeam_channel::{bounded, Sender};

/// What a command asks the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Enable(Mode),
    Disable,
    SetDimensions(Dimensions),
    Shutdown,
}

/// A queued command plus the channel its result goes back on.
pub(crate) struct Command {
    pub(crate) action: Action,
    pub(crate) reply: Option<Sender<Result<(), EngineError>>>,
}

/// Cloneable handle for driving a [`Scheduler`](super::Scheduler) from
/// other threads.
///
/// Every method except [`shutdown`](Self::shutdown) blocks until the
/// scheduler has applied the command, which happens between ticks. Once
/// `run` has returned, every method fails with [`ControlError::Disconnected`].
#[derive(Clone)]
pub struct ControlHandle {
    commands: Sender<Command>,
}

impl ControlHandle {
    pub(crate) fn new(commands: Sender<Command>) -> Self {
        Self { commands }
    }

    /// Starts (or switches to) `mode`.
    pub fn enable(&self, mode: Mode) -> Result<(), ControlError> {
        self.request(Action::Enable(mode))
    }

    /// Stops ticking and drops any retained frame.
    pub fn disable(&self) -> Result<(), ControlError> {
        self.request(Action::Disable)
    }

    /// Establishes the frame dimensions. Fails while a mode is running.
    pub fn set_dimensions(&self, width: u32, height: u32) -> Result<(), ControlError> {
        self.request(Action::SetDimensions(Dimensions::new(width, height)))
    }

    /// Asks the scheduler to return from `run` after the current tick.
    ///
    /// Does not wait, so it is safe to call from a signal handler.
    pub fn shutdown(&self) -> Result<(), ControlError> {
        self.commands
            .send(Command {
                action: Action::Shutdown,
                reply: None,
            })
            .map_err(|_| ControlError::Disconnected)
    }

    fn request(&self, action: Action) -> Result<(), ControlError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(Command {
                action,
                reply: Some(reply_tx),
            })
            .map_err(|_| ControlError::Disconnected)?;

        reply_rx
            .recv()
            .map_err(|_| ControlError::Disconnected)?
            .map_err(ControlError::Rejected)
    }
}

impl std::fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlHandle")
            .field("pending", &self.commands.len())
            .finish()
    }
}
