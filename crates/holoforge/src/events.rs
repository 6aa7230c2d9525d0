//! # Command Channel
//!
//! Carries [`VoxelCommand`]s from the gesture recognizer to the session
//! loop.
//!
//! ```text
//! recognizer thread(s)            frame thread
//! ┌───────────────┐   bounded   ┌─────────────────────────────┐
//! │ CommandSender │────────────>│ CommandChannel::take_pending │
//! └───────────────┘             └─────────────────────────────┘
//! ```
//!
//! A recognizer that outruns the frame loop loses commands rather than
//! growing memory, and a frame only takes what was queued when it started.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use holoforge_shared::VoxelCommand;
use thiserror::Error;
use tracing::warn;

/// Default commands in flight.
pub const DEFAULT_COMMAND_CAPACITY: usize = 1024;

/// Why a command did not reach the session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel was at capacity; the command was dropped.
    #[error("command channel full")]
    Full,
    /// The session is gone.
    #[error("command channel closed")]
    Closed,
}

/// Consumer end, owned by the session loop.
pub struct CommandChannel {
    sender: Sender<VoxelCommand>,
    receiver: Receiver<VoxelCommand>,
}

impl CommandChannel {
    /// Creates a channel holding at most `capacity` pending commands.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// New producer handle.
    #[must_use]
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            sender: self.sender.clone(),
        }
    }

    /// Commands queued right now, in send order.
    ///
    /// The count is fixed when called; anything sent while iterating waits
    /// for the next call.
    pub fn take_pending(&self) -> impl Iterator<Item = VoxelCommand> + '_ {
        let queued = self.receiver.len();
        self.receiver.try_iter().take(queued)
    }
}

impl Default for CommandChannel {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_CAPACITY)
    }
}

/// Producer handle. Cheap to clone, safe to move to another thread.
#[derive(Clone)]
pub struct CommandSender {
    sender: Sender<VoxelCommand>,
}

impl CommandSender {
    /// Queues a command without blocking.
    ///
    /// # Errors
    ///
    /// `Full` if the channel is at capacity (the command is dropped and
    /// logged), `Closed` if the session is gone.
    pub fn send(&self, command: VoxelCommand) -> Result<(), ChannelError> {
        self.sender.try_send(command).map_err(|error| match error {
            TrySendError::Full(dropped) => {
                warn!(kind = ?dropped.kind(), "command channel full, dropping");
                ChannelError::Full
            }
            TrySendError::Disconnected(_) => ChannelError::Closed,
        })
    }

    /// Queues a command, waiting for room.
    ///
    /// # Errors
    ///
    /// `Closed` if the session is gone.
    pub fn send_blocking(&self, command: VoxelCommand) -> Result<(), ChannelError> {
        self.sender.send(command).map_err(|_| ChannelError::Closed)
    }
}
