//! The confirmation-gated reset of Taurus Engine state.
//!
//! [`ResetOrchestrator`] runs the [`ConfirmationGate`] (unless suppressed),
//! then broker cleanup, repository reset, and checkpoint purge, in that order.
//! The first failure stops the run; nothing already deleted is restored.
//! Re-running the whole reset is the recovery path.

pub mod confirm;
pub mod orchestrator;
pub mod phase;

use std::time::Duration;
use thiserror::Error;

use crate::broker::BusError;
use crate::checkpoint::CheckpointError;
use crate::repository::RepositoryError;

pub use confirm::{Confirmation, ConfirmationChallenge, ConfirmationGate};
pub use orchestrator::{ResetOrchestrator, ResetReport};
pub use phase::{ResetPhase, ResetSession};

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("no answer to the warning prompt within {} seconds", .0.as_secs_f64())]
    PromptTimeout(Duration),

    #[error("user aborted operation from warning prompt; expected={expected:?}, actual={actual:?}")]
    UserAborted { expected: String, actual: String },

    #[error("failed to interact with the warning prompt")]
    PromptIo(#[source] std::io::Error),

    #[error("broker cleanup failed")]
    BrokerCleanup(#[source] BusError),

    #[error("repository reset failed")]
    RepositoryReset(#[source] RepositoryError),

    #[error("checkpoint purge failed")]
    CheckpointPurge(#[source] CheckpointError),
}

impl ResetError {
    /// Terminal phase for this error: prompt errors abort, the rest fail.
    pub fn terminal_phase(&self) -> ResetPhase {
        match self {
            Self::PromptTimeout(_) | Self::UserAborted { .. } | Self::PromptIo(_) => {
                ResetPhase::Aborted
            }
            _ => ResetPhase::Failed,
        }
    }
}
