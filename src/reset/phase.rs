//! Reset phases and the transitions allowed between them.
//!
//! ```text
//! Idle -> Confirming -> CleaningBroker -> ResettingRepository -> PurgingCheckpoints -> Done
//!   \___________________^
//! any non-terminal phase -> Aborted | Failed
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    Idle,
    Confirming,
    CleaningBroker,
    ResettingRepository,
    PurgingCheckpoints,
    Done,
    /// The operator declined or did not answer.
    Aborted,
    /// A cleanup phase failed. Completed phases are not rolled back.
    Failed,
}

impl ResetPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Failed)
    }

    pub fn can_transition_to(self, next: ResetPhase) -> bool {
        use ResetPhase::*;
        match (self, next) {
            (Idle, Confirming)
            | (Idle, CleaningBroker)
            | (Confirming, CleaningBroker)
            | (CleaningBroker, ResettingRepository)
            | (ResettingRepository, PurgingCheckpoints)
            | (PurgingCheckpoints, Done) => true,
            (from, Aborted | Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ResetPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Confirming => "confirming",
            Self::CleaningBroker => "cleaning_broker",
            Self::ResettingRepository => "resetting_repository",
            Self::PurgingCheckpoints => "purging_checkpoints",
            Self::Done => "done",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Progress of one reset invocation. Lives in memory only.
#[derive(Debug)]
pub struct ResetSession {
    phase: ResetPhase,
    visited: Vec<ResetPhase>,
}

impl Default for ResetSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetSession {
    pub fn new() -> Self {
        Self {
            phase: ResetPhase::Idle,
            visited: Vec::new(),
        }
    }

    pub fn phase(&self) -> ResetPhase {
        self.phase
    }

    /// Phases entered after `Idle`, in order, including the terminal one.
    pub fn visited(&self) -> &[ResetPhase] {
        &self.visited
    }

    pub fn advance(&mut self, next: ResetPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal reset transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!(from = %self.phase, to = %next, "reset phase");
        self.phase = next;
        self.visited.push(next);
    }
}
