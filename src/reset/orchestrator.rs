//! Sequences the reset phases with fail-fast semantics.

use std::backtrace::Backtrace;

use tracing::{error, info, warn};

use super::{Confirmation, ResetError, ResetPhase, ResetSession};
use crate::broker::{BrokerCleaner, BusConnector, CleanupSummary, ResetTargets};
use crate::checkpoint::CheckpointPurge;
use crate::repository::RepositoryReset;

/// What a completed reset did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub queues: CleanupSummary,
    pub exchanges: CleanupSummary,
    pub checkpoints_removed: usize,
    pub phases: Vec<ResetPhase>,
}

pub struct ResetOrchestrator<C, R, P> {
    broker: BrokerCleaner<C>,
    targets: ResetTargets,
    repository: R,
    checkpoints: P,
}

impl<C, R, P> ResetOrchestrator<C, R, P>
where
    C: BusConnector,
    R: RepositoryReset,
    P: CheckpointPurge,
{
    pub fn new(connector: C, targets: ResetTargets, repository: R, checkpoints: P) -> Self {
        Self {
            broker: BrokerCleaner::new(connector),
            targets,
            repository,
            checkpoints,
        }
    }

    /// Reset broker resources, the repository, and model checkpoints.
    ///
    /// Unless `suppress_prompt` is set, `gate` must approve first. Must be run
    /// while all Taurus Engine and Taurus Collector services are stopped.
    pub async fn run(
        &self,
        suppress_prompt: bool,
        gate: &mut dyn Confirmation,
    ) -> Result<ResetReport, ResetError> {
        warn!(
            suppress_prompt,
            backtrace = %Backtrace::force_capture(),
            "reset of Taurus Engine state invoked"
        );

        let mut session = ResetSession::new();
        match self.execute(&mut session, suppress_prompt, gate).await {
            Ok(report) => {
                info!(
                    queues_deleted = report.queues.deleted,
                    exchanges_deleted = report.exchanges.deleted,
                    checkpoints_removed = report.checkpoints_removed,
                    "reset complete"
                );
                Ok(report)
            }
            Err(e) => {
                let stopped_in = session.phase();
                session.advance(e.terminal_phase());
                error!(
                    phase = %stopped_in,
                    outcome = %session.phase(),
                    error = %error_chain(&e),
                    "reset stopped; remaining phases skipped"
                );
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        session: &mut ResetSession,
        suppress_prompt: bool,
        gate: &mut dyn Confirmation,
    ) -> Result<ResetReport, ResetError> {
        if suppress_prompt {
            info!("confirmation prompt suppressed");
        } else {
            session.advance(ResetPhase::Confirming);
            gate.confirm().await?;
        }

        session.advance(ResetPhase::CleaningBroker);
        info!("deleting Taurus Engine-related message queues and exchanges");
        let queues = self
            .broker
            .clean_queues(&self.targets.exact_queues(), &self.targets.queue_prefixes())
            .await
            .map_err(ResetError::BrokerCleanup)?;
        let exchanges = self
            .broker
            .clean_exchanges(&self.targets.exchanges())
            .await
            .map_err(ResetError::BrokerCleanup)?;

        session.advance(ResetPhase::ResettingRepository);
        info!("resetting repository");
        self.repository
            .reset()
            .map_err(ResetError::RepositoryReset)?;

        session.advance(ResetPhase::PurgingCheckpoints);
        info!("deleting model checkpoints");
        let checkpoints_removed = self
            .checkpoints
            .remove_all()
            .map_err(ResetError::CheckpointPurge)?;

        session.advance(ResetPhase::Done);
        Ok(ResetReport {
            queues,
            exchanges,
            checkpoints_removed,
            phases: session.visited().to_vec(),
        })
    }
}

/// `error: cause: cause` for log output.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
