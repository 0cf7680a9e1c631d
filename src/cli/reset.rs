//! CLI reset command — wipe broker resources, repository, and checkpoints.

use anyhow::Result;

use crate::broker::{ManagementConnector, ResetTargets};
use crate::checkpoint::FsCheckpointStore;
use crate::config::TaurusConfig;
use crate::repository::SqliteRepository;
use crate::reset::{ConfirmationGate, ResetOrchestrator};

/// Reset Taurus Engine's message queues/exchanges, repository, and model
/// checkpoints, prompting on stdin/stdout unless `suppress_prompt` is set.
pub async fn reset(config: &TaurusConfig, suppress_prompt: bool) -> Result<()> {
    let orchestrator = ResetOrchestrator::new(
        ManagementConnector::new(&config.broker),
        ResetTargets::from_config(config),
        SqliteRepository::new(config.resolved_db_path()),
        FsCheckpointStore::new(config.resolved_checkpoint_dir()),
    );
    let mut gate = ConfirmationGate::stdio(config.prompt_timeout());

    let report = orchestrator.run(suppress_prompt, &mut gate).await?;

    println!(
        "Deleted {} queue(s) and {} exchange(s); {} already absent.",
        report.queues.deleted,
        report.exchanges.deleted,
        report.queues.already_absent + report.exchanges.already_absent,
    );
    println!("Repository reset: {}", config.resolved_db_path().display());
    println!("Removed {} model checkpoint(s).", report.checkpoints_removed);
    Ok(())
}
