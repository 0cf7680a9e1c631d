mod helpers;

use helpers::{Answer, FakeCheckpoints, FakeConnector, FakeRepository, ScriptedConfirmation};
use taurus_reset::broker::{ResetTarget, ResetTargets, TargetKind};
use taurus_reset::config::TaurusConfig;
use taurus_reset::reset::{ResetError, ResetOrchestrator, ResetPhase};

fn targets() -> ResetTargets {
    ResetTargets::new(vec![
        ResetTarget::new(TargetKind::ExactQueue, "taurus.mswapper.results"),
        ResetTarget::new(TargetKind::PrefixedQueue, "taurus.mswapper.model.input."),
        ResetTarget::new(TargetKind::Exchange, "taurus.model.results"),
    ])
}

fn broker() -> FakeConnector {
    FakeConnector::with_queues(&[
        "taurus.mswapper.results",
        "taurus.mswapper.model.input.m1",
        "taurus.mswapper.model.input.m2",
        "unrelated",
    ])
    .with_exchanges(&["taurus.model.results"])
}

#[tokio::test]
async fn confirmed_reset_runs_every_phase_in_order() {
    let connector = broker();
    let repository = FakeRepository::default();
    let checkpoints = FakeCheckpoints::holding(2);
    let orchestrator =
        ResetOrchestrator::new(connector.clone(), targets(), repository.clone(), checkpoints.clone());
    let mut gate = ScriptedConfirmation::new(Answer::Approve);

    let report = orchestrator.run(false, &mut gate).await.unwrap();

    assert_eq!(gate.calls, 1);
    assert_eq!(report.queues.deleted, 3);
    assert_eq!(report.exchanges.deleted, 1);
    assert_eq!(report.checkpoints_removed, 2);
    assert_eq!(
        report.phases,
        vec![
            ResetPhase::Confirming,
            ResetPhase::CleaningBroker,
            ResetPhase::ResettingRepository,
            ResetPhase::PurgingCheckpoints,
            ResetPhase::Done,
        ]
    );
    assert_eq!(repository.calls(), 1);
    assert_eq!(checkpoints.calls(), 1);
    connector.snapshot(|s| assert!(s.queues.contains("unrelated")));
}

#[tokio::test]
async fn suppressed_prompt_skips_confirmation() {
    let orchestrator = ResetOrchestrator::new(
        broker(),
        targets(),
        FakeRepository::default(),
        FakeCheckpoints::default(),
    );
    // Would abort if it were consulted.
    let mut gate = ScriptedConfirmation::new(Answer::Decline("no"));

    let report = orchestrator.run(true, &mut gate).await.unwrap();

    assert_eq!(gate.calls, 0);
    assert_eq!(report.phases.first(), Some(&ResetPhase::CleaningBroker));
}

#[tokio::test]
async fn prompt_timeout_performs_no_cleanup() {
    let connector = broker();
    let repository = FakeRepository::default();
    let checkpoints = FakeCheckpoints::default();
    let orchestrator =
        ResetOrchestrator::new(connector.clone(), targets(), repository.clone(), checkpoints.clone());
    let mut gate = ScriptedConfirmation::new(Answer::Timeout);

    let err = orchestrator.run(false, &mut gate).await.unwrap_err();

    assert!(matches!(err, ResetError::PromptTimeout(_)));
    assert_eq!(err.terminal_phase(), ResetPhase::Aborted);
    connector.snapshot(|s| {
        assert_eq!(s.connects, 0, "broker is never contacted");
        assert!(s.deleted_queues.is_empty());
    });
    assert_eq!(repository.calls(), 0);
    assert_eq!(checkpoints.calls(), 0);
}

#[tokio::test]
async fn declined_prompt_performs_no_cleanup() {
    let connector = broker();
    let repository = FakeRepository::default();
    let orchestrator = ResetOrchestrator::new(
        connector.clone(),
        targets(),
        repository.clone(),
        FakeCheckpoints::default(),
    );
    let mut gate = ScriptedConfirmation::new(Answer::Decline("Yes-99"));

    let err = orchestrator.run(false, &mut gate).await.unwrap_err();

    match err {
        ResetError::UserAborted { actual, .. } => assert_eq!(actual, "Yes-99"),
        other => panic!("expected UserAborted, got {other:?}"),
    }
    connector.snapshot(|s| assert_eq!(s.connects, 0));
    assert_eq!(repository.calls(), 0);
}

#[tokio::test]
async fn broker_failure_stops_before_repository() {
    let connector = broker().failing_on("taurus.model.results");
    let repository = FakeRepository::default();
    let checkpoints = FakeCheckpoints::default();
    let orchestrator =
        ResetOrchestrator::new(connector.clone(), targets(), repository.clone(), checkpoints.clone());

    let err = orchestrator
        .run(true, &mut ScriptedConfirmation::new(Answer::Approve))
        .await
        .unwrap_err();

    assert!(matches!(err, ResetError::BrokerCleanup(_)));
    assert_eq!(err.terminal_phase(), ResetPhase::Failed);
    // Queues deleted before the failing exchange stay deleted.
    connector.snapshot(|s| {
        assert_eq!(s.deleted_queues.len(), 3);
        assert_eq!(s.releases, s.connects);
    });
    assert_eq!(repository.calls(), 0);
    assert_eq!(checkpoints.calls(), 0);
}

#[tokio::test]
async fn repository_failure_never_purges_checkpoints() {
    let repository = FakeRepository::failing();
    let checkpoints = FakeCheckpoints::default();
    let orchestrator =
        ResetOrchestrator::new(broker(), targets(), repository.clone(), checkpoints.clone());

    let err = orchestrator
        .run(true, &mut ScriptedConfirmation::new(Answer::Approve))
        .await
        .unwrap_err();

    assert!(matches!(err, ResetError::RepositoryReset(_)));
    assert!(std::error::Error::source(&err).is_some(), "collaborator error is kept");
    assert_eq!(repository.calls(), 1);
    assert_eq!(checkpoints.calls(), 0);
}

#[tokio::test]
async fn checkpoint_failure_is_surfaced() {
    let orchestrator = ResetOrchestrator::new(
        broker(),
        targets(),
        FakeRepository::default(),
        FakeCheckpoints::failing(),
    );

    let err = orchestrator
        .run(true, &mut ScriptedConfirmation::new(Answer::Approve))
        .await
        .unwrap_err();

    assert!(matches!(err, ResetError::CheckpointPurge(_)));
}

#[tokio::test]
async fn rerun_after_success_is_harmless() {
    let connector = broker();
    let orchestrator = ResetOrchestrator::new(
        connector.clone(),
        targets(),
        FakeRepository::default(),
        FakeCheckpoints::default(),
    );
    let mut gate = ScriptedConfirmation::new(Answer::Approve);

    orchestrator.run(true, &mut gate).await.unwrap();
    let second = orchestrator.run(true, &mut gate).await.unwrap();

    assert_eq!(second.queues.total(), 0);
    assert_eq!(second.exchanges.deleted, 0);
    assert_eq!(second.exchanges.already_absent, 1);
}

#[tokio::test]
async fn default_config_targets_every_taurus_queue() {
    let connector = FakeConnector::with_queues(&[
        "taurus.mswapper.results",
        "taurus.mswapper.scheduler.notification",
        "taurus.metric.custom.data",
        "taurus.dynamodb",
        "taurus.mswapper.model.input.abc",
        "grok.unrelated",
    ]);
    let orchestrator = ResetOrchestrator::new(
        connector.clone(),
        ResetTargets::from_config(&TaurusConfig::default()),
        FakeRepository::default(),
        FakeCheckpoints::default(),
    );

    let report = orchestrator
        .run(true, &mut ScriptedConfirmation::new(Answer::Approve))
        .await
        .unwrap();

    assert_eq!(report.queues.deleted, 5);
    connector.snapshot(|s| {
        assert_eq!(s.queues.len(), 1);
        assert!(s.queues.contains("grok.unrelated"));
        assert_eq!(
            s.deleted_exchanges,
            vec!["taurus.model.results", "taurus.data.non-metric"]
        );
    });
}
