//! Broker resources owned by Taurus Engine, resolved from configuration.

use std::collections::BTreeSet;

use crate::config::TaurusConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A queue deleted when its name matches exactly.
    ExactQueue,
    /// Every queue whose name starts with this prefix.
    PrefixedQueue,
    Exchange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTarget {
    pub kind: TargetKind,
    pub name: String,
}

impl ResetTarget {
    pub fn new(kind: TargetKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// The broker resources one reset run deletes. Built per run, never cached.
#[derive(Debug, Clone, Default)]
pub struct ResetTargets {
    targets: Vec<ResetTarget>,
}

impl ResetTargets {
    pub fn new(targets: Vec<ResetTarget>) -> Self {
        Self { targets }
    }

    pub fn from_config(config: &TaurusConfig) -> Self {
        let swapper = &config.model_swapper;
        Self::new(vec![
            ResetTarget::new(TargetKind::ExactQueue, &swapper.results_queue),
            ResetTarget::new(TargetKind::ExactQueue, &swapper.scheduler_notification_queue),
            ResetTarget::new(TargetKind::ExactQueue, &config.metric_listener.queue_name),
            ResetTarget::new(TargetKind::ExactQueue, &config.dynamodb.input_queue_name),
            ResetTarget::new(TargetKind::PrefixedQueue, &swapper.model_input_queue_prefix),
            ResetTarget::new(
                TargetKind::Exchange,
                &config.metric_streamer.results_exchange_name,
            ),
            ResetTarget::new(TargetKind::Exchange, &config.non_metric_data.exchange_name),
        ])
    }

    pub fn exact_queues(&self) -> BTreeSet<String> {
        self.names_of(TargetKind::ExactQueue).collect()
    }

    pub fn queue_prefixes(&self) -> BTreeSet<String> {
        self.names_of(TargetKind::PrefixedQueue).collect()
    }

    /// Exchanges in configuration order.
    pub fn exchanges(&self) -> Vec<String> {
        self.names_of(TargetKind::Exchange).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResetTarget> {
        self.targets.iter()
    }

    fn names_of(&self, kind: TargetKind) -> impl Iterator<Item = String> + '_ {
        self.targets
            .iter()
            .filter(move |t| t.kind == kind)
            .map(|t| t.name.clone())
    }
}
