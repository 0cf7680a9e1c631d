//! Deletes Taurus Engine queues and exchanges.
//!
//! Queues are matched against the live queue list because model input queues
//! are created per model and cannot be named up front. Exchanges are deleted
//! by name. Each operation opens its own connection and releases it on return.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::{BusConnector, BusError, Deletion};

/// Counts from one cleanup pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub deleted: usize,
    /// Matched resources that were gone by the time the delete ran.
    pub already_absent: usize,
}

impl CleanupSummary {
    fn record(&mut self, outcome: Deletion) {
        match outcome {
            Deletion::Deleted => self.deleted += 1,
            Deletion::AlreadyAbsent => self.already_absent += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.deleted + self.already_absent
    }
}

/// Whether a queue belongs to the reset: an exact name or a prefix match.
pub fn classify(name: &str, exact: &BTreeSet<String>, prefixes: &BTreeSet<String>) -> bool {
    exact.contains(name) || prefixes.iter().any(|p| name.starts_with(p.as_str()))
}

pub struct BrokerCleaner<C> {
    connector: C,
}

impl<C: BusConnector> BrokerCleaner<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Delete every queue that [`classify`] selects.
    pub async fn clean_queues(
        &self,
        exact: &BTreeSet<String>,
        prefixes: &BTreeSet<String>,
    ) -> Result<CleanupSummary, BusError> {
        let mut bus = self.connector.connect().await?;

        let mut queues = bus.list_queues().await?;
        queues.sort();
        queues.dedup();
        debug!(count = queues.len(), "listed broker queues");

        let mut summary = CleanupSummary::default();
        for queue in queues.iter().filter(|q| classify(q, exact, prefixes)) {
            info!(queue = %queue, "deleting Taurus queue");
            let outcome = bus.delete_queue(queue).await?;
            if outcome == Deletion::AlreadyAbsent {
                info!(queue = %queue, "queue already absent");
            }
            summary.record(outcome);
        }

        Ok(summary)
    }

    /// Delete each named exchange in order.
    pub async fn clean_exchanges(&self, names: &[String]) -> Result<CleanupSummary, BusError> {
        let mut bus = self.connector.connect().await?;

        let mut summary = CleanupSummary::default();
        for exchange in names {
            info!(exchange = %exchange, "deleting Taurus exchange");
            let outcome = bus.delete_exchange(exchange).await?;
            if outcome == Deletion::AlreadyAbsent {
                info!(exchange = %exchange, "exchange already absent");
            }
            summary.record(outcome);
        }

        Ok(summary)
    }
}
