#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taurus_reset::broker::{BusConnector, BusError, Deletion, MessageBus};
use taurus_reset::checkpoint::{CheckpointError, CheckpointPurge};
use taurus_reset::repository::{RepositoryError, RepositoryReset};
use taurus_reset::reset::{Confirmation, ResetError};

/// In-memory broker state shared between a [`FakeConnector`] and the test.
#[derive(Debug, Default)]
pub struct BrokerState {
    pub queues: BTreeSet<String>,
    pub exchanges: BTreeSet<String>,
    pub deleted_queues: Vec<String>,
    pub deleted_exchanges: Vec<String>,
    pub list_calls: usize,
    pub connects: usize,
    pub releases: usize,
    /// Deleting this queue or exchange returns HTTP 500.
    pub fail_on: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    pub state: Arc<Mutex<BrokerState>>,
}

impl FakeConnector {
    pub fn with_queues(queues: &[&str]) -> Self {
        let connector = Self::default();
        connector.state.lock().unwrap().queues = queues.iter().map(|q| q.to_string()).collect();
        connector
    }

    pub fn with_exchanges(self, exchanges: &[&str]) -> Self {
        self.state.lock().unwrap().exchanges = exchanges.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn failing_on(self, name: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(name.to_string());
        self
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&BrokerState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

#[async_trait]
impl BusConnector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn MessageBus>, BusError> {
        self.state.lock().unwrap().connects += 1;
        Ok(Box::new(FakeBus {
            state: Arc::clone(&self.state),
        }))
    }
}

pub struct FakeBus {
    state: Arc<Mutex<BrokerState>>,
}

impl FakeBus {
    fn check_failure(state: &BrokerState, name: &str) -> Result<(), BusError> {
        if state.fail_on.as_deref() == Some(name) {
            return Err(BusError::Status {
                resource: name.to_string(),
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessageBus for FakeBus {
    async fn list_queues(&mut self) -> Result<Vec<String>, BusError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        // Reverse order so callers cannot rely on the broker sorting.
        Ok(state.queues.iter().rev().cloned().collect())
    }

    async fn delete_queue(&mut self, name: &str) -> Result<Deletion, BusError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, name)?;
        state.deleted_queues.push(name.to_string());
        Ok(if state.queues.remove(name) {
            Deletion::Deleted
        } else {
            Deletion::AlreadyAbsent
        })
    }

    async fn delete_exchange(&mut self, name: &str) -> Result<Deletion, BusError> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state, name)?;
        state.deleted_exchanges.push(name.to_string());
        Ok(if state.exchanges.remove(name) {
            Deletion::Deleted
        } else {
            Deletion::AlreadyAbsent
        })
    }
}

impl Drop for FakeBus {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.releases += 1;
        }
    }
}

/// Records calls; fails when `fail` is set.
#[derive(Clone, Default)]
pub struct FakeRepository {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeRepository {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RepositoryReset for FakeRepository {
    fn reset(&self) -> Result<(), RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RepositoryError::Sql(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeCheckpoints {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
    pub stored: usize,
}

impl FakeCheckpoints {
    pub fn holding(stored: usize) -> Self {
        Self {
            stored,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CheckpointPurge for FakeCheckpoints {
    fn remove_all(&self) -> Result<usize, CheckpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CheckpointError::Remove {
                path: "/checkpoints/m1".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            });
        }
        Ok(self.stored)
    }
}

/// Confirmation that answers from a script instead of a terminal.
pub enum Answer {
    Approve,
    Timeout,
    Decline(&'static str),
}

pub struct ScriptedConfirmation {
    pub answer: Answer,
    pub calls: usize,
}

impl ScriptedConfirmation {
    pub fn new(answer: Answer) -> Self {
        Self { answer, calls: 0 }
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn confirm(&mut self) -> Result<(), ResetError> {
        self.calls += 1;
        match self.answer {
            Answer::Approve => Ok(()),
            Answer::Timeout => Err(ResetError::PromptTimeout(std::time::Duration::from_secs(30))),
            Answer::Decline(actual) => Err(ResetError::UserAborted {
                expected: "Yes-1".into(),
                actual: actual.into(),
            }),
        }
    }
}
