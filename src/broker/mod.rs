//! Message-bus access for broker cleanup.
//!
//! Provides the [`MessageBus`] and [`BusConnector`] traits, the RabbitMQ
//! management API implementation in [`management`], the configured
//! [`targets`], and the [`cleaner`] that deletes them.

pub mod cleaner;
pub mod management;
pub mod targets;

use async_trait::async_trait;
use thiserror::Error;

pub use cleaner::{classify, BrokerCleaner, CleanupSummary};
pub use management::{ManagementBus, ManagementConnector};
pub use targets::{ResetTarget, ResetTargets, TargetKind};

/// Outcome of a single delete call. Both variants leave the resource absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    AlreadyAbsent,
}

#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to connect to broker at {url}: {message}")]
    Connect { url: String, message: String },

    #[error("broker rejected credentials for user {user}")]
    Authentication { user: String },

    #[error("broker request for {resource} failed")]
    Http {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("broker returned HTTP {status} for {resource}: {body}")]
    Status {
        resource: String,
        status: u16,
        body: String,
    },

    #[error("malformed broker response for {resource}: {message}")]
    Malformed { resource: String, message: String },
}

/// An open connection to the broker.
///
/// Dropping the value releases the connection.
#[async_trait]
pub trait MessageBus: Send {
    /// Names of every queue in the virtual host, in broker order.
    async fn list_queues(&mut self) -> Result<Vec<String>, BusError>;

    async fn delete_queue(&mut self, name: &str) -> Result<Deletion, BusError>;

    async fn delete_exchange(&mut self, name: &str) -> Result<Deletion, BusError>;
}

/// Opens scoped [`MessageBus`] connections.
#[async_trait]
pub trait BusConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn MessageBus>, BusError>;
}
