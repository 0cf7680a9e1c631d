//! Destructive reset of Taurus Engine state.
//!
//! Deletes Taurus Engine's message queues and exchanges, wipes its repository
//! database, and removes all model checkpoints. Must be run while all Taurus
//! Engine and Taurus Collector services are stopped.
//!
//! # Phases
//!
//! | Phase | Collaborator | On failure |
//! |-------|--------------|------------|
//! | Confirm | warning prompt with a random `Yes-{n}` token | abort, nothing deleted |
//! | Broker | RabbitMQ management API | stop before repository |
//! | Repository | SQLite database | stop before checkpoints |
//! | Checkpoints | checkpoint directory | stop |
//!
//! Phases run strictly in order. Nothing is rolled back; re-running the reset
//! after fixing the cause is the recovery path.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`broker`] — Queue/exchange discovery and deletion
//! - [`repository`] — Repository schema and reset
//! - [`checkpoint`] — Model checkpoint store
//! - [`reset`] — Confirmation gate and the phase orchestrator

pub mod broker;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod repository;
pub mod reset;
