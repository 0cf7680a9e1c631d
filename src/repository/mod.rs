//! Taurus Engine repository database.
//!
//! The repository holds metric definitions, metric samples, and instance
//! status history in SQLite. A reset drops every table and recreates the
//! schema in a single transaction.

pub mod schema;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to create repository directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open repository at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("repository statement failed")]
    Sql(#[from] rusqlite::Error),
}

/// Wipes the repository. The reset orchestrator's view of the datastore.
pub trait RepositoryReset {
    fn reset(&self) -> Result<(), RepositoryError>;
}

/// Open (or create) the repository at the given path with the schema initialized.
pub fn open_repository(path: impl AsRef<Path>) -> Result<Connection, RepositoryError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RepositoryError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path).map_err(|source| RepositoryError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(Duration::from_secs(5))?;

    schema::init_schema(&conn)?;

    tracing::debug!(path = %path.display(), "repository opened");
    Ok(conn)
}

/// Row counts of the data-bearing tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryCounts {
    pub metrics: u64,
    pub metric_samples: u64,
    pub status_history: u64,
}

pub fn repository_counts(conn: &Connection) -> Result<RepositoryCounts, RepositoryError> {
    let count = |table: &str| -> rusqlite::Result<u64> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as u64)
    };

    Ok(RepositoryCounts {
        metrics: count("metric")?,
        metric_samples: count("metric_data")?,
        status_history: count("instance_status_history")?,
    })
}

/// Drop every user table and recreate the schema. Commits or changes nothing.
pub fn reset_repository(conn: &mut Connection) -> Result<RepositoryCounts, RepositoryError> {
    let discarded = repository_counts(conn)?;

    let tx = conn.transaction()?;
    // Tables are dropped in catalog order; FK checks wait for the commit.
    tx.pragma_update(None, "defer_foreign_keys", "ON")?;

    let tables: Vec<String> = tx
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")?
        .query_map([], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    for table in &tables {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", table.replace('"', "\"\"")))?;
    }

    schema::init_schema(&tx)?;
    tx.commit()?;

    info!(
        tables = tables.len(),
        metrics = discarded.metrics,
        metric_samples = discarded.metric_samples,
        status_history = discarded.status_history,
        "repository reset"
    );
    Ok(discarded)
}

/// The on-disk SQLite repository.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    path: PathBuf,
}

impl SqliteRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RepositoryReset for SqliteRepository {
    fn reset(&self) -> Result<(), RepositoryError> {
        let mut conn = open_repository(&self.path)?;
        reset_repository(&mut conn)?;
        Ok(())
    }
}

/// Open an in-memory repository for testing.
#[cfg(test)]
pub fn open_memory_repository() -> Result<Connection, RepositoryError> {
    let conn = Connection::open_in_memory()?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    schema::init_schema(&conn)?;
    Ok(conn)
}
