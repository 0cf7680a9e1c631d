//! Model checkpoint storage.
//!
//! Each model's checkpoint lives under the storage root as one entry named by
//! model id. A purge removes every entry and leaves the root in place.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to read checkpoint directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove checkpoint {}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Removes all model checkpoints. The reset orchestrator's view of the store.
pub trait CheckpointPurge {
    /// Returns the number of checkpoints removed.
    fn remove_all(&self) -> Result<usize, CheckpointError>;
}

#[derive(Debug, Clone)]
pub struct FsCheckpointStore {
    root: PathBuf,
}

impl FsCheckpointStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sorted ids of every stored checkpoint. Empty when the root does not exist.
    pub fn model_ids(&self) -> Result<Vec<String>, CheckpointError> {
        let mut ids: Vec<String> = self
            .entries()?
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn entries(&self) -> Result<Vec<PathBuf>, CheckpointError> {
        let read_err = |source| CheckpointError::ReadDir {
            path: self.root.clone(),
            source,
        };

        let dir = match std::fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_err(e)),
        };

        dir.map(|entry| entry.map(|e| e.path()).map_err(read_err))
            .collect()
    }
}

impl CheckpointPurge for FsCheckpointStore {
    fn remove_all(&self) -> Result<usize, CheckpointError> {
        let entries = self.entries()?;

        for path in &entries {
            debug!(path = %path.display(), "removing checkpoint");
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(path)
            } else {
                std::fs::remove_file(path)
            };
            match removed {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(CheckpointError::Remove {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }

        info!(root = %self.root.display(), removed = entries.len(), "model checkpoints removed");
        Ok(entries.len())
    }
}
