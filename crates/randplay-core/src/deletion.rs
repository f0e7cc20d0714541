use crate::error::Error;
use crate::player::ExecutionRecord;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, error};

/// Two-phase removal of the last-executed file: a delete must be requested
/// and then confirmed before the filesystem is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    ConfirmPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteStatus {
    Deleted,
    NotFound,
    Failed(String),
}

/// Outcome of one delete attempt, tied to the specific file attempted.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub path: PathBuf,
    pub status: DeleteStatus,
}

impl DeleteOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, DeleteStatus::Deleted)
    }

    pub fn message(&self) -> String {
        match &self.status {
            DeleteStatus::Deleted => format!("Deleted '{}'", self.path.display()),
            DeleteStatus::NotFound => {
                format!("'{}' was not found (already removed?)", self.path.display())
            }
            DeleteStatus::Failed(reason) => {
                format!("Failed to delete '{}': {}", self.path.display(), reason)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct DeletionGuard {
    state: DeleteState,
}

impl DeletionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DeleteState {
        self.state
    }

    /// Start a delete. Only valid while `record.last_file` is set; returns
    /// the path awaiting confirmation.
    pub fn request(&mut self, record: &ExecutionRecord) -> Result<PathBuf, Error> {
        match record.last_file() {
            Some(file) => {
                self.state = DeleteState::ConfirmPending;
                Ok(file.path.clone())
            }
            None => Err(Error::NothingExecuted),
        }
    }

    /// Perform the filesystem delete of the pending file. The attempt is
    /// terminal either way: a failure is reported through the outcome's
    /// status, not as an `Err`. On success the record is cleared so the
    /// same file cannot be deleted twice; on failure it is left set.
    pub fn confirm(&mut self, record: &mut ExecutionRecord) -> Result<DeleteOutcome, Error> {
        if self.state != DeleteState::ConfirmPending {
            return Err(Error::NoPendingDelete);
        }
        self.state = DeleteState::Idle;

        let file = record.last_file().cloned().ok_or(Error::NothingExecuted)?;
        let status = match fs::remove_file(&file.path) {
            Ok(()) => {
                record.clear();
                debug!("Deleted '{}'", file.path.display());
                DeleteStatus::Deleted
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                error!("Delete target '{}' not found", file.path.display());
                DeleteStatus::NotFound
            }
            Err(err) => {
                error!("Failed to delete '{}': {}", file.path.display(), err);
                DeleteStatus::Failed(err.to_string())
            }
        };

        Ok(DeleteOutcome {
            path: file.path,
            status,
        })
    }

    /// Abandon a pending delete with no side effect.
    pub fn cancel(&mut self) {
        self.state = DeleteState::Idle;
    }
}
