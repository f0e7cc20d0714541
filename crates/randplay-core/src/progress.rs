use crate::deletion::DeleteOutcome;
use std::path::{Path, PathBuf};

/// Trait for observing session and indexing state changes.
///
/// CLI implements with tracing/indicatif; a presentation layer would drive
/// its rendering from these callbacks. All methods have default no-op
/// implementations.
pub trait Reporter: Send + Sync {
    fn on_index_start(&self) {}
    fn on_index_progress(&self, _files_found: usize, _current_path: &str) {}
    fn on_index_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_working_set_changed(&self, _directories: &[PathBuf]) {}
    fn on_grant_dropped(&self, _path: &Path, _reason: &str) {}
    fn on_execution(&self, _file: &Path, _handler: &Path) {}
    fn on_delete_outcome(&self, _outcome: &DeleteOutcome) {}
}

/// No-op reporter for silent operation.
pub struct SilentReporter;

impl Reporter for SilentReporter {}
