use crate::error::Error;
use crate::extensions::ExtensionSet;
use crate::progress::Reporter;
use crate::scanner::{self, IndexedFile};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Result of one completed indexing run, delivered atomically.
#[derive(Debug)]
pub struct IndexOutcome {
    pub files: Vec<IndexedFile>,
    pub directories_walked: usize,
    pub skipped_subtrees: usize,
    pub duration: Duration,
}

/// Runs directory traversal on a background thread so the control thread
/// never blocks. Only one run may be in flight at a time; starting another
/// while busy is rejected rather than superseding the active run.
pub struct Indexer {
    busy: Arc<AtomicBool>,
}

impl Indexer {
    pub fn new() -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Begin an asynchronous traversal of `directories`, filtering by
    /// `extensions`. Returns immediately with a handle; the full result
    /// list is delivered through the handle when the walk finishes. The
    /// busy flag is cleared by the worker as its last act, even when the
    /// result is empty or the run was cancelled.
    pub fn start(
        &self,
        directories: Vec<PathBuf>,
        extensions: ExtensionSet,
        reporter: Arc<dyn Reporter>,
    ) -> Result<IndexingRun, Error> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Busy);
        }

        let busy = Arc::clone(&self.busy);
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_worker = Arc::clone(&cancel);
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let start = Instant::now();
            reporter.on_index_start();
            debug!("Indexing {} directories", directories.len());

            let (files, stats) = scanner::collect_matching_files(
                &directories,
                &extensions,
                &cancel_worker,
                reporter.as_ref(),
            );

            let result = if cancel_worker.load(Ordering::Relaxed) {
                info!("Indexing run cancelled after {:?}", start.elapsed());
                Err(Error::Cancelled)
            } else {
                let duration = start.elapsed();
                reporter.on_index_complete(files.len(), duration.as_secs_f64());
                info!(
                    "Indexed {} files across {} directories in {:.2}s ({} subtrees skipped)",
                    files.len(),
                    directories.len(),
                    duration.as_secs_f64(),
                    stats.skipped_subtrees,
                );
                Ok(IndexOutcome {
                    files,
                    directories_walked: directories.len(),
                    skipped_subtrees: stats.skipped_subtrees,
                    duration,
                })
            };

            // Clear busy before delivering so a caller that has seen the
            // result can start the next run immediately.
            busy.store(false, Ordering::SeqCst);
            let _ = tx.send(result);
        });

        Ok(IndexingRun {
            cancel,
            receiver: rx,
            handle: Some(handle),
        })
    }
}

impl Default for Indexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to an in-flight indexing run.
pub struct IndexingRun {
    cancel: Arc<AtomicBool>,
    receiver: mpsc::Receiver<Result<IndexOutcome, Error>>,
    handle: Option<JoinHandle<()>>,
}

impl IndexingRun {
    /// Request cancellation. The run winds down at its next check and
    /// completes with `Error::Cancelled`, publishing nothing.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Non-blocking poll for the result.
    pub fn try_result(&mut self) -> Option<Result<IndexOutcome, Error>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::Other(
                "indexing worker terminated unexpectedly".to_string(),
            ))),
        }
    }

    /// Block until the run completes and return its result.
    pub fn wait(mut self) -> Result<IndexOutcome, Error> {
        let result = self
            .receiver
            .recv()
            .map_err(|_| Error::Other("indexing worker terminated unexpectedly".to_string()))?;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        result
    }
}

impl Drop for IndexingRun {
    fn drop(&mut self) {
        // An abandoned handle should not keep the indexer busy any longer
        // than necessary.
        self.cancel.store(true, Ordering::Relaxed);
    }
}
