use crate::deletion::{DeleteOutcome, DeleteState, DeletionGuard};
use crate::error::Error;
use crate::extensions::{self, ExtensionSet};
use crate::grants::{self, ActiveDirectory, ScopeRegistry};
use crate::indexer::{Indexer, IndexingRun, IndexOutcome};
use crate::launcher::Launcher;
use crate::player::{self, ExecutionRecord};
use crate::progress::Reporter;
use crate::scanner::IndexedFile;
use crate::storage::{GrantStore, PreferenceStore};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The in-process session: owns the working set of resolved directories,
/// the file index, and the execution record, and mutates them only on the
/// control thread. Grants and extension preferences live behind the
/// injected stores and reconstruct this state across restarts.
pub struct Session {
    grants: Box<dyn GrantStore>,
    prefs: Box<dyn PreferenceStore>,
    scopes: ScopeRegistry,
    extensions: ExtensionSet,
    working_set: Vec<ActiveDirectory>,
    index: Vec<IndexedFile>,
    record: ExecutionRecord,
    guard: DeletionGuard,
    indexer: Indexer,
    reporter: Arc<dyn Reporter>,
}

impl Session {
    pub fn new(
        grants: Box<dyn GrantStore>,
        prefs: Box<dyn PreferenceStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            grants,
            prefs,
            scopes: ScopeRegistry::new(),
            extensions: ExtensionSet::new(),
            working_set: Vec::new(),
            index: Vec::new(),
            record: ExecutionRecord::default(),
            guard: DeletionGuard::new(),
            indexer: Indexer::new(),
            reporter,
        }
    }

    /// Cold start: load extension preferences and rebuild the working set
    /// from all persisted grants.
    pub fn load(&mut self) -> Result<(), Error> {
        let items = self.prefs.list()?;
        self.extensions = ExtensionSet::new();
        for item in items {
            self.extensions.add(&item.name);
        }
        debug!("Loaded {} extension preference(s)", self.extensions.len());
        self.reload_working_set()
    }

    /// Re-derive the active directory list from the full current grant
    /// set. A grant that fails to resolve is dropped from the store and
    /// reported once, not retried.
    pub fn reload_working_set(&mut self) -> Result<(), Error> {
        for dir in self.working_set.drain(..) {
            let key = dir.path.to_string_lossy().into_owned();
            self.scopes.end(&key)?;
        }

        let mut dropped = false;
        for grant in self.grants.list()? {
            match grants::resolve(&grant) {
                Ok(dir) => {
                    let key = dir.path.to_string_lossy().into_owned();
                    self.scopes.begin(&key)?;
                    self.working_set.push(dir);
                }
                Err(Error::StaleGrant { path, reason }) => {
                    warn!("Dropping stale grant for '{}': {}", path.display(), reason);
                    self.reporter.on_grant_dropped(&path, &reason);
                    self.grants.delete(&grant.path)?;
                    dropped = true;
                }
                Err(other) => return Err(other),
            }
        }
        if dropped {
            self.grants.save()?;
        }

        info!("Working set holds {} directories", self.working_set.len());
        self.notify_working_set();
        Ok(())
    }

    /// Grant read access to a directory and add it to the working set.
    /// Granting a path that already has an active grant is a no-op;
    /// returns whether the working set changed.
    pub fn grant_directory(&mut self, path: &Path) -> Result<bool, Error> {
        let canonical = fs::canonicalize(path).map_err(|e| Error::GrantCreation {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let key = canonical.to_string_lossy().into_owned();

        if self.scopes.is_held(&key) {
            debug!("'{}' already granted, ignoring", key);
            return Ok(false);
        }

        let grant = grants::create_grant(&canonical)?;
        self.grants.insert(&grant)?;
        self.grants.save()?;

        let dir = grants::resolve(&grant)?;
        self.scopes.begin(&key)?;
        self.working_set.push(dir);
        self.notify_working_set();
        Ok(true)
    }

    /// Remove a directory from the working set and destroy its grant. The
    /// access scope is ended exactly once. Revoking an unknown path is a
    /// no-op; the path may already be gone from disk.
    pub fn revoke_directory(&mut self, path: &Path) -> Result<bool, Error> {
        let key = fs::canonicalize(path)
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| path.to_string_lossy().into_owned());

        let known = self.grants.list()?.iter().any(|g| g.path == key);
        if !known && !self.scopes.is_held(&key) {
            return Ok(false);
        }

        self.grants.delete(&key)?;
        self.grants.save()?;

        if self.scopes.is_held(&key) {
            self.scopes.end(&key)?;
            self.working_set
                .retain(|d| d.path.to_string_lossy() != key.as_str());
            self.notify_working_set();
        }
        Ok(true)
    }

    /// Add an extension to the filter set and persist it. Duplicates and
    /// empty names are no-ops.
    pub fn add_extension(&mut self, name: &str) -> Result<bool, Error> {
        let normalized = match extensions::normalize(name) {
            Some(n) => n,
            None => return Ok(false),
        };
        if !self.extensions.add(&normalized) {
            return Ok(false);
        }
        self.prefs.insert(&normalized)?;
        self.prefs.save()?;
        Ok(true)
    }

    /// Remove an extension from the filter set and its persisted record.
    /// Removing an absent name is a no-op.
    pub fn remove_extension(&mut self, name: &str) -> Result<bool, Error> {
        let normalized = match extensions::normalize(name) {
            Some(n) => n,
            None => return Ok(false),
        };
        if !self.extensions.remove(&normalized) {
            return Ok(false);
        }
        self.prefs.delete(&normalized)?;
        self.prefs.save()?;
        Ok(true)
    }

    /// Apply caller-policy default extensions when the preference store is
    /// empty (first run). Returns how many were added.
    pub fn bootstrap_extensions(&mut self, defaults: &[String]) -> Result<usize, Error> {
        if !self.prefs.list()?.is_empty() {
            return Ok(0);
        }
        let mut added = 0;
        for name in defaults {
            if self.add_extension(name)? {
                added += 1;
            }
        }
        info!("Bootstrapped {} default extension(s)", added);
        Ok(added)
    }

    /// Begin an asynchronous indexing run over the current working set.
    /// Rejected with `Error::Busy` while another run is in flight.
    pub fn start_indexing(&self) -> Result<IndexingRun, Error> {
        let dirs: Vec<PathBuf> = self.working_set.iter().map(|d| d.path.clone()).collect();
        self.indexer
            .start(dirs, self.extensions.clone(), Arc::clone(&self.reporter))
    }

    pub fn is_indexing(&self) -> bool {
        self.indexer.is_busy()
    }

    /// Replace the index wholesale with a completed run's result. Returns
    /// the new index size.
    pub fn apply_index(&mut self, outcome: IndexOutcome) -> usize {
        self.index = outcome.files;
        self.index.len()
    }

    /// Blocking convenience: start a run, wait for it, apply the result.
    pub fn reindex(&mut self) -> Result<usize, Error> {
        let run = self.start_indexing()?;
        let outcome = run.wait()?;
        Ok(self.apply_index(outcome))
    }

    /// Pick a uniformly random indexed file and hand it to the launcher
    /// with the handler program. On success it becomes the last-executed
    /// file, replacing any prior value.
    pub fn select_and_execute(
        &mut self,
        handler: &Path,
        launcher: &dyn Launcher,
    ) -> Result<IndexedFile, Error> {
        let file = player::select_random(&self.index)?.clone();
        player::execute(&file, handler, launcher, &mut self.record)?;
        self.reporter.on_execution(&file.path, handler);
        Ok(file)
    }

    /// Start a delete of the last-executed file; returns the path awaiting
    /// confirmation.
    pub fn request_delete(&mut self) -> Result<PathBuf, Error> {
        self.guard.request(&self.record)
    }

    /// Confirm the pending delete. On success the file is also removed
    /// from the in-memory index so it cannot be selected again.
    pub fn confirm_delete(&mut self) -> Result<DeleteOutcome, Error> {
        let outcome = self.guard.confirm(&mut self.record)?;
        if outcome.succeeded() {
            self.index.retain(|f| f.path != outcome.path);
        }
        self.reporter.on_delete_outcome(&outcome);
        Ok(outcome)
    }

    pub fn cancel_delete(&mut self) {
        self.guard.cancel();
    }

    pub fn delete_state(&self) -> DeleteState {
        self.guard.state()
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    pub fn working_set(&self) -> &[ActiveDirectory] {
        &self.working_set
    }

    pub fn index(&self) -> &[IndexedFile] {
        &self.index
    }

    pub fn last_file(&self) -> Option<&IndexedFile> {
        self.record.last_file()
    }

    fn notify_working_set(&self) {
        let dirs: Vec<PathBuf> = self.working_set.iter().map(|d| d.path.clone()).collect();
        self.reporter.on_working_set_changed(&dirs);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.scopes.release_all();
    }
}
