use crate::error::Error;
use crate::platform::{self, FileIdentity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Durable token binding a directory path to read permission. Persisted by
/// a `GrantStore` and read back at process start; the token is opaque to
/// callers and only meaningful to [`resolve`].
#[derive(Debug, Clone)]
pub struct AccessGrant {
    /// Canonical path of the granted directory.
    pub path: String,
    /// Opaque payload capturing the directory's identity at grant time.
    pub token: Vec<u8>,
    pub created_at: String,
}

/// Decoded token payload. Changing this layout invalidates stored tokens,
/// which resolve as stale and get re-acquired.
#[derive(Debug, Serialize, Deserialize)]
struct GrantToken {
    canonical_path: String,
    identity: FileIdentity,
}

/// A granted directory that resolved successfully and is usable for
/// traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveDirectory {
    pub path: PathBuf,
}

/// Request durable read permission for `path`. Fails if the path does not
/// exist, is not a directory, or cannot be read.
pub fn create_grant(path: &Path) -> Result<AccessGrant, Error> {
    let canonical = fs::canonicalize(path).map_err(|e| Error::GrantCreation {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let meta = fs::metadata(&canonical).map_err(|e| Error::GrantCreation {
        path: canonical.clone(),
        reason: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(Error::GrantCreation {
            path: canonical,
            reason: "not a directory".to_string(),
        });
    }

    // Probe readability now so a permission problem surfaces at grant time
    // rather than mid-traversal.
    fs::read_dir(&canonical).map_err(|e| Error::GrantCreation {
        path: canonical.clone(),
        reason: e.to_string(),
    })?;

    let identity = platform::file_identity(&canonical).map_err(|e| Error::GrantCreation {
        path: canonical.clone(),
        reason: e.to_string(),
    })?;

    let canonical_str = canonical.to_string_lossy().into_owned();
    let token = bincode::serialize(&GrantToken {
        canonical_path: canonical_str.clone(),
        identity,
    })
    .map_err(|e| Error::Token(e.to_string()))?;

    debug!("Created grant for '{}'", canonical_str);
    Ok(AccessGrant {
        path: canonical_str,
        token,
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Convert a stored grant back into an active directory handle. Staleness
/// (directory deleted, moved, or replaced since the grant was created) is a
/// distinct error so the caller can drop the grant from persisted storage.
pub fn resolve(grant: &AccessGrant) -> Result<ActiveDirectory, Error> {
    let token: GrantToken = bincode::deserialize(&grant.token).map_err(|_| Error::StaleGrant {
        path: PathBuf::from(&grant.path),
        reason: "token is unreadable".to_string(),
    })?;

    let path = PathBuf::from(&token.canonical_path);
    let meta = fs::metadata(&path).map_err(|_| Error::StaleGrant {
        path: path.clone(),
        reason: "directory no longer resolves".to_string(),
    })?;
    if !meta.is_dir() {
        return Err(Error::StaleGrant {
            path,
            reason: "no longer a directory".to_string(),
        });
    }

    let identity = platform::file_identity(&path).map_err(|e| Error::StaleGrant {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    if identity != token.identity {
        return Err(Error::StaleGrant {
            path,
            reason: "directory was replaced since the grant was created".to_string(),
        });
    }

    Ok(ActiveDirectory { path })
}

/// Tracks elevated-access scopes per canonical path. A scope is begun once
/// when a directory enters the working set and must be ended exactly once
/// when it leaves; double-begin and double-release are both errors.
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    held: HashSet<String>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, path: &str) -> Result<(), Error> {
        if !self.held.insert(path.to_string()) {
            return Err(Error::Scope {
                path: PathBuf::from(path),
                reason: "scope already held".to_string(),
            });
        }
        debug!("Began access scope for '{}'", path);
        Ok(())
    }

    pub fn end(&mut self, path: &str) -> Result<(), Error> {
        if !self.held.remove(path) {
            return Err(Error::Scope {
                path: PathBuf::from(path),
                reason: "scope not held (double release?)".to_string(),
            });
        }
        debug!("Ended access scope for '{}'", path);
        Ok(())
    }

    pub fn is_held(&self, path: &str) -> bool {
        self.held.contains(path)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Release every scope still held. Used on session teardown so no
    /// scope outlives the working set.
    pub fn release_all(&mut self) -> usize {
        let count = self.held.len();
        if count > 0 {
            warn!("Releasing {} scope(s) still held at teardown", count);
        }
        self.held.clear();
        count
    }
}
