use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Filesystem identity of a directory, captured when a grant is created and
/// compared again at resolution time. A directory that was deleted and
/// recreated at the same path gets a new identity, so the old grant reads
/// as stale rather than silently pointing at a different object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIdentity {
    pub device: u64,
    pub inode: u64,
}

#[cfg(unix)]
pub fn file_identity(path: &Path) -> io::Result<FileIdentity> {
    use std::os::unix::fs::MetadataExt;

    let meta = fs::metadata(path)?;
    Ok(FileIdentity {
        device: meta.dev(),
        inode: meta.ino(),
    })
}

#[cfg(not(unix))]
pub fn file_identity(path: &Path) -> io::Result<FileIdentity> {
    use std::time::UNIX_EPOCH;

    // No stable inode on this platform; creation time is the closest
    // durable identity std exposes.
    let meta = fs::metadata(path)?;
    let created = meta
        .created()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    Ok(FileIdentity {
        device: 0,
        inode: created,
    })
}
