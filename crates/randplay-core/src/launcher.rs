use crate::error::Error;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// External collaborator that opens a file with a handler program. Safe to
/// call from the control thread; implementations must not block on the
/// launched program.
pub trait Launcher {
    fn open(&self, file: &Path, handler: &Path) -> Result<(), Error>;
}

/// Launches the handler as a detached child process with the file path as
/// its single argument.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn open(&self, file: &Path, handler: &Path) -> Result<(), Error> {
        Command::new(handler)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Launch {
                handler: handler.to_path_buf(),
                file: file.to_path_buf(),
                reason: e.to_string(),
            })?;
        debug!(
            "Spawned '{}' for '{}'",
            handler.display(),
            file.display()
        );
        Ok(())
    }
}
