use crate::error::Error;
use crate::launcher::Launcher;
use crate::scanner::IndexedFile;
use rand::seq::SliceRandom;
use std::path::Path;
use tracing::info;

/// At most one outstanding "last executed" file at a time. Deletion is only
/// ever permitted against this record; a new execution replaces it.
#[derive(Debug, Default)]
pub struct ExecutionRecord {
    last_file: Option<IndexedFile>,
}

impl ExecutionRecord {
    pub fn last_file(&self) -> Option<&IndexedFile> {
        self.last_file.as_ref()
    }

    pub fn set(&mut self, file: IndexedFile) {
        self.last_file = Some(file);
    }

    pub fn clear(&mut self) {
        self.last_file = None;
    }
}

/// Uniform-random choice over the current index. Fails explicitly on an
/// empty index.
pub fn select_random(index: &[IndexedFile]) -> Result<&IndexedFile, Error> {
    index.choose(&mut rand::thread_rng()).ok_or(Error::EmptyIndex)
}

/// Hand `file` to the external launcher along with the handler program. On
/// success the execution record is updated, replacing any prior value; on
/// failure it is left untouched and the error is reported to the caller
/// with no retry.
pub fn execute(
    file: &IndexedFile,
    handler: &Path,
    launcher: &dyn Launcher,
    record: &mut ExecutionRecord,
) -> Result<(), Error> {
    launcher.open(&file.path, handler)?;
    info!(
        "Executed '{}' with '{}'",
        file.path.display(),
        handler.display()
    );
    record.set(file.clone());
    Ok(())
}
