use crate::extensions::ExtensionSet;
use crate::progress::Reporter;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::warn;

/// A file discovered during indexing: its absolute path plus the granted
/// directory it was found under. Transient; the index is rebuilt wholesale
/// on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub path: PathBuf,
    pub root: PathBuf,
}

#[derive(Debug, Default)]
pub struct WalkStats {
    pub files_matched: usize,
    pub skipped_subtrees: usize,
}

/// Recursive traversal of `roots`, filtering leaf files by extension
/// membership. Roots are walked in parallel but results keep the input
/// order across roots; within a root, order is filesystem enumeration
/// order and is not stable across runs. Symlinks are skipped; an
/// unreadable directory is counted and skipped, never fatal.
///
/// Returns a partial result if `cancel` is observed mid-walk; the caller
/// decides whether a cancelled walk is discarded.
pub fn collect_matching_files(
    roots: &[PathBuf],
    extensions: &ExtensionSet,
    cancel: &AtomicBool,
    reporter: &dyn Reporter,
) -> (Vec<IndexedFile>, WalkStats) {
    let found = AtomicUsize::new(0);

    let per_root: Vec<(Vec<IndexedFile>, usize)> = roots
        .par_iter()
        .map(|root| {
            let mut files = Vec::new();
            let mut skipped = 0usize;
            visit_dir(
                root, root, extensions, cancel, reporter, &found, &mut files, &mut skipped,
            );
            (files, skipped)
        })
        .collect();

    let mut stats = WalkStats::default();
    let mut all = Vec::new();
    for (files, skipped) in per_root {
        stats.skipped_subtrees += skipped;
        all.extend(files);
    }
    stats.files_matched = all.len();
    (all, stats)
}

#[allow(clippy::too_many_arguments)]
fn visit_dir(
    dir: &Path,
    root: &Path,
    extensions: &ExtensionSet,
    cancel: &AtomicBool,
    reporter: &dyn Reporter,
    found: &AtomicUsize,
    out: &mut Vec<IndexedFile>,
    skipped: &mut usize,
) {
    if cancel.load(Ordering::Relaxed) {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Skipping unreadable directory {}: {}", dir.display(), err);
            *skipped += 1;
            return;
        }
    };

    for entry in entries {
        if cancel.load(Ordering::Relaxed) {
            return;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping entry in {}: {}", dir.display(), err);
                continue;
            }
        };

        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                continue;
            }
        };

        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            visit_dir(
                &path, root, extensions, cancel, reporter, found, out, skipped,
            );
        } else if file_type.is_file() && extensions.matches(&path) {
            let count = found.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.on_index_progress(count, &path.to_string_lossy());
            out.push(IndexedFile {
                path,
                root: root.to_path_buf(),
            });
        }
    }
}
