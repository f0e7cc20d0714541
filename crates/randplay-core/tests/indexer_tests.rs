use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

use randplay_core::extensions::ExtensionSet;
use randplay_core::indexer::Indexer;
use randplay_core::scanner;
use randplay_core::{Error, Reporter, SilentReporter};

/// Create a directory tree with a known mix of matching and non-matching
/// files.
/// Layout:
///   root/
///     clips/
///       one.mp4
///       two.MP4
///       notes.txt
///       nested/
///         three.avi
///     other/
///       four.mp4
///       README
fn create_test_tree(root: &std::path::Path) -> (PathBuf, PathBuf) {
    let clips = root.join("clips");
    let other = root.join("other");
    fs::create_dir_all(clips.join("nested")).unwrap();
    fs::create_dir_all(&other).unwrap();

    fs::write(clips.join("one.mp4"), "a").unwrap();
    fs::write(clips.join("two.MP4"), "b").unwrap();
    fs::write(clips.join("notes.txt"), "c").unwrap();
    fs::write(clips.join("nested").join("three.avi"), "d").unwrap();
    fs::write(other.join("four.mp4"), "e").unwrap();
    fs::write(other.join("README"), "f").unwrap();

    (clips, other)
}

fn media_extensions() -> ExtensionSet {
    let mut extensions = ExtensionSet::new();
    extensions.add("mp4");
    extensions.add("avi");
    extensions
}

fn indexed_paths(files: &[scanner::IndexedFile]) -> BTreeSet<PathBuf> {
    files.iter().map(|f| f.path.clone()).collect()
}

/// Reporter that parks the indexing worker inside `on_index_start` until
/// the test releases it, making in-flight assertions deterministic.
struct GateReporter {
    release: Mutex<Receiver<()>>,
}

impl GateReporter {
    fn new() -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Arc::new(Self {
                release: Mutex::new(rx),
            }),
            tx,
        )
    }
}

impl Reporter for GateReporter {
    fn on_index_start(&self) {
        let guard = self.release.lock().unwrap();
        let _ = guard.recv_timeout(Duration::from_secs(5));
    }
}

#[test]
fn test_index_matches_exactly_the_filtered_files() {
    let tmp = tempdir().unwrap();
    let (clips, other) = create_test_tree(tmp.path());

    let indexer = Indexer::new();
    let run = indexer
        .start(
            vec![clips.clone(), other.clone()],
            media_extensions(),
            Arc::new(SilentReporter),
        )
        .unwrap();
    let outcome = run.wait().unwrap();

    let expected: BTreeSet<PathBuf> = [
        clips.join("one.mp4"),
        clips.join("two.MP4"),
        clips.join("nested").join("three.avi"),
        other.join("four.mp4"),
    ]
    .into_iter()
    .collect();

    assert_eq!(indexed_paths(&outcome.files), expected);
    assert_eq!(outcome.directories_walked, 2);
    assert_eq!(outcome.skipped_subtrees, 0);

    // Every indexed file knows which granted directory it came from.
    for file in &outcome.files {
        assert!(file.path.starts_with(&file.root));
    }
}

#[test]
fn test_indexing_is_idempotent_on_unchanged_tree() {
    let tmp = tempdir().unwrap();
    let (clips, other) = create_test_tree(tmp.path());
    let roots = vec![clips, other];

    let indexer = Indexer::new();
    let first = indexer
        .start(roots.clone(), media_extensions(), Arc::new(SilentReporter))
        .unwrap()
        .wait()
        .unwrap();
    let second = indexer
        .start(roots, media_extensions(), Arc::new(SilentReporter))
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(indexed_paths(&first.files), indexed_paths(&second.files));
}

#[test]
fn test_second_start_while_busy_is_rejected() {
    let tmp = tempdir().unwrap();
    let (clips, other) = create_test_tree(tmp.path());

    let indexer = Indexer::new();
    let (reporter, release) = GateReporter::new();
    let run = indexer
        .start(vec![clips.clone(), other.clone()], media_extensions(), reporter)
        .unwrap();

    assert!(indexer.is_busy());
    match indexer.start(vec![clips, other], media_extensions(), Arc::new(SilentReporter)) {
        Err(Error::Busy) => {}
        other => panic!("Expected Busy, got {:?}", other.map(|_| ())),
    }

    release.send(()).unwrap();
    let outcome = run.wait().unwrap();
    assert_eq!(outcome.files.len(), 4);

    // The worker cleared the busy flag before delivering the result.
    assert!(!indexer.is_busy());
}

#[test]
fn test_cancelled_run_publishes_nothing() {
    let tmp = tempdir().unwrap();
    let (clips, other) = create_test_tree(tmp.path());

    let indexer = Indexer::new();
    let (reporter, release) = GateReporter::new();
    let run = indexer
        .start(vec![clips, other], media_extensions(), reporter)
        .unwrap();

    run.cancel();
    release.send(()).unwrap();

    match run.wait() {
        Err(Error::Cancelled) => {}
        other => panic!("Expected Cancelled, got {:?}", other.map(|o| o.files.len())),
    }
    assert!(!indexer.is_busy());
}

#[test]
fn test_unreadable_root_is_skipped_not_fatal() {
    let tmp = tempdir().unwrap();
    let (clips, _other) = create_test_tree(tmp.path());
    let vanished = tmp.path().join("vanished");

    // `vanished` never existed; the run continues with the readable root.
    let cancel = AtomicBool::new(false);
    let (files, stats) = scanner::collect_matching_files(
        &[vanished, clips.clone()],
        &media_extensions(),
        &cancel,
        &SilentReporter,
    );

    assert_eq!(stats.skipped_subtrees, 1);
    let expected: BTreeSet<PathBuf> = [
        clips.join("one.mp4"),
        clips.join("two.MP4"),
        clips.join("nested").join("three.avi"),
    ]
    .into_iter()
    .collect();
    assert_eq!(indexed_paths(&files), expected);
}

#[cfg(unix)]
#[test]
fn test_symlinked_subtree_is_skipped() {
    let tmp = tempdir().unwrap();
    let (clips, other) = create_test_tree(tmp.path());

    // Link one root inside the other; following it would double-count.
    std::os::unix::fs::symlink(&other, clips.join("loop")).unwrap();
    std::os::unix::fs::symlink(other.join("four.mp4"), clips.join("alias.mp4")).unwrap();

    let cancel = AtomicBool::new(false);
    let (files, _stats) = scanner::collect_matching_files(
        &[clips.clone()],
        &media_extensions(),
        &cancel,
        &SilentReporter,
    );

    let expected: BTreeSet<PathBuf> = [
        clips.join("one.mp4"),
        clips.join("two.MP4"),
        clips.join("nested").join("three.avi"),
    ]
    .into_iter()
    .collect();
    assert_eq!(indexed_paths(&files), expected);
}

#[test]
fn test_empty_extension_set_matches_nothing() {
    let tmp = tempdir().unwrap();
    let (clips, other) = create_test_tree(tmp.path());

    let indexer = Indexer::new();
    let run = indexer
        .start(
            vec![clips, other],
            ExtensionSet::new(),
            Arc::new(SilentReporter),
        )
        .unwrap();
    let outcome = run.wait().unwrap();
    assert!(outcome.files.is_empty());
}
