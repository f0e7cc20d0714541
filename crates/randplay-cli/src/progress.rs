use indicatif::{ProgressBar, ProgressStyle};
use randplay_core::Reporter;
use std::path::Path;
use std::sync::Mutex;

/// CLI reporter using an indicatif spinner for indexing (total file count
/// is unknown upfront) and plain lines for session events.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }
}

impl Reporter for CliReporter {
    fn on_index_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message("Indexing files...");
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_index_progress(&self, files_found: usize, _current_path: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Indexing... {} files found", files_found));
        }
    }

    fn on_index_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Index complete: {} files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_grant_dropped(&self, path: &Path, reason: &str) {
        eprintln!(
            "  \x1b[33m!\x1b[0m Dropped stale grant for {}: {}",
            path.display(),
            reason
        );
    }
}
