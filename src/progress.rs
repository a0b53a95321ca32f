use crate::walker::ScanObserver;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ProgressStats {
    pub files_with_matches: usize,
    pub matches_found: usize,
    start_time: Instant,
}

impl ProgressStats {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Progress bar fed by the tree walker.
pub struct ProgressReporter {
    bar: ProgressBar,
    stats: Mutex<ProgressStats>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files\n{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self::with_bar(bar)
    }

    /// A reporter that draws nothing, for non-terminal output.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        Self {
            bar,
            stats: Mutex::new(ProgressStats {
                files_with_matches: 0,
                matches_found: 0,
                start_time: Instant::now(),
            }),
        }
    }

    /// Clears the bar and returns the final counts.
    pub fn finish(&self) -> ProgressStats {
        let stats = self.stats.lock().clone();
        self.bar.finish_and_clear();
        stats
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanObserver for ProgressReporter {
    fn on_candidates(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn on_file_scanned(&self, path: &Path, matches: usize) {
        let mut stats = self.stats.lock();
        if matches > 0 {
            stats.files_with_matches += 1;
        }
        stats.matches_found += matches;
        self.bar.inc(1);
        self.bar.set_message(format!(
            "{} matches in {:.1}s | {}",
            stats.matches_found,
            stats.elapsed().as_secs_f64(),
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
    }
}
