//! Progress tracking for translated units

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Counts translated text units and estimates the time left.
///
/// Reporting only: nothing in the traversal branches on these numbers.
pub struct ProgressTracker {
    total: usize,
    processed: usize,
    started: Instant,
    bar: ProgressBar,
}

impl ProgressTracker {
    /// Create a tracker drawing a progress bar on stderr
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self::with_bar(total, bar)
    }

    /// Create a tracker that draws nothing
    pub fn hidden(total: usize) -> Self {
        Self::with_bar(total, ProgressBar::hidden())
    }

    fn with_bar(total: usize, bar: ProgressBar) -> Self {
        Self {
            total,
            processed: 0,
            started: Instant::now(),
            bar,
        }
    }

    /// Count one more translated unit and refresh the display
    pub fn record(&mut self) {
        self.processed += 1;
        self.bar.inc(1);
        self.bar.set_message(format!(
            "{:.2}% complete, estimated time {:.2} s",
            self.fraction() * 100.0,
            self.eta_secs(self.started.elapsed())
        ));
    }

    /// Share of units done, in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.processed as f64 / self.total as f64).min(1.0)
    }

    /// `elapsed / processed * (total - processed)`, zero before the first unit
    pub fn eta_secs(&self, elapsed: Duration) -> f64 {
        if self.processed == 0 {
            return 0.0;
        }
        let remaining = self.total.saturating_sub(self.processed);
        elapsed.as_secs_f64() / self.processed as f64 * remaining as f64
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Write a line to stderr without tearing the bar
    pub fn eprintln(&self, message: impl AsRef<str>) {
        self.bar.suspend(|| eprintln!("{}", message.as_ref()));
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }
}
