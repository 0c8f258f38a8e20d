// Run metrics
//
// Lightweight counters for a compile run, summarised in the log at the end

use crate::error::{Issue, Severity};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters for a single compile run
///
/// Uses atomics so a shared reference is enough to record into, whichever
/// thread processes a card.
#[derive(Debug)]
pub struct Metrics {
    /// Cards whose folder and byte code were produced
    pub cards_processed: AtomicUsize,

    /// Files copied to the destination
    pub files_copied: AtomicUsize,

    /// Total bytes copied
    pub bytes_copied: AtomicU64,

    /// Stale files removed from card folders
    pub stale_files_removed: AtomicUsize,

    /// Warning-level issues raised
    pub warnings: AtomicUsize,

    /// Error-level issues raised (the run continued)
    pub errors: AtomicUsize,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            cards_processed: AtomicUsize::new(0),
            files_copied: AtomicUsize::new(0),
            bytes_copied: AtomicU64::new(0),
            stale_files_removed: AtomicUsize::new(0),
            warnings: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_card_processed(&self) {
        self.cards_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_files_copied(&self, files: usize, bytes: u64) {
        self.files_copied.fetch_add(files, Ordering::Relaxed);
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_stale_removed(&self, files: usize) {
        self.stale_files_removed.fetch_add(files, Ordering::Relaxed);
    }

    /// Count an issue by its severity
    pub fn record_issue(&self, issue: &Issue) {
        match issue.severity() {
            Severity::Warning => self.warnings.fetch_add(1, Ordering::Relaxed),
            Severity::Error => self.errors.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Summary ===");
        tracing::info!(
            "Cards: {} processed in {:.2}s",
            self.cards_processed.load(Ordering::Relaxed),
            self.elapsed().as_secs_f64()
        );
        tracing::info!(
            "Files: {} copied ({:.1} MiB), {} stale files removed",
            self.files_copied.load(Ordering::Relaxed),
            self.bytes_copied.load(Ordering::Relaxed) as f64 / (1024.0 * 1024.0),
            self.stale_files_removed.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Issues: {} warnings, {} errors",
            self.warnings.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.cards_processed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.files_copied.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_files() {
        let metrics = Metrics::new();

        metrics.record_card_processed();
        metrics.record_files_copied(3, 300);
        metrics.record_files_copied(2, 200);
        metrics.record_stale_removed(1);

        assert_eq!(metrics.cards_processed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.files_copied.load(Ordering::Relaxed), 5);
        assert_eq!(metrics.bytes_copied.load(Ordering::Relaxed), 500);
        assert_eq!(metrics.stale_files_removed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_issue_by_severity() {
        let metrics = Metrics::new();

        metrics.record_issue(&Issue::TooManyFiles { count: 300 });
        metrics.record_issue(&Issue::EmptySourceDefinition);
        metrics.record_issue(&Issue::TooManyCards { count: 120 });

        assert_eq!(metrics.warnings.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_elapsed() {
        let metrics = Metrics::new();
        thread::sleep(Duration::from_millis(10));
        assert!(metrics.elapsed().as_millis() >= 10);
    }
}
