//! Counters tracking the progress of one mirror run.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Thread-safe counters shared between the crawler and its transfer tasks.
#[derive(Debug, Default)]
pub struct MirrorStats {
    listings: AtomicUsize,
    submitted: AtomicUsize,
    downloaded: AtomicUsize,
    failed: AtomicUsize,
    skipped: AtomicUsize,
    undated: AtomicUsize,
    retried: AtomicUsize,
}

impl MirrorStats {
    /// Creates a new stats tracker with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of directory listings fetched.
    #[must_use]
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    /// Number of files handed to transfer tasks.
    #[must_use]
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    /// Number of files fully written to disk.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Number of files that exhausted their retry budget.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Number of files declined before transfer (date window, checksums, existing).
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Number of files whose names carried no date token.
    #[must_use]
    pub fn undated(&self) -> usize {
        self.undated.load(Ordering::SeqCst)
    }

    /// Number of retry attempts across all transfers.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    pub(crate) fn increment_listings(&self) {
        self.listings.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_downloaded(&self) {
        self.downloaded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_undated(&self) {
        self.undated.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn increment_retried(&self) {
        self.retried.fetch_add(1, Ordering::SeqCst);
    }

    /// Captures the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> CrawlSummary {
        CrawlSummary {
            listings: self.listings(),
            submitted: self.submitted(),
            downloaded: self.downloaded(),
            failed: self.failed(),
            skipped: self.skipped(),
            undated: self.undated(),
            retried: self.retried(),
        }
    }
}

/// Point-in-time view of the run counters, returned when a crawl finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlSummary {
    /// Directory listings fetched.
    pub listings: usize,
    /// Files handed to transfer tasks.
    pub submitted: usize,
    /// Files fully written to disk.
    pub downloaded: usize,
    /// Files that exhausted their retry budget.
    pub failed: usize,
    /// Files declined before transfer.
    pub skipped: usize,
    /// Files whose names carried no date token.
    pub undated: usize,
    /// Retry attempts across all transfers.
    pub retried: usize,
}
