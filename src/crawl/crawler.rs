//! Recursive walk over a remote directory tree.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use crate::config::MirrorConfig;
use crate::listing::{ListingEntry, ListingError, ListingFetcher};
use crate::pattern::PathPattern;

use super::scheduler::{ScheduleError, Scheduler};
use super::stats::CrawlSummary;

/// Errors that end a crawl early.
///
/// Listing fetches are not retried: a directory that cannot be listed makes
/// the walk incomplete in a way no counter can express, so it surfaces here
/// instead of being absorbed like a file transfer failure.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A directory listing could not be fetched or parsed.
    #[error("listing error: {0}")]
    Listing(#[from] ListingError),

    /// A destination directory could not be prepared.
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Walks a remote directory tree, offering every selected file to the
/// scheduler.
///
/// Selection happens level by level: each listing entry is checked against
/// the include and exclude patterns at its depth, and only the patterns
/// that matched follow the walk into a subdirectory. Subtrees no include
/// pattern can reach are never listed at all.
pub struct Crawler {
    config: Arc<MirrorConfig>,
    fetcher: Arc<dyn ListingFetcher>,
    scheduler: Scheduler,
}

impl Crawler {
    /// Creates a crawler over the given listing source and scheduler.
    #[must_use]
    pub fn new(
        config: Arc<MirrorConfig>,
        fetcher: Arc<dyn ListingFetcher>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            config,
            fetcher,
            scheduler,
        }
    }

    /// Crawls the tree rooted at `root_locator` and downloads every selected
    /// file.
    ///
    /// Transfers already submitted are always waited for, even when the walk
    /// itself fails partway, so no download is left dangling.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Listing`] if any directory listing cannot be
    /// fetched or parsed, and [`CrawlError::Schedule`] if a destination
    /// directory cannot be created.
    #[instrument(skip(self), fields(root = %root_locator))]
    pub async fn crawl(&self, root_locator: &str) -> Result<CrawlSummary, CrawlError> {
        let includes: Vec<&PathPattern> = self.config.include_patterns().iter().collect();
        let excludes: Vec<&PathPattern> = self.config.exclude_patterns().iter().collect();

        let walk = self
            .visit(root_locator.to_string(), Vec::new(), 0, includes, excludes)
            .await;

        // Drain submitted transfers even when the walk failed partway.
        self.scheduler.wait_for_transfers().await;

        let summary = self.scheduler.stats().snapshot();
        walk?;

        info!(
            listings = summary.listings,
            submitted = summary.submitted,
            downloaded = summary.downloaded,
            failed = summary.failed,
            skipped = summary.skipped,
            undated = summary.undated,
            retried = summary.retried,
            "crawl finished"
        );
        Ok(summary)
    }

    /// Fetches one listing and recurses into its selected subdirectories.
    ///
    /// `components` holds the directory names between the crawl root and
    /// this listing; each recursion extends a fresh copy, so siblings never
    /// see each other's names.
    fn visit<'a>(
        &'a self,
        locator: String,
        components: Vec<String>,
        level: usize,
        includes: Vec<&'a PathPattern>,
        excludes: Vec<&'a PathPattern>,
    ) -> BoxFuture<'a, Result<(), CrawlError>> {
        async move {
            let entries = self.fetcher.fetch_listing(&locator).await?;
            self.scheduler.stats().increment_listings();
            debug!(locator = %locator, entries = entries.len(), "listing fetched");

            for entry in entries {
                let name = entry.name();

                let narrowed_includes: Vec<&PathPattern> = includes
                    .iter()
                    .filter(|pattern| pattern.matches(name, level))
                    .copied()
                    .collect();
                if narrowed_includes.is_empty() {
                    trace!(name, level, "no include pattern matches");
                    continue;
                }

                let narrowed_excludes: Vec<&PathPattern> = excludes
                    .iter()
                    .filter(|pattern| pattern.matches(name, level))
                    .copied()
                    .collect();
                if narrowed_excludes
                    .iter()
                    .any(|pattern| pattern.is_exhausted(level))
                {
                    debug!(name, level, "entry excluded");
                    continue;
                }

                match entry {
                    ListingEntry::File(file) => {
                        self.scheduler.offer(&file, &components).await?;
                    }
                    ListingEntry::Directory(dir) => {
                        let mut next = components.clone();
                        next.push(dir.name);
                        self.visit(
                            dir.locator,
                            next,
                            level + 1,
                            narrowed_includes,
                            narrowed_excludes,
                        )
                        .await?;
                    }
                }
            }

            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::path::Path;
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::listing::{DirEntry, FileEntry};
    use crate::transfer::{TransferClient, TransferError};

    const ROOT: &str = "https://mirror.example/data/";

    /// Serves canned listings from a map keyed by locator.
    struct StubFetcher {
        listings: HashMap<String, Vec<ListingEntry>>,
    }

    #[async_trait]
    impl ListingFetcher for StubFetcher {
        async fn fetch_listing(&self, locator: &str) -> Result<Vec<ListingEntry>, ListingError> {
            self.listings
                .get(locator)
                .cloned()
                .ok_or_else(|| ListingError::http_status(locator, 404))
        }
    }

    /// Writes a marker payload after a short delay.
    struct SlowWritingClient;

    #[async_trait]
    impl TransferClient for SlowWritingClient {
        async fn transfer(&self, _locator: &str, dest: &Path) -> Result<u64, TransferError> {
            tokio::time::sleep(Duration::from_millis(30)).await;
            tokio::fs::write(dest, b"payload")
                .await
                .map_err(|e| TransferError::io(dest.to_path_buf(), e))?;
            Ok(7)
        }
    }

    fn file(base: &str, name: &str) -> ListingEntry {
        ListingEntry::File(FileEntry {
            name: name.to_string(),
            locator: format!("{base}{name}"),
            modified_at: "2023-02-03 04:05:06".to_string(),
        })
    }

    fn dir(base: &str, name: &str) -> ListingEntry {
        ListingEntry::Directory(DirEntry {
            name: name.to_string(),
            locator: format!("{base}{name}/"),
        })
    }

    fn crawler(
        output: &Path,
        includes: &[&str],
        excludes: &[&str],
        listings: HashMap<String, Vec<ListingEntry>>,
    ) -> Crawler {
        let mut builder = MirrorConfig::builder().output_root(output).workers(2);
        for &template in includes {
            builder = builder.include(template);
        }
        for &template in excludes {
            builder = builder.exclude(template);
        }
        let config = Arc::new(builder.build().unwrap());

        let fetcher = Arc::new(StubFetcher { listings });
        let scheduler = Scheduler::new(Arc::clone(&config), Arc::new(SlowWritingClient));
        Crawler::new(config, fetcher, scheduler)
    }

    // ==================== Selection Tests ====================

    #[tokio::test]
    async fn test_crawl_downloads_matching_files_and_skips_unmatched_subtrees() {
        let out = TempDir::new().unwrap();
        let spot = format!("{ROOT}spot/");
        let listings = HashMap::from([
            (
                ROOT.to_string(),
                vec![dir(ROOT, "spot"), dir(ROOT, "futures")],
            ),
            // The futures/ listing is deliberately absent: fetching it would
            // fail the crawl, so success proves the walk never descended.
            (spot.clone(), vec![file(&spot, "k-2023-01.zip")]),
        ]);

        let crawler = crawler(out.path(), &["spot/*"], &[], listings);
        let summary = crawler.crawl(ROOT).await.unwrap();

        assert!(out.path().join("spot/k-2023-01.zip").exists());
        assert_eq!(summary.listings, 2);
        assert_eq!(summary.downloaded, 1);
    }

    #[tokio::test]
    async fn test_crawl_narrows_patterns_level_by_level() {
        let out = TempDir::new().unwrap();
        let a = format!("{ROOT}a/");
        let ab = format!("{a}b/");
        let ac = format!("{a}c/");
        let ab1m = format!("{ab}1m/");
        let ac1m = format!("{ac}1m/");
        let listings = HashMap::from([
            (ROOT.to_string(), vec![dir(ROOT, "a")]),
            (a.clone(), vec![dir(&a, "b"), dir(&a, "c")]),
            // b/5m/ is absent: the level-2 segment "1m" rules it out before
            // any fetch.
            (ab.clone(), vec![dir(&ab, "1m"), dir(&ab, "5m")]),
            (ac.clone(), vec![dir(&ac, "1m")]),
            (ab1m.clone(), vec![file(&ab1m, "b-2023-01.zip")]),
            (ac1m.clone(), vec![file(&ac1m, "c-2023-01.zip")]),
        ]);

        let crawler = crawler(out.path(), &["a/*/1m"], &[], listings);
        let summary = crawler.crawl(ROOT).await.unwrap();

        assert!(out.path().join("a/b/1m/b-2023-01.zip").exists());
        assert!(out.path().join("a/c/1m/c-2023-01.zip").exists());
        assert_eq!(summary.downloaded, 2);
        assert_eq!(summary.listings, 6);
    }

    #[tokio::test]
    async fn test_crawl_exclusion_empties_matching_subtree() {
        let out = TempDir::new().unwrap();
        let a = format!("{ROOT}a/");
        let ab = format!("{a}b/");
        let ac = format!("{a}c/");
        let listings = HashMap::from([
            (ROOT.to_string(), vec![dir(ROOT, "a")]),
            (a.clone(), vec![dir(&a, "b"), dir(&a, "c")]),
            (ab.clone(), vec![file(&ab, "f-2023-01.zip")]),
            (ac.clone(), vec![file(&ac, "g-2023-01.zip")]),
        ]);

        let crawler = crawler(out.path(), &["a"], &["a/b"], listings);
        let summary = crawler.crawl(ROOT).await.unwrap();

        // The excluded directory is still listed, but nothing inside it
        // survives selection.
        assert!(!out.path().join("a/b/f-2023-01.zip").exists());
        assert!(out.path().join("a/c/g-2023-01.zip").exists());
        assert_eq!(summary.listings, 4);
        assert_eq!(summary.downloaded, 1);
    }

    #[tokio::test]
    async fn test_crawl_without_include_patterns_selects_nothing() {
        let out = TempDir::new().unwrap();
        let listings = HashMap::from([(
            ROOT.to_string(),
            vec![file(ROOT, "k-2023-01.zip"), dir(ROOT, "spot")],
        )]);

        let crawler = crawler(out.path(), &[], &[], listings);
        let summary = crawler.crawl(ROOT).await.unwrap();

        assert_eq!(summary.listings, 1);
        assert_eq!(summary.submitted, 0);
        assert_eq!(summary.downloaded, 0);
    }

    // ==================== Robustness Tests ====================

    #[tokio::test]
    async fn test_crawl_records_undated_files_and_continues() {
        let out = TempDir::new().unwrap();
        let listings = HashMap::from([(
            ROOT.to_string(),
            vec![file(ROOT, "README.txt"), file(ROOT, "k-2023-01.zip")],
        )]);

        let crawler = crawler(out.path(), &["*"], &[], listings);
        let summary = crawler.crawl(ROOT).await.unwrap();

        assert_eq!(summary.undated, 1);
        assert_eq!(summary.downloaded, 1);
        assert!(out.path().join("k-2023-01.zip").exists());
        assert!(!out.path().join("README.txt").exists());
    }

    #[tokio::test]
    async fn test_crawl_listing_failure_propagates_after_transfers_drain() {
        let out = TempDir::new().unwrap();
        let listings = HashMap::from([(
            ROOT.to_string(),
            // The file is submitted first; the unlistable directory then
            // fails the walk.
            vec![file(ROOT, "k-2023-01.zip"), dir(ROOT, "unlistable")],
        )]);

        let crawler = crawler(out.path(), &["*"], &[], listings);
        let result = crawler.crawl(ROOT).await;

        assert!(matches!(result, Err(CrawlError::Listing(_))));
        // The in-flight transfer finished before crawl returned.
        assert!(out.path().join("k-2023-01.zip").exists());
    }
}
