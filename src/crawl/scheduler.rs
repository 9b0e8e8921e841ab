//! Transfer scheduling: decide whether a discovered file is wanted and, if
//! so, dispatch its download.
//!
//! Every decline is recorded in [`MirrorStats`] rather than raised, so one
//! odd file never stops a walk. Download failures are likewise absorbed
//! after the retry budget runs out; only local file system problems
//! (failure to create the destination directory) surface as errors.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{MirrorConfig, OverwritePolicy, CHECKSUM_SUFFIX};
use crate::listing::FileEntry;
use crate::transfer::TransferClient;

use super::stats::MirrorStats;

/// Outcome of offering one file to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// The file was accepted and assigned this task number.
    Submitted(u64),
    /// The file was declined for the given reason.
    Declined(DeclineReason),
}

/// Why the scheduler declined a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// The file name carries no date token.
    MissingDateToken,
    /// The file's date token sorts before the start of the date window.
    BeforeStartDate,
    /// The file's date token sorts after the end of the date window.
    AfterEndDate,
    /// The file is a checksum sidecar and checksums are not kept.
    ChecksumFile,
    /// The destination already exists and overwriting is disabled.
    AlreadyExists,
}

/// Errors that prevent the scheduler from preparing a destination.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Could not create the destination directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Accepts discovered files, applies the configured filters, and runs the
/// surviving transfers on a bounded worker pool.
pub struct Scheduler {
    config: Arc<MirrorConfig>,
    client: Arc<dyn TransferClient>,
    stats: Arc<MirrorStats>,
    task_seq: AtomicU64,
    pool: Option<Arc<Semaphore>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Scheduler {
    /// Creates a scheduler running at most `config.workers()` transfers at
    /// once. Zero workers means every transfer runs inline on the caller.
    #[must_use]
    pub fn new(config: Arc<MirrorConfig>, client: Arc<dyn TransferClient>) -> Self {
        let pool = match config.workers() {
            0 => None,
            workers => Some(Arc::new(Semaphore::new(workers))),
        };

        Self {
            config,
            client,
            stats: Arc::new(MirrorStats::new()),
            task_seq: AtomicU64::new(0),
            pool,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// The shared run counters.
    #[must_use]
    pub fn stats(&self) -> &MirrorStats {
        &self.stats
    }

    /// Offers one discovered file for download.
    ///
    /// `components` is the directory path below the crawl root; the file
    /// lands at `output_root/components.../name`. Files outside the date
    /// window, checksum sidecars, and already-present destinations are
    /// declined and counted, never raised.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::CreateDir`] if the destination directory
    /// cannot be created.
    #[instrument(skip(self, file), fields(file = %file.name))]
    pub async fn offer(
        &self,
        file: &FileEntry,
        components: &[String],
    ) -> Result<Offer, ScheduleError> {
        let token = match file.date_token() {
            Ok(token) => token,
            Err(error) => {
                warn!(error = %error, "skipping file without date token");
                self.stats.increment_undated();
                return Ok(Offer::Declined(DeclineReason::MissingDateToken));
            }
        };

        if let Some(start) = self.config.start_date() {
            if sorts_before(token, start) {
                debug!(token, start, "file predates the window");
                self.stats.increment_skipped();
                return Ok(Offer::Declined(DeclineReason::BeforeStartDate));
            }
        }

        if let Some(end) = self.config.end_date() {
            if sorts_after(token, end) {
                debug!(token, end, "file postdates the window");
                self.stats.increment_skipped();
                return Ok(Offer::Declined(DeclineReason::AfterEndDate));
            }
        }

        if !self.config.keep_checksums() && file.name.ends_with(CHECKSUM_SUFFIX) {
            debug!("skipping checksum sidecar");
            self.stats.increment_skipped();
            return Ok(Offer::Declined(DeclineReason::ChecksumFile));
        }

        let mut dir = self.config.output_root().to_path_buf();
        for component in components {
            dir.push(component);
        }
        let dest = dir.join(&file.name);

        if self.config.overwrite() == OverwritePolicy::Never
            && tokio::fs::try_exists(&dest).await.unwrap_or(false)
        {
            debug!(dest = %dest.display(), "destination exists, not overwriting");
            self.stats.increment_skipped();
            return Ok(Offer::Declined(DeclineReason::AlreadyExists));
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ScheduleError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let task = self.task_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.increment_submitted();

        match &self.pool {
            None => {
                transfer_with_retry(
                    self.client.as_ref(),
                    file,
                    &dest,
                    task,
                    self.config.retry_budget(),
                    &self.stats,
                )
                .await;
            }
            Some(pool) => {
                let pool = Arc::clone(pool);
                let client = Arc::clone(&self.client);
                let stats = Arc::clone(&self.stats);
                let file = file.clone();
                let retry_budget = self.config.retry_budget();

                // The permit is acquired inside the task so offering never
                // blocks the walk; only the transfers themselves queue.
                let handle = tokio::spawn(async move {
                    let Ok(_permit) = pool.acquire_owned().await else {
                        error!(task, file = %file.name, "worker pool closed before transfer");
                        stats.increment_failed();
                        return;
                    };
                    transfer_with_retry(
                        client.as_ref(),
                        &file,
                        &dest,
                        task,
                        retry_budget,
                        &stats,
                    )
                    .await;
                });

                self.handles
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .push(handle);
            }
        }

        Ok(Offer::Submitted(task))
    }

    /// Waits for every spawned transfer to finish.
    pub async fn wait_for_transfers(&self) {
        let handles = {
            let mut guard = self
                .handles
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };

        for handle in handles {
            if let Err(error) = handle.await {
                warn!(error = %error, "transfer task did not run to completion");
            }
        }
    }
}

/// Whether `token` falls entirely before `bound`.
///
/// Only the overlapping prefix is compared, so a monthly token like
/// `2023-01` straddles every daily bound within that month instead of
/// sorting ahead of it.
fn sorts_before(token: &str, bound: &str) -> bool {
    let n = token.len().min(bound.len());
    token.as_bytes()[..n] < bound.as_bytes()[..n]
}

/// Whether `token` falls entirely after `bound`. Counterpart of
/// [`sorts_before`].
fn sorts_after(token: &str, bound: &str) -> bool {
    let n = token.len().min(bound.len());
    token.as_bytes()[..n] > bound.as_bytes()[..n]
}

/// Runs one transfer, retrying on failure until the budget is spent.
///
/// A budget of `n` allows `n + 1` attempts in total. Exhaustion is counted
/// and logged, never propagated, so one unreachable file cannot unwind a
/// whole run.
async fn transfer_with_retry(
    client: &dyn TransferClient,
    file: &FileEntry,
    dest: &Path,
    task: u64,
    retry_budget: u32,
    stats: &MirrorStats,
) {
    for attempt in 0..=retry_budget {
        if attempt == 0 {
            info!(task, file = %file.name, "downloading");
        } else {
            stats.increment_retried();
            info!(task, file = %file.name, attempt, "retry downloading");
        }

        match client.transfer(&file.locator, dest).await {
            Ok(bytes) => {
                stats.increment_downloaded();
                info!(task, file = %file.name, bytes, "downloaded");
                return;
            }
            Err(error) => {
                warn!(task, file = %file.name, attempt, error = %error, "download attempt failed");
            }
        }
    }

    stats.increment_failed();
    error!(
        task,
        file = %file.name,
        attempts = retry_budget + 1,
        "download failed after all attempts"
    );
}
