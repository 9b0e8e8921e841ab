//! HTTP transfer client that streams response bodies to disk.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::TransferError;
use super::TransferClient;
use crate::user_agent::default_user_agent;

/// HTTP client for downloading files from remote servers.
///
/// Response bodies are streamed to disk in chunks so large archives never
/// have to fit in memory. A transfer that fails partway leaves no partial
/// file behind.
#[derive(Debug, Clone)]
pub struct HttpTransferClient {
    client: Client,
}

impl HttpTransferClient {
    /// Creates a new transfer client with default timeouts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a transfer client with custom timeouts (useful for testing).
    #[must_use]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        #[allow(clippy::expect_used)]
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");

        Self { client }
    }
}

impl Default for HttpTransferClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferClient for HttpTransferClient {
    #[instrument(skip(self), fields(locator = %locator, dest = %dest.display()))]
    async fn transfer(&self, locator: &str, dest: &Path) -> Result<u64, TransferError> {
        let response = self.client.get(locator).send().await.map_err(|e| {
            if e.is_timeout() {
                TransferError::timeout(locator)
            } else {
                TransferError::network(locator, e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::http_status(locator, status.as_u16()));
        }

        // File::create truncates any pre-existing destination.
        let mut file = File::create(dest)
            .await
            .map_err(|e| TransferError::io_at(dest, e))?;

        let result = stream_to_file(&mut file, response, locator, dest).await;

        if result.is_err() {
            drop(file);
            if let Err(remove_error) = tokio::fs::remove_file(dest).await {
                debug!(
                    path = %dest.display(),
                    error = %remove_error,
                    "failed to remove partial file"
                );
            }
        }

        result
    }
}

/// Streams the response body into the open file, returning total bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    locator: &str,
    dest: &Path,
) -> Result<u64, TransferError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| {
            if e.is_timeout() {
                TransferError::timeout(locator)
            } else {
                TransferError::network(locator, e)
            }
        })?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| TransferError::io_at(dest, e))?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| TransferError::io_at(dest, e))?;

    Ok(written)
}
