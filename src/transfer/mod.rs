//! File transfer: fetch one remote file and stream it to a local path.
//!
//! The [`TransferClient`] trait abstracts the wire so the crawl layer can be
//! tested against in-memory fakes. [`HttpTransferClient`] is the production
//! implementation.

mod constants;
mod error;
mod http;

pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::TransferError;
pub use http::HttpTransferClient;

use std::path::Path;

use async_trait::async_trait;

/// A client capable of fetching one remote file to a local destination.
#[async_trait]
pub trait TransferClient: Send + Sync {
    /// Downloads the file at `locator` to `dest`, returning bytes written.
    ///
    /// Any pre-existing file at `dest` is truncated. Callers decide whether
    /// replacement is wanted before invoking this.
    async fn transfer(&self, locator: &str, dest: &Path) -> Result<u64, TransferError>;
}
