//! Remote directory listings: the entry model and the fetcher seam.
//!
//! A listing is one page of a remote index: files and subdirectories, each
//! with a display name and an absolute locator. [`ListingFetcher`] is the
//! only contact the crawl has with the remote index format: everything
//! above this module sees [`ListingEntry`] values, so the whole selection
//! pipeline runs against in-memory fetchers in tests.

mod entry;
mod error;
mod http;

use async_trait::async_trait;

pub use entry::{DirEntry, EntryError, FileEntry, ListingEntry};
pub use error::ListingError;
pub use http::HttpListingFetcher;

/// Retrieves the entries of one remote directory.
#[async_trait]
pub trait ListingFetcher: Send + Sync {
    /// Fetches the listing at `locator` and returns its entries in page order.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] when the listing cannot be retrieved or does
    /// not parse. The failure is fatal for the subtree rooted at `locator`;
    /// implementations do not retry.
    async fn fetch_listing(&self, locator: &str) -> Result<Vec<ListingEntry>, ListingError>;
}
