//! HTTP implementation of [`ListingFetcher`] for HTML index pages.
//!
//! Parses the table shape public dataset indexes render: one `<tr>` per
//! entry with `<td>` cells for link, size and modification date. The size
//! cell is ignored; an empty modification-date cell marks a directory.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::entry::{DirEntry, FileEntry, ListingEntry};
use super::error::ListingError;
use super::ListingFetcher;
use crate::user_agent;

/// Default HTTP connect timeout for listing requests (30 seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout for listing requests (listings are small pages).
const READ_TIMEOUT_SECS: u64 = 60;

/// One table row of an index page.
#[allow(clippy::expect_used)]
static ROW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("row regex is valid") // Static pattern, safe to panic
});

/// One data cell inside a row.
#[allow(clippy::expect_used)]
static CELL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("cell regex is valid") // Static pattern, safe to panic
});

/// The entry link inside the first cell: href plus display text.
#[allow(clippy::expect_used)]
static ANCHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*"([^"]*)"[^>]*>([^<]*)</a>"#)
        .expect("anchor regex is valid") // Static pattern, safe to panic
});

/// Fetches directory listings over HTTP and parses the index table.
///
/// The client is created once and reused across listings, taking advantage
/// of connection pooling.
#[derive(Debug, Clone)]
pub struct HttpListingFetcher {
    client: Client,
}

impl HttpListingFetcher {
    /// Creates a fetcher with default timeouts (30s connect, 60s read).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }
}

impl Default for HttpListingFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingFetcher for HttpListingFetcher {
    #[instrument(skip(self), fields(locator = %locator))]
    async fn fetch_listing(&self, locator: &str) -> Result<Vec<ListingEntry>, ListingError> {
        debug!("fetching listing");

        let response = self.client.get(locator).send().await.map_err(|e| {
            if e.is_timeout() {
                ListingError::timeout(locator)
            } else {
                ListingError::network(locator, e)
            }
        })?;

        if !response.status().is_success() {
            return Err(ListingError::http_status(
                locator,
                response.status().as_u16(),
            ));
        }

        // Resolve hrefs against the final URL so redirected listings still
        // produce correct child locators.
        let base = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ListingError::timeout(locator)
            } else {
                ListingError::network(locator, e)
            }
        })?;

        let entries = parse_listing(&body, locator, &base)?;
        debug!(entries = entries.len(), "listing parsed");
        Ok(entries)
    }
}

/// Parses the rows of an index page into listing entries.
///
/// Rows without any `<td>` cell (headers, separators) are ignored. A row
/// that has cells must have at least three of them and a parseable link in
/// the first, otherwise the whole listing is rejected. Rows named with a
/// leading dot (parent links included) never become entries.
fn parse_listing(html: &str, locator: &str, base: &Url) -> Result<Vec<ListingEntry>, ListingError> {
    let mut entries = Vec::new();

    for row in ROW_PATTERN.captures_iter(html) {
        let row_html = row.get(1).map_or("", |m| m.as_str());
        let cells: Vec<&str> = CELL_PATTERN
            .captures_iter(row_html)
            .filter_map(|cell| cell.get(1).map(|m| m.as_str()))
            .collect();

        if cells.is_empty() {
            continue;
        }
        if cells.len() < 3 {
            return Err(ListingError::parse(
                locator,
                format!("listing row has {} cells, expected 3", cells.len()),
            ));
        }

        let anchor = ANCHOR_PATTERN
            .captures(cells[0])
            .ok_or_else(|| ListingError::parse(locator, "listing row has no entry link"))?;
        let href = anchor.get(1).map_or("", |m| m.as_str());
        let name = anchor
            .get(2)
            .map_or("", |m| m.as_str())
            .trim()
            .trim_end_matches('/');
        if name.is_empty() || name.starts_with('.') {
            continue;
        }

        let resolved = base.join(href).map_err(|_| {
            ListingError::parse(locator, format!("unresolvable entry href '{href}'"))
        })?;

        // `&nbsp;` pads empty cells in some index pages
        let modified = cells[2].replace("&nbsp;", " ");
        let modified = modified.trim();

        let entry = if modified.is_empty() {
            ListingEntry::Directory(DirEntry {
                name: name.to_string(),
                locator: resolved.into(),
            })
        } else {
            ListingEntry::File(FileEntry {
                name: name.to_string(),
                locator: resolved.into(),
                modified_at: modified.to_string(),
            })
        };
        entries.push(entry);
    }

    Ok(entries)
}
