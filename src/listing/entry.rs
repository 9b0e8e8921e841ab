//! Entry model for one remote directory listing.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Matches the first `YYYY-MM` or `YYYY-MM-DD` token in a file name.
#[allow(clippy::expect_used)]
static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}(?:-\d{2})?").expect("date token regex is valid") // Static pattern, safe to panic
});

/// Error extracting metadata from a listing entry.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The file name carries no `YYYY-MM` or `YYYY-MM-DD` token.
    #[error("no date token in file name '{name}'")]
    MissingDateToken {
        /// The file name that was scanned.
        name: String,
    },
}

/// A file row in a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Display name with any trailing `/` stripped.
    pub name: String,
    /// Absolute URL the file downloads from.
    pub locator: String,
    /// Remote modification date, verbatim from the listing.
    pub modified_at: String,
}

impl FileEntry {
    /// Extracts the date token embedded in the file name.
    ///
    /// Archive names like `BTCUSDT-1m-2023-01.zip` carry the period they
    /// cover; the first `YYYY-MM` or `YYYY-MM-DD` substring is the token.
    /// Extraction happens on demand so a directory walk never trips over an
    /// oddly named file; only scheduling it does.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MissingDateToken`] if the name has no date-like
    /// substring.
    pub fn date_token(&self) -> Result<&str, EntryError> {
        DATE_TOKEN
            .find(&self.name)
            .map(|token| token.as_str())
            .ok_or_else(|| EntryError::MissingDateToken {
                name: self.name.clone(),
            })
    }
}

/// A subdirectory row in a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Display name with any trailing `/` stripped.
    pub name: String,
    /// Absolute URL of the nested listing.
    pub locator: String,
}

/// One row of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    /// A downloadable file.
    File(FileEntry),
    /// A directory that can be listed in turn.
    Directory(DirEntry),
}

impl ListingEntry {
    /// Display name shared by both entry kinds.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File(file) => &file.name,
            Self::Directory(dir) => &dir.name,
        }
    }
}
