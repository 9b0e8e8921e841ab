//! Error types for listing retrieval.

use thiserror::Error;

/// Errors that can occur fetching or interpreting one directory listing.
///
/// Any of these poisons the whole subtree below the locator: callers
/// propagate the failure instead of retrying the listing.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching listing {locator}: {source}")]
    Network {
        /// The listing URL that failed.
        locator: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before the listing arrived.
    #[error("timeout fetching listing {locator}")]
    Timeout {
        /// The listing URL that timed out.
        locator: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching listing {locator}")]
    HttpStatus {
        /// The listing URL that returned an error status.
        locator: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The listing document did not have the expected index-table shape.
    #[error("malformed listing at {locator}: {reason}")]
    Parse {
        /// The listing URL whose document failed to parse.
        locator: String,
        /// What was wrong with the document.
        reason: String,
    },
}

impl ListingError {
    /// Creates a network error from a reqwest error.
    pub fn network(locator: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            locator: locator.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(locator: impl Into<String>) -> Self {
        Self::Timeout {
            locator: locator.into(),
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(locator: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            locator: locator.into(),
            status,
        }
    }

    /// Creates a parse error.
    pub fn parse(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_timeout_display() {
        let error = ListingError::timeout("https://mirror.example/data/");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://mirror.example/data/"));
    }

    #[test]
    fn test_listing_error_http_status_display() {
        let error = ListingError::http_status("https://mirror.example/data/", 503);
        let msg = error.to_string();
        assert!(msg.contains("503"), "Expected '503' in: {msg}");
        assert!(
            msg.contains("https://mirror.example/data/"),
            "Expected locator in: {msg}"
        );
    }

    #[test]
    fn test_listing_error_parse_display() {
        let error = ListingError::parse("https://mirror.example/data/", "row has 2 cells");
        let msg = error.to_string();
        assert!(msg.contains("malformed"), "Expected 'malformed' in: {msg}");
        assert!(msg.contains("row has 2 cells"), "Expected reason in: {msg}");
    }
}
