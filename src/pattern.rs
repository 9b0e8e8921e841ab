//! Slash-segmented glob patterns probed one directory level at a time.
//!
//! A [`PathPattern`] is built from a template like
//! `futures/um/monthly/klines/BTC*USDT/1m` and matched against entry names
//! while a remote tree is walked: segment 0 against top-level names, segment
//! 1 one directory down, and so on. Once the walk moves past the last segment
//! the pattern is exhausted and matches every name below that point, so an
//! include template selects a whole subtree and an exclude template vetoes
//! one.

use glob::{Pattern, PatternError};
use thiserror::Error;

/// Error building a [`PathPattern`] from a template string.
#[derive(Debug, Error)]
#[error("invalid path template '{template}': {source}")]
pub struct PathPatternError {
    /// The template that failed to compile.
    pub template: String,
    /// The segment compilation error.
    #[source]
    pub source: PatternError,
}

/// A slash-segmented glob pattern matched level by level during a crawl.
///
/// Each segment is a shell-style glob (`*`, `?`, `[...]`) covering exactly
/// one path component. Leading and trailing empty segments are discarded, so
/// `/spot/daily/` and `spot/daily` are the same template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Pattern>,
}

impl PathPattern {
    /// Compiles a template into its per-level segments.
    ///
    /// # Errors
    ///
    /// Returns [`PathPatternError`] if any segment is not a valid glob
    /// (for example an unclosed character class).
    pub fn new(template: &str) -> Result<Self, PathPatternError> {
        let trimmed = template.trim_matches('/');
        let segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('/')
                .map(Pattern::new)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| PathPatternError {
                    template: template.to_string(),
                    source,
                })?
        };
        Ok(Self { segments })
    }

    /// Whether `name` is acceptable at directory depth `level`.
    ///
    /// True when the pattern is exhausted at `level` (everything below the
    /// last segment is covered) or when segment `level` glob-matches `name`.
    #[must_use]
    pub fn matches(&self, name: &str, level: usize) -> bool {
        self.is_exhausted(level) || self.segments[level].matches(name)
    }

    /// Whether `level` lies beyond the last segment.
    #[must_use]
    pub fn is_exhausted(&self, level: usize) -> bool {
        level >= self.segments.len()
    }
}

/// Strips a root-locator prefix from a path template.
///
/// Lets callers paste full listing URLs as templates: the root the crawl
/// starts from is removed and the remainder is the relative template.
/// Templates that do not start with `root` pass through unchanged.
#[must_use]
pub fn strip_locator_prefix<'t>(template: &'t str, root: &str) -> &'t str {
    template.strip_prefix(root).unwrap_or(template)
}
