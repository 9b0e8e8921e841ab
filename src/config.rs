//! Run configuration: what to select, where to put it, how hard to try.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::pattern::{PathPattern, PathPatternError};

/// Retry budget applied when none is configured.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// Worker count applied when none is configured.
pub const DEFAULT_WORKERS: usize = 1;

/// Suffix marking checksum sidecar files in remote listings.
pub const CHECKSUM_SUFFIX: &str = ".CHECKSUM";

/// Shape check for date bounds before the calendar check.
#[allow(clippy::expect_used)]
static DATE_BOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date bound regex is valid") // Static pattern, safe to panic
});

/// Errors rejecting a configuration at build time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A date bound is not a real calendar date in `YYYY-MM-DD` form.
    #[error("invalid {which} '{value}': expected a calendar date in YYYY-MM-DD form")]
    InvalidDate {
        /// Which bound was rejected (`start date` or `end date`).
        which: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A path template failed to compile.
    #[error(transparent)]
    InvalidPattern(#[from] PathPatternError),

    /// An overwrite policy label was not recognized.
    #[error("invalid overwrite policy '{value}': expected 'never' or 'always'")]
    InvalidOverwrite {
        /// The rejected label.
        value: String,
    },
}

/// What to do when a destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Keep the existing file and decline the transfer.
    #[default]
    Never,
    /// Replace the existing file.
    Always,
}

impl OverwritePolicy {
    /// The lowercase label used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Always => "always",
        }
    }
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OverwritePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            _ => Err(ConfigError::InvalidOverwrite {
                value: value.to_string(),
            }),
        }
    }
}

/// Validated settings for one mirror run.
///
/// Built through [`MirrorConfig::builder`]; a value of this type always
/// holds compiled patterns and well-formed date bounds.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    include_patterns: Vec<PathPattern>,
    exclude_patterns: Vec<PathPattern>,
    start_date: Option<String>,
    end_date: Option<String>,
    overwrite: OverwritePolicy,
    output_root: PathBuf,
    keep_checksums: bool,
    retry_budget: u32,
    workers: usize,
}

impl MirrorConfig {
    /// Starts building a configuration.
    #[must_use]
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::default()
    }

    /// Path templates selecting subtrees to download.
    #[must_use]
    pub fn include_patterns(&self) -> &[PathPattern] {
        &self.include_patterns
    }

    /// Path templates vetoing subtrees.
    #[must_use]
    pub fn exclude_patterns(&self) -> &[PathPattern] {
        &self.exclude_patterns
    }

    /// Inclusive lower date bound, if any.
    #[must_use]
    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }

    /// Inclusive upper date bound, if any.
    #[must_use]
    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    /// Policy for destinations that already exist.
    #[must_use]
    pub fn overwrite(&self) -> OverwritePolicy {
        self.overwrite
    }

    /// Local directory the mirrored tree is rooted at.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Whether checksum sidecar files are downloaded too.
    #[must_use]
    pub fn keep_checksums(&self) -> bool {
        self.keep_checksums
    }

    /// Retries allowed per file after the first attempt.
    #[must_use]
    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Concurrent transfer limit; zero runs transfers inline.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }
}

/// Builder for [`MirrorConfig`]. All settings are optional.
#[derive(Debug, Default)]
pub struct MirrorConfigBuilder {
    includes: Vec<String>,
    excludes: Vec<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    overwrite: OverwritePolicy,
    output_root: Option<PathBuf>,
    keep_checksums: bool,
    retry_budget: Option<u32>,
    workers: Option<usize>,
}

impl MirrorConfigBuilder {
    /// Adds an include template like `spot/monthly/klines/BTC*/1m`.
    #[must_use]
    pub fn include(mut self, template: impl Into<String>) -> Self {
        self.includes.push(template.into());
        self
    }

    /// Adds an exclude template.
    #[must_use]
    pub fn exclude(mut self, template: impl Into<String>) -> Self {
        self.excludes.push(template.into());
        self
    }

    /// Sets the inclusive lower date bound (`YYYY-MM-DD`).
    #[must_use]
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Sets the inclusive upper date bound (`YYYY-MM-DD`).
    #[must_use]
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Sets the overwrite policy.
    #[must_use]
    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    /// Sets the local directory the mirrored tree is rooted at.
    #[must_use]
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    /// Downloads checksum sidecar files too.
    #[must_use]
    pub fn keep_checksums(mut self, keep: bool) -> Self {
        self.keep_checksums = keep;
        self
    }

    /// Sets the retries allowed per file after the first attempt.
    #[must_use]
    pub fn retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = Some(budget);
        self
    }

    /// Sets the concurrent transfer limit; zero runs transfers inline.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Validates and assembles the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDate`] for a malformed or impossible
    /// date bound and [`ConfigError::InvalidPattern`] for a template whose
    /// glob segments do not compile.
    pub fn build(self) -> Result<MirrorConfig, ConfigError> {
        if let Some(ref date) = self.start_date {
            validate_date_bound("start date", date)?;
        }
        if let Some(ref date) = self.end_date {
            validate_date_bound("end date", date)?;
        }

        let include_patterns = compile_templates(&self.includes)?;
        let exclude_patterns = compile_templates(&self.excludes)?;

        Ok(MirrorConfig {
            include_patterns,
            exclude_patterns,
            start_date: self.start_date,
            end_date: self.end_date,
            overwrite: self.overwrite,
            output_root: self.output_root.unwrap_or_else(|| PathBuf::from(".")),
            keep_checksums: self.keep_checksums,
            retry_budget: self.retry_budget.unwrap_or(DEFAULT_RETRY_BUDGET),
            workers: self.workers.unwrap_or(DEFAULT_WORKERS),
        })
    }
}

fn compile_templates(templates: &[String]) -> Result<Vec<PathPattern>, ConfigError> {
    templates
        .iter()
        .map(|template| PathPattern::new(template).map_err(ConfigError::from))
        .collect()
}

fn validate_date_bound(which: &'static str, value: &str) -> Result<(), ConfigError> {
    let well_formed = DATE_BOUND.is_match(value)
        && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(ConfigError::InvalidDate {
            which,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== Builder Tests ====================

    #[test]
    fn test_build_applies_defaults() {
        let config = MirrorConfig::builder().build().unwrap();

        assert!(config.include_patterns().is_empty());
        assert!(config.exclude_patterns().is_empty());
        assert_eq!(config.start_date(), None);
        assert_eq!(config.end_date(), None);
        assert_eq!(config.overwrite(), OverwritePolicy::Never);
        assert_eq!(config.output_root(), Path::new("."));
        assert!(!config.keep_checksums());
        assert_eq!(config.retry_budget(), DEFAULT_RETRY_BUDGET);
        assert_eq!(config.workers(), DEFAULT_WORKERS);
    }

    #[test]
    fn test_build_keeps_all_settings() {
        let config = MirrorConfig::builder()
            .include("spot/monthly/klines/BTC*/1m")
            .include("spot/daily/klines/ETH*/1m")
            .exclude("spot/monthly/klines/BTCDOWN*")
            .start_date("2023-01-01")
            .end_date("2023-06-30")
            .overwrite(OverwritePolicy::Always)
            .output_root("/srv/mirror")
            .keep_checksums(true)
            .retry_budget(5)
            .workers(8)
            .build()
            .unwrap();

        assert_eq!(config.include_patterns().len(), 2);
        assert_eq!(config.exclude_patterns().len(), 1);
        assert_eq!(config.start_date(), Some("2023-01-01"));
        assert_eq!(config.end_date(), Some("2023-06-30"));
        assert_eq!(config.overwrite(), OverwritePolicy::Always);
        assert_eq!(config.output_root(), Path::new("/srv/mirror"));
        assert!(config.keep_checksums());
        assert_eq!(config.retry_budget(), 5);
        assert_eq!(config.workers(), 8);
    }

    // ==================== Date Validation Tests ====================

    #[test]
    fn test_build_rejects_malformed_start_date() {
        for bad in ["2023-1-1", "2023-01", "01-01-2023", "not-a-date", ""] {
            let result = MirrorConfig::builder().start_date(bad).build();
            let error = result.unwrap_err();
            assert!(
                error.to_string().contains("start date"),
                "expected start date rejection for '{bad}', got: {error}"
            );
        }
    }

    #[test]
    fn test_build_rejects_impossible_calendar_date() {
        let result = MirrorConfig::builder().end_date("2023-02-31").build();
        let error = result.unwrap_err();
        assert!(error.to_string().contains("end date"), "got: {error}");
    }

    #[test]
    fn test_build_accepts_leap_day() {
        let config = MirrorConfig::builder()
            .start_date("2024-02-29")
            .build()
            .unwrap();
        assert_eq!(config.start_date(), Some("2024-02-29"));
    }

    // ==================== Pattern Validation Tests ====================

    #[test]
    fn test_build_rejects_invalid_template() {
        let result = MirrorConfig::builder().include("data/[").build();
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    // ==================== Overwrite Policy Tests ====================

    #[test]
    fn test_overwrite_policy_parses_labels() {
        assert_eq!(
            "never".parse::<OverwritePolicy>().unwrap(),
            OverwritePolicy::Never
        );
        assert_eq!(
            "always".parse::<OverwritePolicy>().unwrap(),
            OverwritePolicy::Always
        );
        assert_eq!(
            "ALWAYS".parse::<OverwritePolicy>().unwrap(),
            OverwritePolicy::Always
        );
    }

    #[test]
    fn test_overwrite_policy_rejects_unknown_label() {
        let error = "sometimes".parse::<OverwritePolicy>().unwrap_err();
        assert!(error.to_string().contains("sometimes"), "got: {error}");
    }

    #[test]
    fn test_overwrite_policy_display_round_trips() {
        for policy in [OverwritePolicy::Never, OverwritePolicy::Always] {
            let parsed: OverwritePolicy = policy.to_string().parse().unwrap();
            assert_eq!(parsed, policy);
        }
    }
}
