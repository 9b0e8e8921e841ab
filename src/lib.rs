//! Treemirror Core Library
//!
//! This library provides the core functionality for the treemirror tool,
//! which mirrors selected subtrees of a remote directory index (dated
//! archive collections, public dataset dumps) onto the local file system.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Validated run settings, built through a builder
//! - [`crawl`] - Tree walk, transfer scheduling, and run counters
//! - [`listing`] - Directory index fetching and parsing
//! - [`pattern`] - Slash-segmented glob templates matched level by level
//! - [`transfer`] - Streaming HTTP downloads to local files

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod crawl;
pub mod listing;
pub mod pattern;
#[cfg(test)]
pub mod test_support;
pub mod transfer;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use config::{
    CHECKSUM_SUFFIX, ConfigError, DEFAULT_RETRY_BUDGET, DEFAULT_WORKERS, MirrorConfig,
    MirrorConfigBuilder, OverwritePolicy,
};
pub use crawl::{
    CrawlError, CrawlSummary, Crawler, DeclineReason, MirrorStats, Offer, ScheduleError,
    Scheduler,
};
pub use listing::{
    DirEntry, EntryError, FileEntry, HttpListingFetcher, ListingEntry, ListingError,
    ListingFetcher,
};
pub use pattern::{PathPattern, PathPatternError, strip_locator_prefix};
pub use transfer::{
    CONNECT_TIMEOUT_SECS, HttpTransferClient, READ_TIMEOUT_SECS, TransferClient, TransferError,
};
