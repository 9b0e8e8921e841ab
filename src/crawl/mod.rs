//! Crawl engine: walk a remote directory tree and mirror the selected files.
//!
//! This module ties the listing and transfer layers together. The crawler
//! fetches one listing at a time, narrows the path templates level by
//! level, and hands every surviving file to the scheduler, which filters by
//! date window and runs the downloads on a bounded worker pool.
//!
//! # Features
//!
//! - Level-by-level glob selection with include and exclude templates
//! - Date window filtering on the tokens embedded in archive names
//! - Bounded concurrent downloads with a per-file retry budget
//! - Counters for every outcome, returned as a run summary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use treemirror_core::config::MirrorConfig;
//! use treemirror_core::crawl::{Crawler, Scheduler};
//! use treemirror_core::listing::HttpListingFetcher;
//! use treemirror_core::transfer::HttpTransferClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(
//!     MirrorConfig::builder()
//!         .include("spot/monthly/klines/BTCUSDT/1m")
//!         .start_date("2023-01-01")
//!         .output_root("./mirror")
//!         .workers(4)
//!         .build()?,
//! );
//!
//! let scheduler = Scheduler::new(Arc::clone(&config), Arc::new(HttpTransferClient::new()));
//! let crawler = Crawler::new(config, Arc::new(HttpListingFetcher::new()), scheduler);
//!
//! let summary = crawler.crawl("https://archives.example.org/data/").await?;
//! println!("downloaded {} files", summary.downloaded);
//! # Ok(())
//! # }
//! ```

mod crawler;
mod scheduler;
mod stats;

pub use crawler::{CrawlError, Crawler};
pub use scheduler::{DeclineReason, Offer, ScheduleError, Scheduler};
pub use stats::{CrawlSummary, MirrorStats};
