//! CLI entry point for the treemirror tool.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use treemirror_core::{
    Crawler, HttpListingFetcher, HttpTransferClient, MirrorConfig, Scheduler,
    strip_locator_prefix,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Treemirror starting");

    let mut builder = MirrorConfig::builder()
        .output_root(args.output.clone())
        .overwrite(args.overwrite)
        .keep_checksums(args.keep_checksums)
        .retry_budget(u32::from(args.max_retries))
        .workers(usize::from(args.workers));

    // Templates may be pasted as full listing URLs; the root prefix is
    // stripped so only the relative part is matched.
    for template in &args.paths {
        builder = builder.include(strip_locator_prefix(template, &args.root));
    }
    for template in &args.excludes {
        builder = builder.exclude(strip_locator_prefix(template, &args.root));
    }
    if let Some(ref date) = args.start_date {
        builder = builder.start_date(date.as_str());
    }
    if let Some(ref date) = args.end_date {
        builder = builder.end_date(date.as_str());
    }

    let config = Arc::new(builder.build().context("invalid configuration")?);

    let fetcher = Arc::new(HttpListingFetcher::new());
    let client = Arc::new(HttpTransferClient::new());
    let scheduler = Scheduler::new(Arc::clone(&config), client);
    let crawler = Crawler::new(config, fetcher, scheduler);

    let summary = crawler.crawl(&args.root).await?;

    info!(
        downloaded = summary.downloaded,
        failed = summary.failed,
        skipped = summary.skipped,
        undated = summary.undated,
        retried = summary.retried,
        "Mirror complete"
    );

    Ok(())
}
