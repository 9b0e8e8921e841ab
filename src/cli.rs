//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use treemirror_core::{ConfigError, DEFAULT_RETRY_BUDGET, DEFAULT_WORKERS, OverwritePolicy};

/// Mirror selected files from remote directory index listings.
///
/// Treemirror walks a remote directory tree, selects entries with
/// slash-segmented glob templates, and downloads the matching files into a
/// local tree of the same shape.
#[derive(Parser, Debug)]
#[command(name = "treemirror")]
#[command(author, version, about)]
pub struct Args {
    /// Root listing URL the crawl starts from
    pub root: String,

    /// Path template to download, relative to the root (repeatable)
    #[arg(short = 'p', long = "path", required = true)]
    pub paths: Vec<String>,

    /// Path template to skip (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub excludes: Vec<String>,

    /// Skip files dated before this day (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Skip files dated after this day (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Directory the mirrored tree is written under
    #[arg(short = 'o', long, default_value = ".")]
    pub output: PathBuf,

    /// Whether existing files are replaced (never, always)
    #[arg(long, default_value_t = OverwritePolicy::Never, value_parser = parse_overwrite)]
    pub overwrite: OverwritePolicy,

    /// Download .CHECKSUM sidecar files too
    #[arg(long)]
    pub keep_checksums: bool,

    /// Maximum retry attempts per file after the first (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_RETRY_BUDGET as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// Concurrent downloads; 0 downloads inline while walking (0-100)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS as u8, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub workers: u8,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_overwrite(value: &str) -> Result<OverwritePolicy, String> {
    value
        .parse()
        .map_err(|error: ConfigError| error.to_string())
}
