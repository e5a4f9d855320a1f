//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use wallget_core::{
    Categories, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS, Order, Purity, Sorting, TopRange,
};

/// Output directory used when neither the CLI nor the config file names one.
pub const DEFAULT_OUTPUT_DIR: &str = "wallpapers";

/// Download wallpapers from an image-gallery search API.
///
/// Wallget pages through search results and saves every image into a local
/// directory. Files already present are skipped, so interrupted runs can be
/// resumed by running the same command again. The API key is read from the
/// `WALLGET_API_KEY` environment variable.
#[derive(Parser, Debug)]
#[command(name = "wallget")]
#[command(author, version, about)]
pub struct Args {
    /// Free-text search terms (tags, `-tag` exclusions, `@user`, `id:123`)
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Category mask over general/anime/people, e.g. 110
    #[arg(long)]
    pub categories: Option<Categories>,

    /// Purity mask over sfw/sketchy/nsfw, e.g. 100
    #[arg(long)]
    pub purity: Option<Purity>,

    /// Sort key: date_added, relevance, random, views, favorites, toplist, hot
    #[arg(long)]
    pub sorting: Option<Sorting>,

    /// Sort direction: desc or asc
    #[arg(long)]
    pub order: Option<Order>,

    /// Time window for the toplist sort: 1d, 3d, 1w, 1M, 3M, 6M, 1y
    #[arg(long)]
    pub top_range: Option<TopRange>,

    /// First result page to download (1-based)
    #[arg(short = 's', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start_page: u32,

    /// Number of pages to download
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Directory to save images into (created if missing)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent downloads (1-100)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: u8,

    /// Per-file download deadline in seconds (1-3600)
    #[arg(short = 't', long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: u64,

    /// Search endpoint URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output and non-error logs
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}
