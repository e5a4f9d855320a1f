//! CLI entry point for the wallget tool.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};
use wallget_core::{
    DEFAULT_SEARCH_ENDPOINT, DownloadSession, ProgressReporter, RunSummary, SearchQuery,
    SessionConfig, api_key_from_env,
};

mod app_config;
mod cli;
mod config_runtime;

use app_config::load_default_file_config;
use cli::{Args, DEFAULT_OUTPUT_DIR};
use config_runtime::{
    apply_config_defaults, parse_cli_with_sources, resolve_default_log_level,
    should_force_cli_log_level,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, cli_sources) = parse_cli_with_sources();
    let loaded = load_default_file_config()?;
    let args = apply_config_defaults(args, &cli_sources, loaded.config.as_ref())?;

    init_tracing(
        resolve_default_log_level(&args),
        should_force_cli_log_level(&cli_sources),
    );
    debug!(?args, config_path = ?loaded.path, "CLI arguments resolved");

    // Credential is checked before any network activity.
    let api_key = api_key_from_env()?;
    let query = build_query(&args, &api_key);

    let reporter = Arc::new(ProgressReporter::for_stdout(args.quiet));
    let config = SessionConfig {
        target_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        concurrency: usize::from(args.concurrency),
        timeout: Duration::from_secs(args.timeout),
        api_key,
        search_endpoint: args
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string()),
    };

    info!(
        target_dir = %config.target_dir.display(),
        start_page = args.start_page,
        pages = args.pages,
        "Wallget starting"
    );

    let session = DownloadSession::new(config, reporter)
        .await
        .context("Failed to prepare download session")?;
    let outcome = session.run(&query, args.start_page, args.pages).await;
    session.finish();

    let summary = outcome.context("Download run aborted")?;
    if !args.quiet {
        println!("{}", summary_line(&summary));
    }
    Ok(())
}

fn build_query(args: &Args, api_key: &str) -> SearchQuery {
    let mut builder = SearchQuery::builder(api_key);
    if let Some(categories) = args.categories {
        builder = builder.categories(categories);
    }
    if let Some(purity) = args.purity {
        builder = builder.purity(purity);
    }
    if let Some(sorting) = args.sorting {
        builder = builder.sorting(sorting);
    }
    if let Some(order) = args.order {
        builder = builder.order(order);
    }
    if let Some(top_range) = args.top_range {
        builder = builder.top_range(top_range);
    }
    if let Some(text) = &args.query {
        builder = builder.text(text.clone());
    }
    builder.build()
}

fn summary_line(summary: &RunSummary) -> String {
    format!(
        "Finished in {:.1}s: {} downloaded, {} skipped, {} failed",
        summary.elapsed.as_secs_f64(),
        summary.downloaded,
        summary.skipped,
        summary.failed
    )
}

fn init_tracing(default_level: &str, force_cli_level: bool) {
    let filter = if force_cli_level {
        tracing_subscriber::EnvFilter::new(default_level)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
    };
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal() && !no_color)
        .with_env_filter(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_summary_line_format() {
        let summary = RunSummary {
            pages_fetched: 2,
            downloaded: 40,
            skipped: 7,
            failed: 1,
            elapsed: Duration::from_millis(12_340),
        };
        assert_eq!(
            summary_line(&summary),
            "Finished in 12.3s: 40 downloaded, 7 skipped, 1 failed"
        );
    }

    #[test]
    fn test_build_query_only_sends_given_filters() {
        let args = Args::try_parse_from(["wallget", "-q", "forest", "--sorting", "views"]).unwrap();
        let query = build_query(&args, "k3y");
        let keys: Vec<&str> = query.params(1).iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["apikey", "q", "sorting", "page"]);
    }
}
