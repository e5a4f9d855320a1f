use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Which arguments were given explicitly on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) output_dir: bool,
    pub(crate) concurrency: bool,
    pub(crate) timeout: bool,
    pub(crate) categories: bool,
    pub(crate) purity: bool,
    pub(crate) sorting: bool,
    pub(crate) order: bool,
    pub(crate) top_range: bool,
    pub(crate) api_url: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let matches = Args::command().get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = sources_from_matches(&matches);
    (args, sources)
}

fn sources_from_matches(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        output_dir: is_commandline_value(matches, "output_dir"),
        concurrency: is_commandline_value(matches, "concurrency"),
        timeout: is_commandline_value(matches, "timeout"),
        categories: is_commandline_value(matches, "categories"),
        purity: is_commandline_value(matches, "purity"),
        sorting: is_commandline_value(matches, "sorting"),
        order: is_commandline_value(matches, "order"),
        top_range: is_commandline_value(matches, "top_range"),
        api_url: is_commandline_value(matches, "api_url"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills every argument not given on the command line from the config file.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Result<Args> {
    if let Some(file_config) = file_config {
        if !cli_sources.output_dir
            && args.output_dir.is_none()
            && let Some(output_dir) = &file_config.output_dir
        {
            args.output_dir = Some(output_dir.clone());
        }

        if !cli_sources.concurrency
            && let Some(concurrency) = file_config.concurrency
        {
            args.concurrency = concurrency;
        }

        if !cli_sources.timeout
            && let Some(timeout_secs) = file_config.timeout_secs
        {
            args.timeout = timeout_secs;
        }

        if !cli_sources.categories && args.categories.is_none() {
            args.categories = file_config.categories;
        }
        if !cli_sources.purity && args.purity.is_none() {
            args.purity = file_config.purity;
        }
        if !cli_sources.sorting && args.sorting.is_none() {
            args.sorting = file_config.sorting;
        }
        if !cli_sources.order && args.order.is_none() {
            args.order = file_config.order;
        }
        if !cli_sources.top_range && args.top_range.is_none() {
            args.top_range = file_config.top_range;
        }

        if !cli_sources.api_url
            && args.api_url.is_none()
            && let Some(api_url) = &file_config.api_url
        {
            args.api_url = Some(api_url.clone());
        }

        if !cli_sources.verbose
            && !cli_sources.quiet
            && let Some(verbosity) = file_config.verbosity
        {
            apply_config_verbosity(&mut args, verbosity);
        }
    }

    if !(1..=100).contains(&args.concurrency) {
        bail!(
            "Invalid effective concurrency value: {}. Expected range: 1..=100",
            args.concurrency
        );
    }
    if !(1..=3600).contains(&args.timeout) {
        bail!(
            "Invalid effective timeout value: {}. Expected range: 1..=3600",
            args.timeout
        );
    }

    Ok(args)
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Explicit `-v`/`--quiet` override `RUST_LOG`.
pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}
