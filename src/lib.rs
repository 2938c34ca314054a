//! cinerank - movies on in cinemas, ranked by rating
//!
//! Collects the current cinema schedule, looks every movie up on a rating
//! service, and ranks the result for the console. All network responses go
//! through a persistent expiring cache, so repeated runs are fast and do not
//! hammer the upstream services.
//!
//! The pieces, leaves first:
//!
//! * [`cache`]: persistent key/value store with lazy expiry
//! * [`matcher`]: fuzzy title comparison
//! * [`reconcile`]: attaching ratings to listings
//! * [`rank`]: scoring, filtering and ordering
//! * [`fetch`]: cached network access, schedule parsing, title search
//! * [`app`]: the pipeline tying them together

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod matcher;
pub mod output;
pub mod progress;
pub mod rank;
pub mod reconcile;
pub mod signal;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;

use crate::app::ListingPipeline;
use crate::cache::CacheStore;
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::fetch::{CachingFetcher, ReqwestClient};
use crate::output::{JsonOutput, TableOutput};
use crate::progress::Progress;
use crate::rank::{RankOptions, RankedListing};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error when configuration, the cache, or the schedule fails.
/// [`app::AppError::Interrupted`] signals a Ctrl+C.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = Some(dir.clone());
    }
    log::debug!("Configuration: {config:?}");

    let shutdown = signal::install_handler()?;

    let mut store = CacheStore::open(&config.cache_root(), &config.namespace)
        .context("Failed to open cache")?;
    if cli.clean_cache {
        store.remove_all().context("Failed to clear cache")?;
    }

    let client = ReqwestClient::new(
        &config.user_agent,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let fetcher = CachingFetcher::new(client, config.request_ttl_secs);
    let progress = Progress::new(cli.quiet);

    let records = ListingPipeline::new(&config, &fetcher).listings(&mut store, &progress, &shutdown)?;

    let options = cli.rank_options();
    let ranked = rank::rank(records, options);

    report(
        &ranked,
        options,
        cli.output,
        !cli.no_color,
        io::stdout().lock(),
    )
}

/// Print `ranked` in `format` to `writer`.
///
/// A run that gets this far completed normally, so the exit code is
/// [`ExitCode::Success`] even when filtering left nothing to show.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn report<W: Write>(
    ranked: &[RankedListing],
    options: RankOptions,
    format: OutputFormat,
    color: bool,
    writer: W,
) -> anyhow::Result<ExitCode> {
    if ranked.is_empty() {
        log::warn!("No rated movies to show");
    }

    let exit_code = ExitCode::Success;
    match format {
        OutputFormat::Table => TableOutput::new(ranked, color).write_to(writer)?,
        OutputFormat::Json => JsonOutput::new(ranked, options, exit_code).write_to(writer)?,
    }

    Ok(exit_code)
}
