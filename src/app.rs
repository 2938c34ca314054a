//! The listing pipeline: schedule, ratings, cache, rank.

use reqwest::Url;

use crate::cache::{CacheError, CacheStore};
use crate::config::{Config, LISTINGS_CACHE_KEY};
use crate::fetch::schedule::ScheduleError;
use crate::fetch::{CachingFetcher, HttpClient, ScheduleSource, SearchClient, TransportError};
use crate::progress::ProgressCallback;
use crate::reconcile::{ListingRecord, Reconciler};
use crate::signal::ShutdownHandler;

/// Errors that stop a run.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Enrichment was interrupted by user (Ctrl+C).
    #[error("Interrupted by user")]
    Interrupted,

    /// A configured URL does not parse.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Transport(#[from] TransportError),

    /// The schedule could not be loaded.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A cache operation failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Parse a configured URL.
///
/// # Errors
///
/// Returns [`AppError::InvalidUrl`] when `url` is not absolute and valid.
pub fn parse_url(url: &str) -> Result<Url, AppError> {
    Url::parse(url).map_err(|e| AppError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Produces the reconciled listing set, from the cache when it is fresh.
pub struct ListingPipeline<'a, C> {
    config: &'a Config,
    fetcher: &'a CachingFetcher<C>,
    reconciler: Reconciler,
}

impl<'a, C: HttpClient> ListingPipeline<'a, C> {
    /// Pipeline using `fetcher` for all network access.
    #[must_use]
    pub fn new(config: &'a Config, fetcher: &'a CachingFetcher<C>) -> Self {
        Self {
            config,
            fetcher,
            reconciler: Reconciler::new(config.match_threshold),
        }
    }

    /// Return every listing with its rating attached.
    ///
    /// A cached listing set is returned as is. Otherwise the schedule is
    /// fetched, each listing is reconciled against the search service, and
    /// the result is cached under [`LISTINGS_CACHE_KEY`]. An interrupted run
    /// caches nothing.
    ///
    /// # Errors
    ///
    /// Fails when the schedule is unavailable, when a cache operation fails,
    /// or when `shutdown` is triggered during enrichment.
    pub fn listings(
        &self,
        store: &mut CacheStore,
        progress: &dyn ProgressCallback,
        shutdown: &ShutdownHandler,
    ) -> Result<Vec<ListingRecord>, AppError> {
        if let Some(cached) = store.get_as::<Vec<ListingRecord>>(LISTINGS_CACHE_KEY)? {
            log::info!("Using {} cached listings", cached.len());
            return Ok(cached);
        }

        let schedule_url = parse_url(&self.config.schedule_url)?;
        let search_url = parse_url(&self.config.search_url)?;

        let raw = ScheduleSource::new(self.fetcher, schedule_url)?.listings(store)?;
        log::info!("Schedule lists {} movies", raw.len());

        let mut records = Vec::with_capacity(raw.len());
        {
            let mut search = SearchClient::new(self.fetcher, store, search_url)
                .with_header("Origin", self.config.search_origin())
                .with_header("Referer", self.config.search_referer.as_str())
                .with_header("Pragma", "no-cache");

            progress.on_start(raw.len());
            for (i, listing) in raw.into_iter().enumerate() {
                if shutdown.is_shutdown_requested() {
                    progress.on_finish();
                    return Err(AppError::Interrupted);
                }

                progress.on_progress(i + 1, &listing.name);
                records.push(self.reconciler.reconcile(listing, &mut search)?);
            }
            progress.on_finish();
        }

        let rated = records.iter().filter(|r| r.is_rated()).count();
        log::info!("Found ratings for {rated} of {} movies", records.len());

        store.put_as(LISTINGS_CACHE_KEY, &records, self.config.listing_ttl_secs)?;
        Ok(records)
    }
}
