//! End-to-end runs of the listing pipeline against a canned network.

use cinerank::app::{AppError, ListingPipeline};
use cinerank::cache::CacheStore;
use cinerank::config::{Config, LISTINGS_CACHE_KEY};
use cinerank::fetch::{CachingFetcher, FetchRequest, HttpClient, HttpResponse, TransportError};
use cinerank::output::TableOutput;
use cinerank::progress::NoProgress;
use cinerank::rank::{rank, RankOptions};
use cinerank::signal::ShutdownHandler;
use serde_json::json;
use std::cell::Cell;
use std::collections::HashMap;
use tempfile::tempdir;

const SCHEDULE: &str = "https://schedule.test/msk/schedule_cinema";
const SEARCH: &str = "https://suggest.test/suggest?srv=kinopoisk";

/// Serves fixed bodies by URL and counts requests.
#[derive(Default)]
struct CannedWeb {
    pages: HashMap<String, (u16, String)>,
    hits: Cell<usize>,
}

impl CannedWeb {
    fn page(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), (status, body.into()));
        self
    }

    fn rating(self, query: &str, title: &str, rate: f64, votes: u64) -> Self {
        let candidate = json!({"title": title, "rating": {"rate": rate, "votes": votes}});
        let body = json!([query, [], [candidate.to_string()]]).to_string();
        self.page(&format!("{SEARCH}&part={query}"), 200, body)
    }
}

impl HttpClient for CannedWeb {
    fn get(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError> {
        self.hits.set(self.hits.get() + 1);
        match self.pages.get(request.url.as_str()) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Err(TransportError::Timeout("no page".into())),
        }
    }
}

fn block(title: &str, cinemas: usize) -> String {
    let rows: String = (0..cinemas)
        .map(|i| format!(r#"<tr><td><a href="/cinema/{i}/">Cinema {i}</a></td></tr>"#))
        .collect();
    format!(
        r#"<div class="b-object s-votes-hover-area"><h3><a href="/movie/{title}/">{title}</a></h3><table>{rows}</table></div>"#
    )
}

fn schedule() -> String {
    [block("Arrival", 7), block("Barbie", 7), block("Carol", 9), block("Drama", 1)].concat()
}

fn web() -> CannedWeb {
    CannedWeb::default()
        .page(SCHEDULE, 200, schedule())
        .rating("arrival", "Arrival", 7.0, 10)
        .rating("barbie", "Barbei", 7.0, 5)
        .rating("carol", "Carol", 9.0, 1)
        .rating("drama", "Completely Different", 8.0, 100)
}

fn config() -> Config {
    Config {
        schedule_url: SCHEDULE.into(),
        search_url: SEARCH.into(),
        ..Config::default()
    }
}

#[test]
fn test_rank_by_rating() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    let config = config();
    let fetcher = CachingFetcher::new(web(), config.request_ttl_secs);

    let records = ListingPipeline::new(&config, &fetcher)
        .listings(&mut store, &NoProgress, &ShutdownHandler::new())
        .unwrap();
    assert_eq!(records.len(), 4);
    // Title too far from the search hit: kept unrated.
    assert_eq!(records[3].rate, 0.0);

    let ranked = rank(records, RankOptions::default());
    let names: Vec<&str> = ranked.iter().map(|r| r.listing.name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Arrival", "Barbie"]);
}

#[test]
fn test_rank_most_cinemas() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    let config = config();
    let fetcher = CachingFetcher::new(web(), config.request_ttl_secs);

    let records = ListingPipeline::new(&config, &fetcher)
        .listings(&mut store, &NoProgress, &ShutdownHandler::new())
        .unwrap();
    let options = RankOptions {
        filter_by_popularity: true,
        ..RankOptions::default()
    };

    // Mean venue count is 6: Drama (1) is dropped, the rest stay.
    let ranked = rank(records, options);
    let names: Vec<&str> = ranked.iter().map(|r| r.listing.name.as_str()).collect();
    assert_eq!(names, vec!["Carol", "Arrival", "Barbie"]);

    let table = TableOutput::new(&ranked, false).to_string_plain();
    assert!(table.contains("Carol"));
    assert!(!table.contains("Drama"));
}

#[test]
fn test_second_run_served_from_cache() {
    let dir = tempdir().unwrap();
    let config = config();

    let first = {
        let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
        let fetcher = CachingFetcher::new(web(), config.request_ttl_secs);
        let records = ListingPipeline::new(&config, &fetcher)
            .listings(&mut store, &NoProgress, &ShutdownHandler::new())
            .unwrap();
        assert_eq!(fetcher.client().hits.get(), 5);
        records
    };

    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    let fetcher = CachingFetcher::new(CannedWeb::default(), config.request_ttl_secs);
    let second = ListingPipeline::new(&config, &fetcher)
        .listings(&mut store, &NoProgress, &ShutdownHandler::new())
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(fetcher.client().hits.get(), 0);
}

#[test]
fn test_lost_listing_cache_reuses_request_cache() {
    let dir = tempdir().unwrap();
    let config = config();

    {
        let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
        let fetcher = CachingFetcher::new(web(), config.request_ttl_secs);
        ListingPipeline::new(&config, &fetcher)
            .listings(&mut store, &NoProgress, &ShutdownHandler::new())
            .unwrap();
        store.remove(LISTINGS_CACHE_KEY).unwrap();
    }

    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    let fetcher = CachingFetcher::new(CannedWeb::default(), config.request_ttl_secs);
    let records = ListingPipeline::new(&config, &fetcher)
        .listings(&mut store, &NoProgress, &ShutdownHandler::new())
        .unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(fetcher.client().hits.get(), 0);
}

#[test]
fn test_search_outage_leaves_movies_unrated() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    let config = config();
    let web = CannedWeb::default().page(SCHEDULE, 200, schedule());
    let fetcher = CachingFetcher::new(web, config.request_ttl_secs);

    let records = ListingPipeline::new(&config, &fetcher)
        .listings(&mut store, &NoProgress, &ShutdownHandler::new())
        .unwrap();

    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| !r.is_rated()));
    assert!(rank(records, RankOptions::default()).is_empty());
}

#[test]
fn test_schedule_outage_is_fatal() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    let config = config();
    let fetcher = CachingFetcher::new(CannedWeb::default(), config.request_ttl_secs);

    let result = ListingPipeline::new(&config, &fetcher).listings(
        &mut store,
        &NoProgress,
        &ShutdownHandler::new(),
    );
    assert!(matches!(result, Err(AppError::Schedule(_))));
    assert!(store.get(LISTINGS_CACHE_KEY).unwrap().is_none());
}
