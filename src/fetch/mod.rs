//! Network access behind the cache.
//!
//! Every upstream request goes through [`CachingFetcher`], which derives a
//! stable cache key from the request URL, serves fresh entries from the
//! [`CacheStore`], and only otherwise hits the network. Network trouble never
//! becomes an error here: it is reported as [`FetchOutcome::NoData`] so the
//! caller decides whether missing data is fatal.
//!
//! * [`http`]: the blocking `reqwest` transport.
//! * [`schedule`]: extracting listings from the schedule page.
//! * [`search`]: the title search used to find ratings.

pub mod http;
pub mod schedule;
pub mod search;

use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::cache::{CacheResult, CacheStore, CacheValue};

pub use http::ReqwestClient;
pub use schedule::{parse_schedule, ScheduleSource};
pub use search::{interpret_search_results, SearchClient};

/// Cache key prefix for network responses.
const REQUEST_KEY_PREFIX: &str = "request-";

/// A GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Target URL.
    pub url: Url,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// A GET request for `url` with no extra headers.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: Vec::new(),
        }
    }

    /// Add a request header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Cache key for this request: `request-` followed by the SHA-256 of the
    /// serialized URL. Headers do not take part.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let digest = Sha256::digest(self.url.as_str().as_bytes());
        format!("{REQUEST_KEY_PREFIX}{digest:x}")
    }
}

/// A response as seen by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is `200 OK`.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// A request that never produced a response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The host could not be reached.
    #[error("Connection failed: {0}")]
    Connect(String),
    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// Any other transport-level failure.
    #[error("Request failed: {0}")]
    Other(String),
}

/// Something that can perform GET requests.
pub trait HttpClient {
    /// Perform `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received. Non-2xx
    /// responses are not errors.
    fn get(&self, request: &FetchRequest) -> Result<HttpResponse, TransportError>;
}

/// Why a fetch produced no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoData {
    /// The server answered with a non-success status.
    Status(u16),
    /// The request never got a response.
    Transport(TransportError),
}

impl std::fmt::Display for NoData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoData::Status(status) => write!(f, "HTTP status {status}"),
            NoData::Transport(err) => write!(f, "{err}"),
        }
    }
}

/// Result of a cached fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A payload, either fresh from the network or from the cache.
    Data(CacheValue),
    /// Nothing usable; never cached.
    NoData(NoData),
}

/// Fetches through the cache.
#[derive(Debug, Clone)]
pub struct CachingFetcher<C> {
    client: C,
    ttl_secs: u64,
}

impl<C: HttpClient> CachingFetcher<C> {
    /// Fetcher caching successful responses for `ttl_secs` seconds.
    #[must_use]
    pub fn new(client: C, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Return the cached payload for `request`, fetching and caching it on a
    /// miss.
    ///
    /// Successful bodies are cached as JSON when they decode and as raw text
    /// otherwise. Failed requests and non-success statuses are not cached.
    ///
    /// # Errors
    ///
    /// Only cache storage errors are returned.
    pub fn fetch(&self, store: &mut CacheStore, request: &FetchRequest) -> CacheResult<FetchOutcome> {
        let key = request.cache_key();

        if let Some(cached) = store.get(&key)? {
            log::debug!("Serving {} from cache", request.url);
            return Ok(FetchOutcome::Data(cached));
        }

        log::debug!("Fetching {}", request.url);
        let response = match self.client.get(request) {
            Ok(response) => response,
            Err(err) => {
                log::warn!("Could not fetch {}: {err}", request.url);
                return Ok(FetchOutcome::NoData(NoData::Transport(err)));
            }
        };

        if !response.is_ok() {
            log::warn!("{} answered with status {}", request.url, response.status);
            return Ok(FetchOutcome::NoData(NoData::Status(response.status)));
        }

        let value = CacheValue::from_body(response.body);
        let stored = store.put(&key, value, self.ttl_secs)?;
        Ok(FetchOutcome::Data(stored))
    }
}
