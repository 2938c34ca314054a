//! Title search on the rating service.
//!
//! The suggest endpoint answers with a JSON array whose third element lists
//! candidate movies. Each candidate is itself a JSON document encoded as a
//! string, carrying `title` and `rating.{rate,votes}`. Only the first
//! candidate is considered.

use reqwest::Url;
use serde_json::Value;

use super::{CachingFetcher, FetchOutcome, FetchRequest, HttpClient};
use crate::cache::{CacheError, CacheStore, CacheValue};
use crate::reconcile::{EnrichmentRecord, EnrichmentSource, LookupOutcome};

/// Query parameter carrying the searched title.
const QUERY_PARAM: &str = "part";

/// Position of the candidate list in a suggest response.
const CANDIDATES_INDEX: usize = 2;

/// Read the best candidate out of a suggest response.
///
/// Missing rating fields default to zero. A response that is not a JSON
/// array, or a candidate that is not a readable document, is
/// [`LookupOutcome::Malformed`]; an empty candidate list is
/// [`LookupOutcome::NotFound`].
#[must_use]
pub fn interpret_search_results(value: &CacheValue) -> LookupOutcome {
    let Some(Value::Array(sections)) = value.as_structured() else {
        return LookupOutcome::Malformed;
    };

    let Some(first) = sections
        .get(CANDIDATES_INDEX)
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
    else {
        return LookupOutcome::NotFound;
    };

    let candidate = match first {
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(doc) => doc,
            Err(e) => {
                log::debug!("Unreadable search candidate: {e}");
                return LookupOutcome::Malformed;
            }
        },
        Value::Object(_) => first.clone(),
        _ => return LookupOutcome::Malformed,
    };

    if !candidate.is_object() {
        return LookupOutcome::Malformed;
    }

    let rating = candidate.get("rating");
    LookupOutcome::Found(EnrichmentRecord {
        name: candidate
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        rate: rating.and_then(|r| r.get("rate")).map_or(0.0, lenient_f64),
        votes: rating.and_then(|r| r.get("votes")).map_or(0, lenient_u64),
    })
}

/// Numbers sometimes arrive as strings.
fn lenient_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn lenient_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Rating lookups through the cache.
pub struct SearchClient<'a, C> {
    fetcher: &'a CachingFetcher<C>,
    store: &'a mut CacheStore,
    base_url: Url,
    headers: Vec<(String, String)>,
}

impl<'a, C: HttpClient> SearchClient<'a, C> {
    /// Search client querying `base_url`, caching into `store`.
    #[must_use]
    pub fn new(fetcher: &'a CachingFetcher<C>, store: &'a mut CacheStore, base_url: Url) -> Self {
        Self {
            fetcher,
            store,
            base_url,
            headers: Vec::new(),
        }
    }

    /// Send `name: value` with every search request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The request issued for `title`. Titles are searched in lowercase.
    #[must_use]
    pub fn request_for(&self, title: &str) -> FetchRequest {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(QUERY_PARAM, &title.to_lowercase());

        self.headers
            .iter()
            .fold(FetchRequest::get(url), |request, (name, value)| {
                request.with_header(name.as_str(), value.as_str())
            })
    }
}

impl<C: HttpClient> EnrichmentSource for SearchClient<'_, C> {
    type Error = CacheError;

    fn lookup(&mut self, title: &str) -> Result<LookupOutcome, CacheError> {
        let request = self.request_for(title);

        Ok(match self.fetcher.fetch(&mut *self.store, &request)? {
            FetchOutcome::Data(value) => interpret_search_results(&value),
            FetchOutcome::NoData(reason) => LookupOutcome::Unavailable(reason.to_string()),
        })
    }
}
