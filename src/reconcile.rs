//! Merging schedule listings with ratings from the search service.
//!
//! The schedule site knows which movies are on and where; the rating service
//! knows how good they are. The two are joined by title only, so every
//! candidate rating is gated by [`crate::matcher::matches`] before it is
//! copied onto a listing. Listings that end up without a rating keep the
//! explicit `rate = 0, votes = 0` default.

use serde::{Deserialize, Serialize};

use crate::matcher::{self, DEFAULT_MATCH_THRESHOLD};

/// A cinema showing a movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Display name of the cinema.
    pub name: String,
    /// Link to the cinema's page on the schedule site.
    pub link: String,
}

/// A listing as scraped from the schedule page, before any rating lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    /// Title as shown on the schedule site.
    pub name: String,
    /// Link to the movie's schedule page.
    pub link: String,
    /// Cinemas showing the movie, placeholder links excluded.
    pub venues: Vec<Venue>,
    /// Number of entries in `venues`.
    pub venue_count: usize,
}

impl RawListing {
    /// Create a listing; `venue_count` is derived from `venues`.
    #[must_use]
    pub fn new(name: impl Into<String>, link: impl Into<String>, venues: Vec<Venue>) -> Self {
        let venue_count = venues.len();
        Self {
            name: name.into(),
            link: link.into(),
            venues,
            venue_count,
        }
    }
}

/// A listing after reconciliation.
///
/// `rate == 0` and `votes == 0` mean no rating could be attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Title as shown on the schedule site.
    pub name: String,
    /// Link to the movie's schedule page.
    pub link: String,
    /// Cinemas showing the movie.
    pub venues: Vec<Venue>,
    /// Number of entries in `venues`.
    pub venue_count: usize,
    /// Rating from the search service, `0.0` when unknown.
    pub rate: f64,
    /// Number of votes behind `rate`, `0` when unknown.
    pub votes: u64,
}

impl ListingRecord {
    /// A listing with no rating attached.
    #[must_use]
    pub fn unrated(listing: RawListing) -> Self {
        Self {
            name: listing.name,
            link: listing.link,
            venues: listing.venues,
            venue_count: listing.venue_count,
            rate: 0.0,
            votes: 0,
        }
    }

    /// Whether a rating was attached during reconciliation.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        self.rate != 0.0
    }
}

/// Best-guess rating returned by the search service for a title.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    /// Title as known to the search service.
    pub name: String,
    /// Number of votes.
    pub votes: u64,
    /// Average rating.
    pub rate: f64,
}

/// What a rating lookup produced.
///
/// Only [`Found`](Self::Found) can lead to a rating; the other variants stay
/// distinct so logs can tell "nothing matched" from "the lookup failed", even
/// though both leave the listing unrated.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The service returned a candidate.
    Found(EnrichmentRecord),
    /// The service answered but had no candidates.
    NotFound,
    /// The service answered with something that is not a search result.
    Malformed,
    /// The service could not be reached or refused the request.
    Unavailable(String),
}

/// A source of ratings keyed by title.
pub trait EnrichmentSource {
    /// Error that aborts reconciliation (storage failures, not missing data).
    type Error;

    /// Look up the best candidate for `title`.
    ///
    /// # Errors
    ///
    /// Implementations return an error only for failures that must stop the
    /// whole run; anything that merely means "no rating" is a
    /// [`LookupOutcome`].
    fn lookup(&mut self, title: &str) -> Result<LookupOutcome, Self::Error>;
}

/// Attaches ratings to raw listings.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    threshold: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Reconciler {
    /// Reconciler accepting titles within `threshold` edits of each other.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// The configured match threshold.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Look up a rating for `listing` and merge it when the titles match.
    ///
    /// # Errors
    ///
    /// Propagates the source's error. Missing, malformed or mismatched
    /// ratings are not errors; they produce an unrated record.
    pub fn reconcile<S: EnrichmentSource>(
        &self,
        listing: RawListing,
        source: &mut S,
    ) -> Result<ListingRecord, S::Error> {
        let outcome = source.lookup(&listing.name)?;
        Ok(self.merge(listing, outcome))
    }

    /// Merge an already obtained lookup outcome into `listing`.
    #[must_use]
    pub fn merge(&self, listing: RawListing, outcome: LookupOutcome) -> ListingRecord {
        let candidate = match outcome {
            LookupOutcome::Found(candidate) => candidate,
            LookupOutcome::NotFound => {
                log::debug!("No rating candidates for '{}'", listing.name);
                return ListingRecord::unrated(listing);
            }
            LookupOutcome::Malformed => {
                log::debug!("Unreadable rating response for '{}'", listing.name);
                return ListingRecord::unrated(listing);
            }
            LookupOutcome::Unavailable(reason) => {
                log::warn!("Rating lookup failed for '{}': {reason}", listing.name);
                return ListingRecord::unrated(listing);
            }
        };

        if candidate.name.trim().is_empty() {
            log::debug!("Rating candidate for '{}' has no title", listing.name);
            return ListingRecord::unrated(listing);
        }

        if !matcher::matches(&candidate.name, &listing.name, self.threshold) {
            log::debug!(
                "Rejected rating candidate '{}' for '{}'",
                candidate.name,
                listing.name
            );
            return ListingRecord::unrated(listing);
        }

        log::debug!(
            "Matched '{}' to '{}' (rate {}, votes {})",
            listing.name,
            candidate.name,
            candidate.rate,
            candidate.votes
        );

        let mut record = ListingRecord::unrated(listing);
        record.rate = candidate.rate;
        record.votes = candidate.votes;
        record
    }
}
