//! Ranking reconciled listings.
//!
//! Steps run in a fixed order: score, stable sort, popularity filter, drop
//! unrated listings, truncate.

use serde::Serialize;

use crate::reconcile::ListingRecord;

/// Weight of the normalized vote count in a vote-weighted score.
const VOTE_WEIGHT: f64 = 10.0;

/// Options for [`rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    /// Maximum number of results; `0` returns everything.
    pub limit: usize,
    /// Keep only listings shown in more cinemas than average.
    pub filter_by_popularity: bool,
    /// Add the normalized vote count to the rating.
    pub weight_by_votes: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            filter_by_popularity: false,
            weight_by_votes: false,
        }
    }
}

/// A listing with the score it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedListing {
    /// The listing.
    #[serde(flatten)]
    pub listing: ListingRecord,
    /// Composite score.
    pub score: f64,
}

/// Score, filter, sort and truncate `records`.
///
/// Ties keep their input order. Listings without a rating never appear in
/// the result.
///
/// # Examples
///
/// ```
/// use cinerank::rank::{rank, RankOptions};
/// use cinerank::reconcile::{ListingRecord, RawListing};
///
/// let mut top = ListingRecord::unrated(RawListing::new("Top", "/top", vec![]));
/// top.rate = 9.0;
/// let unrated = ListingRecord::unrated(RawListing::new("Unrated", "/u", vec![]));
///
/// let ranked = rank(vec![unrated, top], RankOptions::default());
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].listing.name, "Top");
/// ```
#[must_use]
pub fn rank(records: Vec<ListingRecord>, options: RankOptions) -> Vec<RankedListing> {
    let scorer = Scorer::new(&records, options.weight_by_votes);

    let mut ranked: Vec<RankedListing> = records
        .into_iter()
        .map(|listing| RankedListing {
            score: scorer.score(&listing),
            listing,
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    if options.filter_by_popularity {
        if let Some(mean) = mean_venue_count(&ranked) {
            log::debug!("Mean venue count: {mean:.2}");
            ranked.retain(|r| r.listing.venue_count as f64 > mean);
        }
    }

    ranked.retain(|r| r.listing.is_rated());

    if options.limit > 0 {
        ranked.truncate(options.limit);
    }

    ranked
}

/// Computes scores relative to the vote range of the whole input.
struct Scorer {
    weighted: bool,
    min_votes: u64,
    max_votes: u64,
}

impl Scorer {
    fn new(records: &[ListingRecord], weighted: bool) -> Self {
        let min_votes = records.iter().map(|r| r.votes).min().unwrap_or(0);
        let max_votes = records.iter().map(|r| r.votes).max().unwrap_or(0);
        Self {
            weighted,
            min_votes,
            max_votes,
        }
    }

    fn score(&self, record: &ListingRecord) -> f64 {
        if !self.weighted {
            return record.rate;
        }

        let spread = self.max_votes - self.min_votes;
        if spread == 0 {
            return record.rate;
        }

        let offset = (record.votes - self.min_votes) as f64;
        record.rate + offset / spread as f64 * VOTE_WEIGHT
    }
}

fn mean_venue_count(ranked: &[RankedListing]) -> Option<f64> {
    if ranked.is_empty() {
        return None;
    }
    let total: usize = ranked.iter().map(|r| r.listing.venue_count).sum();
    Some(total as f64 / ranked.len() as f64)
}
