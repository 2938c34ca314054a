//! JSON output formatter for ranked results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "movies": [
//!     {
//!       "position": 1,
//!       "name": "Oppenheimer",
//!       "link": "https://www.afisha.ru/movie/1/",
//!       "rate": 8.1,
//!       "votes": 5000,
//!       "score": 8.1,
//!       "cinemas": [{"name": "Luxor", "link": "https://www.afisha.ru/cinema/10/"}],
//!       "cinemas_count": 1
//!     }
//!   ],
//!   "summary": {
//!     "generated_at": "2024-01-01T00:00:00Z",
//!     "count": 1,
//!     "limit": 10,
//!     "most_cinemas": false,
//!     "votes_weighted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "CR000"
//!   }
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ExitCode;
use crate::rank::{RankOptions, RankedListing};
use crate::reconcile::Venue;

/// A single ranked movie in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonMovie {
    /// 1-based rank
    pub position: usize,
    /// Title from the schedule site
    pub name: String,
    /// Schedule page of the movie
    pub link: String,
    /// External rating
    pub rate: f64,
    /// Votes behind the rating
    pub votes: u64,
    /// Score the movie was ranked by
    pub score: f64,
    /// Cinemas showing the movie
    pub cinemas: Vec<Venue>,
    /// Number of cinemas
    pub cinemas_count: usize,
}

impl JsonMovie {
    fn from_ranked(position: usize, ranked: &RankedListing) -> Self {
        let listing = &ranked.listing;
        Self {
            position,
            name: listing.name.clone(),
            link: listing.link.clone(),
            rate: listing.rate,
            votes: listing.votes,
            score: ranked.score,
            cinemas: listing.venues.clone(),
            cinemas_count: listing.venue_count,
        }
    }
}

/// Run metadata.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// When the output was produced
    pub generated_at: DateTime<Utc>,
    /// Number of movies in the output
    pub count: usize,
    /// Requested limit, 0 for unlimited
    pub limit: usize,
    /// Whether the popularity filter was on
    pub most_cinemas: bool,
    /// Whether votes were part of the score
    pub votes_weighted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CR000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Ranked movies, best first
    pub movies: Vec<JsonMovie>,
    /// Run metadata
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the output for `ranked` produced with `options`.
    ///
    /// # Example
    ///
    /// ```
    /// use cinerank::error::ExitCode;
    /// use cinerank::output::json::JsonOutput;
    /// use cinerank::rank::RankOptions;
    ///
    /// let output = JsonOutput::new(&[], RankOptions::default(), ExitCode::Success);
    /// assert_eq!(output.summary.count, 0);
    /// assert_eq!(output.summary.exit_code_name, "CR000");
    /// ```
    #[must_use]
    pub fn new(ranked: &[RankedListing], options: RankOptions, exit_code: ExitCode) -> Self {
        Self {
            movies: ranked
                .iter()
                .enumerate()
                .map(|(i, r)| JsonMovie::from_ranked(i + 1, r))
                .collect(),
            summary: JsonSummary {
                generated_at: Utc::now(),
                count: ranked.len(),
                limit: options.limit,
                most_cinemas: options.filter_by_popularity,
                votes_weighted: options.weight_by_votes,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        writeln!(writer, "{}", self.to_json_pretty()?)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{ListingRecord, RawListing};

    fn ranked() -> Vec<RankedListing> {
        let venues = vec![Venue {
            name: "Luxor".into(),
            link: "/cinema/10/".into(),
        }];
        let mut listing = ListingRecord::unrated(RawListing::new("Oppenheimer", "/movie/1/", venues));
        listing.rate = 8.1;
        listing.votes = 5000;
        vec![RankedListing {
            score: 8.1,
            listing,
        }]
    }

    #[test]
    fn test_json_movies() {
        let output = JsonOutput::new(&ranked(), RankOptions::default(), ExitCode::Success);
        assert_eq!(output.movies.len(), 1);
        assert_eq!(output.movies[0].position, 1);
        assert_eq!(output.movies[0].cinemas_count, 1);
        assert_eq!(output.summary.exit_code, 0);
    }

    #[test]
    fn test_json_serialization() {
        let options = RankOptions {
            limit: 0,
            filter_by_popularity: true,
            weight_by_votes: true,
        };
        let json = JsonOutput::new(&ranked(), options, ExitCode::Success)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["movies"][0]["name"], "Oppenheimer");
        assert_eq!(value["movies"][0]["votes"], 5000);
        assert_eq!(value["movies"][0]["cinemas"][0]["name"], "Luxor");
        assert_eq!(value["summary"]["limit"], 0);
        assert_eq!(value["summary"]["most_cinemas"], true);
        assert_eq!(value["summary"]["exit_code_name"], "CR000");
    }

    #[test]
    fn test_write_to_ends_with_newline() {
        let mut buf = Vec::new();
        JsonOutput::new(&[], RankOptions::default(), ExitCode::Success)
            .write_to(&mut buf)
            .unwrap();
        assert!(String::from_utf8(buf).unwrap().ends_with("}\n"));
    }
}
