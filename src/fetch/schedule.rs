//! The cinema schedule page.
//!
//! The page lists one block per movie (`div.s-votes-hover-area`). Inside a
//! block the `<h3>` holds a link to the movie, and a `<table>` holds one link
//! per cinema. Placeholder links (`href="#"`) are not cinemas.

use regex::Regex;
use reqwest::Url;

use super::{CachingFetcher, FetchOutcome, FetchRequest, HttpClient, NoData};
use crate::cache::{CacheError, CacheStore};
use crate::reconcile::{RawListing, Venue};

/// Errors from loading the schedule.
#[derive(thiserror::Error, Debug)]
pub enum ScheduleError {
    /// The schedule page could not be fetched.
    #[error("Schedule page {url} is unavailable: {reason}")]
    Unavailable {
        /// Page URL
        url: String,
        /// Why nothing was received
        reason: NoData,
    },

    /// The page was fetched but is not an HTML document.
    #[error("Schedule page {url} did not return HTML")]
    NotHtml {
        /// Page URL
        url: String,
    },

    /// A cache operation failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A built-in pattern failed to compile.
    #[error("Invalid schedule pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Extracts listings from schedule HTML.
#[derive(Debug, Clone)]
pub struct ScheduleParser {
    block: Regex,
    title: Regex,
    table: Regex,
    link: Regex,
    tag: Regex,
}

impl ScheduleParser {
    /// Compile the extraction patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Pattern`] if a pattern does not compile.
    pub fn new() -> Result<Self, ScheduleError> {
        Ok(Self {
            block: Regex::new(r#"<div[^>]*\bclass="[^"]*\bs-votes-hover-area\b[^"]*"[^>]*>"#)?,
            title: Regex::new(r#"(?s)<h3\b[^>]*>.*?<a\b[^>]*?\bhref="([^"]*)"[^>]*>(.*?)</a>"#)?,
            table: Regex::new(r"(?s)<table\b[^>]*>(.*?)</table>")?,
            link: Regex::new(r#"(?s)<a\b[^>]*?\bhref="([^"]*)"[^>]*>(.*?)</a>"#)?,
            tag: Regex::new(r"<[^>]*>")?,
        })
    }

    /// Extract every listing from `html`, in page order.
    ///
    /// Blocks without a title link are skipped.
    #[must_use]
    pub fn parse(&self, html: &str) -> Vec<RawListing> {
        let starts: Vec<usize> = self.block.find_iter(html).map(|m| m.end()).collect();
        let mut listings = Vec::with_capacity(starts.len());

        for (i, &start) in starts.iter().enumerate() {
            let end = match starts.get(i + 1) {
                Some(&next) => next,
                None => html.len(),
            };
            let block = &html[start..end];

            let Some(title) = self.title.captures(block) else {
                log::debug!("Skipping schedule block {i} without a title");
                continue;
            };
            let link = decode_entities(&title[1]);
            let name = self.text(&title[2]);

            let venues = match self.table.captures(block) {
                Some(table) => self.venues(&table[1]),
                None => Vec::new(),
            };

            listings.push(RawListing::new(name, link, venues));
        }

        log::debug!("Parsed {} listings from schedule", listings.len());
        listings
    }

    fn venues(&self, table: &str) -> Vec<Venue> {
        self.link
            .captures_iter(table)
            .filter_map(|caps| {
                let link = decode_entities(&caps[1]);
                if is_placeholder(&link) {
                    return None;
                }
                Some(Venue {
                    name: self.text(&caps[2]),
                    link,
                })
            })
            .collect()
    }

    /// Visible text of an HTML fragment.
    fn text(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, "");
        decode_entities(stripped.trim())
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract listings from schedule HTML.
///
/// # Errors
///
/// Returns [`ScheduleError::Pattern`] if the extraction patterns do not
/// compile.
pub fn parse_schedule(html: &str) -> Result<Vec<RawListing>, ScheduleError> {
    Ok(ScheduleParser::new()?.parse(html))
}

fn is_placeholder(link: &str) -> bool {
    let link = link.trim();
    link.is_empty() || link == "#"
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&laquo;", "«")
        .replace("&raquo;", "»")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// The schedule page, fetched through the cache.
#[derive(Debug)]
pub struct ScheduleSource<'a, C> {
    fetcher: &'a CachingFetcher<C>,
    url: Url,
    parser: ScheduleParser,
}

impl<'a, C: HttpClient> ScheduleSource<'a, C> {
    /// Schedule source for the page at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Pattern`] if the parser cannot be built.
    pub fn new(fetcher: &'a CachingFetcher<C>, url: Url) -> Result<Self, ScheduleError> {
        Ok(Self {
            fetcher,
            url,
            parser: ScheduleParser::new()?,
        })
    }

    /// Fetch and parse the schedule.
    ///
    /// # Errors
    ///
    /// A schedule that cannot be fetched is an error: without it there is
    /// nothing to rank.
    pub fn listings(&self, store: &mut CacheStore) -> Result<Vec<RawListing>, ScheduleError> {
        let request = FetchRequest::get(self.url.clone());

        match self.fetcher.fetch(store, &request)? {
            FetchOutcome::Data(value) => match value.as_text() {
                Some(html) => Ok(self.parser.parse(html)),
                None => Err(ScheduleError::NotHtml {
                    url: self.url.to_string(),
                }),
            },
            FetchOutcome::NoData(reason) => Err(ScheduleError::Unavailable {
                url: self.url.to_string(),
                reason,
            }),
        }
    }
}
