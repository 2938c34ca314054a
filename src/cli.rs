//! Command-line interface definitions for cinerank.
//!
//! # Example
//!
//! ```bash
//! # Top 10 movies by rating
//! cinerank
//!
//! # Top 5 among movies shown in more cinemas than average, votes counted in
//! cinerank -n 5 --most-cinemas --votes
//!
//! # Everything, as JSON, after dropping cached data
//! cinerank -n 0 --output json --clean-cache
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::rank::RankOptions;

/// Movies on in cinemas right now, ranked by their external rating.
///
/// Schedule and rating data are cached on disk; the first run downloads
/// everything and may take a while.
#[derive(Debug, Parser)]
#[command(name = "cinerank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of results (0 for all)
    #[arg(short = 'n', long, value_name = "N", default_value = "10")]
    pub number: usize,

    /// Show only movies that are on in more cinemas than average
    #[arg(short = 'm', long)]
    pub most_cinemas: bool,

    /// Take the number of votes into account
    #[arg(long)]
    pub votes: bool,

    /// Remove cached data; everything is downloaded again
    #[arg(long)]
    pub clean_cache: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cache root directory (overrides the configuration)
    #[arg(long, value_name = "PATH", env = "CINERANK_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Ranking options selected on the command line.
    #[must_use]
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            limit: self.number,
            filter_by_popularity: self.most_cinemas,
            weight_by_votes: self.votes,
        }
    }
}

/// Output format for ranked results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width console table
    Table,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
