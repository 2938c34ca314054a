//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file (`--config PATH`, or `config.toml` in the platform config
//!    directory when it exists)
//! 3. `CINERANK_*` environment variables (e.g. `CINERANK_MATCH_THRESHOLD=2`)
//! 4. Command-line flags, applied by the caller

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "CINERANK_";

/// Cache key of the reconciled listing set.
pub const LISTINGS_CACHE_KEY: &str = "popular_movies";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schedule page listing the movies currently on.
    pub schedule_url: String,
    /// Title search endpoint of the rating service.
    pub search_url: String,
    /// Referer/Origin sent with search requests.
    pub search_referer: String,
    /// User agent for all requests.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// How long network responses stay cached.
    pub request_ttl_secs: u64,
    /// How long the reconciled listing set stays cached.
    pub listing_ttl_secs: u64,
    /// Largest title edit distance still accepted as the same movie.
    pub match_threshold: usize,
    /// Root directory of the cache. Defaults to the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Subdirectory of the cache root used by this program.
    pub namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule_url: "http://www.afisha.ru/msk/schedule_cinema".to_string(),
            search_url: "https://suggest-kinopoisk.yandex.net/suggest-kinopoisk?srv=kinopoisk"
                .to_string(),
            search_referer: "https://plus.kinopoisk.ru/".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/54.0.2840.71 Safari/537.36"
                .to_string(),
            request_timeout_secs: 30,
            request_ttl_secs: 60 * 60 * 24,
            listing_ttl_secs: 60 * 60 * 24 * 7,
            match_threshold: crate::matcher::DEFAULT_MATCH_THRESHOLD,
            cache_dir: None,
            namespace: "cinemas".to_string(),
        }
    }
}

impl Config {
    /// Build the layered figment without extracting it.
    ///
    /// With `file` set, that file is merged (missing files are ignored by
    /// figment). Otherwise the platform config file is used if present.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        let file = file.map(Path::to_path_buf).or_else(default_config_file);
        if let Some(path) = file {
            log::debug!("Merging configuration file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a layer holds a value of the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(file).extract()
    }

    /// Cache root: the configured directory, else the platform cache
    /// directory, else `cacher` in the system temp directory.
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }

        match ProjectDirs::from("com", "cinerank", "cinerank") {
            Some(dirs) => dirs.cache_dir().to_path_buf(),
            None => std::env::temp_dir().join("cacher"),
        }
    }

    /// Origin header value derived from the referer.
    #[must_use]
    pub fn search_origin(&self) -> &str {
        self.search_referer.trim_end_matches('/')
    }
}

fn default_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("com", "cinerank", "cinerank")?;
    let path = dirs.config_dir().join("config.toml");
    path.exists().then_some(path)
}
