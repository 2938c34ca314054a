//! Cache entry definitions.

use serde::{Deserialize, Serialize};

/// A value stored in the cache.
///
/// Upstream responses are decoded as JSON when possible and kept verbatim
/// otherwise; both forms are valid cache payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheValue {
    /// A decoded JSON document.
    Structured(serde_json::Value),
    /// A body that did not decode as JSON.
    Raw(String),
}

impl CacheValue {
    /// Classify a response body: JSON when it parses, raw text otherwise.
    #[must_use]
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Raw(body),
        }
    }

    /// The decoded document, if this value is structured.
    #[must_use]
    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    /// The raw text. Structured values that are plain JSON strings count too.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Raw(text) => Some(text),
            Self::Structured(value) => value.as_str(),
        }
    }
}

/// A single cached value with its absolute expiry time.
///
/// Only `data` and `expires` are written to disk; the key is implied by the
/// file the entry lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key the entry is stored under.
    #[serde(skip)]
    pub key: String,
    /// The cached payload.
    pub data: CacheValue,
    /// Expiry time in seconds since the Unix epoch.
    pub expires: u64,
}

impl CacheEntry {
    /// Create an entry that expires `ttl_secs` after `now`.
    #[must_use]
    pub fn new(key: impl Into<String>, data: CacheValue, now: u64, ttl_secs: u64) -> Self {
        Self {
            key: key.into(),
            data,
            expires: now.saturating_add(ttl_secs),
        }
    }

    /// An entry is stale once the clock reaches its expiry time.
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires <= now
    }
}
