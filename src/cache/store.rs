//! File-backed cache store with an in-memory index.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::entry::{CacheEntry, CacheValue};

/// Extension of entry files inside a namespace directory.
const ENTRY_EXTENSION: &str = "mpk";

/// Errors raised by the cache store.
///
/// "Not found" while deleting a stale file is never reported; everything else
/// the filesystem refuses is.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The namespace directory could not be created.
    #[error("Failed to create cache directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// Reading, writing or deleting an entry file failed.
    #[error("Cache I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },

    /// An entry file exists but cannot be decoded.
    #[error("Corrupted cache entry {path}: {source}. Run with --clean-cache to reset the cache")]
    Corrupt {
        /// Path of the unreadable entry
        path: PathBuf,
        /// The decoding error
        #[source]
        source: rmp_serde::decode::Error,
    },

    /// An entry could not be encoded for disk.
    #[error("Failed to encode cache entry '{key}': {source}")]
    Encode {
        /// Key of the entry
        key: String,
        /// The encoding error
        #[source]
        source: rmp_serde::encode::Error,
    },

    /// A typed value could not be converted to a structured payload.
    #[error("Failed to serialize value for cache key '{key}': {source}")]
    Serialize {
        /// Key of the entry
        key: String,
        /// The serialization error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Source of the current time, in whole seconds since the Unix epoch.
pub trait Clock {
    /// Current time.
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Persistent key/value cache with per-entry expiry.
///
/// Reads consult the in-memory index first and fall back to the entry file.
/// Writes go to memory and are then written through to disk before
/// [`put`](Self::put) returns.
///
/// # Example
///
/// ```no_run
/// use cinerank::cache::{CacheStore, CacheValue};
/// use std::path::Path;
///
/// let mut store = CacheStore::open(Path::new("/tmp/cacher"), "cinemas")?;
/// store.put("greeting", CacheValue::Raw("hello".into()), 60)?;
/// assert_eq!(store.get("greeting")?, Some(CacheValue::Raw("hello".into())));
/// # Ok::<(), cinerank::cache::CacheError>(())
/// ```
pub struct CacheStore {
    dir: PathBuf,
    objects: HashMap<String, CacheEntry>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("dir", &self.dir)
            .field("entries_in_memory", &self.objects.len())
            .finish()
    }
}

impl CacheStore {
    /// Open (creating if needed) the cache namespace `namespace` under `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::CreateDir`] if the directory cannot be created.
    /// A directory that already exists is fine.
    pub fn open(root: &Path, namespace: &str) -> CacheResult<Self> {
        Self::with_clock(root, namespace, Box::new(SystemClock))
    }

    /// Open a namespace with a custom time source.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn with_clock(root: &Path, namespace: &str, clock: Box<dyn Clock>) -> CacheResult<Self> {
        let dir = root.join(namespace);
        ensure_dir(&dir)?;
        log::debug!("Cache namespace opened at {}", dir.display());

        Ok(Self {
            dir,
            objects: HashMap::new(),
            clock,
        })
    }

    /// Directory holding this namespace's entry files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file that holds `key`.
    ///
    /// The file name is the SHA-256 of the key, so arbitrary keys map to
    /// stable, filesystem-safe names.
    #[must_use]
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{digest:x}.{ENTRY_EXTENSION}"))
    }

    /// Look up `key`.
    ///
    /// Returns `Ok(None)` when the key is unknown or its entry has expired. An
    /// expired entry is deleted from memory and disk as part of the lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry file exists but cannot be read or
    /// decoded, or if deleting a stale entry fails for a reason other than
    /// the file already being gone.
    pub fn get(&mut self, key: &str) -> CacheResult<Option<CacheValue>> {
        let path = self.entry_path(key);

        if !self.objects.contains_key(key) {
            match read_entry(&path)? {
                Some(mut entry) => {
                    entry.key = key.to_string();
                    self.objects.insert(key.to_string(), entry);
                }
                None => {
                    log::trace!("Cache miss: {key}");
                    return Ok(None);
                }
            }
        }

        let now = self.clock.now();
        let expired = self
            .objects
            .get(key)
            .is_some_and(|entry| entry.is_expired(now));

        if expired {
            log::debug!("Cache entry expired: {key}");
            self.objects.remove(key);
            remove_file_if_exists(&path)?;
            return Ok(None);
        }

        log::trace!("Cache hit: {key}");
        Ok(self.objects.get(key).map(|entry| entry.data.clone()))
    }

    /// Look up `key` and deserialize a structured payload into `T`.
    ///
    /// A payload that is raw text or does not have the shape of `T` is
    /// reported as absent.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> CacheResult<Option<T>> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };

        match value {
            CacheValue::Structured(json) => match serde_json::from_value(json) {
                Ok(typed) => Ok(Some(typed)),
                Err(e) => {
                    log::warn!("Ignoring cached value for '{key}' with unexpected shape: {e}");
                    Ok(None)
                }
            },
            CacheValue::Raw(_) => {
                log::warn!("Ignoring raw text cached under '{key}'");
                Ok(None)
            }
        }
    }

    /// Store `value` under `key` for `ttl_secs` seconds and return it.
    ///
    /// The entry is on disk (written and synced) when this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be encoded or persisted. The
    /// in-memory copy is dropped in that case so both layers stay in step.
    pub fn put(&mut self, key: &str, value: CacheValue, ttl_secs: u64) -> CacheResult<CacheValue> {
        let stored = value.clone();
        let entry = CacheEntry::new(key, value, self.clock.now(), ttl_secs);
        let path = self.entry_path(key);
        self.objects.insert(key.to_string(), entry);

        let written = self
            .objects
            .get(key)
            .map_or(Ok(()), |entry| write_entry(&path, entry));
        if let Err(e) = written {
            self.objects.remove(key);
            return Err(e);
        }

        log::debug!("Cached '{key}' for {ttl_secs}s");
        Ok(stored)
    }

    /// Serialize `value` into a structured payload and store it.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Serialize`] if `value` has no JSON form, or any
    /// error from [`put`](Self::put).
    pub fn put_as<T: Serialize>(&mut self, key: &str, value: &T, ttl_secs: u64) -> CacheResult<()> {
        let json = serde_json::to_value(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.put(key, CacheValue::Structured(json), ttl_secs)?;
        Ok(())
    }

    /// Delete `key` from both layers. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry file exists but cannot be deleted.
    pub fn remove(&mut self, key: &str) -> CacheResult<()> {
        self.objects.remove(key);
        remove_file_if_exists(&self.entry_path(key))
    }

    /// Delete every entry in this namespace.
    ///
    /// Afterwards the store is empty and usable, exactly as if it had just
    /// been opened on a fresh directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be deleted or recreated.
    pub fn remove_all(&mut self) -> CacheResult<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        }

        ensure_dir(&self.dir)?;
        self.objects.clear();
        log::info!("Cache cleared: {}", self.dir.display());
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> CacheResult<()> {
    fs::create_dir_all(dir).map_err(|source| CacheError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn read_entry(path: &Path) -> CacheResult<Option<CacheEntry>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    rmp_serde::from_slice(&bytes)
        .map(Some)
        .map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Write an entry to a sibling temp file, sync it, then rename it into place
/// so a reader never sees a half-written entry.
fn write_entry(path: &Path, entry: &CacheEntry) -> CacheResult<()> {
    let bytes = rmp_serde::to_vec_named(entry).map_err(|source| CacheError::Encode {
        key: entry.key.clone(),
        source,
    })?;

    let tmp_path = path.with_extension("tmp");
    let io_err = |source: io::Error| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    {
        let mut file = File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }

    fs::rename(&tmp_path, path).map_err(io_err)
}

fn remove_file_if_exists(path: &Path) -> CacheResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
