use cinerank::cache::{CacheError, CacheStore, CacheValue};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_garbage_entry_is_reported() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();

    // Write garbage where the entry would live
    fs::write(store.entry_path("popular_movies"), b"not messagepack at all").unwrap();

    let err = store.get("popular_movies").unwrap_err();
    assert!(matches!(err, CacheError::Corrupt { .. }));
    assert!(err.to_string().contains("--clean-cache"));
}

#[test]
fn test_truncated_entry_is_reported() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    store
        .put("k", CacheValue::Raw("some longer payload".into()), 60)
        .unwrap();

    let path = store.entry_path("k");
    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let mut reopened = CacheStore::open(dir.path(), "cinemas").unwrap();
    assert!(matches!(
        reopened.get("k"),
        Err(CacheError::Corrupt { .. })
    ));
}

#[test]
fn test_recovery_after_remove_all() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    fs::write(store.entry_path("k"), b"corrupted garbage").unwrap();
    assert!(store.get("k").is_err());

    store.remove_all().unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn test_remove_overwrites_corrupt_entry() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    fs::write(store.entry_path("k"), b"corrupted garbage").unwrap();

    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);

    store.put("k", CacheValue::Raw("fresh".into()), 60).unwrap();
    assert_eq!(store.get("k").unwrap(), Some(CacheValue::Raw("fresh".into())));
}

#[cfg(unix)]
#[test]
fn test_cache_root_is_a_file() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"").unwrap();

    let err = CacheStore::open(&blocker, "cinemas").unwrap_err();
    assert!(matches!(err, CacheError::CreateDir { .. }));
}
