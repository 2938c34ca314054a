//! Cache store behaviour across handles sharing one directory.

use cinerank::cache::{CacheStore, CacheValue, Clock};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

#[derive(Clone)]
struct TestClock(Arc<AtomicU64>);

impl TestClock {
    fn at(now: u64) -> Self {
        Self(Arc::new(AtomicU64::new(now)))
    }

    fn advance(&self, secs: u64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn store_at(root: &std::path::Path, clock: &TestClock) -> CacheStore {
    CacheStore::with_clock(root, "cinemas", Box::new(clock.clone())).unwrap()
}

#[test]
fn test_entries_survive_restart() {
    let dir = tempdir().unwrap();
    let clock = TestClock::at(1_000);

    {
        let mut store = store_at(dir.path(), &clock);
        store
            .put("popular_movies", CacheValue::Structured(json!([1, 2, 3])), 604_800)
            .unwrap();
        store
            .put("request-page", CacheValue::Raw("<html></html>".into()), 86_400)
            .unwrap();
    }

    let mut store = store_at(dir.path(), &clock);
    assert_eq!(
        store.get("popular_movies").unwrap(),
        Some(CacheValue::Structured(json!([1, 2, 3])))
    );
    assert_eq!(
        store.get("request-page").unwrap(),
        Some(CacheValue::Raw("<html></html>".into()))
    );
}

#[test]
fn test_expiry_is_lazy_and_per_entry() {
    let dir = tempdir().unwrap();
    let clock = TestClock::at(1_000);
    let mut store = store_at(dir.path(), &clock);

    store.put("short", CacheValue::Raw("a".into()), 10).unwrap();
    store.put("long", CacheValue::Raw("b".into()), 100).unwrap();
    let short_path = store.entry_path("short");

    clock.advance(10);
    // Expired but untouched: still on disk until read.
    assert!(short_path.exists());

    assert_eq!(store.get("short").unwrap(), None);
    assert!(!short_path.exists());
    assert_eq!(store.get("long").unwrap(), Some(CacheValue::Raw("b".into())));
}

#[test]
fn test_expired_on_reopen() {
    let dir = tempdir().unwrap();
    let clock = TestClock::at(1_000);

    store_at(dir.path(), &clock)
        .put("k", CacheValue::Raw("v".into()), 5)
        .unwrap();

    clock.advance(6);
    let mut store = store_at(dir.path(), &clock);
    assert_eq!(store.get("k").unwrap(), None);
    assert!(!store.entry_path("k").exists());
}

#[test]
fn test_namespaces_are_separate() {
    let dir = tempdir().unwrap();
    let mut cinemas = CacheStore::open(dir.path(), "cinemas").unwrap();
    let mut other = CacheStore::open(dir.path(), "other").unwrap();

    cinemas.put("k", CacheValue::Raw("v".into()), 60).unwrap();
    assert_eq!(other.get("k").unwrap(), None);

    other.remove_all().unwrap();
    assert_eq!(cinemas.get("k").unwrap(), Some(CacheValue::Raw("v".into())));
}

#[test]
fn test_remove_all_clears_disk() {
    let dir = tempdir().unwrap();
    let mut store = CacheStore::open(dir.path(), "cinemas").unwrap();
    store.put("a", CacheValue::Raw("1".into()), 60).unwrap();
    store.put("b", CacheValue::Raw("2".into()), 60).unwrap();

    store.remove_all().unwrap();
    assert!(store.dir().exists());

    let mut reopened = CacheStore::open(dir.path(), "cinemas").unwrap();
    assert_eq!(reopened.get("a").unwrap(), None);
    assert_eq!(reopened.get("b").unwrap(), None);

    reopened.put("c", CacheValue::Raw("3".into()), 60).unwrap();
    assert_eq!(reopened.get("c").unwrap(), Some(CacheValue::Raw("3".into())));
}

#[test]
fn test_second_handle_sees_writes_after_open() {
    let dir = tempdir().unwrap();
    let mut first = CacheStore::open(dir.path(), "cinemas").unwrap();
    let mut second = CacheStore::open(dir.path(), "cinemas").unwrap();

    first.put("k", CacheValue::Raw("v".into()), 60).unwrap();
    assert_eq!(second.get("k").unwrap(), Some(CacheValue::Raw("v".into())));
}
