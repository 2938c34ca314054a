//! Configuration layering: defaults, TOML file, environment.

use cinerank::config::Config;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all CINERANK_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("CINERANK_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_missing_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.match_threshold, 3);
    assert_eq!(config.request_ttl_secs, 86_400);
    assert_eq!(config.listing_ttl_secs, 604_800);
    assert_eq!(config.namespace, "cinemas");
}

#[test]
fn test_toml_file_overrides_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
match_threshold = 2
listing_ttl_secs = 3600
cache_dir = "/var/cache/cinerank"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.match_threshold, 2);
    assert_eq!(config.listing_ttl_secs, 3600);
    assert_eq!(config.cache_root(), std::path::PathBuf::from("/var/cache/cinerank"));
    assert_eq!(config.request_ttl_secs, 86_400);
}

#[test]
fn test_env_overrides_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "match_threshold = 2\nnamespace = \"from-file\"\n").unwrap();

    std::env::set_var("CINERANK_MATCH_THRESHOLD", "5");
    let config = Config::load(Some(&path));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.match_threshold, 5);
    assert_eq!(config.namespace, "from-file");
}

#[test]
fn test_wrong_type_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "match_threshold = \"three\"\n").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}
