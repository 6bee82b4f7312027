use std::fs;
use std::path::Path;

use gitpulse_cache::{CacheConfig, JsonFileCache};
use gitpulse_core::{
    AnalysisCache, CacheEntry, CommitRecord, RepositoryAnalysis, RepositoryDescriptor,
};
use tempfile::TempDir;

fn entry(path: &str, head: &str) -> CacheEntry {
    let mut repo = RepositoryDescriptor::at(path);
    repo.head_revision = head.to_string();
    let mut analysis = RepositoryAnalysis::empty(repo);
    analysis.commits = vec![CommitRecord::new(head, "Alice", "2024-01-05", "Fix | bug")];
    CacheEntry::new(analysis)
}

#[test]
fn test_set_then_get() {
    let temp = TempDir::new().unwrap();
    let cache = JsonFileCache::new(temp.path().join("nested/cache"));
    let repo = Path::new("/src/app");

    assert!(cache.get(repo).is_none());
    cache.set(repo, &entry("/src/app", "abc"));

    let loaded = cache.get(repo).unwrap();
    assert_eq!(loaded, entry_with_time(&loaded, "/src/app", "abc"));
    assert!(cache.is_valid(repo, "abc"));
    assert!(!cache.is_valid(repo, "def"));
    assert!(!cache.is_valid(Path::new("/src/other"), "abc"));
}

/// The expected entry, stamped with the loaded entry's timestamps.
fn entry_with_time(loaded: &CacheEntry, path: &str, head: &str) -> CacheEntry {
    let mut expected = entry(path, head);
    expected.last_updated = loaded.last_updated;
    expected.analysis.last_updated = loaded.analysis.last_updated;
    expected
}

#[test]
fn test_entry_file_is_readable_json() {
    let temp = TempDir::new().unwrap();
    let cache = JsonFileCache::new(temp.path());
    cache.set(Path::new("/src/app"), &entry("/src/app", "abc"));

    let content = fs::read_to_string(cache.entry_path(Path::new("/src/app"))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["repo_path"], "/src/app");
    assert_eq!(value["last_revision"], "abc");
    assert_eq!(value["analysis"]["commits"][0]["message"], "Fix | bug");
    assert!(content.contains('\n'));
}

#[test]
fn test_corrupt_entry_is_a_miss() {
    let temp = TempDir::new().unwrap();
    let cache = JsonFileCache::new(temp.path());
    let repo = Path::new("/src/app");
    fs::write(cache.entry_path(repo), "{ not json").unwrap();

    assert!(cache.get(repo).is_none());
    assert!(!cache.is_valid(repo, "abc"));
}

#[test]
fn test_clear_one() {
    let temp = TempDir::new().unwrap();
    let cache = JsonFileCache::new(temp.path());
    cache.set(Path::new("/src/a"), &entry("/src/a", "1"));
    cache.set(Path::new("/src/b"), &entry("/src/b", "2"));

    cache.clear(Some(Path::new("/src/a")));
    assert!(cache.get(Path::new("/src/a")).is_none());
    assert!(cache.get(Path::new("/src/b")).is_some());

    // Clearing a missing entry is a no-op
    cache.clear(Some(Path::new("/src/a")));
}

#[test]
fn test_clear_all_only_removes_entries() {
    let temp = TempDir::new().unwrap();
    let cache = JsonFileCache::new(temp.path());
    cache.set(Path::new("/src/a"), &entry("/src/a", "1"));
    cache.set(Path::new("/src/b"), &entry("/src/b", "2"));
    fs::write(temp.path().join("README.txt"), "keep me").unwrap();

    cache.clear(None);

    assert!(cache.get(Path::new("/src/a")).is_none());
    assert!(cache.get(Path::new("/src/b")).is_none());
    assert!(temp.path().join("README.txt").exists());
}

#[test]
fn test_clear_all_without_directory() {
    let temp = TempDir::new().unwrap();
    let cache = JsonFileCache::new(temp.path().join("never-created"));
    cache.clear(None);
    assert!(!cache.dir().exists());
}

#[test]
fn test_unwritable_location_is_ignored() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("file");
    fs::write(&blocker, "").unwrap();

    // The cache directory would have to live inside a regular file
    let cache = JsonFileCache::new(blocker.join("cache"));
    cache.set(Path::new("/src/a"), &entry("/src/a", "1"));
    assert!(cache.get(Path::new("/src/a")).is_none());
}

#[test]
fn test_config_defaults_and_override() {
    let config: CacheConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.dir, JsonFileCache::default_dir());

    let config: CacheConfig = serde_json::from_str(r#"{"dir":"/var/cache/gp"}"#).unwrap();
    assert_eq!(JsonFileCache::with_config(&config).dir(), Path::new("/var/cache/gp"));
}
