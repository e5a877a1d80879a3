//! Tests for storage module

use super::*;
use crate::config::AwsCredentials;
use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::ObjectStore;
use std::sync::Arc;
use test_case::test_case;

// ============================================================================
// Glob Tests
// ============================================================================

#[test_case("song_data/*/*/*/*.json", "song_data/A/B/C/TRABCEI128F424C983.json", true ; "song file")]
#[test_case("song_data/*/*/*/*.json", "song_data/A/B/TRABCEI128F424C983.json", false ; "too shallow")]
#[test_case("song_data/*/*/*/*.json", "song_data/A/B/C/D/x.json", false ; "too deep")]
#[test_case("log_data/*/*/*.json", "log_data/2018/11/2018-11-01-events.json", true ; "log file")]
#[test_case("log_data/*/*/*.json", "log_data/2018/11/2018-11-01-events.csv", false ; "wrong extension")]
#[test_case("log_data/**/*.json", "log_data/a.json", true ; "double star zero dirs")]
#[test_case("log_data/**/*.json", "log_data/x/y/z/a.json", true ; "double star many dirs")]
#[test_case("data/file?.json", "data/file1.json", true ; "question mark")]
#[test_case("data/file?.json", "data/file12.json", false ; "question mark single char")]
#[test_case("data/[ab]*.json", "data/b1.json", true ; "char class")]
#[test_case("data/[!ab]*.json", "data/b1.json", false ; "negated char class")]
#[test_case("data/a+b.json", "data/a+b.json", true ; "regex metachar is literal")]
fn test_glob_match(pattern: &str, path: &str, expected: bool) {
    let glob = GlobPattern::new(pattern).unwrap();
    assert_eq!(glob.is_match(path), expected);
}

#[test_case("song_data/*/*/*/*.json", "song_data" ; "song prefix")]
#[test_case("a/b/*.json", "a/b" ; "two literal dirs")]
#[test_case("*.json", "" ; "no literal dir")]
#[test_case("a/b/c.json", "a/b" ; "literal file")]
fn test_glob_prefix(pattern: &str, prefix: &str) {
    assert_eq!(GlobPattern::new(pattern).unwrap().prefix(), prefix);
}

#[test]
fn test_glob_invalid() {
    assert!(GlobPattern::new("data/[abc").is_err());
    assert!(GlobPattern::new("").is_err());
    assert!(GlobPattern::new("/").is_err());
}

#[test]
fn test_glob_trims_slashes() {
    let glob = GlobPattern::new("/log_data/*.json").unwrap();
    assert_eq!(glob.as_str(), "log_data/*.json");
    assert!(glob.is_match("/log_data/x.json"));
}

// ============================================================================
// Storage Tests
// ============================================================================

#[tokio::test]
async fn test_memory_put_get_list() {
    let storage = Storage::in_memory();
    storage
        .put("song_data/A/B/C/x.json", Bytes::from_static(b"{}"))
        .await
        .unwrap();
    storage
        .put("song_data/A/B/C/y.json", Bytes::from_static(b"{}"))
        .await
        .unwrap();
    storage
        .put("log_data/2018/11/e.json", Bytes::from_static(b"{}"))
        .await
        .unwrap();

    let all = storage.list("").await.unwrap();
    assert_eq!(all.len(), 3);

    let songs = storage.list("song_data").await.unwrap();
    assert_eq!(
        songs,
        vec!["song_data/A/B/C/x.json", "song_data/A/B/C/y.json"]
    );

    let data = storage.get("log_data/2018/11/e.json").await.unwrap();
    assert_eq!(data.as_ref(), b"{}");
}

#[tokio::test]
async fn test_glob_listing() {
    let storage = Storage::in_memory();
    for path in [
        "song_data/A/B/C/x.json",
        "song_data/A/B/y.json",
        "song_data/A/B/C/notes.txt",
    ] {
        storage.put(path, Bytes::new()).await.unwrap();
    }

    let glob = GlobPattern::new("song_data/*/*/*/*.json").unwrap();
    let matched = storage.glob(&glob).await.unwrap();
    assert_eq!(matched, vec!["song_data/A/B/C/x.json"]);
}

#[tokio::test]
async fn test_store_prefix() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let root = Storage::from_store(Arc::clone(&store), "");
    let analytics = Storage::from_store(store, "analytics");
    analytics
        .put("songs/part-00000.parquet", Bytes::from_static(b"x"))
        .await
        .unwrap();
    root.put("analytics_old/file", Bytes::from_static(b"y"))
        .await
        .unwrap();

    assert_eq!(
        root.list("analytics").await.unwrap(),
        vec!["analytics/songs/part-00000.parquet"]
    );
    assert_eq!(
        analytics.list("").await.unwrap(),
        vec!["songs/part-00000.parquet"]
    );
}

#[tokio::test]
async fn test_exists_and_delete_dir() {
    let storage = Storage::in_memory();
    storage.put("t/a", Bytes::new()).await.unwrap();
    storage.put("t/b/c", Bytes::new()).await.unwrap();
    storage.put("u/a", Bytes::new()).await.unwrap();

    assert!(storage.exists("t/a").await.unwrap());
    assert!(!storage.exists("t/zzz").await.unwrap());

    let deleted = storage.delete_dir("t", 4).await.unwrap();
    assert_eq!(deleted, 2);
    assert!(storage.list("t").await.unwrap().is_empty());
    assert_eq!(storage.list("u").await.unwrap(), vec!["u/a"]);
}

#[test]
fn test_open_local_missing_dir() {
    let err = Storage::open("/definitely/not/a/dir", &AwsCredentials::default()).unwrap_err();
    assert!(matches!(err, crate::Error::Config { .. }));
}

#[test]
fn test_create_local_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out");
    let storage = Storage::create(path.to_str().unwrap(), &AwsCredentials::default()).unwrap();
    assert_eq!(storage.scheme(), "file");
    assert!(path.is_dir());
}

#[tokio::test]
async fn test_local_roundtrip() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = format!("file://{}", temp_dir.path().display());
    let storage = Storage::open(&url, &AwsCredentials::default()).unwrap();

    storage
        .put("log_data/2018/11/e.json", Bytes::from_static(b"{\"a\":1}"))
        .await
        .unwrap();
    let glob = GlobPattern::new("log_data/*/*/*.json").unwrap();
    assert_eq!(
        storage.glob(&glob).await.unwrap(),
        vec!["log_data/2018/11/e.json"]
    );
}

#[test]
fn test_url_formatting() {
    let storage = Storage::from_store(Arc::new(InMemory::new()), "/analytics/");
    assert_eq!(storage.url("songs"), "memory://analytics/songs");
    assert_eq!(storage.url(""), "memory://analytics");
}

#[test]
fn test_empty_url_rejected() {
    assert!(Storage::open("", &AwsCredentials::default()).is_err());
}

#[test]
fn test_s3_missing_bucket() {
    let err = Storage::open("s3:///path", &AwsCredentials::default()).unwrap_err();
    assert!(err.to_string().contains("Missing bucket"));
}
