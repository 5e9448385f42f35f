//! キャッシュ機能テスト
//!
//! 生成結果キャッシュの動作を検証

use romance_copy::generator::{cache_key, CacheFile};
use tempfile::tempdir;

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    let key = cache_key("gpt-4.1", "system", "prompt");
    cache.insert(key.clone(), "gpt-4.1", r#"{"product_description": "A tote."}"#.to_string());
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get(&key), Some(r#"{"product_description": "A tote."}"#));
    assert!(loaded.get("nonexistent_hash").is_none());
}

/// キャッシュの上書き
#[test]
fn test_cache_overwrite() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut cache = CacheFile::load(dir.path());

    cache.insert("same".to_string(), "gpt-4.1", "first".to_string());
    cache.insert("same".to_string(), "gpt-4.1", "second".to_string());

    assert_eq!(cache.get("same"), Some("second"));
    assert_eq!(cache.len(), 1);
}

/// キャッシュファイルが破損している場合
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{ invalid json }").unwrap();

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// バージョンが異なるキャッシュは破棄
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(
        CacheFile::cache_path(dir.path()),
        r#"{"version": 99, "entries": {"k": {"model": "m", "created_at": "", "response": "r"}}}"#,
    )
    .unwrap();

    assert!(CacheFile::load(dir.path()).is_empty());
}

/// キャッシュ削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");

    assert!(!CacheFile::clear(dir.path()).unwrap());

    let mut cache = CacheFile::load(dir.path());
    cache.insert("k".to_string(), "m", "r".to_string());
    cache.save(dir.path()).unwrap();
    assert!(CacheFile::cache_path(dir.path()).exists());

    assert!(CacheFile::clear(dir.path()).unwrap());
    assert!(!CacheFile::cache_path(dir.path()).exists());
}
