//! 生成結果キャッシュモジュール
//!
//! (モデル, システムプロンプト, ユーザープロンプト) の SHA-256 をキーにして
//! 生成サービスの応答をキャッシュし、同じプロンプトの再生成をスキップする。

use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".generation-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// プロンプトハッシュ → 応答
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub model: String,
    /// 保存日時（RFC 3339）
    pub created_at: String,
    /// 生成サービスの生の応答
    pub response: String,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), error = %e, "cache file could not be opened");
                return Self::default();
            }
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, CacheFile>(reader) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                eprintln!("キャッシュバージョン不一致、再生成します");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %cache_path.display(), error = %e, "cache file is corrupt, starting empty");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(folder))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ false）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    /// キャッシュをルックアップ
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.response.as_str())
    }

    /// キャッシュに追加
    pub fn insert(&mut self, key: String, model: &str, response: String) {
        self.entries.insert(
            key,
            CacheEntry {
                model: model.to_string(),
                created_at: chrono::Local::now().to_rfc3339(),
                response,
            },
        );
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// キャッシュキー（SHA-256 の16進表現）
pub fn cache_key(model: &str, system: &str, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [model, system, prompt] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_stable_and_distinct() {
        let a = cache_key("gpt-4.1", "sys", "prompt");
        assert_eq!(a, cache_key("gpt-4.1", "sys", "prompt"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, cache_key("gpt-4.1", "sysp", "rompt"));
        assert_ne!(a, cache_key("gpt-4o", "sys", "prompt"));
    }
}
