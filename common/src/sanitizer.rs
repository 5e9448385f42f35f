//! 禁止語（ブラックリスト）処理モジュール
//!
//! ブランドごとの禁止語を単語境界・大文字小文字無視で扱う。
//!
//! パターンは2種類ある:
//! - エスケープあり `\b(?:p1|p2|...)\b`: 商品属性の除去と生成結果の検査
//! - エスケープなし `\b(p1|p2|...)\b`: 過去の商品説明（段落）の除去
//!
//! エスケープなしでは `s.a.l.e.` の `.` などがメタ文字として解釈される。

use regex::{Regex, RegexBuilder};
use std::collections::{BTreeSet, HashSet};

/// コンパイル済みの禁止語パターン
#[derive(Debug, Clone)]
pub struct Blacklist {
    phrases: Vec<String>,
    escaped: Option<Regex>,
    raw: Option<Regex>,
}

lazy_static::lazy_static! {
    static ref MULTI_SPACE_RE: Regex = Regex::new(r"\s{2,}").unwrap();
}

fn compile(alternation: &str, capture: bool) -> Result<Regex, regex::Error> {
    let pattern = if capture {
        format!(r"\b({})\b", alternation)
    } else {
        format!(r"\b(?:{})\b", alternation)
    };
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .size_limit(1 << 24)
        .build()
}

impl Blacklist {
    /// 禁止語リストからパターンを構築
    ///
    /// 空の語は無視する。エスケープなしのパターンが不正な正規表現になる場合は
    /// エスケープありのパターンで代用する。
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        if phrases.is_empty() {
            return Self {
                phrases,
                escaped: None,
                raw: None,
            };
        }

        let escaped_alt = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let escaped = compile(&escaped_alt, false).ok();

        let raw = match compile(&phrases.join("|"), true) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!(error = %e, "raw blacklist pattern is not a valid regex, falling back to escaped phrases");
                escaped.clone()
            }
        };

        Self {
            phrases,
            escaped,
            raw,
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// 商品属性から禁止語を除去（エスケープあり）
    ///
    /// 除去後に2文字以上の空白を1つにまとめ、前後を削る。
    /// 結果が変わらなくなるまで繰り返す。
    pub fn strip(&self, text: &str) -> String {
        let Some(re) = &self.escaped else {
            return collapse_runs(text);
        };
        let mut current = text.to_string();
        loop {
            let next = collapse_runs(&re.replace_all(&current, ""));
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// 段落から禁止語を除去（エスケープなし）
    ///
    /// 除去後に空白を単一スペースへ正規化する。結果が変わらなくなるまで繰り返す。
    pub fn strip_raw(&self, text: &str) -> String {
        let Some(re) = &self.raw else {
            return normalize_whitespace(text);
        };
        let mut current = text.to_string();
        loop {
            let next = normalize_whitespace(&re.replace_all(&current, ""));
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// 段落の禁止語除去と重複排除（大文字小文字無視、初出順）
    pub fn dedup_and_clean<I, S>(&self, paragraphs: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut cleaned = Vec::new();

        for paragraph in paragraphs {
            let paragraph = paragraph.as_ref();
            if paragraph.trim().is_empty() {
                continue;
            }
            let text = self.strip_raw(paragraph);
            if seen.insert(text.to_lowercase()) {
                cleaned.push(text);
            }
        }

        cleaned
    }

    /// 生成テキスト中の禁止語（小文字化、重複なし）
    pub fn find_violations(&self, text: &str) -> BTreeSet<String> {
        match &self.escaped {
            Some(re) if !text.is_empty() => re
                .find_iter(text)
                .map(|m| m.as_str().to_lowercase())
                .collect(),
            _ => BTreeSet::new(),
        }
    }
}

/// `\s{2,}` を1つのスペースにまとめて前後を削る
fn collapse_runs(text: &str) -> String {
    MULTI_SPACE_RE.replace_all(text, " ").trim().to_string()
}

/// 空白で分割して単一スペースで連結
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 商品属性から禁止語を除去（エスケープあり）
pub fn strip_blacklist<S: AsRef<str>>(text: &str, blacklist: &[S]) -> String {
    Blacklist::new(blacklist).strip(text)
}

/// 段落から禁止語を除去（エスケープなし）
pub fn strip_blacklist_raw<S: AsRef<str>>(text: &str, blacklist: &[S]) -> String {
    Blacklist::new(blacklist).strip_raw(text)
}

/// 段落の禁止語除去と重複排除
pub fn dedup_and_clean<P: AsRef<str>, S: AsRef<str>>(paragraphs: &[P], blacklist: &[S]) -> Vec<String> {
    Blacklist::new(blacklist).dedup_and_clean(paragraphs)
}

/// 生成テキスト中の禁止語
pub fn find_violations<S: AsRef<str>>(text: &str, blacklist: &[S]) -> BTreeSet<String> {
    Blacklist::new(blacklist).find_violations(text)
}
