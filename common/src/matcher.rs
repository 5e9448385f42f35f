//! 過去コピー照合モジュール
//!
//! 商品のグループ値から、参照コーパス中の過去の商品説明を選ぶ。
//!
//! ## 照合フロー
//! 1. 完全一致（小文字化）: 全シートの該当行をすべて集約
//! 2. 類似度が閾値以上: 最上位候補のみ、最初に行が見つかったシートで打ち切り
//! 3. 閾値未満: 上位10候補を順に、最初に行が見つかった (候補, シート) で打ち切り

use crate::corpus::{ReferenceCorpus, SheetHit};
use crate::similarity::similarity;
use serde::{Deserialize, Serialize};

/// 類似一致とみなす閾値（この値を含む）
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// 閾値未満のときに試す候補数
pub const FALLBACK_CANDIDATES: usize = 10;

/// 照合種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchType {
    Exact,
    SimilarAboveThreshold,
    SimilarBelowThreshold,
    #[default]
    None,
}

impl MatchType {
    /// 出力シートに書き込むラベル
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Exact => "Exact",
            MatchType::SimilarAboveThreshold => "Similar threshold greater than 70%",
            MatchType::SimilarBelowThreshold => "Less than 70%",
            MatchType::None => "",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::SimilarAboveThreshold => write!(f, "similar (>= 70%)"),
            MatchType::SimilarBelowThreshold => write!(f, "similar (< 70%)"),
            MatchType::None => write!(f, "none"),
        }
    }
}

/// 類似度候補
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub value: String,
    pub score: f64,
}

/// 照合結果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchResult {
    /// 過去の商品説明（重複なし）
    pub descriptions: Vec<String>,
    /// 一致した行のグループ値（元の表記）
    pub matched_category_values: Vec<String>,
    pub match_type: MatchType,
    /// 類似度フェーズで評価した上位候補（完全一致時は空）
    pub candidates: Vec<Candidate>,
}

impl MatchResult {
    fn absorb(&mut self, hit: SheetHit<'_>) {
        for row in hit.rows {
            if let Some(description) = &row.description {
                self.descriptions.push(description.clone());
            }
            self.matched_category_values.push(row.category_value.clone());
        }
    }

    fn dedup_descriptions(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.descriptions.retain(|d| seen.insert(d.clone()));
    }
}

/// 全候補の類似度（降順、同点は列挙順）
pub fn rank_candidates(normalized: &str, corpus: &ReferenceCorpus) -> Vec<Candidate> {
    let mut scores: Vec<Candidate> = corpus
        .known_values()
        .iter()
        .map(|value| Candidate {
            value: value.clone(),
            score: similarity(normalized, value),
        })
        .collect();

    // sort_by は安定ソート
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// グループ値から過去の商品説明を照合する
///
/// # Arguments
/// * `category_value` - 商品のグループ値（欠損はNone → 空文字列として照合）
/// * `corpus` - 参照コーパス
///
/// # Returns
/// 照合結果。失敗はなく、見つからない場合は説明が空になる。
pub fn find_match(category_value: Option<&str>, corpus: &ReferenceCorpus) -> MatchResult {
    let normalized = category_value.unwrap_or_default().to_lowercase();
    let mut result = MatchResult::default();

    // 完全一致
    if corpus.contains(&normalized) {
        tracing::debug!(value = %normalized, "exact match");
        result.match_type = MatchType::Exact;
        for hit in corpus.lookup(&normalized) {
            result.absorb(hit);
        }
        result.dedup_descriptions();
        return result;
    }

    let ranked = rank_candidates(&normalized, corpus);
    let Some(top) = ranked.first() else {
        tracing::debug!(value = %normalized, "reference corpus is empty");
        return result;
    };

    if top.score >= SIMILARITY_THRESHOLD {
        tracing::debug!(value = %normalized, candidate = %top.value, score = top.score, "similar match");
        result.match_type = MatchType::SimilarAboveThreshold;
        if let Some(hit) = corpus.first_hit(&top.value) {
            result.absorb(hit);
        }
        result.candidates = vec![top.clone()];
    } else {
        result.match_type = MatchType::SimilarBelowThreshold;
        let shortlist: Vec<Candidate> = ranked.into_iter().take(FALLBACK_CANDIDATES).collect();
        for candidate in &shortlist {
            tracing::debug!(value = %normalized, candidate = %candidate.value, score = candidate.score, "weak candidate");
        }
        if let Some(hit) = shortlist.iter().find_map(|c| corpus.first_hit(&c.value)) {
            result.absorb(hit);
        }
        result.candidates = shortlist;
    }

    result.dedup_descriptions();
    result
}
