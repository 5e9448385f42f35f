//! 参照コーパスモジュール
//!
//! ブランドごとの参照シート（学習用・全カタログ）を保持し、
//! グループ値（小文字化）による行の検索を提供する。
//! プロセス開始時に一度だけ構築し、以降は読み取り専用で共有する。

use crate::types::{ReferenceRow, ReferenceSheet};
use std::collections::HashSet;

/// 参照コーパス
#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    /// シート（固定順）
    sheets: Vec<ReferenceSheet>,
    /// 既知のグループ値（小文字化・初出順）
    known_values: Vec<String>,
    /// known_values の所属判定用
    known_set: HashSet<String>,
}

/// 1シート分の検索結果
#[derive(Debug, Clone, PartialEq)]
pub struct SheetHit<'a> {
    pub sheet: &'a str,
    pub rows: Vec<&'a ReferenceRow>,
}

impl ReferenceCorpus {
    /// シートからコーパスを構築
    ///
    /// シートの順序がそのまま検索順になる。
    pub fn new(sheets: Vec<ReferenceSheet>) -> Self {
        let mut known_values = Vec::new();
        let mut known_set = HashSet::new();

        for sheet in &sheets {
            for row in &sheet.rows {
                let value = row.category_value.to_lowercase();
                if known_set.insert(value.clone()) {
                    known_values.push(value);
                }
            }
        }

        Self {
            sheets,
            known_values,
            known_set,
        }
    }

    /// 既知のグループ値（小文字化・初出順）
    pub fn known_values(&self) -> &[String] {
        &self.known_values
    }

    /// 小文字化済みの値が既知か
    pub fn contains(&self, normalized: &str) -> bool {
        self.known_set.contains(normalized)
    }

    pub fn is_empty(&self) -> bool {
        self.known_values.is_empty()
    }

    pub fn sheets(&self) -> &[ReferenceSheet] {
        &self.sheets
    }

    fn category_rows<'a>(sheet: &'a ReferenceSheet, normalized: &str) -> Vec<&'a ReferenceRow> {
        sheet
            .rows
            .iter()
            .filter(|row| row.category_value.to_lowercase() == normalized)
            .collect()
    }

    /// 1シート内で、グループ値が一致し説明を持つ行
    pub fn rows_in_sheet<'a>(&'a self, sheet: &'a ReferenceSheet, normalized: &str) -> Vec<&'a ReferenceRow> {
        let mut rows = Self::category_rows(sheet, normalized);
        rows.retain(|row| row.description.is_some());
        rows
    }

    /// 全シートを固定順に検索（完全一致用、説明のない行も含む）
    pub fn lookup(&self, normalized: &str) -> Vec<SheetHit<'_>> {
        self.sheets
            .iter()
            .filter_map(|sheet| {
                let rows = Self::category_rows(sheet, normalized);
                if rows.is_empty() {
                    None
                } else {
                    Some(SheetHit {
                        sheet: sheet.name.as_str(),
                        rows,
                    })
                }
            })
            .collect()
    }

    /// 固定順で最初に説明を持つ行が見つかったシート（類似度フェーズ用）
    pub fn first_hit(&self, normalized: &str) -> Option<SheetHit<'_>> {
        self.sheets.iter().find_map(|sheet| {
            let rows = self.rows_in_sheet(sheet, normalized);
            if rows.is_empty() {
                None
            } else {
                Some(SheetHit {
                    sheet: sheet.name.as_str(),
                    rows,
                })
            }
        })
    }

    /// 説明を持つ行の総数
    pub fn record_count(&self) -> usize {
        self.sheets
            .iter()
            .map(|s| s.rows.iter().filter(|r| r.description.is_some()).count())
            .sum()
    }
}
