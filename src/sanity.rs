//! 生成済みワークブックの事後チェック
//!
//! 全シートについて、指定列の文数判定と禁止語を `<列>_sentences` / `<列>_blacklisted`
//! 列として追加し、`<シート>_results` シートにまとめる。
//! 指定列のいずれかが空の行は対象外。

use crate::error::Result;
use crate::workbook::writer::sheet_name_with_suffix;
use crate::workbook::{Table, WorkbookReader};
use romance_copy_common::{AttributeValue, Blacklist, ProductRecord, SentenceCheck, EXPECTED_SENTENCES};
use std::path::{Path, PathBuf};

const RESULTS_SUFFIX: &str = "_results";

/// 列ごとの期待文数
pub fn expected_sentences(column: &str) -> usize {
    if column == "editorial_tagline_appended_genz_line" {
        5
    } else {
        EXPECTED_SENTENCES
    }
}

/// デフォルトの出力先（<入力>_checked.xlsx）
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "results".into());
    input.with_file_name(format!("{}_checked.xlsx", stem))
}

/// 1シート分をチェック（対象列が無いシートは None）
pub fn check_table(table: &Table, columns: &[String], blacklist: &Blacklist) -> Option<Table> {
    if let Some(missing) = columns.iter().find(|c| !table.has_column(c)) {
        tracing::warn!(sheet = %table.sheet, column = %missing, "column not found, skipping sheet");
        return None;
    }

    let mut headers = table.headers.clone();
    for column in columns {
        headers.push(format!("{}_sentences", column));
        headers.push(format!("{}_blacklisted", column));
    }

    let rows = table
        .rows
        .iter()
        .filter(|row| columns.iter().all(|c| row.get(c).map(|v| !v.is_blank()).unwrap_or(false)))
        .map(|row| {
            let mut attributes = row.attributes.clone();
            for column in columns {
                let text = row.get(column).map(|v| v.to_category_text()).unwrap_or_default();
                let verdict = SentenceCheck::evaluate(&text, expected_sentences(column));
                let found: Vec<String> = blacklist.find_violations(&text).into_iter().collect();
                attributes.push((format!("{}_sentences", column), AttributeValue::Text(verdict.to_string())));
                attributes.push((format!("{}_blacklisted", column), AttributeValue::Text(found.join(", "))));
            }
            ProductRecord::new(attributes)
        })
        .collect();

    Some(Table::new(sheet_name_with_suffix(&table.sheet, RESULTS_SUFFIX), headers, rows))
}

/// ワークブックの全シートをチェック
pub fn check_workbook(input: &Path, columns: &[String], blacklist: &Blacklist) -> Result<Vec<Table>> {
    let mut reader = WorkbookReader::open(input)?;
    let mut results = Vec::new();

    for sheet in reader.sheet_names() {
        let table = reader.read_table(&sheet)?;
        if let Some(checked) = check_table(&table, columns, blacklist) {
            results.push(checked);
        }
    }

    Ok(results)
}
