//! 結果ワークブック出力（rust_xlsxwriter）
//!
//! 文字列は常に文字列セルとして書き込む（URLへの自動変換なし）。

use super::Table;
use crate::error::{CopyError, Result};
use crate::generator::{CopyRecord, GenerationOutcome};
use romance_copy_common::prompts::SEO_FIELDS;
use romance_copy_common::{AttributeValue, BrandProfile, CopyStyle};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::collections::HashSet;
use std::path::Path;

/// Excelのセル文字数上限
const MAX_CELL_CHARS: usize = 32_767;
/// Excelのシート名文字数上限
const MAX_SHEET_NAME_CHARS: usize = 31;

pub const ORIGINAL_FORMAT_SHEET: &str = "Original Format";
pub const FORMATTED_VIEW_SHEET: &str = "Formatted View";

/// 生成結果に付加する注記列
pub const ANNOTATION_COLUMNS: [&str; 7] = [
    "Old Description",
    "Matched OLD Mega PDP Value",
    "Prompt",
    "Match_Type",
    "Blacklisted Keywords",
    "Generation Error",
    "Sentence Check",
];

fn xlsx_error(e: XlsxError) -> CopyError {
    CopyError::WorkbookWrite(e.to_string())
}

fn truncate_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// シート名を上限内に切り詰めて接尾辞を付ける
pub fn sheet_name_with_suffix(base: &str, suffix: &str) -> String {
    let keep = MAX_SHEET_NAME_CHARS.saturating_sub(suffix.chars().count());
    let base: String = base.chars().take(keep).collect();
    format!("{}{}", base, suffix)
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| CopyError::WorkbookWrite(format!("列数が上限を超えています: {}", col + 1)))
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &AttributeValue) -> Result<()> {
    match value {
        AttributeValue::Missing => {}
        AttributeValue::Float(f) if f.is_nan() => {}
        AttributeValue::Text(s) => {
            worksheet.write_string(row, col, truncate_cell(s)).map_err(xlsx_error)?;
        }
        AttributeValue::Int(i) => {
            worksheet.write_number(row, col, *i as f64).map_err(xlsx_error)?;
        }
        AttributeValue::Float(f) => {
            worksheet.write_number(row, col, *f).map_err(xlsx_error)?;
        }
        AttributeValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b).map_err(xlsx_error)?;
        }
    }
    Ok(())
}

/// ヘッダー行と値の行を書き込む
fn write_rows(worksheet: &mut Worksheet, name: &str, headers: &[String], rows: &[Vec<AttributeValue>]) -> Result<()> {
    let header_format = Format::new().set_bold();
    worksheet.set_name(name).map_err(xlsx_error)?;

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, column_index(col)?, header.as_str(), &header_format)
            .map_err(xlsx_error)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            write_cell(worksheet, r as u32 + 1, column_index(col)?, value)?;
        }
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;
    Ok(())
}

fn text(value: impl Into<String>) -> AttributeValue {
    AttributeValue::Text(value.into())
}

fn json_array(items: &[String]) -> AttributeValue {
    text(serde_json::to_string(items).unwrap_or_default())
}

/// 生成列（本文・SEO）の値
fn generated_values(outcome: &GenerationOutcome, style: CopyStyle) -> Vec<AttributeValue> {
    let copy = outcome.copy();
    let mut values: Vec<AttributeValue> = style
        .fields()
        .iter()
        .map(|field| {
            copy.and_then(|c| c.text(field))
                .map(text)
                .unwrap_or_default()
        })
        .collect();
    for i in 0..SEO_FIELDS.len() {
        values.push(
            copy.map(|c| text(c.seo_keywords[i].join(", ")))
                .unwrap_or_default(),
        );
    }
    values
}

fn annotation_values(record: &CopyRecord) -> Vec<AttributeValue> {
    let prepared = &record.prepared;
    let violations: Vec<String> = record
        .outcome
        .violations()
        .map(|v| v.iter().cloned().collect())
        .unwrap_or_default();
    let sentence_check = match &record.outcome {
        GenerationOutcome::Generated { sentence_checks, .. } => sentence_checks
            .iter()
            .map(|(field, check)| format!("{}: {}", field, check))
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };

    vec![
        json_array(&prepared.samples),
        json_array(&prepared.matched.matched_category_values),
        text(prepared.prompt.as_str()),
        text(prepared.matched.match_type.label()),
        text(violations.join(", ")),
        text(record.outcome.failure().unwrap_or_default()),
        text(sentence_check),
    ]
}

/// 生成結果ワークブックを書き出す
///
/// - "Original Format": 入力の全属性 + 生成列 + 注記列
/// - "Formatted View": ID・商品名・グループ値 + 生成列
pub fn write_copy_results(path: &Path, records: &[CopyRecord], brand: &BrandProfile, style: CopyStyle) -> Result<()> {
    let generated_headers: Vec<String> = style
        .fields()
        .iter()
        .chain(SEO_FIELDS.iter())
        .map(|s| s.to_string())
        .collect();
    let reserved: HashSet<&str> = generated_headers
        .iter()
        .map(|s| s.as_str())
        .chain(ANNOTATION_COLUMNS)
        .collect();

    // 入力属性の列（初出順、生成列と同名のものは生成側で置き換え）
    let mut attribute_headers: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for record in records {
        for (name, _) in &record.prepared.product.attributes {
            if !reserved.contains(name.as_str()) && seen.insert(name.clone()) {
                attribute_headers.push(name.clone());
            }
        }
    }

    let mut original_headers = attribute_headers.clone();
    original_headers.extend(generated_headers.iter().cloned());
    original_headers.extend(ANNOTATION_COLUMNS.iter().map(|s| s.to_string()));

    let original_rows: Vec<Vec<AttributeValue>> = records
        .iter()
        .map(|record| {
            let product = &record.prepared.product;
            let mut row: Vec<AttributeValue> = attribute_headers
                .iter()
                .map(|h| product.get(h).cloned().unwrap_or_default())
                .collect();
            row.extend(generated_values(&record.outcome, style));
            row.extend(annotation_values(record));
            row
        })
        .collect();

    let key_columns = [&brand.id_column, &brand.name_column, &brand.group_column];
    let mut formatted_headers: Vec<String> = key_columns.iter().map(|s| s.to_string()).collect();
    formatted_headers.extend(generated_headers.iter().cloned());

    let formatted_rows: Vec<Vec<AttributeValue>> = records
        .iter()
        .map(|record| {
            let product = &record.prepared.product;
            let mut row: Vec<AttributeValue> = key_columns
                .iter()
                .map(|c| product.get(c).cloned().unwrap_or_default())
                .collect();
            row.extend(generated_values(&record.outcome, style));
            row
        })
        .collect();

    let mut workbook = Workbook::new();
    write_rows(workbook.add_worksheet(), ORIGINAL_FORMAT_SHEET, &original_headers, &original_rows)?;
    write_rows(workbook.add_worksheet(), FORMATTED_VIEW_SHEET, &formatted_headers, &formatted_rows)?;
    workbook.save(path).map_err(xlsx_error)?;

    tracing::info!(path = %path.display(), rows = records.len(), "wrote results workbook");
    Ok(())
}

/// チェック結果ワークブックを書き出す（1テーブル1シート、テーブル名をシート名に使う）
pub fn write_check_results(path: &Path, tables: &[Table]) -> Result<()> {
    let mut workbook = Workbook::new();
    for table in tables {
        let rows: Vec<Vec<AttributeValue>> = table
            .rows
            .iter()
            .map(|record| {
                table
                    .headers
                    .iter()
                    .map(|h| record.get(h).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        write_rows(workbook.add_worksheet(), &table.sheet, &table.headers, &rows)?;
    }
    workbook.save(path).map_err(xlsx_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_with_suffix() {
        assert_eq!(sheet_name_with_suffix("Original Format", "_results"), "Original Format_results");
        let long = "1 New Romance Copy Generation";
        let name = sheet_name_with_suffix(long, "_results");
        assert_eq!(name.chars().count(), 31);
        assert!(name.ends_with("_results"));
    }

    #[test]
    fn test_column_index_overflow_is_error() {
        assert_eq!(column_index(0).unwrap(), 0);
        assert_eq!(column_index(65_535).unwrap(), u16::MAX);
        assert!(matches!(column_index(65_536), Err(CopyError::WorkbookWrite(_))));
    }

    #[test]
    fn test_truncate_cell() {
        let long = "a".repeat(MAX_CELL_CHARS + 10);
        assert_eq!(truncate_cell(&long).len(), MAX_CELL_CHARS);
        assert_eq!(truncate_cell("short"), "short");
    }
}
