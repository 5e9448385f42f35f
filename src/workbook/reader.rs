//! ワークブック読み込み（calamine）

use super::Table;
use crate::error::{CopyError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use romance_copy_common::{AttributeValue, BrandProfile, ProductRecord, ReferenceRow, ReferenceSheet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// 開いたワークブック
pub struct WorkbookReader {
    sheets: Sheets<BufReader<File>>,
    path: String,
}

impl WorkbookReader {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CopyError::FileNotFound(path.display().to_string()));
        }
        let sheets = open_workbook_auto(path)
            .map_err(|e| CopyError::WorkbookRead(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            sheets,
            path: path.display().to_string(),
        })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    fn range(&mut self, sheet: &str) -> Result<Range<Data>> {
        if !self.sheet_names().iter().any(|s| s == sheet) {
            return Err(CopyError::SheetNotFound(format!("{} ({})", sheet, self.path)));
        }
        self.sheets
            .worksheet_range(sheet)
            .map_err(|e| CopyError::WorkbookRead(format!("{} / {}: {}", self.path, sheet, e)))
    }

    /// シートを表として読み込み（1行目がヘッダー、空行は除外）
    pub fn read_table(&mut self, sheet: &str) -> Result<Table> {
        let range = self.range(sheet)?;
        let mut rows = range.rows();

        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row
                .iter()
                .enumerate()
                .map(|(i, cell)| header_name(cell, i))
                .collect(),
            None => return Ok(Table::new(sheet, Vec::new(), Vec::new())),
        };

        let records = rows
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .map(|row| {
                let attributes = headers
                    .iter()
                    .enumerate()
                    .map(|(i, name)| (name.clone(), row.get(i).map(cell_value).unwrap_or_default()))
                    .collect();
                ProductRecord::new(attributes)
            })
            .collect();

        Ok(Table::new(sheet, headers, records))
    }

    /// 参照シートを読み込み
    ///
    /// グループ値が空の行は除外する。説明が空の行はグループ値のみ保持する。
    pub fn read_reference_sheet(
        &mut self,
        sheet: &str,
        group_column: &str,
        description_column: &str,
    ) -> Result<ReferenceSheet> {
        let table = self.read_table(sheet)?;
        table.require_column(group_column)?;
        table.require_column(description_column)?;

        let rows = table
            .rows
            .iter()
            .filter_map(|record| {
                let category = record.get(group_column).filter(|v| !v.is_blank())?;
                let category = category.to_category_text();
                let row = match record.get(description_column) {
                    Some(desc) if !desc.is_blank() => ReferenceRow::new(category, desc.to_category_text()),
                    _ => ReferenceRow::without_description(category),
                };
                Some(row)
            })
            .collect();

        Ok(ReferenceSheet::new(sheet, rows))
    }

    /// ブランドの参照シートをすべて読み込み（プロファイルの順序）
    pub fn read_reference_sheets(&mut self, brand: &BrandProfile) -> Result<Vec<ReferenceSheet>> {
        brand
            .reference_sheets
            .iter()
            .map(|sheet| self.read_reference_sheet(sheet, &brand.group_column, &brand.description_column))
            .collect()
    }
}

/// ヘッダー名（空欄は "Unnamed: i"）
fn header_name(cell: &Data, index: usize) -> String {
    match cell_value(cell) {
        value if value.is_blank() => format!("Unnamed: {}", index),
        value => value.to_category_text(),
    }
}

/// セル値を変換
pub fn cell_value(cell: &Data) -> AttributeValue {
    match cell {
        Data::Empty | Data::Error(_) => AttributeValue::Missing,
        Data::String(s) => AttributeValue::Text(s.clone()),
        Data::Int(i) => AttributeValue::Int(*i),
        Data::Float(f) => AttributeValue::Float(*f),
        Data::Bool(b) => AttributeValue::Bool(*b),
        Data::DateTime(dt) => AttributeValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => AttributeValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value() {
        assert_eq!(cell_value(&Data::Empty), AttributeValue::Missing);
        assert_eq!(cell_value(&Data::String("Tote".into())), AttributeValue::Text("Tote".into()));
        assert_eq!(cell_value(&Data::Float(1.5)), AttributeValue::Float(1.5));
        assert_eq!(cell_value(&Data::Bool(true)), AttributeValue::Bool(true));
    }

    #[test]
    fn test_header_name() {
        assert_eq!(header_name(&Data::String("Item#".into()), 0), "Item#");
        assert_eq!(header_name(&Data::Empty, 3), "Unnamed: 3");
        assert_eq!(header_name(&Data::Int(2024), 1), "2024");
    }

    #[test]
    fn test_open_missing_file() {
        let err = WorkbookReader::open(Path::new("no/such/book.xlsx")).err().unwrap();
        assert!(matches!(err, CopyError::FileNotFound(_)));
    }
}
