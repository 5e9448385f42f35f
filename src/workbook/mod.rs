//! ワークブック入出力
//!
//! - reader: calamine によるシート読み込み
//! - writer: rust_xlsxwriter による結果出力

pub mod reader;
pub mod writer;

pub use reader::WorkbookReader;
pub use writer::{write_check_results, write_copy_results};

use crate::error::{CopyError, Result};
use romance_copy_common::ProductRecord;

/// ヘッダー付きの1シート
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<ProductRecord>,
}

impl Table {
    pub fn new(sheet: impl Into<String>, headers: Vec<String>, rows: Vec<ProductRecord>) -> Self {
        Self {
            sheet: sheet.into(),
            headers,
            rows,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(CopyError::ColumnNotFound {
                sheet: self.sheet.clone(),
                column: column.to_string(),
            })
        }
    }
}
