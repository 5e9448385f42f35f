//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use romance_copy::error::CopyError;
use romance_copy::rules;
use romance_copy::workbook::WorkbookReader;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないワークブックを開いた場合
#[test]
fn test_open_nonexistent_workbook() {
    let result = WorkbookReader::open(Path::new("/nonexistent/path/12345.xlsx"));
    assert!(matches!(result, Err(CopyError::FileNotFound(_))));
}

/// ワークブックでないファイルを開いた場合
#[test]
fn test_open_invalid_workbook() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, "not a workbook").unwrap();

    assert!(matches!(WorkbookReader::open(&path), Err(CopyError::WorkbookRead(_))));
}

/// 存在しないルール文書
#[test]
fn test_missing_rules_document() {
    let err = rules::load_rules(Path::new("/nonexistent/Rules_new.docx")).unwrap_err();
    assert!(matches!(err, CopyError::FileNotFound(_)));
}

/// CopyErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        CopyError::Config("テスト設定エラー".to_string()),
        CopyError::FileNotFound("book.xlsx".to_string()),
        CopyError::WorkbookRead("読み込み失敗".to_string()),
        CopyError::WorkbookWrite("書き込み失敗".to_string()),
        CopyError::SheetNotFound("Model Training".to_string()),
        CopyError::RulesDocument("壊れた文書".to_string()),
        CopyError::ApiCall("API呼び出し失敗".to_string()),
        CopyError::ApiParse("JSONなし".to_string()),
        CopyError::CliExecution("claude".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 列が見つからない場合のメッセージ
#[test]
fn test_column_not_found_message() {
    let err = CopyError::ColumnNotFound {
        sheet: "Model Training".to_string(),
        column: "Mega PDP Group Value".to_string(),
    };
    let display = err.to_string();
    assert!(display.contains("Mega PDP Group Value"));
    assert!(display.contains("Model Training"));
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = CopyError::MissingApiKey.to_string();

    assert!(display.contains("APIキー"));
    assert!(display.contains("romance-copy config"));
    assert!(display.contains("OPENAI_API_KEY"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CopyError = io_err.into();

    assert!(matches!(err, CopyError::Io(_)));
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: CopyError = json_err.into();

    assert!(matches!(err, CopyError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_is_transparent() {
    let common_err = romance_copy_common::Error::Config("不明なブランド".to_string());
    let err: CopyError = common_err.into();

    assert!(matches!(err, CopyError::Common(_)));
    assert!(err.to_string().contains("不明なブランド"));
}
