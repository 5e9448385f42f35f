use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopyError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`romance-copy config --set-api-key YOUR_KEY` または OPENAI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ワークブック読み込みエラー: {0}")]
    WorkbookRead(String),

    #[error("ワークブック書き込みエラー: {0}")]
    WorkbookWrite(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("列が見つかりません: {column} (シート: {sheet})")]
    ColumnNotFound { sheet: String, column: String },

    #[error("ルール文書の読み込みに失敗: {0}")]
    RulesDocument(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] romance_copy_common::Error),
}

pub type Result<T> = std::result::Result<T, CopyError>;
