//! 入力データの型定義
//!
//! CLIと各モジュールで共有される型:
//! - AttributeValue: スプレッドシートのセル値
//! - ProductRecord: 商品1件分の属性（列順を保持）
//! - ReferenceRow / ReferenceSheet: 過去コピーの参照シート

use serde::{Deserialize, Serialize};

/// セル値（文字列・数値・真偽値・欠損）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Missing,
}

impl AttributeValue {
    /// 欠損・NaN・空文字列
    pub fn is_blank(&self) -> bool {
        match self {
            AttributeValue::Missing => true,
            AttributeValue::Float(f) => f.is_nan(),
            AttributeValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 照合用の文字列表現（欠損・NaNは空文字列）
    pub fn to_category_text(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Int(i) => i.to_string(),
            AttributeValue::Float(f) if f.is_nan() => String::new(),
            AttributeValue::Float(f) => format!("{:?}", f),
            AttributeValue::Bool(b) => if *b { "True".into() } else { "False".into() },
            AttributeValue::Missing => String::new(),
        }
    }

    /// プロンプト用の文字列表現（文字列以外はJSONエンコード）
    pub fn to_prompt_text(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Int(i) => serde_json::to_string(i).unwrap_or_default(),
            AttributeValue::Float(f) => serde_json::to_string(f).unwrap_or_else(|_| "NaN".into()),
            AttributeValue::Bool(b) => serde_json::to_string(b).unwrap_or_default(),
            AttributeValue::Missing => "null".into(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Missing => Ok(()),
            AttributeValue::Float(v) if v.is_nan() => Ok(()),
            other => write!(f, "{}", other.to_category_text()),
        }
    }
}

/// 商品1件分の属性（列順を保持）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub attributes: Vec<(String, AttributeValue)>,
}

impl ProductRecord {
    pub fn new(attributes: Vec<(String, AttributeValue)>) -> Self {
        Self { attributes }
    }

    /// 属性を取得
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// 照合用のグループ値（欠損時None）
    pub fn group_value(&self, column: &str) -> Option<String> {
        self.get(column)
            .filter(|v| !v.is_blank() || v.as_text().is_some())
            .map(|v| v.to_category_text())
    }

    /// 表示用の文字列（欠損時は空文字列）
    pub fn display(&self, name: &str) -> String {
        self.get(name).map(|v| v.to_string()).unwrap_or_default()
    }
}

/// 参照シートの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    /// グループ値（元の表記のまま）
    pub category_value: String,
    /// 過去の商品説明（空セルはNone）
    pub description: Option<String>,
}

impl ReferenceRow {
    pub fn new(category_value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            category_value: category_value.into(),
            description: Some(description.into()),
        }
    }

    /// 説明が空の行（グループ値のみ既知として扱う）
    pub fn without_description(category_value: impl Into<String>) -> Self {
        Self {
            category_value: category_value.into(),
            description: None,
        }
    }
}

/// 参照シート（学習用シート・全カタログシートなど）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSheet {
    pub name: String,
    pub rows: Vec<ReferenceRow>,
}

impl ReferenceSheet {
    pub fn new(name: impl Into<String>, rows: Vec<ReferenceRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}
