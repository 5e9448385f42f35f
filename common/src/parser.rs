//! APIレスポンスパーサー
//!
//! 生成サービスの応答からJSONオブジェクトを抽出し、
//! コピー本文とSEOキーワードを取り出す

use crate::error::{Error, Result};
use crate::prompts::{CopyStyle, SEO_FIELDS};
use serde_json::{Map, Value};

/// 生成結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedCopy {
    /// (フィールド名, 本文) をスタイルのフィールド順で保持
    pub fields: Vec<(String, String)>,
    /// SEO Keyword 1..3
    pub seo_keywords: [Vec<String>; 3],
}

impl GeneratedCopy {
    /// フィールドの本文
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, text)| text.as_str())
    }

    /// 全本文（禁止語検査用）
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, text)| text.as_str())
    }
}

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の {...} オブジェクト
/// 3. エラー
///
/// # Examples
/// ```
/// use romance_copy_common::extract_json;
///
/// let response = "Sure! {\"product_description\": \"A tote.\"}";
/// let json = extract_json(response).unwrap();
/// assert!(json.starts_with('{'));
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + "```json".len();
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

fn keyword_list(object: &Map<String, Value>, field: &str) -> Vec<String> {
    match object.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// 生成レスポンスをパース
///
/// スタイルの本文フィールドが1つでも欠けていればエラー。
/// SEOキーワードは欠けていても空リストとして扱う。
pub fn parse_generation_response(response: &str, style: CopyStyle) -> Result<GeneratedCopy> {
    let json_str = extract_json(response)?;
    let value: Value = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("生成結果 JSONパースエラー: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Parse("生成結果がJSONオブジェクトではありません".into()))?;

    let mut fields = Vec::with_capacity(style.fields().len());
    for field in style.fields() {
        let text = match object.get(*field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(Error::Parse(format!("フィールド '{}' がありません", field)));
            }
            Some(other) => other.to_string(),
        };
        fields.push((field.to_string(), text));
    }

    let seo_keywords = SEO_FIELDS.map(|field| keyword_list(object, field));

    Ok(GeneratedCopy { fields, seo_keywords })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_with_block() {
        let response = "Here you go:\n```json\n{\"product_description\": \"A tote.\"}\n```\nThanks.";
        let json = extract_json(response).unwrap();
        assert_eq!(json, "{\"product_description\": \"A tote.\"}");
    }

    #[test]
    fn test_extract_json_raw_with_surrounding_text() {
        let response = r#"Result: {"a": {"b": 1}} done"#;
        assert_eq!(extract_json(response).unwrap(), r#"{"a": {"b": 1}}"#);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("JSONが見つかりません"));
        } else {
            panic!("Expected Parse error");
        }
        assert!(extract_json("").is_err());
    }

    #[test]
    fn test_parse_description_response() {
        let response = r#"```json
{
  "product_description": "Our Clare crossbody keeps up with you.",
  "SEO Keyword 1": ["crossbody bag", "small crossbody"],
  "SEO Keyword 2": ["pebbled leather"],
  "SEO Keyword 3": "everyday bag"
}
```"#;
        let copy = parse_generation_response(response, CopyStyle::Description).unwrap();
        assert_eq!(copy.text("product_description"), Some("Our Clare crossbody keeps up with you."));
        assert_eq!(copy.seo_keywords[0], vec!["crossbody bag", "small crossbody"]);
        assert_eq!(copy.seo_keywords[1], vec!["pebbled leather"]);
        assert_eq!(copy.seo_keywords[2], vec!["everyday bag"]);
    }

    #[test]
    fn test_parse_tagline_response_keeps_field_order() {
        let response = r#"{"editorial_tagline_genz_variation": "B.", "editorial_tagline": "A."}"#;
        let copy = parse_generation_response(response, CopyStyle::Tagline).unwrap();
        let texts: Vec<&str> = copy.texts().collect();
        assert_eq!(texts, vec!["A.", "B."]);
        assert!(copy.seo_keywords.iter().all(|k| k.is_empty()));
    }

    #[test]
    fn test_parse_missing_field_is_error() {
        let response = r#"{"editorial_tagline": "A."}"#;
        let err = parse_generation_response(response, CopyStyle::Tagline).unwrap_err();
        assert!(err.to_string().contains("editorial_tagline_genz_variation"));
    }

    #[test]
    fn test_parse_non_object_is_error() {
        let result = parse_generation_response(r#"```json
["a"]
```"#, CopyStyle::Description);
        assert!(result.is_err());
    }
}
