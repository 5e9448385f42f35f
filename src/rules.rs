//! ブランドルール文書の読み込み
//!
//! - .docx: 本文の段落（表の中は除く）を改行で連結
//! - それ以外: テキストとしてそのまま読む

use crate::error::{CopyError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;

const DOCUMENT_XML: &str = "word/document.xml";

/// ルール文書を読み込む
pub fn load_rules(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CopyError::FileNotFound(path.display().to_string()));
    }

    let is_docx = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("docx"))
        .unwrap_or(false);

    if is_docx {
        let paragraphs = read_docx_paragraphs(path)?;
        tracing::debug!(path = %path.display(), paragraphs = paragraphs.len(), "loaded rules document");
        Ok(paragraphs.join("\n"))
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// .docx の本文段落
pub fn read_docx_paragraphs(path: &Path) -> Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| CopyError::RulesDocument(format!("{}: {}", path.display(), e)))?;
    let mut entry = archive
        .by_name(DOCUMENT_XML)
        .map_err(|e| CopyError::RulesDocument(format!("{}: {}", path.display(), e)))?;

    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    parse_document_xml(&xml)
}

/// document.xml から段落テキストを取り出す
pub fn parse_document_xml(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| CopyError::RulesDocument(format!("XML解析エラー (位置 {}): {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => current.clear(),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if table_depth == 0 => paragraphs.push(String::new()),
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| CopyError::RulesDocument(format!("XML文字参照エラー: {}", e)))?;
                current.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                b"w:p" if table_depth == 0 => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Use AP style.</w:t></w:r></w:p>
    <w:p/>
    <w:p><w:r><w:t xml:space="preserve">Avoid </w:t></w:r><w:r><w:t>&quot;picture this&quot;</w:t></w:r></w:p>
    <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell text</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
    <w:p><w:r><w:t>One</w:t><w:tab/><w:t>Two</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_parse_document_xml() {
        let paragraphs = parse_document_xml(BODY).unwrap();
        assert_eq!(
            paragraphs,
            vec!["Use AP style.", "", "Avoid \"picture this\"", "One\tTwo"]
        );
    }

    #[test]
    fn test_load_plain_text_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.txt");
        std::fs::write(&path, "Rule 1\nRule 2").unwrap();
        assert_eq!(load_rules(&path).unwrap(), "Rule 1\nRule 2");
    }

    #[test]
    fn test_load_missing_rules() {
        let err = load_rules(Path::new("missing/rules.docx")).unwrap_err();
        assert!(matches!(err, CopyError::FileNotFound(_)));
    }

    #[test]
    fn test_invalid_docx_is_rules_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, "not a zip").unwrap();
        assert!(matches!(load_rules(&path).unwrap_err(), CopyError::RulesDocument(_)));
    }
}
