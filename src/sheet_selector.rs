//! 入力シート・ブランドプロファイルの選択

use crate::error::{CopyError, Result};
use dialoguer::MultiSelect;
use romance_copy_common::BrandProfile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 生成対象シートを決める
///
/// `requested` が指定されていればそれを検証して使う。
/// 未指定の場合は対話選択（プロファイルの入力シートが初期選択）。
/// 端末でなければプロファイルの入力シートのうち存在するものを使う。
pub fn select_sheets(available: &[String], requested: &[String], brand: &BrandProfile) -> Result<Vec<String>> {
    if !requested.is_empty() {
        if let Some(missing) = requested.iter().find(|s| !available.contains(s)) {
            return Err(CopyError::SheetNotFound(missing.clone()));
        }
        return Ok(requested.to_vec());
    }

    let defaults = default_sheets(available, brand);
    if !console_is_interactive() {
        return non_empty(defaults);
    }

    let checked: Vec<bool> = available.iter().map(|s| defaults.contains(s)).collect();
    let picked = MultiSelect::new()
        .with_prompt("生成するシートを選択してください（スペースで選択、Enterで決定）")
        .items(available)
        .defaults(&checked)
        .interact()
        .map_err(|e| CopyError::Config(format!("シート選択エラー: {}", e)))?;

    non_empty(picked.into_iter().map(|i| available[i].clone()).collect())
}

/// プロファイルの入力シートのうちワークブックに存在するもの
pub fn default_sheets(available: &[String], brand: &BrandProfile) -> Vec<String> {
    brand
        .input_sheets
        .iter()
        .filter(|s| available.contains(s))
        .cloned()
        .collect()
}

fn non_empty(sheets: Vec<String>) -> Result<Vec<String>> {
    if sheets.is_empty() {
        Err(CopyError::Config("生成対象のシートがありません（--sheet で指定してください）".into()))
    } else {
        Ok(sheets)
    }
}

fn console_is_interactive() -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// フォルダ内のプロファイルJSON一覧（名前順、読めないものは除外）
pub fn list_profiles(dir: &Path) -> Vec<(PathBuf, BrandProfile)> {
    let mut profiles: Vec<(PathBuf, BrandProfile)> = WalkDir::new(dir)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
        .filter_map(|e| match BrandProfile::from_file(e.path()) {
            Ok(profile) => Some((e.path().to_path_buf(), profile)),
            Err(err) => {
                tracing::debug!(path = %e.path().display(), error = %err, "not a brand profile");
                None
            }
        })
        .collect();

    profiles.sort_by(|a, b| a.1.name.cmp(&b.1.name));
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_requested_sheets_are_validated() {
        let brand = BrandProfile::from_preset("spade").unwrap();
        let available = sheets(&["Model Training", "Batch 2"]);

        assert_eq!(select_sheets(&available, &sheets(&["Batch 2"]), &brand).unwrap(), vec!["Batch 2"]);
        assert!(matches!(
            select_sheets(&available, &sheets(&["Nope"]), &brand),
            Err(CopyError::SheetNotFound(_))
        ));
    }

    #[test]
    fn test_default_sheets() {
        let brand = BrandProfile::from_preset("coach").unwrap();
        let available = sheets(&["Model Training", "1 New Romance Copy Generation"]);
        assert_eq!(default_sheets(&available, &brand), vec!["1 New Romance Copy Generation"]);
        assert!(default_sheets(&sheets(&["Other"]), &brand).is_empty());
    }

    #[test]
    fn test_list_profiles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("zeta.json"),
            r#"{"name": "Zeta", "workbook": "z.xlsx", "rules": "z.docx"}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("alpha.json"),
            r#"{"name": "Alpha", "workbook": "a.xlsx", "rules": "a.docx", "style": "tagline"}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"model": "gpt-4.1"}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let profiles = list_profiles(dir.path());
        let names: Vec<&str> = profiles.iter().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
