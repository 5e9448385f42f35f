use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use romance_copy::ai_provider::AiProvider;
use romance_copy::generator::{CacheFile, CliClient, GenerationOutcome, GenerationService, OpenAiClient, Pipeline, RunOptions};
use romance_copy::{cli, config, logging, rules, sanity, sheet_selector, workbook};
use romance_copy_common::{find_match, BrandProfile, ReferenceCorpus, PRESET_NAMES};
use cli::{Cli, Commands};
use config::Config;
use std::path::{Path, PathBuf};
use workbook::WorkbookReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::configure_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Generate { brand, workbook, rules, sheet, output, style, limit, dry_run, use_cache } => {
            println!("✍ romance-copy - コピー生成\n");

            // 1. ブランド・ルール
            println!("[1/5] ブランドプロファイルとルールを読み込み中...");
            let brand = BrandProfile::resolve(&brand)?;
            let style = style.unwrap_or(brand.style);
            let rules_path = rules.unwrap_or_else(|| brand.rules.clone());
            let rules_text = rules::load_rules(&rules_path)
                .with_context(|| format!("ルール文書: {}", rules_path.display()))?;
            println!("✔ {} ({}) / ルール {}文字\n", brand.name, style, rules_text.chars().count());

            // 2. 参照コーパス
            println!("[2/5] 参照シートを読み込み中...");
            let workbook_path = workbook.unwrap_or_else(|| brand.workbook.clone());
            let mut reader = WorkbookReader::open(&workbook_path)
                .with_context(|| format!("ワークブック: {}", workbook_path.display()))?;
            let corpus = ReferenceCorpus::new(reader.read_reference_sheets(&brand)?);
            println!(
                "✔ {}件の参照行 / {}種類のグループ値\n",
                corpus.record_count(),
                corpus.known_values().len()
            );

            // 3. 入力シート・照合
            println!("[3/5] 入力シートを照合中...");
            let sheets = sheet_selector::select_sheets(&reader.sheet_names(), &sheet, &brand)?;
            let pipeline = Pipeline::new(&brand, &rules_text, style, &corpus);
            let mut prepared = Vec::new();
            for name in &sheets {
                let table = reader.read_table(name)?;
                let remaining = limit.map(|l| l.saturating_sub(prepared.len())).unwrap_or(usize::MAX);
                let rows: Vec<_> = table.rows.into_iter().take(remaining).collect();
                println!("  - {}: {}件", name, rows.len());
                prepared.extend(pipeline.prepare(name, &rows));
            }
            println!("✔ {}件の商品を照合\n", prepared.len());

            // 4. 生成
            let service: Option<Box<dyn GenerationService>> = if dry_run {
                None
            } else if cli.ai_provider == AiProvider::Openai {
                Some(Box::new(OpenAiClient::new(&config)?))
            } else {
                Some(Box::new(CliClient::new(cli.ai_provider)?))
            };
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}_Results.xlsx", brand.name)));
            let options = RunOptions {
                cache_dir: use_cache.then(|| output_dir(&output)),
            };

            println!(
                "[4/5] コピー生成中...{}{}",
                if dry_run { " (ドライラン)" } else { "" },
                if use_cache { " (キャッシュ有効)" } else { "" }
            );
            let progress = ProgressBar::new(prepared.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            let records = pipeline.run(service.as_deref(), prepared, &options, &progress).await;
            progress.finish_and_clear();

            let generated = records.iter().filter(|r| r.outcome.copy().is_some()).count();
            let cached = records
                .iter()
                .filter(|r| matches!(r.outcome, GenerationOutcome::Generated { from_cache: true, .. }))
                .count();
            let failed = records.iter().filter(|r| r.outcome.failure().is_some()).count();
            let flagged = records
                .iter()
                .filter(|r| r.outcome.violations().map(|v| !v.is_empty()).unwrap_or(false))
                .count();
            println!("✔ 生成 {}件 (キャッシュ {}件) / 失敗 {}件 / 禁止語あり {}件\n", generated, cached, failed, flagged);

            // 5. 出力
            println!("[5/5] 結果を保存中...");
            workbook::write_copy_results(&output, &records, &brand, style)
                .with_context(|| format!("出力: {}", output.display()))?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ 生成完了");
        }

        Commands::Match { brand, workbook, value } => {
            let brand = BrandProfile::resolve(&brand)?;
            let workbook_path = workbook.unwrap_or_else(|| brand.workbook.clone());
            let mut reader = WorkbookReader::open(&workbook_path)
                .with_context(|| format!("ワークブック: {}", workbook_path.display()))?;
            let corpus = ReferenceCorpus::new(reader.read_reference_sheets(&brand)?);

            let result = find_match(Some(value.as_str()), &corpus);
            println!("照合結果: {}", result.match_type);
            if !result.matched_category_values.is_empty() {
                println!("  一致したグループ値: {}", result.matched_category_values.join(", "));
            }
            if !result.candidates.is_empty() {
                println!("  候補:");
                for candidate in &result.candidates {
                    println!("    {:.3}  {}", candidate.score, candidate.value);
                }
            }
            println!("  参考説明: {}件", result.descriptions.len());
            for description in &result.descriptions {
                println!("    - {}", description);
            }
        }

        Commands::Check { brand, input, columns, output } => {
            println!("🔎 romance-copy - 生成結果チェック\n");
            let brand = BrandProfile::resolve(&brand)?;
            let columns = if columns.is_empty() {
                brand.style.fields().iter().map(|s| s.to_string()).collect()
            } else {
                columns
            };

            println!("[1/2] チェック中... ({})", columns.join(", "));
            let tables = sanity::check_workbook(&input, &columns, &brand.compiled_blacklist())
                .with_context(|| format!("入力: {}", input.display()))?;
            if tables.is_empty() {
                anyhow::bail!("チェック対象の列を含むシートがありません: {}", columns.join(", "));
            }
            for table in &tables {
                println!("  - {}: {}行", table.sheet, table.rows.len());
            }

            println!("[2/2] 結果を保存中...");
            let output = output.unwrap_or_else(|| sanity::default_output_path(&input));
            workbook::write_check_results(&output, &tables)
                .with_context(|| format!("出力: {}", output.display()))?;
            println!("✔ 結果を保存: {}", output.display());

            println!("\n✅ チェック完了");
        }

        Commands::Config { set_api_key, set_model, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if let Some(model) = set_model {
                config.model = model;
                config.save()?;
                println!("✔ モデルを設定しました: {}", config.model);
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  温度: {}", config.temperature);
                println!("  エンドポイント: {}", config.base_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Cache { clear, folder, info } => {
            let target = folder.unwrap_or_else(|| PathBuf::from("."));
            let cache_path = CacheFile::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = CacheFile::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match CacheFile::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }

        Commands::Brands { dir } => {
            println!("プリセット:");
            for name in PRESET_NAMES {
                if let Some(profile) = BrandProfile::from_preset(name) {
                    println!("  {} ({}) - {}", name, profile.style, profile.workbook.display());
                }
            }

            if let Some(dir) = dir {
                let profiles = sheet_selector::list_profiles(&dir);
                println!("\nプロファイル ({}):", dir.display());
                if profiles.is_empty() {
                    println!("  (なし)");
                }
                for (path, profile) in profiles {
                    println!("  {} ({}) - {}", profile.name, profile.style, path.display());
                }
            }
        }
    }

    Ok(())
}

/// 出力ファイルのフォルダ（キャッシュの保存先）
fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
