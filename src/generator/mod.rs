//! コピー生成パイプライン
//!
//! 1. 照合: 全商品を並列に照合し、参考説明を禁止語除去・重複排除（入力順を保持）
//! 2. 生成: 1件ずつ生成サービスを呼び出し、応答をパース
//! 3. 検査: 生成本文の禁止語と文数をチェック
//!
//! 生成の失敗は商品ごとに `GenerationOutcome::Failed` として記録し、処理は継続する。

pub mod cache;
pub mod cli_client;
pub mod openai;

pub use cache::{cache_key, CacheFile};
pub use cli_client::CliClient;
pub use openai::OpenAiClient;

use crate::error::{CopyError, Result};
use async_trait::async_trait;
use indicatif::ProgressBar;
use rayon::prelude::*;
use romance_copy_common::{
    build_system_prompt, build_user_prompt, find_match, parse_generation_response, Blacklist,
    BrandProfile, CopyStyle, GeneratedCopy, MatchResult, ProductRecord, PromptContext,
    ReferenceCorpus, SentenceCheck, EXPECTED_SENTENCES,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// テキスト生成サービス
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// キャッシュキーに含めるモデル名
    fn model(&self) -> &str;

    /// システムプロンプトとユーザープロンプトから応答テキストを生成
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}

/// 1商品の生成結果
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated {
        copy: GeneratedCopy,
        /// 生成本文に含まれていた禁止語（小文字）
        violations: BTreeSet<String>,
        /// (フィールド, 文数判定)
        sentence_checks: Vec<(String, SentenceCheck)>,
        from_cache: bool,
    },
    Failed {
        reason: String,
    },
    /// ドライラン
    Skipped,
}

impl GenerationOutcome {
    pub fn copy(&self) -> Option<&GeneratedCopy> {
        match self {
            GenerationOutcome::Generated { copy, .. } => Some(copy),
            _ => None,
        }
    }

    pub fn violations(&self) -> Option<&BTreeSet<String>> {
        match self {
            GenerationOutcome::Generated { violations, .. } => Some(violations),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// 照合とプロンプト生成まで済んだ商品
#[derive(Debug, Clone)]
pub struct PreparedProduct {
    pub sheet: String,
    pub product: ProductRecord,
    pub matched: MatchResult,
    /// 禁止語除去・重複排除済みの参考説明
    pub samples: Vec<String>,
    pub prompt: String,
}

/// 出力1行分
#[derive(Debug, Clone)]
pub struct CopyRecord {
    pub prepared: PreparedProduct,
    pub outcome: GenerationOutcome,
}

/// 生成オプション
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// キャッシュの保存先（None でキャッシュ無効）
    pub cache_dir: Option<PathBuf>,
}

/// ブランド1つ分の生成パイプライン
pub struct Pipeline<'a> {
    brand: &'a BrandProfile,
    rules: &'a str,
    style: CopyStyle,
    corpus: &'a ReferenceCorpus,
    blacklist: Blacklist,
    system_prompt: String,
}

impl<'a> Pipeline<'a> {
    pub fn new(brand: &'a BrandProfile, rules: &'a str, style: CopyStyle, corpus: &'a ReferenceCorpus) -> Self {
        let blacklist = brand.compiled_blacklist();
        let system_prompt = build_system_prompt(&PromptContext {
            brand,
            rules,
            blacklist: &blacklist,
            style,
        });
        Self {
            brand,
            rules,
            style,
            corpus,
            blacklist,
            system_prompt,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    fn prepare_one(&self, sheet: &str, product: &ProductRecord) -> PreparedProduct {
        let group = product.group_value(&self.brand.group_column);
        let matched = find_match(group.as_deref(), self.corpus);
        let samples = self.blacklist.dedup_and_clean(&matched.descriptions);
        let ctx = PromptContext {
            brand: self.brand,
            rules: self.rules,
            blacklist: &self.blacklist,
            style: self.style,
        };
        let prompt = build_user_prompt(&ctx, &samples, product);

        PreparedProduct {
            sheet: sheet.to_string(),
            product: product.clone(),
            matched,
            samples,
            prompt,
        }
    }

    /// 全商品を照合してプロンプトを組み立てる（並列、入力順を保持）
    pub fn prepare(&self, sheet: &str, products: &[ProductRecord]) -> Vec<PreparedProduct> {
        products
            .par_iter()
            .map(|product| self.prepare_one(sheet, product))
            .collect()
    }

    /// 生成本文を検査
    fn inspect(&self, copy: GeneratedCopy, from_cache: bool) -> GenerationOutcome {
        let violations: BTreeSet<String> = copy
            .texts()
            .flat_map(|text| self.blacklist.find_violations(text))
            .collect();
        let sentence_checks = copy
            .fields
            .iter()
            .map(|(field, text)| (field.clone(), SentenceCheck::evaluate(text, EXPECTED_SENTENCES)))
            .collect();

        GenerationOutcome::Generated {
            copy,
            violations,
            sentence_checks,
            from_cache,
        }
    }

    /// 1件ずつ生成する
    ///
    /// `service` が None の場合はドライランとして生成を行わない。
    pub async fn run(
        &self,
        service: Option<&dyn GenerationService>,
        prepared: Vec<PreparedProduct>,
        options: &RunOptions,
        progress: &ProgressBar,
    ) -> Vec<CopyRecord> {
        let mut cache = options.cache_dir.as_deref().map(CacheFile::load);
        let mut records = Vec::with_capacity(prepared.len());

        for item in prepared {
            let id = item.product.display(&self.brand.id_column);
            progress.set_message(id.clone());

            let outcome = match service {
                None => GenerationOutcome::Skipped,
                Some(service) => self.generate_one(service, &item, cache.as_mut()).await,
            };

            match &outcome {
                GenerationOutcome::Generated { violations, .. } if !violations.is_empty() => {
                    tracing::warn!(item = %id, violations = ?violations, "blacklisted keywords present");
                }
                GenerationOutcome::Failed { reason } => {
                    tracing::warn!(item = %id, reason = %reason, "generation failed");
                }
                _ => {}
            }

            records.push(CopyRecord { prepared: item, outcome });
            progress.inc(1);
        }

        if let (Some(cache), Some(dir)) = (&cache, &options.cache_dir) {
            if let Err(e) = cache.save(dir) {
                tracing::warn!(error = %e, "failed to save generation cache");
            }
        }

        records
    }

    async fn generate_one(
        &self,
        service: &dyn GenerationService,
        item: &PreparedProduct,
        cache: Option<&mut CacheFile>,
    ) -> GenerationOutcome {
        let key = cache_key(service.model(), &self.system_prompt, &item.prompt);

        if let Some(response) = cache.as_ref().and_then(|c| c.get(&key)) {
            if let Ok(copy) = parse_generation_response(response, self.style) {
                tracing::debug!(key = %key, "cache hit");
                return self.inspect(copy, true);
            }
        }

        let result: Result<(GeneratedCopy, String)> = async {
            let response = service.generate(&self.system_prompt, &item.prompt).await?;
            let copy = parse_generation_response(&response, self.style)
                .map_err(|e| CopyError::ApiParse(e.to_string()))?;
            Ok((copy, response))
        }
        .await;

        match result {
            Ok((copy, response)) => {
                if let Some(cache) = cache {
                    cache.insert(key, service.model(), response);
                }
                self.inspect(copy, false)
            }
            Err(e) => GenerationOutcome::Failed { reason: e.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romance_copy_common::{AttributeValue, MatchType, ReferenceRow, ReferenceSheet};

    fn brand() -> BrandProfile {
        BrandProfile::from_json(
            r#"{"name": "Acme", "workbook": "a.xlsx", "rules": "a.txt", "blacklist": ["chic"]}"#,
        )
        .unwrap()
    }

    fn product(id: &str, group: &str) -> ProductRecord {
        ProductRecord::new(vec![
            ("Item#".into(), AttributeValue::Text(id.into())),
            ("Mega PDP Group Value".into(), AttributeValue::Text(group.into())),
        ])
    }

    #[test]
    fn test_prepare_keeps_input_order_and_cleans_samples() {
        let brand = brand();
        let corpus = ReferenceCorpus::new(vec![ReferenceSheet::new(
            "Model Training",
            vec![
                ReferenceRow::new("Tote", "A chic tote."),
                ReferenceRow::new("tote", "A  tote."),
            ],
        )]);
        let pipeline = Pipeline::new(&brand, "rules", CopyStyle::Description, &corpus);

        let products: Vec<ProductRecord> = (0..20).map(|i| product(&format!("K{}", i), "TOTE")).collect();
        let prepared = pipeline.prepare("Input", &products);

        assert_eq!(prepared.len(), 20);
        for (i, item) in prepared.iter().enumerate() {
            assert_eq!(item.product.display("Item#"), format!("K{}", i));
            assert_eq!(item.matched.match_type, MatchType::Exact);
            assert_eq!(item.samples, vec!["A tote."]);
            assert_eq!(item.sheet, "Input");
        }
    }

    #[test]
    fn test_missing_group_value_matches_as_empty() {
        let brand = brand();
        let corpus = ReferenceCorpus::new(Vec::new());
        let pipeline = Pipeline::new(&brand, "", CopyStyle::Description, &corpus);
        let record = ProductRecord::new(vec![("Item#".into(), AttributeValue::Text("K1".into()))]);

        let prepared = pipeline.prepare("Input", &[record]);
        assert_eq!(prepared[0].matched.match_type, MatchType::None);
        assert!(prepared[0].samples.is_empty());
    }

    #[test]
    fn test_outcome_accessors() {
        let failed = GenerationOutcome::Failed { reason: "timeout".into() };
        assert_eq!(failed.failure(), Some("timeout"));
        assert!(failed.copy().is_none());
        assert!(GenerationOutcome::Skipped.violations().is_none());
    }
}
