//! プロンプト生成モジュール
//!
//! - CopyStyle: 生成するコピーの種類と応答フィールド
//! - build_user_prompt: 指示・ルール・参考説明・SEO・商品属性・禁止語・応答形式
//! - build_system_prompt: ブランド編集者としての役割と禁止語

use crate::brand::BrandProfile;
use crate::error::Error;
use crate::sanitizer::Blacklist;
use crate::types::ProductRecord;
use serde::{Deserialize, Serialize};

/// SEOキーワードの応答フィールド
pub const SEO_FIELDS: [&str; 3] = ["SEO Keyword 1", "SEO Keyword 2", "SEO Keyword 3"];

/// 生成するコピーの種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStyle {
    /// 1段落の商品説明
    #[default]
    Description,
    /// 編集タグラインと Gen Z 向けバリエーション
    Tagline,
}

impl CopyStyle {
    /// 応答JSONのテキストフィールド
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            CopyStyle::Description => &["product_description"],
            CopyStyle::Tagline => &["editorial_tagline", "editorial_tagline_genz_variation"],
        }
    }

    /// プロンプト中の呼び方
    fn noun(&self) -> &'static str {
        match self {
            CopyStyle::Description => "product description",
            CopyStyle::Tagline => "tagline",
        }
    }
}

impl std::str::FromStr for CopyStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "description" => Ok(CopyStyle::Description),
            "tagline" => Ok(CopyStyle::Tagline),
            other => Err(Error::Parse(format!("unknown copy style '{}' (description/tagline)", other))),
        }
    }
}

impl std::fmt::Display for CopyStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyStyle::Description => write!(f, "description"),
            CopyStyle::Tagline => write!(f, "tagline"),
        }
    }
}

/// プロンプト生成に必要なブランド側の情報
pub struct PromptContext<'a> {
    pub brand: &'a BrandProfile,
    pub rules: &'a str,
    pub blacklist: &'a Blacklist,
    pub style: CopyStyle,
}

/// 文字列リストを `["a", "b"]` 形式で出力
fn json_list<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|s| serde_json::Value::String(s.as_ref().to_string()).to_string())
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn instructions(ctx: &PromptContext) -> Vec<String> {
    let brand = &ctx.brand.name;
    match ctx.style {
        CopyStyle::Description => vec![
            format!("1. Follow {brand} writer guidelines exactly to craft a single-paragraph (120–150 words) product description."),
            "2. Use a friendly, confident, playful tone. Refer to the reader as 'you' (max once), and to us as 'we'.".into(),
            "3. Refer to the product first by **collection name + silhouette** (e.g., 'Clare crossbody'); use the full web product name only if needed.".into(),
            "4. Begin with varied lifestyle-focused openers like 'Our', 'The', 'Your go-to,' 'Keeps up with,' or 'Makes... effortless.' Avoid overusing 'transforms.'".into(),
            "5. Follow this exact order: material & craft → what it holds → pockets & organization → closure → versatility → flair & finish → styling tip (mandatory).".into(),
            "6. Use active voice (e.g., 'Made from'), AP style (no Oxford commas, standard capitalization).".into(),
            "7. Seamlessly weave in required attributes (materials, additional features, functionality, additional short description) only if not already covered.".into(),
            "8. Integrate SEO phrases naturally (e.g., 'small crossbody bag for work'); avoid generic terms.".into(),
            "9. Do not repeat any word more than twice. Avoid overusing 'perfect for.'".into(),
            "10. Avoid blacklisted phrases (e.g., 'picture this'), city or outfit references, generic brand mentions, style numbers, dimensions, tech specs, or demographic labels.".into(),
            "**All instructions must be followed exactly, no exceptions.**".into(),
        ],
        CopyStyle::Tagline => vec![
            "1. You are given a set of rules. Follow them exactly to generate a new tagline.".into(),
            "2. Do NOT repeat any word in the tagline.".into(),
            "3. Do NOT include the phrase “what fits inside.”".into(),
            "4. Do NOT include any city-specific references.".into(),
            "5. Do NOT mention pairing dress or attire.".into(),
            "6. Do NOT use general phrases, be product-specific.".into(),
            "7. Maintain a natural, authentic tone.".into(),
            "8. Historical Artifacts should be mentioned from the sample description only.".into(),
            "9. Strictly avoid all blacklisted words (severe penalty for violations).".into(),
            "10. Use Natural and Effortless tone. Do NOT use generic terms.".into(),
            "11. Content in the tagline about the product should be in third party, and address the customer as 'you'. 'you' must be used a maximum of once per tagline.".into(),
            "**You must follow Instructions and rules at any cost, else you will be heavily penalized.**".into(),
        ],
    }
}

/// 商品属性をプロンプト用の行に変換
///
/// 除外属性と空値（空文字・NaN・欠損）は出力しない。文字列以外はJSON表現にし、
/// 禁止語を除去してから JSON 文字列として2スペース字下げで出力する。
pub fn attribute_lines(product: &ProductRecord, brand: &BrandProfile, blacklist: &Blacklist) -> Vec<String> {
    product
        .attributes
        .iter()
        .filter(|(key, _)| !brand.is_excluded(key))
        .filter(|(_, value)| !value.is_blank())
        .map(|(key, value)| {
            let cleaned = blacklist.strip(&value.to_prompt_text());
            let quoted = serde_json::Value::String(cleaned).to_string();
            format!("- {}:\n  {}", key, quoted)
        })
        .collect()
}

fn response_format(style: CopyStyle) -> Vec<String> {
    let mut lines = vec![
        "Format your response exactly like this (so it’s easy to parse):\n".to_string(),
        "```json".into(),
        "{".into(),
    ];
    for field in style.fields() {
        lines.push(format!("  \"{}\": \"...\",", field));
    }
    for (i, field) in SEO_FIELDS.iter().enumerate() {
        let comma = if i + 1 < SEO_FIELDS.len() { "," } else { "" };
        lines.push(format!("  \"{}\": [\"...\", \"...\", \"...\"]{}", field, comma));
    }
    lines.push("}".into());
    lines.push("```".into());
    lines
}

/// ユーザープロンプト生成
///
/// # Arguments
/// * `ctx` - ブランド・ルール・禁止語・スタイル
/// * `samples` - 禁止語除去済みの参考説明
/// * `product` - 対象商品
pub fn build_user_prompt(ctx: &PromptContext, samples: &[String], product: &ProductRecord) -> String {
    let noun = ctx.style.noun();
    let mut prompt: Vec<String> = vec!["Instructions:".into()];
    prompt.extend(instructions(ctx));
    prompt.extend([
        "####".to_string(),
        "Rules:".into(),
        ctx.rules.to_string(),
        "####".into(),
    ]);

    if !samples.is_empty() {
        prompt.push(format!(
            "**Use the sample description below as a guide to frame the {noun}. Ensure the new {noun} mirrors the tone and style of the sample. Do not use blacklisted words. Only include historical artifacts if they are mentioned in the sample.**"
        ));
        prompt.push(json_list(samples));
    }

    prompt.extend([
        "####".to_string(),
        "SEO Guidance:".into(),
        "Generate an SEO keyword list.".into(),
        "Keywords should be specific to the product and not generic.".into(),
        format!("Keyword Hierarchy (incorporate these into your {noun} where natural):"),
        "- **Primary Keywords** - Describing product type (example - Flap shoulder bag, Colorblocked bag, Convertible bag)".into(),
        "- **Secondary Keywords** - Describing characteristics (example - Pebbled leather, Colorblocked leather, Classic flap silhouette, Adjustable crossbody strap, Convertible design)".into(),
        "- **Tertiary Keywords** - Describing function - (example - Optional crossbody strap, Everyday bag, Versatile handbag)".into(),
        "####".into(),
        "Below are the attributes for the product:".into(),
    ]);

    prompt.extend(attribute_lines(product, ctx.brand, ctx.blacklist));

    prompt.extend([
        "####".to_string(),
        "Before generating, STRICTLY ENSURE none of the following blacklisted words appear in ANY output.".into(),
        "\n".into(),
        format!("**Blacklisted Words (JSON array)**: **{}**", json_list(ctx.blacklist.phrases())),
        "####".into(),
    ]);

    if ctx.style == CopyStyle::Tagline {
        prompt.extend([
            "Generate 2 taglines:\n".to_string(),
            "1. The main editorial tagline.\n".into(),
            "2. A Gen Z–appealing variation of the editorial tagline.\n".into(),
            "Do NOT use any blacklisted keywords in any of the taglines.".into(),
        ]);
    } else {
        prompt.push(format!("Do NOT use any blacklisted keywords in the {noun}."));
    }
    prompt.push(format!("Always generate the {noun} in 4 sentences."));

    prompt.extend(response_format(ctx.style));
    prompt.join("\n")
}

/// システムプロンプト生成
pub fn build_system_prompt(ctx: &PromptContext) -> String {
    let noun = ctx.style.noun();
    let mut lines = vec![
        format!(
            "You are a world-class luxury fashion editor for {}. Do NOT add any blacklisted words in the {}.",
            ctx.brand.name, noun
        ),
        "Instructions:".into(),
    ];
    lines.extend(instructions(ctx));
    lines.push("####".into());
    lines.push(format!("Blacklisted Keywords: {}", json_list(ctx.blacklist.phrases())));
    lines.join("\n")
}
