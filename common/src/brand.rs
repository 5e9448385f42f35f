//! ブランドプロファイル
//!
//! ブランドごとに異なる設定（ワークブック、ルール文書、シート名、列名、
//! 除外属性、禁止語）を1つの値にまとめる。組み込みプリセットまたはJSONから読み込む。

use crate::error::{Error, Result};
use crate::prompts::CopyStyle;
use crate::sanitizer::Blacklist;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 組み込みプリセット名
pub const PRESET_NAMES: &[&str] = &["spade", "coach"];

/// プロンプトに渡さない属性（共通）
const DEFAULT_EXCLUDED_ATTRIBUTES: &[&str] = &[
    "What Fits Inside - en",
    "Iteration",
    "Tech Fit - en",
    "Primary Digital Asset URL",
    "Non-Primary Digital Asset URL",
];

const SPADE_BLACKLIST: &[&str] = &[
    "earned a treat", "NO.really", "s.a.l.e.", "expires", "celebrating", "psst",
    "customer", "hello", "sale on sale", "leaving soon", "Rewarding", "surprise",
    "elevate", "girl on the go", "hang", "you've bagged", "it's your final chance",
    "treating you to code", "e_legance", "elegant", "hot", "vintage", "discount",
    "attention", "you have", "glamorous", "kitsch", "lady", "splurge", "Official",
    "we're releasing", "discover", "ob_sessed", "got to", "major bag alert", "Officially",
    "releasing", "open immediately", "retro", "Win", "edgy", "all for you",
    "you're getting", "order today", "utterly", "#win", "open asap", "now trending",
    "confirm", "Announcement", "chic", "deal", "1-day", "yes", "all caps",
    "Announcing", "officially in stock", "adorable", "(1-day special!)", "take",
    "Lucky you", "Score", "cute", "fresh", "released", "explore", "presenting",
    "all eyes on", "classy", "gorgeous", "markdown", "Checkout", "no joke",
    "for you", "awesome", "hung", "Babe", "redeem", "Oooh", "get one",
    "is sure to excite", "smile", "snack", "hey", "reserved", "make one yours",
    "nice", "Knott", "as a thank you", "calling your name", "P_ssst", "Psst",
    "view", "tons", "oh", "no", "earn", "just in", "flirty", "secure",
    "hello gorgeous", "oof", "glow on", "just reduced", "sexy", "Deserve",
    "hello", "gorgeous", "sale just dropped", "buy more", "save more", "unlock",
    "name a more iconic", "Shop", "kind of time-sensitive", "we're confirming",
    "offering", "treat", "duo", "Styles made to last", "must-have", "alert",
    "compliments of us", "claim", "New you", "Enhance", "special message",
    "you're receiving", "upgraded", "we're giving you", "One-day", "No exclusions",
    "special feature", "just-reduced", "shipment", "hi there", "Snag", "Expires",
    "girl", "sale confirmed", "wristlet", "Hey you", "Continue", "Leaving soon",
    "because you rock", "you've secured", "all emojis", "Landed", "check out",
    "It's your final chance", "the modern woman", "fashion-forward individual", "smart",
    "PVC", "sophisticated", "modern wardrobe", "luxurious", "logo",
    "logo embellishment", "Saffiano PVC", "the modern woman", "smart",
    "sophisticated", "fashion-forward individual", "modern wardrobe", "sophistication",
    "we", "casual day", "flair", "causal outings", "casual",
    "brighter days", "metal material", "sophistication", "trust us", "day party",
    "fashion-savvy individual", "elegance", "elegant", "modern fashion", "modern",
    "precision edge painting",
];

const COACH_BLACKLIST: &[&str] = &[
    "inspired by", "chic", "exudes sophistication", "gen-z customer", "gen-z",
    "aesthetic", "affordable", "ageless", "body", "chic", "coachie", "couture",
    "craftsman", "customer", "cute", "dainty", "daintier", "darling", "deal",
    "delightful", "designer", "discount", "disruptive", "don", "donning",
    "easy win", "elegant", "elegance", "embellished", "enchanting", "engineered",
    "eternal", "expressive luxury", "fabulous", "fabulousness", "fashion",
    "fashion lover", "fashionista", "fave", "footwear", "gang", "gender-neutral",
    "handbag", "hot", "it bag", "it girl", "it’s giving", "jet-set", "lovely",
    "multifunctional", "must have", "new you", "obsess", "obsessed", "mindful",
    "green", "conscious", "eco-conscious", "pioneering", "pleasing", "pretty",
    "purse", "quiet luxury", "sale", "sassy", "savage", "sensations", "sleek",
    "splendid", "sueded", "sustainable", "szn", "tender", "treasures",
    "trendsetter", "turn heads", "unearth", "unveil", "unveiling", "uptown style",
    "downtown style", "urban", "vibes", "but make it fashion", "meet",
    "experience", "introducing", "just", "literally", "figuratively",
    "audacious", "pvc", "PVC", "mundane", "nitty-gritties", "beauty scores",
    "best", "boast", "booster", "statement", "promise", "declaration", "go-to",
    "taste", "impeccable", "pretty face", "testament", "touches", "must-have",
    "impraczcal", "unassuming", "overlook", "unusual", "friend", "flair",
    "fierce", "efforzless", "glamour", "outing", "fashionable", "stylish",
    "more than a pretty face", "your new best friend", "accessories collection",
    "boasts", "modern fashion", "this is Coach Outlet's promise to you",
    "declaration of style", "testament to your impeccable taste",
    "finishing touches from Coach Outlet", "fashion adventures", "flair",
    "audacious modern style", "this beauty scores high", "meziculously",
    "captivating", "aesthetics", "simplicity and class", "dash of the unusual",
    "crafted to fulfill", "unassuming elegance", "it's impractical to overlook",
    "sexy", "let's talk about", "inspiration can come", "fall in love",
    "inspiration can strike", "picture this", "picture themselves", "imagine",
    "bio-attributed", "bio-based", "biodegradable", "bio-finished",
    "carbon neutral", "certified b corp", "chemical recycling", "circular",
    "closed loop", "compostable", "fair trade", "FSC", "forest stewardship",
    "council", "mechanical recycling", "natural", "PEFC", "recyclable",
    "upcycled", "SFI", "responsible", "synthetic", "traceable", "transparent",
    "vegan", "zero waste",
];

fn default_reference_sheets() -> Vec<String> {
    vec!["Model Training".into(), "Full Catalog Short Descriptions".into()]
}

fn default_input_sheets() -> Vec<String> {
    vec!["1 New Romance Copy Generation".into()]
}

fn default_group_column() -> String {
    "Mega PDP Group Value".into()
}

fn default_description_column() -> String {
    "Short Description - en".into()
}

fn default_id_column() -> String {
    "Item#".into()
}

fn default_name_column() -> String {
    "Web Product Name - en".into()
}

fn default_excluded_attributes() -> Vec<String> {
    DEFAULT_EXCLUDED_ATTRIBUTES.iter().map(|s| s.to_string()).collect()
}

/// ブランドプロファイル
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandProfile {
    /// プロンプト中のブランド名
    pub name: String,
    /// 参照シートと入力シートを含むワークブック
    pub workbook: PathBuf,
    /// ルール文書（.docx またはテキスト）
    pub rules: PathBuf,
    /// 参照シート（検索順）
    #[serde(default = "default_reference_sheets")]
    pub reference_sheets: Vec<String>,
    /// 生成対象シート
    #[serde(default = "default_input_sheets")]
    pub input_sheets: Vec<String>,
    #[serde(default = "default_group_column")]
    pub group_column: String,
    #[serde(default = "default_description_column")]
    pub description_column: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_excluded_attributes")]
    pub excluded_attributes: Vec<String>,
    #[serde(default)]
    pub style: CopyStyle,
    #[serde(default)]
    pub blacklist: Vec<String>,
}

impl BrandProfile {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "spade" | "kate spade" => Some(Self::spade_preset()),
            "coach" | "coach outlet" => Some(Self::coach_preset()),
            _ => None,
        }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    /// プリセット名またはJSONファイルパスから解決
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if let Some(profile) = Self::from_preset(name_or_path) {
            return Ok(profile);
        }
        let path = Path::new(name_or_path);
        if path.is_file() {
            return Self::from_file(path);
        }
        Err(Error::Config(format!(
            "不明なブランド '{}' ({} またはプロファイルJSONのパス)",
            name_or_path,
            PRESET_NAMES.join("/")
        )))
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("ブランド名が空です".into()));
        }
        if self.reference_sheets.is_empty() {
            return Err(Error::Config(format!("{}: 参照シートが指定されていません", self.name)));
        }
        if self.group_column.is_empty() || self.description_column.is_empty() {
            return Err(Error::Config(format!("{}: 列名が空です", self.name)));
        }
        Ok(())
    }

    /// コンパイル済みの禁止語
    pub fn compiled_blacklist(&self) -> Blacklist {
        Blacklist::new(&self.blacklist)
    }

    /// 属性をプロンプトから除外するか
    pub fn is_excluded(&self, attribute: &str) -> bool {
        self.excluded_attributes.iter().any(|a| a == attribute)
    }

    fn base(name: &str, workbook: &str, rules: &str, style: CopyStyle, blacklist: &[&str]) -> Self {
        Self {
            name: name.into(),
            workbook: PathBuf::from(workbook),
            rules: PathBuf::from(rules),
            reference_sheets: default_reference_sheets(),
            input_sheets: default_input_sheets(),
            group_column: default_group_column(),
            description_column: default_description_column(),
            id_column: default_id_column(),
            name_column: default_name_column(),
            excluded_attributes: default_excluded_attributes(),
            style,
            blacklist: blacklist.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Kate Spade 用プリセット
    fn spade_preset() -> Self {
        Self::base(
            "Spade",
            "Documents/POC Product Selection- Kate Spade.xlsx",
            "Documents/Kate Spade Rules_new.docx",
            CopyStyle::Description,
            SPADE_BLACKLIST,
        )
    }

    /// Coach Outlet 用プリセット
    fn coach_preset() -> Self {
        Self::base(
            "Coach",
            "Documents/POC Product Selection- Coach Outlet.xlsx",
            "Documents/Coach Rules_new.docx",
            CopyStyle::Tagline,
            COACH_BLACKLIST,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let spade = BrandProfile::from_preset("Spade").unwrap();
        assert_eq!(spade.name, "Spade");
        assert_eq!(spade.reference_sheets, vec!["Model Training", "Full Catalog Short Descriptions"]);
        assert!(spade.blacklist.iter().any(|p| p == "s.a.l.e."));
        assert!(spade.is_excluded("Iteration"));
        assert!(!spade.is_excluded("Mega PDP Group Value"));

        let coach = BrandProfile::from_preset("coach outlet").unwrap();
        assert_eq!(coach.style, CopyStyle::Tagline);
        assert!(coach.blacklist.iter().any(|p| p == "zero waste"));

        assert!(BrandProfile::from_preset("unknown").is_none());
    }

    #[test]
    fn test_preset_blacklists_compile() {
        for name in PRESET_NAMES {
            let profile = BrandProfile::from_preset(name).unwrap();
            let blacklist = profile.compiled_blacklist();
            assert!(!blacklist.is_empty());
            assert!(!blacklist.find_violations("A chic bag").is_empty());
        }
    }

    #[test]
    fn test_from_json_with_defaults() {
        let json = r#"{
            "name": "Acme",
            "workbook": "acme.xlsx",
            "rules": "acme.txt",
            "blacklist": ["cheap"]
        }"#;
        let profile = BrandProfile::from_json(json).unwrap();
        assert_eq!(profile.group_column, "Mega PDP Group Value");
        assert_eq!(profile.input_sheets, vec!["1 New Romance Copy Generation"]);
        assert_eq!(profile.style, CopyStyle::Description);
        assert_eq!(profile.blacklist, vec!["cheap"]);
    }

    #[test]
    fn test_from_json_rejects_empty_name() {
        let json = r#"{"name": " ", "workbook": "a.xlsx", "rules": "a.txt"}"#;
        let err = BrandProfile::from_json(json).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_resolve_unknown() {
        let err = BrandProfile::resolve("no-such-brand-or-file").unwrap_err();
        assert!(err.to_string().contains("no-such-brand-or-file"));
    }
}
