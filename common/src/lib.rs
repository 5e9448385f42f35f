//! Romance Copy Common Library
//!
//! 参照説明の照合・禁止語処理・プロンプト生成など、
//! CLIから使うI/Oを持たないロジック

pub mod audit;
pub mod brand;
pub mod corpus;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod prompts;
pub mod sanitizer;
pub mod similarity;
pub mod types;

pub use audit::{count_sentences, SentenceCheck, EXPECTED_SENTENCES};
pub use brand::{BrandProfile, PRESET_NAMES};
pub use corpus::ReferenceCorpus;
pub use error::{Error, Result};
pub use matcher::{find_match, MatchResult, MatchType};
pub use parser::{extract_json, parse_generation_response, GeneratedCopy};
pub use prompts::{build_system_prompt, build_user_prompt, CopyStyle, PromptContext};
pub use sanitizer::{dedup_and_clean, find_violations, strip_blacklist, strip_blacklist_raw, Blacklist};
pub use similarity::similarity;
pub use types::{AttributeValue, ProductRecord, ReferenceRow, ReferenceSheet};
