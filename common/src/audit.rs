//! 生成コピーの事後チェック
//!
//! - 文数カウント（`.` `!` `?` の直後が空白または末尾で区切る）
//! - 期待文数との比較

use regex::Regex;

/// 期待する文数
pub const EXPECTED_SENTENCES: usize = 4;

/// 文数を数える
pub fn count_sentences(text: &str) -> usize {
    lazy_static::lazy_static! {
        static ref SENTENCE_END_RE: Regex = Regex::new(r"[.!?](?:\s|$)").unwrap();
    }

    SENTENCE_END_RE
        .split(text.trim())
        .filter(|s| !s.trim().is_empty())
        .count()
}

/// 文数チェック結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceCheck {
    Ok,
    TooFew(usize),
    TooMany(usize),
}

impl SentenceCheck {
    pub fn evaluate(text: &str, expected: usize) -> Self {
        let count = count_sentences(text);
        match count.cmp(&expected) {
            std::cmp::Ordering::Equal => SentenceCheck::Ok,
            std::cmp::Ordering::Less => SentenceCheck::TooFew(count),
            std::cmp::Ordering::Greater => SentenceCheck::TooMany(count),
        }
    }
}

impl std::fmt::Display for SentenceCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SentenceCheck::Ok => write!(f, "OK"),
            SentenceCheck::TooFew(n) => write!(f, "Too few ({})", n),
            SentenceCheck::TooMany(n) => write!(f, "Too many ({})", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sentences() {
        assert_eq!(count_sentences("One. Two! Three? Four."), 4);
        assert_eq!(count_sentences(""), 0);
        assert_eq!(count_sentences("   "), 0);
        assert_eq!(count_sentences("No terminal punctuation"), 1);
    }

    #[test]
    fn test_abbreviation_inside_word_is_not_a_break() {
        // "." の直後が空白でなければ区切らない
        assert_eq!(count_sentences("Made in the U.S.A. for you."), 2);
        assert_eq!(count_sentences("Version 2.0 is here."), 1);
    }

    #[test]
    fn test_sentence_check_verdicts() {
        assert_eq!(SentenceCheck::evaluate("A. B. C. D.", 4), SentenceCheck::Ok);
        assert_eq!(SentenceCheck::evaluate("A. B.", 4), SentenceCheck::TooFew(2));
        assert_eq!(SentenceCheck::evaluate("A. B. C. D. E.", 4), SentenceCheck::TooMany(5));
        assert_eq!(SentenceCheck::TooFew(2).to_string(), "Too few (2)");
        assert_eq!(SentenceCheck::Ok.to_string(), "OK");
    }
}
