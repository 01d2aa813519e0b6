use std::sync::LazyLock;

use regex::Regex;

use crate::classifier::patterns::{DateFunctionReport, TextOffset, TokenMatch};
use crate::classifier::vocabulary::Vocabulary;

static DEFAULT_DETECTOR: LazyLock<DateFunctionDetector> = LazyLock::new(|| {
    DateFunctionDetector::new(&Vocabulary::new())
        .expect("built-in date vocabulary should compile")
});

/// Finds date/time functions and keywords by case-insensitive whole-word match.
///
/// Matching runs on the caller's raw text so reported offsets point into it.
#[derive(Debug, Clone)]
pub struct DateFunctionDetector {
    pattern: Regex,
}

impl DateFunctionDetector {
    /// Compile a detector for the vocabulary's date functions.
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, String> {
        if vocabulary.date_functions.is_empty() {
            return Err("Date function vocabulary is empty".to_string());
        }
        let alternatives = vocabulary
            .date_functions
            .iter()
            .map(|word| word_pattern(word))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternatives})\b"))
            .map_err(|e| format!("Failed to compile date function pattern: {e}"))?;
        Ok(Self { pattern })
    }

    /// Detector over the built-in vocabulary.
    pub fn builtin() -> Self {
        DEFAULT_DETECTOR.clone()
    }

    /// Scan `sql` for date/time tokens.
    pub fn check(&self, sql: &str) -> DateFunctionReport {
        let positions: Vec<TokenMatch> = self
            .pattern
            .find_iter(sql)
            .map(|m| TokenMatch {
                token: m.as_str().to_string(),
                offset: TextOffset::raw(m.start()),
            })
            .collect();

        let mut found_functions: Vec<String> = Vec::new();
        for m in &positions {
            if !found_functions.contains(&m.token) {
                found_functions.push(m.token.clone());
            }
        }

        DateFunctionReport {
            has_date_functions: !positions.is_empty(),
            found_functions,
            positions,
        }
    }
}

/// Escape one vocabulary entry; spaces inside multi-word entries match any whitespace run.
fn word_pattern(word: &str) -> String {
    word.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Scan `sql` with the built-in date vocabulary.
pub fn check_date_functions(sql: &str) -> DateFunctionReport {
    DEFAULT_DETECTOR.check(sql)
}

/// True when `sql` contains any built-in date/time token.
pub fn has_date_functions(sql: &str) -> bool {
    check_date_functions(sql).has_date_functions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tokens_with_raw_offsets() {
        let sql = "SELECT * FROM users WHERE created_at > current_date - INTERVAL '1 day'";
        let report = check_date_functions(sql);

        assert!(report.has_date_functions);
        assert_eq!(report.found_functions, vec!["current_date", "INTERVAL", "day"]);
        assert_eq!(report.positions[0].offset, TextOffset::raw(39));
        assert_eq!(&sql[39..51], "current_date");
    }

    #[test]
    fn prefers_longest_whole_word() {
        let report = check_date_functions("SELECT CURRENT_TIMESTAMP");
        assert_eq!(report.found_functions, vec!["CURRENT_TIMESTAMP"]);
    }

    #[test]
    fn ignores_partial_words() {
        let report = check_date_functions("SELECT birthday, ages, nowhere FROM people");
        assert!(!report.has_date_functions);
        assert!(report.positions.is_empty());
    }

    #[test]
    fn multi_word_keyword_spans_whitespace() {
        let report = check_date_functions("SELECT ts AT\n  TIME ZONE 'UTC' FROM t");
        assert_eq!(report.found_functions, vec!["AT\n  TIME ZONE"]);
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let mut vocab = Vocabulary::new();
        vocab.date_functions.clear();
        assert!(DateFunctionDetector::new(&vocab).is_err());
    }
}
