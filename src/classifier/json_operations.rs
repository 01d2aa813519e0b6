//! JSON operator, function, and cast detection.
//!
//! All matching is plain substring search, not tokenization. The single `?`
//! operator therefore also fires on `?` inside string literals or on bind
//! placeholders, and `->` is reported alongside `->>`. Both are accepted for a
//! triage step that only decides whether to try native execution.

use std::sync::LazyLock;

use crate::classifier::patterns::{JsonOperationReport, JsonOperatorMatch, JsonTokenMatch, TextOffset};
use crate::classifier::vocabulary::Vocabulary;

static DEFAULT_DETECTOR: LazyLock<JsonOperationDetector> =
    LazyLock::new(|| JsonOperationDetector::new(Vocabulary::new()));

/// Finds JSON operators, functions, and type casts in raw query text.
#[derive(Debug, Clone)]
pub struct JsonOperationDetector {
    vocabulary: Vocabulary,
}

impl JsonOperationDetector {
    /// Detector over the given vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Scan `sql` for JSON usage.
    pub fn check(&self, sql: &str) -> JsonOperationReport {
        let mut operators_found: Vec<JsonOperatorMatch> = self
            .vocabulary
            .json_operators
            .iter()
            .filter_map(|op| {
                let (first, occurrences) = locate(sql, &op.operator)?;
                Some(JsonOperatorMatch {
                    operator: op.operator.clone(),
                    description: op.description.clone(),
                    offset: TextOffset::raw(first),
                    occurrences,
                })
            })
            .collect();
        operators_found.sort_by_key(|m| m.offset.position);

        // ASCII lowercasing keeps byte offsets aligned with the raw text.
        let lowered = sql.to_ascii_lowercase();
        let mut functions_found: Vec<JsonTokenMatch> = self
            .vocabulary
            .json_functions
            .iter()
            .filter_map(|name| {
                let (first, occurrences) = locate(&lowered, &name.to_ascii_lowercase())?;
                Some(JsonTokenMatch {
                    name: name.clone(),
                    offset: TextOffset::raw(first),
                    occurrences,
                })
            })
            .collect();
        functions_found.sort_by_key(|m| m.offset.position);

        let mut type_casts: Vec<JsonTokenMatch> = self
            .vocabulary
            .json_casts
            .iter()
            .filter_map(|cast| {
                let (first, occurrences) = locate(sql, cast)?;
                Some(JsonTokenMatch {
                    name: cast.clone(),
                    offset: TextOffset::raw(first),
                    occurrences,
                })
            })
            .collect();
        type_casts.sort_by_key(|m| m.offset.position);

        let contains_json =
            !operators_found.is_empty() || !functions_found.is_empty() || !type_casts.is_empty();

        let mut report = JsonOperationReport {
            contains_json,
            operators_found,
            functions_found,
            type_casts,
            details: Vec::new(),
        };
        report.details = summarize(&report);
        report
    }
}

/// First byte offset and non-overlapping occurrence count of `needle`.
fn locate(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let mut hits = haystack.match_indices(needle);
    let (first, _) = hits.next()?;
    Some((first, 1 + hits.count()))
}

fn summarize(report: &JsonOperationReport) -> Vec<String> {
    let mut details = Vec::new();
    if !report.operators_found.is_empty() {
        details.push(format!(
            "Found JSON operators: {}",
            report.operators().join(", ")
        ));
    }
    if !report.functions_found.is_empty() {
        details.push(format!(
            "Found JSON functions: {}",
            report.functions().join(", ")
        ));
    }
    if !report.type_casts.is_empty() {
        details.push(format!(
            "Found JSON type casts: {}",
            report.casts().join(", ")
        ));
    }
    details
}

/// Scan `sql` with the built-in JSON vocabulary.
pub fn analyze_json_operations(sql: &str) -> JsonOperationReport {
    DEFAULT_DETECTOR.check(sql)
}

/// True when `sql` uses any built-in JSON operator, function, or cast.
pub fn has_json(sql: &str) -> bool {
    analyze_json_operations(sql).contains_json
}
