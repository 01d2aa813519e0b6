use serde::Serialize;

use crate::classifier::native_execution::NativeExecutionClassifier;
use crate::classifier::patterns::NativeExecutionVerdict;
use crate::parser::preprocess::clean_query;
use crate::rewriter::transformer::{self, TransformedQuery};

/// Everything learned about one incoming query on its way to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnalysis {
    /// Caller-chosen name for the query (file stem, `query`, `tool_input`, ...).
    pub label: String,
    /// Query as received.
    pub original: String,
    /// Query with markdown fences removed.
    pub cleaned: String,
    /// Detector evidence and routing decision for `cleaned`.
    pub verdict: NativeExecutionVerdict,
    /// Passthrough rewrite, present when the verdict asked for native execution.
    pub rewrite: Option<TransformedQuery>,
}

impl QueryAnalysis {
    /// Text to hand to the parser: the rewrite when there is one, else the cleaned query.
    pub fn candidate_sql(&self) -> &str {
        self.rewrite
            .as_ref()
            .map_or(self.cleaned.as_str(), |rewrite| rewrite.sql.as_str())
    }

    /// Source database the query was routed to, if it was wrapped.
    pub fn passthrough_database(&self) -> Option<&str> {
        self.rewrite.as_ref().and_then(|r| r.database.as_deref())
    }
}

/// Clean `raw`, classify it, and rewrite it when the classifier asks for native execution.
pub fn analyze_query(
    label: impl Into<String>,
    raw: &str,
    classifier: &NativeExecutionClassifier,
) -> QueryAnalysis {
    let cleaned = clean_query(raw);
    let verdict = classifier.classify(&cleaned);
    let rewrite = verdict
        .needs_native_execution
        .then(|| transformer::rewrite(&cleaned));

    QueryAnalysis {
        label: label.into(),
        original: raw.to_string(),
        cleaned,
        verdict,
        rewrite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::patterns::RoutingPolicy;

    #[test]
    fn json_query_is_cleaned_and_rewritten() {
        let classifier = NativeExecutionClassifier::builtin(RoutingPolicy::Json);
        let analysis = analyze_query(
            "q",
            "```sql\nSELECT doc->>'a' FROM shop.orders\n```",
            &classifier,
        );

        assert_eq!(analysis.passthrough_database(), Some("shop"));
        assert_eq!(
            analysis.candidate_sql(),
            "SELECT * FROM shop(SELECT doc->>'a' FROM orders);"
        );
    }

    #[test]
    fn plain_query_passes_through_cleaned_only() {
        let classifier = NativeExecutionClassifier::builtin(RoutingPolicy::Json);
        let analysis = analyze_query("q", "```SELECT  id FROM shop.orders```", &classifier);

        assert!(analysis.rewrite.is_none());
        assert_eq!(analysis.candidate_sql(), "SELECT  id FROM shop.orders");
    }
}
