use std::sync::LazyLock;

use regex::Regex;

/// Markdown code fence, optionally tagged `sql`.
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(sql)?").expect("code fence pattern should compile"));

/// Escaped underscore sequence that language models sometimes emit for identifiers.
pub const ESCAPED_UNDERSCORE: &str = "\\_";

/// Literal triple-quote delimiter left over from docstring-style prompts.
pub const TRIPLE_QUOTE: &str = "\"\"\"";

/// Remove markdown code fences (```` ``` ```` and ```` ```sql ````) from a query.
///
/// Removal is repeated until no fence remains, so the result is a fixed point:
/// `clean_query(&clean_query(x)) == clean_query(x)` for every input.
pub fn clean_query(query: &str) -> String {
    let mut cleaned = CODE_FENCE.replace_all(query, "").into_owned();
    while CODE_FENCE.is_match(&cleaned) {
        cleaned = CODE_FENCE.replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

/// Collapse every run of whitespace into a single space and trim both ends.
///
/// Case is preserved; this is the normalization used by the passthrough rewriter.
pub fn collapse_whitespace(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalization used by join analysis: trimmed, whitespace-collapsed, upper-cased.
///
/// Offsets reported against this text are not comparable with offsets into the
/// caller's original string.
pub fn normalize_for_join_analysis(query: &str) -> String {
    collapse_whitespace(query.trim()).to_uppercase()
}

/// Strip literal `"""` delimiters and every semicolon.
pub fn strip_wrapper_artifacts(query: &str) -> String {
    query.replace(TRIPLE_QUOTE, "").replace(';', "")
}

/// True when the query contains at least one `\_` escape.
pub fn has_escaped_underscores(query: &str) -> bool {
    query.contains(ESCAPED_UNDERSCORE)
}

/// Replace every `\_` with a bare `_`.
pub fn unescape_underscores(query: &str) -> String {
    query.replace(ESCAPED_UNDERSCORE, "_")
}
