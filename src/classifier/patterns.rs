use serde::Serialize;
use std::fmt;

/// Which text an evidence offset points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetSpace {
    /// The caller's original, unnormalized query text.
    Raw,
    /// The trimmed, whitespace-collapsed, upper-cased text used for join analysis.
    Normalized,
}

impl fmt::Display for OffsetSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffsetSpace::Raw => write!(f, "raw"),
            OffsetSpace::Normalized => write!(f, "normalized"),
        }
    }
}

/// Byte position of a piece of evidence, tagged with the text it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextOffset {
    /// Text the position is relative to.
    pub space: OffsetSpace,
    /// Byte offset into that text.
    pub position: usize,
}

impl TextOffset {
    /// Offset into the caller's original text.
    pub fn raw(position: usize) -> Self {
        Self {
            space: OffsetSpace::Raw,
            position,
        }
    }

    /// Offset into the join-analysis normalized text.
    pub fn normalized(position: usize) -> Self {
        Self {
            space: OffsetSpace::Normalized,
            position,
        }
    }
}

impl fmt::Display for TextOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.position, self.space)
    }
}

/// One matched token together with where it was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenMatch {
    /// Matched text exactly as it appears in the query.
    pub token: String,
    /// Where the match starts.
    pub offset: TextOffset,
}

/// Result of scanning a query for date/time functions and keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateFunctionReport {
    /// Whether at least one date/time token was found.
    pub has_date_functions: bool,
    /// Distinct matched tokens, in order of first appearance.
    pub found_functions: Vec<String>,
    /// Every match, ascending by offset.
    pub positions: Vec<TokenMatch>,
}

/// A JSON operator found in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonOperatorMatch {
    /// Operator text, e.g. `->>`.
    pub operator: String,
    /// Human-readable meaning of the operator.
    pub description: String,
    /// First occurrence.
    pub offset: TextOffset,
    /// Number of non-overlapping occurrences.
    pub occurrences: usize,
}

/// A JSON function or type cast found in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonTokenMatch {
    /// Vocabulary entry that matched (function name or cast marker).
    pub name: String,
    /// First occurrence.
    pub offset: TextOffset,
    /// Number of non-overlapping occurrences.
    pub occurrences: usize,
}

/// Result of scanning a query for JSON operators, functions, and casts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonOperationReport {
    /// Whether any JSON operator, function, or cast was found.
    pub contains_json: bool,
    /// Operators found, ascending by first offset.
    pub operators_found: Vec<JsonOperatorMatch>,
    /// Functions found, ascending by first offset.
    pub functions_found: Vec<JsonTokenMatch>,
    /// `::json` / `::jsonb` casts found, ascending by first offset.
    pub type_casts: Vec<JsonTokenMatch>,
    /// Summary lines, one per non-empty evidence category.
    pub details: Vec<String>,
}

impl JsonOperationReport {
    /// Operator texts in report order.
    pub fn operators(&self) -> Vec<&str> {
        self.operators_found
            .iter()
            .map(|m| m.operator.as_str())
            .collect()
    }

    /// Function names in report order.
    pub fn functions(&self) -> Vec<&str> {
        self.functions_found.iter().map(|m| m.name.as_str()).collect()
    }

    /// Cast markers in report order.
    pub fn casts(&self) -> Vec<&str> {
        self.type_casts.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Syntactic shape of an inner join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// `INNER JOIN t ON ...`
    Explicit,
    /// Any `JOIN t ON ...`, with or without a qualifier in front
    Implicit,
    /// Legacy `FROM a, b WHERE ...`
    ImplicitComma,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Explicit => write!(f, "explicit"),
            JoinKind::Implicit => write!(f, "implicit"),
            JoinKind::ImplicitComma => write!(f, "implicit_comma"),
        }
    }
}

/// One join found by the join shape detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinDescriptor {
    /// Shape of the join.
    pub kind: JoinKind,
    /// Joined table for `explicit`/`implicit`; both tables for `implicit_comma`.
    pub tables: Vec<String>,
    /// Alias declared with `AS`, for `explicit`/`implicit` joins.
    pub alias: Option<String>,
    /// Join condition, with any trailing clause trimmed off.
    pub condition: String,
    /// Start of the match in the normalized text.
    pub offset: TextOffset,
}

impl JoinDescriptor {
    /// The joined table (first table for comma joins).
    pub fn table(&self) -> Option<&str> {
        self.tables.first().map(String::as_str)
    }
}

/// Result of scanning a query for inner join shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Whether any join was found.
    pub has_joins: bool,
    /// Joins ascending by offset in `normalized_query`.
    pub joins: Vec<JoinDescriptor>,
    /// The text the offsets refer to.
    pub normalized_query: String,
}

impl JoinReport {
    /// Number of joins found.
    pub fn join_count(&self) -> usize {
        self.joins.len()
    }
}

/// A detector whose verdict can trigger native execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Date/time functions or keywords.
    DateFunctions,
    /// JSON operators, functions, or casts.
    JsonOperations,
    /// Inner join shapes.
    Joins,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::DateFunctions => write!(f, "date functions"),
            Signal::JsonOperations => write!(f, "JSON operations"),
            Signal::Joins => write!(f, "joins"),
        }
    }
}

/// Which detector signals feed the native execution decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Only JSON detection routes a query to native execution.
    #[default]
    Json,
    /// Any of the date, JSON, or join detectors routes a query to native execution.
    All,
}

impl RoutingPolicy {
    /// Whether the given signal participates in the decision under this policy.
    pub fn considers(self, signal: Signal) -> bool {
        match self {
            RoutingPolicy::Json => signal == Signal::JsonOperations,
            RoutingPolicy::All => true,
        }
    }
}

impl fmt::Display for RoutingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingPolicy::Json => write!(f, "json"),
            RoutingPolicy::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for RoutingPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(RoutingPolicy::Json),
            "all" => Ok(RoutingPolicy::All),
            _ => Err(format!("Invalid routing policy: {s}")),
        }
    }
}

/// Combined outcome of all detectors for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeExecutionVerdict {
    /// Whether the query should be routed to the source database.
    pub needs_native_execution: bool,
    /// Policy the decision was made under.
    pub policy: RoutingPolicy,
    /// Positive signals that the policy considers, in detector order.
    pub signals: Vec<Signal>,
    /// Date/time detector evidence.
    pub date: DateFunctionReport,
    /// JSON detector evidence.
    pub json: JsonOperationReport,
    /// Join detector evidence.
    pub joins: JoinReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_policy_parses_case_insensitively() {
        assert_eq!("JSON".parse::<RoutingPolicy>(), Ok(RoutingPolicy::Json));
        assert_eq!("all".parse::<RoutingPolicy>(), Ok(RoutingPolicy::All));
        assert!("dates".parse::<RoutingPolicy>().is_err());
    }

    #[test]
    fn json_policy_only_considers_json_signal() {
        assert!(RoutingPolicy::Json.considers(Signal::JsonOperations));
        assert!(!RoutingPolicy::Json.considers(Signal::DateFunctions));
        assert!(!RoutingPolicy::Json.considers(Signal::Joins));
        assert!(RoutingPolicy::All.considers(Signal::Joins));
    }

    #[test]
    fn offsets_display_their_space() {
        assert_eq!(TextOffset::raw(4).to_string(), "4 (raw)");
        assert_eq!(TextOffset::normalized(9).to_string(), "9 (normalized)");
    }
}
