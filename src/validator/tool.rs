use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::classifier::native_execution::NativeExecutionClassifier;
use crate::parser::sql_parser::{SqlParser, SqlparserBackend};
use crate::pipeline::analyze_query;
use crate::validator::validate_query;

/// Action name exposed to the agent unless overridden.
pub const DEFAULT_TOOL_NAME: &str = "sql_parser_tool";
/// Action description exposed to the agent unless overridden.
pub const DEFAULT_TOOL_DESCRIPTION: &str =
    "Parse a SQL query to check it is valid SQL for the federated query engine.";
/// Parser dialect used unless overridden.
pub const DEFAULT_DIALECT: &str = "generic";

/// The action's single input field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInput {
    /// A SQL query to validate.
    #[serde(default)]
    pub tool_input: String,
}

/// Result of one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Canonical text of the accepted query.
    Valid(String),
    /// Parser diagnostic for the last rejected candidate.
    Invalid(String),
}

impl ToolOutcome {
    /// Whether the query was accepted.
    pub fn is_valid(&self) -> bool {
        matches!(self, ToolOutcome::Valid(_))
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutcome::Valid(canonical) => write!(f, "valid query: {canonical}"),
            ToolOutcome::Invalid(error) => write!(f, "invalid query, with error: {error}"),
        }
    }
}

/// Validation action for a language-model agent.
///
/// Cleans the input, routes it through the native execution classifier,
/// rewrites it into a passthrough query when needed, and validates the result
/// with the parser (retrying with unescaped underscores).
#[derive(Debug, Clone)]
pub struct SqlValidationTool<P = SqlparserBackend> {
    name: String,
    description: String,
    dialect: String,
    classifier: NativeExecutionClassifier,
    parser: P,
}

impl Default for SqlValidationTool<SqlparserBackend> {
    fn default() -> Self {
        Self::new(SqlparserBackend)
    }
}

impl<P: SqlParser> SqlValidationTool<P> {
    /// Tool with default name, description, dialect, and JSON-only routing.
    pub fn new(parser: P) -> Self {
        Self {
            name: DEFAULT_TOOL_NAME.to_string(),
            description: DEFAULT_TOOL_DESCRIPTION.to_string(),
            dialect: DEFAULT_DIALECT.to_string(),
            classifier: NativeExecutionClassifier::default(),
            parser,
        }
    }

    /// Override the action name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override the action description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Override the parser dialect.
    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// Override the classifier deciding when to rewrite for native execution.
    pub fn with_classifier(mut self, classifier: NativeExecutionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Action description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Parser dialect.
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Parser the candidates are handed to.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Validate `tool_input` and return the structured outcome.
    pub fn evaluate(&self, tool_input: &str) -> ToolOutcome {
        let analysis = analyze_query("tool_input", tool_input, &self.classifier);
        match validate_query(&self.parser, analysis.candidate_sql(), &self.dialect) {
            Ok(canonical) => ToolOutcome::Valid(canonical),
            Err(error) => ToolOutcome::Invalid(error),
        }
    }

    /// Validate `tool_input` and return the agent-facing text.
    pub fn run(&self, tool_input: &str) -> String {
        self.evaluate(tool_input).to_string()
    }

    /// Validate a JSON payload shaped like [`ToolInput`].
    pub fn run_json(&self, payload: &str) -> Result<String, String> {
        let input: ToolInput =
            serde_json::from_str(payload).map_err(|e| format!("Invalid tool input JSON: {e}"))?;
        Ok(self.run(&input.tool_input))
    }

    /// JSON schema of the action's input.
    pub fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "tool_input": {
                    "type": "string",
                    "description": "A SQL query to validate.",
                    "default": ""
                }
            }
        })
    }

    /// Name, description, and input schema in one document.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema(),
        })
    }
}
