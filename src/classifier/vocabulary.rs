use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Built-in date/time functions, clause names, and keywords.
pub const DATE_FUNCTIONS: &[&str] = &[
    // Current date/time
    "CURRENT_DATE",
    "CURRENT_TIME",
    "CURRENT_TIMESTAMP",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOW",
    // Constructors
    "MAKE_DATE",
    "MAKE_TIME",
    "MAKE_TIMESTAMP",
    "MAKE_TIMESTAMPTZ",
    // Part extraction
    "DATE_PART",
    "DATE_TRUNC",
    "EXTRACT",
    "CENTURY",
    "DECADE",
    "EPOCH",
    "YEAR",
    "MONTH",
    "DAY",
    "HOUR",
    "MINUTE",
    "SECOND",
    "MILLISECOND",
    "MICROSECOND",
    // Formatting
    "TO_CHAR",
    "TO_DATE",
    "TO_TIMESTAMP",
    // Calculations
    "AGE",
    "DATE_BIN",
    "JUSTIFY_DAYS",
    "JUSTIFY_HOURS",
    "JUSTIFY_INTERVAL",
    // Timezones
    "TIMEZONE",
    "AT TIME ZONE",
    // Intervals
    "INTERVAL",
];

/// Built-in JSON operators and their meaning.
pub const JSON_OPERATORS: &[(&str, &str)] = &[
    ("->>", "JSON text extraction operator"),
    ("->", "JSON object/array extraction operator"),
    ("#>", "JSON path extraction operator"),
    ("#>>", "JSON path text extraction operator"),
    ("@>", "JSON containment operator"),
    ("<@", "JSON contained by operator"),
    ("?", "JSON key exists operator"),
    ("?|", "JSON any key exists operator"),
    ("?&", "JSON all keys exist operator"),
];

/// Built-in JSON functions.
pub const JSON_FUNCTIONS: &[&str] = &[
    "json_array_elements",
    "jsonb_array_elements",
    "json_array_elements_text",
    "json_extract_path",
    "json_object",
    "json_build_object",
    "json_build_array",
    "json_populate_record",
    "json_typeof",
    "json_strip_nulls",
    "jsonb_set",
    "jsonb_insert",
];

/// Built-in JSON type-cast markers.
pub const JSON_CASTS: &[&str] = &["::json", "::jsonb"];

/// A JSON operator the detector looks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOperator {
    /// Literal operator text.
    pub operator: String,
    /// Human-readable meaning, used in reports.
    pub description: String,
}

/// Token vocabularies the detectors match against.
///
/// Starts from the built-in lists; extensions loaded from JSON are appended and
/// never replace or remove built-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    /// Date/time functions and keywords (matched case-insensitively, whole words).
    pub date_functions: Vec<String>,
    /// JSON operators (matched as literal substrings).
    pub json_operators: Vec<JsonOperator>,
    /// JSON functions (matched case-insensitively as substrings).
    pub json_functions: Vec<String>,
    /// JSON cast markers (matched as literal substrings).
    pub json_casts: Vec<String>,
}

/// Shape of a JSON vocabulary extension document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct VocabularyExtension {
    #[serde(default)]
    date_functions: Vec<String>,
    #[serde(default)]
    json_operators: BTreeMap<String, String>,
    #[serde(default)]
    json_functions: Vec<String>,
    #[serde(default)]
    json_casts: Vec<String>,
}

impl VocabularyExtension {
    /// Reject empty entries before anything is merged.
    fn validate(&self) -> Result<(), String> {
        if self.date_functions.iter().any(|w| w.trim().is_empty()) {
            return Err("Invalid vocabulary JSON: empty date function".to_string());
        }
        if self.json_operators.keys().any(String::is_empty) {
            return Err("Invalid vocabulary JSON: empty JSON operator".to_string());
        }
        if self.json_functions.iter().any(String::is_empty) {
            return Err("Invalid vocabulary JSON: empty JSON function".to_string());
        }
        if self.json_casts.iter().any(String::is_empty) {
            return Err("Invalid vocabulary JSON: empty JSON cast".to_string());
        }
        Ok(())
    }
}

impl Vocabulary {
    /// The built-in vocabulary.
    pub fn new() -> Self {
        Self {
            date_functions: DATE_FUNCTIONS.iter().map(ToString::to_string).collect(),
            json_operators: JSON_OPERATORS
                .iter()
                .map(|(operator, description)| JsonOperator {
                    operator: (*operator).to_string(),
                    description: (*description).to_string(),
                })
                .collect(),
            json_functions: JSON_FUNCTIONS.iter().map(ToString::to_string).collect(),
            json_casts: JSON_CASTS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Extend the vocabulary from a JSON document.
    ///
    /// Accepted keys: `date_functions`, `json_functions`, `json_casts` (string
    /// arrays) and `json_operators` (object mapping operator to description).
    pub fn load_from_json(&mut self, json: &str) -> Result<(), String> {
        let extension: VocabularyExtension =
            serde_json::from_str(json).map_err(|e| format!("Invalid vocabulary JSON: {e}"))?;

        extension.validate()?;

        for word in extension.date_functions {
            let word = word.trim().to_string();
            if !self
                .date_functions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(&word))
            {
                self.date_functions.push(word);
            }
        }
        for (operator, description) in extension.json_operators {
            if !self.json_operators.iter().any(|op| op.operator == operator) {
                self.json_operators.push(JsonOperator {
                    operator,
                    description,
                });
            }
        }
        for function in extension.json_functions {
            if !self
                .json_functions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(&function))
            {
                self.json_functions.push(function);
            }
        }
        for cast in extension.json_casts {
            if !self.json_casts.contains(&cast) {
                self.json_casts.push(cast);
            }
        }
        Ok(())
    }

    /// Description for a known JSON operator.
    pub fn describe_operator(&self, operator: &str) -> Option<&str> {
        self.json_operators
            .iter()
            .find(|op| op.operator == operator)
            .map(|op| op.description.as_str())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
