//! Detect SQL constructs a federated query engine cannot evaluate and rewrite such
//! queries into native passthrough calls against their source database.
#![warn(missing_docs)]

/// Pattern-based detectors (date/time, JSON, joins) and the native execution decision.
pub mod classifier;
/// Report rendering and file output.
pub mod output;
/// Query text preprocessing and the parser capability.
pub mod parser;
/// End-to-end analysis of one query: clean, classify, rewrite.
pub mod pipeline;
/// Passthrough rewriting of `database.table` queries.
pub mod rewriter;
/// Parser validation with retry candidates, and the agent tool shell.
pub mod validator;

pub use classifier::date_functions::{check_date_functions, has_date_functions};
pub use classifier::joins::{check_inner_joins, has_inner_joins};
pub use classifier::json_operations::{analyze_json_operations, has_json};
pub use classifier::native_execution::needs_native_execution;
pub use parser::preprocess::clean_query;
pub use rewriter::transformer::transform_query;
