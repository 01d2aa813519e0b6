use tracing::debug;

use crate::parser::sql_parser::{CanonicalQuery, SqlParser};

/// Ordered alternative spellings of a query for the parser to try.
pub mod candidates;
/// Agent-facing validation action wrapping the whole pipeline.
pub mod tool;

pub use candidates::QueryCandidates;

/// Parse each candidate spelling of `sql` in turn and return the first canonical form.
///
/// When every candidate is rejected the diagnostic of the last attempt is
/// returned unchanged.
pub fn validate_query<P: SqlParser>(parser: &P, sql: &str, dialect: &str) -> Result<String, String> {
    let mut last_error = None;

    for (index, candidate) in QueryCandidates::new(sql).enumerate() {
        match parser.parse(&candidate, dialect) {
            Ok(ast) => {
                debug!(candidate = index, dialect, "query accepted by parser");
                return Ok(ast.to_canonical_text());
            }
            Err(error) => {
                debug!(candidate = index, dialect, %error, "query rejected by parser");
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| "No query to validate".to_string()))
}
