use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::parser::preprocess::{collapse_whitespace, strip_wrapper_artifacts};

/// `FROM <database>.<table>` after whitespace collapsing. Matched case-sensitively.
static QUALIFIED_FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"FROM ([a-zA-Z0-9_]+)\.([a-zA-Z0-9_]+)")
        .expect("qualified FROM pattern should compile")
});

/// Outcome of a passthrough rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformedQuery {
    /// Source database the query was routed to; `None` when no rewrite happened.
    pub database: Option<String>,
    /// The wrapped passthrough query, or the whitespace-collapsed input.
    pub sql: String,
}

impl TransformedQuery {
    /// Whether the query was wrapped in a passthrough call.
    pub fn is_rewritten(&self) -> bool {
        self.database.is_some()
    }
}

/// Rewrite `sql` into `SELECT * FROM <database>(<query>);`.
///
/// The database is taken from the first `FROM <database>.<table>` reference and
/// its qualifier is stripped from every `<database>.<name>` in the query. Other
/// qualified databases are left untouched inside the wrapper: only single-source
/// passthrough is supported, and a multi-source query is not reported as an
/// error. Without any qualified `FROM` reference the whitespace-collapsed input
/// is returned as is.
pub fn rewrite(sql: &str) -> TransformedQuery {
    let collapsed = collapse_whitespace(sql);

    let database = match QUALIFIED_FROM.captures(&collapsed) {
        Some(caps) => caps[1].to_string(),
        None => {
            return TransformedQuery {
                database: None,
                sql: collapsed,
            }
        }
    };

    let mut others: Vec<&str> = QUALIFIED_FROM
        .captures_iter(&collapsed)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| *name != database)
        .collect();
    others.sort_unstable();
    others.dedup();
    if !others.is_empty() {
        debug!(database = %database, ignored = ?others, "query references more than one source database");
    }

    let unqualified = strip_database_qualifier(&collapsed, &database);
    let body = strip_wrapper_artifacts(&unqualified);
    let wrapped = format!("SELECT * FROM {database}({});", body.trim());
    debug!(database = %database, "wrapped query for native execution");

    TransformedQuery {
        database: Some(database),
        sql: wrapped,
    }
}

/// Rewrite `sql` and return only the resulting text.
pub fn transform_query(sql: &str) -> String {
    rewrite(sql).sql
}

/// The source database a rewrite would target, if any.
pub fn extract_database(sql: &str) -> Option<String> {
    QUALIFIED_FROM
        .captures(&collapse_whitespace(sql))
        .map(|caps| caps[1].to_string())
}

/// Replace every `<database>.<identifier>` with `<identifier>`.
///
/// The qualifier must start at an identifier boundary, so `myshop.t` is not
/// treated as a reference to `shop`.
fn strip_database_qualifier(sql: &str, database: &str) -> String {
    let prefix = format!("{database}.");
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;

    for (idx, _) in sql.match_indices(&prefix) {
        let at_boundary = !sql[..idx].chars().next_back().is_some_and(is_word_char);
        let before_identifier = sql[idx + prefix.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        if at_boundary && before_identifier {
            out.push_str(&sql[copied..idx]);
            copied = idx + prefix.len();
        }
    }
    out.push_str(&sql[copied..]);
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
