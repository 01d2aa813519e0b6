use std::sync::LazyLock;

use regex::Regex;
use sqlparser::ast::Statement;
use sqlparser::dialect::dialect_from_str;
use sqlparser::parser::Parser;

/// A successfully parsed query that can be re-serialized to canonical text.
pub trait CanonicalQuery {
    /// Canonical textual form of the parsed query.
    fn to_canonical_text(&self) -> String;
}

/// Parser capability consumed by the validation pipeline.
///
/// Any `Err` is treated as a recoverable rejection of one candidate text; the
/// diagnostic message is surfaced verbatim when no candidate parses.
pub trait SqlParser {
    /// Parsed representation returned on success.
    type Ast: CanonicalQuery;

    /// Parse `sql` using the named `dialect`.
    fn parse(&self, sql: &str, dialect: &str) -> Result<Self::Ast, String>;
}

/// `SELECT * FROM <database>(<query>)` as produced by the passthrough rewriter.
static PASSTHROUGH_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*SELECT \* FROM ([A-Za-z0-9_]+)\((.*)\)\s*;?\s*$")
        .expect("passthrough call pattern should compile")
});

/// Statements produced by [`SqlparserBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatements {
    /// Passthrough databases wrapping the statements, outermost first.
    pub passthrough: Vec<String>,
    /// Statements of the innermost query.
    pub statements: Vec<Statement>,
}

impl CanonicalQuery for ParsedStatements {
    fn to_canonical_text(&self) -> String {
        let body = self
            .statements
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        self.passthrough
            .iter()
            .rev()
            .fold(body, |inner, database| {
                format!("SELECT * FROM {database}({inner})")
            })
    }
}

/// Parser seam backed by the `sqlparser` crate.
///
/// Dialect names are those accepted by `sqlparser::dialect::dialect_from_str`
/// (`generic`, `postgresql`, `mysql`, `duckdb`, ...). A passthrough call
/// `SELECT * FROM <database>(<query>)` is not SQL any dialect knows, so its
/// inner query is parsed on its own and the wrapper is kept in the canonical
/// text. Ordinary table functions such as `generate_series(1, 10)` still parse
/// as plain statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlparserBackend;

impl SqlparserBackend {
    fn parse_statements(sql: &str, dialect: &str) -> Result<Vec<Statement>, String> {
        let dialect =
            dialect_from_str(dialect).ok_or_else(|| format!("Unknown SQL dialect: {dialect}"))?;
        let statements = Parser::parse_sql(dialect.as_ref(), sql).map_err(|e| e.to_string())?;
        if statements.is_empty() {
            return Err("No SQL statement found".to_string());
        }
        Ok(statements)
    }
}

impl SqlParser for SqlparserBackend {
    type Ast = ParsedStatements;

    fn parse(&self, sql: &str, dialect: &str) -> Result<Self::Ast, String> {
        let Some(caps) = PASSTHROUGH_CALL.captures(sql) else {
            return Ok(ParsedStatements {
                passthrough: Vec::new(),
                statements: Self::parse_statements(sql, dialect)?,
            });
        };

        match self.parse(&caps[2], dialect) {
            Ok(mut inner) => {
                inner.passthrough.insert(0, caps[1].to_string());
                Ok(inner)
            }
            // The body error explains a failed passthrough better than the wrapper's.
            Err(body_error) => Self::parse_statements(sql, dialect)
                .map(|statements| ParsedStatements {
                    passthrough: Vec::new(),
                    statements,
                })
                .map_err(|_| body_error),
        }
    }
}
