use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::classifier::patterns::{JoinDescriptor, JoinKind, JoinReport, TextOffset};
use crate::parser::preprocess::normalize_for_join_analysis;

/// Where a join condition stops: another join, a following clause, a statement end.
const CONDITION_END: &str = r"(?:\s+(?:(?:INNER|LEFT|RIGHT|FULL|CROSS|NATURAL)(?:\s+OUTER)?\s+)?JOIN\b|\s+WHERE\b|\s+GROUP\b|\s+ORDER\b|\s+LIMIT\b|\s*;|$)";

/// Table reference, optionally schema- or database-qualified.
const TABLE: &str = r"(\w+(?:\.\w+)*)";

static EXPLICIT_JOIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bINNER\s+JOIN\s+{TABLE}(?:\s+AS\s+(\w+))?\s+ON\s+([^;]+?){CONDITION_END}"
    ))
    .expect("explicit join pattern should compile")
});

static BARE_JOIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bJOIN\s+{TABLE}(?:\s+AS\s+(\w+))?\s+ON\s+([^;]+?){CONDITION_END}"
    ))
    .expect("bare join pattern should compile")
});

static COMMA_JOIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bFROM\s+{TABLE}(?:\s+AS\s+\w+)?\s*,\s*{TABLE}(?:\s+AS\s+\w+)?\s+WHERE\s+([^;]+?){CONDITION_END}"
    ))
    .expect("comma join pattern should compile")
});

/// Clauses trimmed off a condition if one slipped into the capture.
const TRAILING_CLAUSES: &[&str] = &[
    "INNER JOIN",
    "LEFT JOIN",
    "RIGHT JOIN",
    "FULL JOIN",
    "CROSS JOIN",
    "JOIN",
    "WHERE",
    "GROUP BY",
    "ORDER BY",
    "LIMIT",
];

/// Finds explicit, bare, and comma-style inner joins.
///
/// The families are not exclusive: every `JOIN <table> ... ON` is reported as an
/// implicit join, including the `JOIN` of an `INNER JOIN` (which also yields an
/// explicit descriptor) and of outer joins.
///
/// Runs on a trimmed, whitespace-collapsed, upper-cased copy of the query; the
/// report carries that copy, and every descriptor offset points into it.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinShapeDetector;

impl JoinShapeDetector {
    /// Scan `sql` for inner joins.
    pub fn check(&self, sql: &str) -> JoinReport {
        let normalized = normalize_for_join_analysis(sql);
        let mut joins = Vec::new();

        scan(&EXPLICIT_JOIN, &normalized, &mut joins, |caps| {
            Some(modern_join(JoinKind::Explicit, caps))
        });
        scan(&BARE_JOIN, &normalized, &mut joins, |caps| {
            Some(modern_join(JoinKind::Implicit, caps))
        });
        scan(&COMMA_JOIN, &normalized, &mut joins, |caps| {
            Some(JoinDescriptor {
                kind: JoinKind::ImplicitComma,
                tables: vec![capture(caps, 1)?, capture(caps, 2)?],
                alias: None,
                condition: clean_condition(caps.get(3)?.as_str()),
                offset: TextOffset::normalized(caps.get(0)?.start()),
            })
        });

        joins.sort_by_key(|join| join.offset.position);

        JoinReport {
            has_joins: !joins.is_empty(),
            joins,
            normalized_query: normalized,
        }
    }
}

/// Walk every match of one pattern family.
///
/// Every family captures its condition as group 3. The next search resumes where
/// the condition ended, so a terminator that is itself the start of another join
/// stays available to the following match.
fn scan<F>(pattern: &Regex, text: &str, joins: &mut Vec<JoinDescriptor>, mut describe: F)
where
    F: FnMut(&Captures<'_>) -> Option<JoinDescriptor>,
{
    let mut start = 0;
    while start <= text.len() {
        let Some(caps) = pattern.captures_at(text, start) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let condition_end = caps.get(3).map_or(whole.end(), |m| m.end());
        if let Some(join) = describe(&caps) {
            joins.push(join);
            start = condition_end.max(whole.start() + 1);
        } else {
            // Every pattern starts with an ASCII keyword, so this stays on a char boundary.
            start = whole.start() + 1;
        }
    }
}

fn modern_join(kind: JoinKind, caps: &Captures<'_>) -> JoinDescriptor {
    JoinDescriptor {
        kind,
        tables: capture(caps, 1).into_iter().collect(),
        alias: capture(caps, 2),
        condition: caps.get(3).map_or_else(String::new, |m| clean_condition(m.as_str())),
        offset: TextOffset::normalized(caps.get(0).map_or(0, |m| m.start())),
    }
}

fn capture(caps: &Captures<'_>, index: usize) -> Option<String> {
    caps.get(index).map(|m| m.as_str().to_string())
}

/// Cut a condition at the first trailing clause keyword and trim it.
fn clean_condition(condition: &str) -> String {
    let mut condition = condition;
    for clause in TRAILING_CLAUSES {
        if let Some(idx) = condition.find(&format!(" {clause} ")) {
            condition = &condition[..idx];
        }
    }
    condition.trim().to_string()
}

/// Scan `sql` for inner joins.
pub fn check_inner_joins(sql: &str) -> JoinReport {
    JoinShapeDetector.check(sql)
}

/// True when `sql` contains any inner join shape.
pub fn has_inner_joins(sql: &str) -> bool {
    check_inner_joins(sql).has_joins
}
