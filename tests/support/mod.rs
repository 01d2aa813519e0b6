#![allow(dead_code)]

use std::cell::RefCell;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use sql2native::classifier::native_execution::NativeExecutionClassifier;
use sql2native::classifier::patterns::RoutingPolicy;
use sql2native::parser::sql_parser::{CanonicalQuery, SqlParser};
use sql2native::pipeline::{self, QueryAnalysis};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

pub(crate) fn fixture_input_path(fixture: &str) -> PathBuf {
    fixture_dir(fixture).join("input.sql")
}

pub(crate) fn read_fixture_sql(fixture: &str) -> String {
    std::fs::read_to_string(fixture_input_path(fixture)).expect("fixture SQL should be readable")
}

pub(crate) fn analyze_fixture(fixture: &str, policy: RoutingPolicy) -> QueryAnalysis {
    let classifier = NativeExecutionClassifier::builtin(policy);
    pipeline::analyze_query(fixture, &read_fixture_sql(fixture), &classifier)
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}

/// Canonical form produced by [`ScriptedParser`]: the accepted text, trimmed and upper-cased.
pub(crate) struct Upper(pub String);

impl CanonicalQuery for Upper {
    fn to_canonical_text(&self) -> String {
        self.0.trim().to_uppercase()
    }
}

/// Parser double that rejects any text containing one of `rejected` and
/// records every text it was asked to parse.
pub(crate) struct ScriptedParser {
    rejected: Vec<&'static str>,
    pub(crate) attempts: RefCell<Vec<String>>,
}

impl ScriptedParser {
    pub(crate) fn rejecting(rejected: &[&'static str]) -> Self {
        Self {
            rejected: rejected.to_vec(),
            attempts: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

impl SqlParser for ScriptedParser {
    type Ast = Upper;

    fn parse(&self, sql: &str, _dialect: &str) -> Result<Self::Ast, String> {
        self.attempts.borrow_mut().push(sql.to_string());
        match self.rejected.iter().find(|needle| sql.contains(**needle)) {
            Some(needle) => Err(format!("unexpected token {needle:?}")),
            None => Ok(Upper(sql.to_string())),
        }
    }
}
