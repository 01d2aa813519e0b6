use tracing::debug;

use crate::classifier::date_functions::{self, DateFunctionDetector};
use crate::classifier::joins::{self, JoinShapeDetector};
use crate::classifier::json_operations::{self, JsonOperationDetector};
use crate::classifier::patterns::{NativeExecutionVerdict, RoutingPolicy, Signal};
use crate::classifier::vocabulary::Vocabulary;

/// Combines the date, JSON, and join detectors into one routing decision.
///
/// Every detector runs on every query so the verdict always carries full
/// evidence; the policy only decides which positive signals count.
#[derive(Debug, Clone)]
pub struct NativeExecutionClassifier {
    date: DateFunctionDetector,
    json: JsonOperationDetector,
    joins: JoinShapeDetector,
    policy: RoutingPolicy,
}

impl NativeExecutionClassifier {
    /// Classifier over a custom vocabulary.
    pub fn new(vocabulary: Vocabulary, policy: RoutingPolicy) -> Result<Self, String> {
        Ok(Self {
            date: DateFunctionDetector::new(&vocabulary)?,
            json: JsonOperationDetector::new(vocabulary),
            joins: JoinShapeDetector,
            policy,
        })
    }

    /// Classifier over the built-in vocabulary.
    pub fn builtin(policy: RoutingPolicy) -> Self {
        Self {
            date: DateFunctionDetector::builtin(),
            json: JsonOperationDetector::new(Vocabulary::new()),
            joins: JoinShapeDetector,
            policy,
        }
    }

    /// Policy this classifier decides under.
    pub fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    /// Run every detector and combine the verdicts that the policy considers.
    pub fn classify(&self, sql: &str) -> NativeExecutionVerdict {
        let date = self.date.check(sql);
        let json = self.json.check(sql);
        let joins = self.joins.check(sql);

        let signals: Vec<Signal> = [
            (Signal::DateFunctions, date.has_date_functions),
            (Signal::JsonOperations, json.contains_json),
            (Signal::Joins, joins.has_joins),
        ]
        .into_iter()
        .filter(|(signal, fired)| *fired && self.policy.considers(*signal))
        .map(|(signal, _)| signal)
        .collect();

        debug!(
            policy = %self.policy,
            date = date.has_date_functions,
            json = json.contains_json,
            joins = joins.has_joins,
            "classified query"
        );

        NativeExecutionVerdict {
            needs_native_execution: !signals.is_empty(),
            policy: self.policy,
            signals,
            date,
            json,
            joins,
        }
    }

    /// Whether `sql` should be routed to the source database.
    pub fn needs_native_execution(&self, sql: &str) -> bool {
        self.classify(sql).needs_native_execution
    }
}

impl Default for NativeExecutionClassifier {
    fn default() -> Self {
        Self::builtin(RoutingPolicy::default())
    }
}

/// True when any of the date, JSON, or join detectors fires on `sql`.
pub fn needs_native_execution(sql: &str) -> bool {
    date_functions::has_date_functions(sql)
        || json_operations::has_json(sql)
        || joins::has_inner_joins(sql)
}
