use std::fmt::Write;

use crate::classifier::patterns::{
    DateFunctionReport, JoinKind, JoinReport, JsonOperationReport, NativeExecutionVerdict,
};
use crate::pipeline::QueryAnalysis;

/// Plain-text summary of a date function scan.
pub fn format_date_report(report: &DateFunctionReport) -> String {
    if !report.has_date_functions {
        return "No date functions found in the query.".to_string();
    }

    let mut output = String::from("Date functions found in the query:\n");
    for function in &report.found_functions {
        writeln!(output, "- {function}").unwrap();
    }
    output.push_str("\nPositions in query:\n");
    for m in &report.positions {
        writeln!(output, "- {} at position {}", m.token, m.offset.position).unwrap();
    }
    output
}

/// Plain-text summary of a JSON operation scan.
pub fn format_json_report(report: &JsonOperationReport) -> String {
    if !report.contains_json {
        return "No JSON operations found in the query.".to_string();
    }

    let mut output = String::from("JSON operations found in the query:\n");
    for line in &report.details {
        writeln!(output, "- {line}").unwrap();
    }
    output
}

/// Plain-text summary of a join scan, one block per join.
pub fn format_join_report(report: &JoinReport) -> String {
    if !report.has_joins {
        return "No inner joins found in the query.".to_string();
    }

    let mut output = format!(
        "Found {} inner join(s) in the query:\n\n",
        report.join_count()
    );
    for (i, join) in report.joins.iter().enumerate() {
        writeln!(output, "Join #{}:", i + 1).unwrap();
        writeln!(output, "Type: {}", join.kind).unwrap();
        if join.kind == JoinKind::ImplicitComma {
            writeln!(output, "Tables: {}", join.tables.join(", ")).unwrap();
        } else {
            writeln!(output, "Table: {}", join.table().unwrap_or_default()).unwrap();
            if let Some(alias) = &join.alias {
                writeln!(output, "Alias: {alias}").unwrap();
            }
        }
        writeln!(output, "Condition: {}", join.condition).unwrap();
        writeln!(output, "Position: {}", join.offset.position).unwrap();
        writeln!(output).unwrap();
    }
    output
}

/// Build a markdown report with a summary table and per-query evidence.
pub fn build_report(analyses: &[QueryAnalysis]) -> String {
    let mut report = String::new();

    writeln!(report, "# sql2native Analysis Report").unwrap();
    writeln!(report).unwrap();

    writeln!(report, "## Summary").unwrap();
    writeln!(report).unwrap();
    writeln!(
        report,
        "| Query | Date | JSON | Joins | Native | Source database |"
    )
    .unwrap();
    writeln!(
        report,
        "|-------|------|------|-------|--------|-----------------|"
    )
    .unwrap();

    for analysis in analyses {
        let verdict = &analysis.verdict;
        writeln!(
            report,
            "| {} | {} | {} | {} | {} | {} |",
            analysis.label,
            yes_no(verdict.date.has_date_functions),
            yes_no(verdict.json.contains_json),
            yes_no(verdict.joins.has_joins),
            yes_no(verdict.needs_native_execution),
            analysis.passthrough_database().unwrap_or("-"),
        )
        .unwrap();
    }

    for analysis in analyses {
        writeln!(report).unwrap();
        writeln!(report, "## {}", analysis.label).unwrap();
        writeln!(report).unwrap();
        writeln!(report, "{}", describe_decision(&analysis.verdict)).unwrap();
        writeln!(report).unwrap();

        writeln!(report, "### Date functions").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "{}", format_date_report(&analysis.verdict.date).trim_end()).unwrap();
        writeln!(report).unwrap();

        writeln!(report, "### JSON operations").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "{}", format_json_report(&analysis.verdict.json).trim_end()).unwrap();
        writeln!(report).unwrap();

        writeln!(report, "### Joins").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "{}", format_join_report(&analysis.verdict.joins).trim_end()).unwrap();
        writeln!(report).unwrap();

        writeln!(report, "### Query for the parser").unwrap();
        writeln!(report).unwrap();
        writeln!(report, "```sql").unwrap();
        writeln!(report, "{}", analysis.candidate_sql().trim()).unwrap();
        writeln!(report, "```").unwrap();
    }

    report
}

fn describe_decision(verdict: &NativeExecutionVerdict) -> String {
    if verdict.needs_native_execution {
        let signals = verdict
            .signals
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "**Native execution required** (routing: {}; signals: {signals}).",
            verdict.policy
        )
    } else {
        format!(
            "Native execution not required (routing: {}).",
            verdict.policy
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::date_functions::check_date_functions;
    use crate::classifier::joins::check_inner_joins;

    #[test]
    fn date_report_lists_functions_and_positions() {
        let text = format_date_report(&check_date_functions("SELECT NOW()"));
        assert_eq!(
            text,
            "Date functions found in the query:\n- NOW\n\nPositions in query:\n- NOW at position 7\n"
        );
    }

    #[test]
    fn join_report_shows_alias_and_comma_tables() {
        let text = format_join_report(&check_inner_joins(
            "SELECT * FROM a, b WHERE a.id = b.id",
        ));
        assert!(text.contains("Type: implicit_comma"));
        assert!(text.contains("Tables: A, B"));

        let text = format_join_report(&check_inner_joins(
            "SELECT * FROM a JOIN b AS bb ON a.id = bb.id",
        ));
        assert!(text.contains("Type: implicit"));
        assert!(text.contains("Alias: BB"));
    }

    #[test]
    fn empty_reports_say_so() {
        assert_eq!(
            format_join_report(&JoinReport::default()),
            "No inner joins found in the query."
        );
        assert_eq!(
            format_json_report(&JsonOperationReport::default()),
            "No JSON operations found in the query."
        );
    }
}
