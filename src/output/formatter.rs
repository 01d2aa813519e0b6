use std::path::{Component, Path};

use crate::output::report;
use crate::pipeline::QueryAnalysis;

/// Write the markdown report, the JSON analysis, and the parser-ready SQL to `output_dir`.
pub fn write_output(output_dir: &Path, name: &str, analyses: &[QueryAnalysis]) -> Result<(), String> {
    validate_output_name(name)?;

    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create output directory: {e}"))?;

    let report_path = output_dir.join(format!("{name}_report.md"));
    std::fs::write(&report_path, report::build_report(analyses))
        .map_err(|e| format!("Failed to write {}: {e}", report_path.display()))?;

    let json_path = output_dir.join(format!("{name}_analysis.json"));
    let json = serde_json::to_string_pretty(analyses)
        .map_err(|e| format!("Failed to serialize analysis: {e}"))?;
    std::fs::write(&json_path, json)
        .map_err(|e| format!("Failed to write {}: {e}", json_path.display()))?;

    let sql_path = output_dir.join(format!("{name}_native.sql"));
    std::fs::write(&sql_path, format_candidate_sql(analyses))
        .map_err(|e| format!("Failed to write {}: {e}", sql_path.display()))?;

    Ok(())
}

/// One block per query: a label comment followed by the text handed to the parser.
pub fn format_candidate_sql(analyses: &[QueryAnalysis]) -> String {
    analyses
        .iter()
        .map(|analysis| {
            let routing = match analysis.passthrough_database() {
                Some(database) => format!("native execution on {database}"),
                None => "engine dialect".to_string(),
            };
            format!(
                "-- {} ({routing})\n{}\n",
                analysis.label,
                analysis.candidate_sql().trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Output files are named `<name>_<artifact>`, so `name` must be a single plain file name.
fn validate_output_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Output name must not be empty".to_string());
    }
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain || name.contains(['/', '\\']) {
        return Err(format!(
            "Invalid output name '{name}': must be a plain file name"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::native_execution::NativeExecutionClassifier;
    use crate::classifier::patterns::RoutingPolicy;
    use crate::pipeline::analyze_query;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_path(test: &str) -> PathBuf {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_nanos());
        std::env::temp_dir().join(format!("sql2native_formatter_{test}_{stamp}"))
    }

    fn sample_analyses() -> Vec<QueryAnalysis> {
        let classifier = NativeExecutionClassifier::builtin(RoutingPolicy::All);
        vec![
            analyze_query("orders", "SELECT doc->>'a' FROM shop.orders;", &classifier),
            analyze_query("plain", "SELECT 1", &classifier),
        ]
    }

    #[test]
    fn write_output_reports_directory_creation_errors() {
        let path = scratch_path("file");
        std::fs::write(&path, "not a directory").expect("should create marker file");

        let err = write_output(&path, "output", &sample_analyses())
            .expect_err("directory creation should fail");
        assert!(err.contains("Failed to create output directory"));
    }

    #[test]
    fn write_output_rejects_unsafe_name_paths() {
        let dir = scratch_path("dir");
        std::fs::create_dir_all(&dir).expect("should create temp directory");

        let err = write_output(&dir, "nested/output", &[])
            .expect_err("unsafe output name should fail validation");
        assert!(err.contains("Invalid output name"));

        let err = write_output(&dir, "../escape", &[])
            .expect_err("path traversal should fail validation");
        assert!(err.contains("Invalid output name"));

        let err = write_output(&dir, "  ", &[]).expect_err("blank name should fail");
        assert!(err.contains("must not be empty"));
    }

    #[test]
    fn output_name_must_be_a_single_file_name() {
        assert!(validate_output_name("shopify_orders").is_ok());
        assert!(validate_output_name("orders.v2").is_ok());

        for name in ["/tmp/report", ".", "a\\b", "reports/"] {
            let err = validate_output_name(name).expect_err("non-plain name should fail");
            assert_eq!(
                err,
                format!("Invalid output name '{name}': must be a plain file name")
            );
        }
    }

    #[test]
    fn write_output_writes_all_artifacts_on_success() {
        let dir = scratch_path("ok");

        write_output(&dir, "batch", &sample_analyses()).expect("write_output should succeed");

        let report =
            std::fs::read_to_string(dir.join("batch_report.md")).expect("report should exist");
        let json = std::fs::read_to_string(dir.join("batch_analysis.json"))
            .expect("analysis json should exist");
        let sql =
            std::fs::read_to_string(dir.join("batch_native.sql")).expect("sql file should exist");

        assert!(report.starts_with("# sql2native Analysis Report"));
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("analysis should be valid JSON");
        assert_eq!(parsed[0]["rewrite"]["database"], "shop");
        assert_eq!(parsed[1]["rewrite"], serde_json::Value::Null);
        assert_eq!(
            sql,
            "-- orders (native execution on shop)\nSELECT * FROM shop(SELECT doc->>'a' FROM orders);\n\n-- plain (engine dialect)\nSELECT 1\n"
        );
    }
}
