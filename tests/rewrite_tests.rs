mod support;

use sql2native::classifier::native_execution::NativeExecutionClassifier;
use sql2native::classifier::patterns::{RoutingPolicy, Signal};
use sql2native::classifier::vocabulary::Vocabulary;
use sql2native::parser::preprocess::clean_query;
use sql2native::rewriter::transformer::{extract_database, rewrite};
use sql2native::{needs_native_execution, transform_query};

use support::{analyze_fixture, read_fixture_sql};

// ---- cleaning ----

#[test]
fn clean_removes_sql_and_bare_fences() {
    assert_eq!(clean_query("```sql\nSELECT 1\n```"), "\nSELECT 1\n");
    assert_eq!(clean_query("``````SELECT 1"), "SELECT 1");
    assert_eq!(clean_query("SELECT '`' AS tick"), "SELECT '`' AS tick");
}

#[test]
fn clean_keeps_triple_quotes_for_the_rewriter() {
    assert_eq!(clean_query(r#""""SELECT 1""""#), r#""""SELECT 1""""#);
}

// ---- native execution decision ----

#[test]
fn decision_is_the_or_of_all_detectors() {
    assert!(needs_native_execution(&read_fixture_sql("shopify_orders")));
    assert!(needs_native_execution(&read_fixture_sql("date_filter")));
    assert!(needs_native_execution(&read_fixture_sql("multi_join")));
    assert!(!needs_native_execution(&read_fixture_sql("plain_select")));
}

#[test]
fn json_policy_keeps_evidence_but_ignores_date_and_join_signals() {
    let analysis = analyze_fixture("date_filter", RoutingPolicy::Json);

    assert!(!analysis.verdict.needs_native_execution);
    assert!(analysis.verdict.signals.is_empty());
    assert!(analysis.verdict.date.has_date_functions);
    assert!(analysis.rewrite.is_none());
}

#[test]
fn all_policy_lists_every_positive_signal() {
    let analysis = analyze_fixture("multi_join", RoutingPolicy::All);
    assert_eq!(analysis.verdict.signals, vec![Signal::Joins]);

    let analysis = analyze_fixture("shopify_orders", RoutingPolicy::All);
    assert_eq!(analysis.verdict.signals, vec![Signal::JsonOperations]);
}

#[test]
fn classifier_rejects_an_empty_date_vocabulary() {
    let mut vocabulary = Vocabulary::new();
    vocabulary.date_functions.clear();

    let err = NativeExecutionClassifier::new(vocabulary, RoutingPolicy::All)
        .expect_err("empty date vocabulary should fail");
    assert_eq!(err, "Date function vocabulary is empty");
}

// ---- passthrough rewrite ----

#[test]
fn qualified_query_is_wrapped_for_its_database() {
    assert_eq!(
        transform_query("SELECT * FROM shop.orders WHERE id = 1"),
        "SELECT * FROM shop(SELECT * FROM orders WHERE id = 1);"
    );
}

#[test]
fn unqualified_query_only_loses_extra_whitespace() {
    assert_eq!(transform_query("SELECT 1"), "SELECT 1");
    assert_eq!(
        transform_query("SELECT a\n\tFROM   t  "),
        "SELECT a FROM t"
    );
}

#[test]
fn every_reference_to_the_database_is_unqualified() {
    assert_eq!(
        transform_query("SELECT shop.orders.id FROM shop.orders JOIN shop.items ON 1 = 1"),
        "SELECT * FROM shop(SELECT orders.id FROM orders JOIN items ON 1 = 1);"
    );
}

#[test]
fn only_the_first_database_is_used() {
    let result = rewrite("SELECT * FROM crm.users u JOIN erp.accounts a ON u.id = a.user_id");

    assert_eq!(result.database.as_deref(), Some("crm"));
    assert_eq!(
        result.sql,
        "SELECT * FROM crm(SELECT * FROM users u JOIN erp.accounts a ON u.id = a.user_id);"
    );
}

#[test]
fn triple_quotes_and_semicolons_are_stripped_from_the_body() {
    assert_eq!(
        transform_query(r#""""SELECT * FROM shop.orders;""""#),
        "SELECT * FROM shop(SELECT * FROM orders);"
    );
}

#[test]
fn lowercase_from_is_not_rewritten() {
    let result = rewrite("select * from shop.orders");

    assert!(!result.is_rewritten());
    assert_eq!(result.sql, "select * from shop.orders");
}

#[test]
fn wrapped_query_without_qualifiers_is_left_alone() {
    let wrapped = "SELECT * FROM shop(SELECT * FROM orders WHERE id = 1);";
    assert_eq!(transform_query(wrapped), wrapped);
}

#[test]
fn rewrapping_a_query_with_a_qualified_source_nests() {
    let once = transform_query("SELECT * FROM erp.t");
    assert_eq!(once, "SELECT * FROM erp(SELECT * FROM t);");

    let nested = transform_query("SELECT * FROM shop(SELECT * FROM erp.t);");
    assert_eq!(
        nested,
        "SELECT * FROM erp(SELECT * FROM shop(SELECT * FROM t));"
    );
}

#[test]
fn shopify_fixture_routes_to_its_source() {
    let analysis = analyze_fixture("shopify_orders", RoutingPolicy::Json);

    assert_eq!(analysis.passthrough_database(), Some("snk_psql_shopify"));
    assert_eq!(
        analysis.candidate_sql(),
        "SELECT * FROM snk_psql_shopify(SELECT lineitem->>'item' AS product_id, \
         SUM((lineitem->>'quantity')::int) AS total_quantity_sold FROM orders, \
         LATERAL json_array_elements(orders.line_items::json) AS lineitem \
         GROUP BY product_id ORDER BY total_quantity_sold DESC LIMIT 10);"
    );
}

#[test]
fn extract_database_matches_rewrite_target() {
    let sql = read_fixture_sql("date_filter");
    assert_eq!(extract_database(&sql), rewrite(&sql).database);
    assert_eq!(extract_database(&sql).as_deref(), Some("erp"));
}
