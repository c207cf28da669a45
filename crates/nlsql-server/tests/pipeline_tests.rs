//! Question-to-rows conversions over the sample dataset

use nlsql_ir::{Dataset, Value};
use nlsql_registry::examples;
use nlsql_server::history::QueryHistory;
use nlsql_server::{ConvertError, Converter};
use std::sync::Arc;

fn text(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[test]
fn test_every_example_converts() {
    let converter = Converter::default();
    for example in examples() {
        let conversion = converter
            .convert(example.natural_language)
            .unwrap_or_else(|e| panic!("{}: {}", example.natural_language, e));
        assert_eq!(conversion.sql(), example.sql);
        assert!(!conversion.rows().is_empty());
    }
}

#[test]
fn test_total_orders_by_customer() {
    let conversion = Converter::default()
        .convert("Show total orders by customer")
        .unwrap();

    assert_eq!(conversion.rule, "orders_per_customer");
    let rows = conversion.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["total_orders"]);
    assert_eq!(rows[0].get("total_orders"), Some(&Value::Int(7)));
}

#[test]
fn test_customers_older_than_thirty() {
    let conversion = Converter::default()
        .convert("customers older than 30")
        .unwrap();
    assert_eq!(conversion.rule, "customers_older");

    let ages: Vec<_> = conversion.rows().iter().map(|r| text(r.get("age"))).collect();
    assert_eq!(ages, vec!["34", "45", "52"]);
}

#[test]
fn test_who_bought() {
    let conversion = Converter::default().convert("who bought Camera").unwrap();
    assert_eq!(conversion.rows().len(), 1);
    assert_eq!(text(conversion.rows()[0].get("name")), "Diana Wilson");
}

#[test]
fn test_sorted_listing() {
    let conversion = Converter::default()
        .convert("list customers sorted by age desc")
        .unwrap();
    let names: Vec<_> = conversion.rows().iter().map(|r| text(r.get("name"))).collect();
    assert_eq!(names.first().map(String::as_str), Some("Edward Davis"));
    assert_eq!(names.last().map(String::as_str), Some("Alice Johnson"));
}

#[test]
fn test_missing_table_in_custom_dataset() {
    let converter = Converter::with_dataset(Arc::new(Dataset::new()));
    let err = converter.convert("show all orders").unwrap_err();
    assert!(matches!(err, ConvertError::TableNotFound(ref t) if t == "orders"));
}

#[test]
fn test_converter_stays_usable_after_failure() {
    let converter = Converter::default();
    assert!(converter.convert("gibberish").is_err());
    assert!(converter.convert("list orders").is_ok());
}

#[test]
fn test_history_records_successes() {
    let converter = Converter::default();
    let mut history = QueryHistory::default();

    for i in 0..12 {
        let question = if i % 2 == 0 { "list orders" } else { "how many customers" };
        if let Ok(conversion) = converter.convert(question) {
            history.record(question, conversion.sql());
        }
    }
    if let Ok(conversion) = converter.convert("nonsense") {
        history.record("nonsense", conversion.sql());
    }

    assert_eq!(history.len(), 10);
    assert_eq!(
        history.entries().next().map(|e| e.natural_language.as_str()),
        Some("how many customers")
    );
}
