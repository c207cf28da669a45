//! End-to-end statements over the sample dataset

use nlsql_exec::{ExecutionError, Executor};
use nlsql_ir::{Dataset, Row, Value};
use std::sync::Arc;

const ORDERS_PER_CUSTOMER: &str = "SELECT c.name, COUNT(o.id) as total_orders FROM customers c \
     LEFT JOIN orders o ON c.id = o.customer_id GROUP BY c.id, c.name;";

fn column(rows: &[Row], name: &str) -> Vec<String> {
    rows.iter()
        .map(|r| r.get(name).map(|v| v.to_string()).unwrap_or_default())
        .collect()
}

#[test]
fn test_orders_per_customer_collapses_to_one_row() {
    // c.id groups on the merged id, which is the order id after the join,
    // and the COUNT in the select list then collapses the buckets.
    let rows = Executor::default().execute(ORDERS_PER_CUSTOMER).unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("total_orders", Value::Int(7))])]);
}

#[test]
fn test_group_by_strips_qualifier() {
    let rows = Executor::default()
        .execute("SELECT c.city FROM customers c LEFT JOIN orders o ON c.id = o.customer_id GROUP BY c.id;")
        .unwrap();
    // Seven distinct merged ids, one per order
    assert_eq!(rows.len(), 7);

    let rows = Executor::default()
        .execute("SELECT c.city FROM customers c GROUP BY c.city;")
        .unwrap();
    assert_eq!(column(&rows, "city"), vec!["London", "Paris", "Berlin"]);
}

#[test]
fn test_customers_with_orders() {
    let rows = Executor::default()
        .execute(
            "SELECT c.name, c.city, o.product, o.amount, o.date FROM customers c \
             LEFT JOIN orders o ON c.id = o.customer_id;",
        )
        .unwrap();

    assert_eq!(rows.len(), 7);
    assert_eq!(
        rows[0].columns().collect::<Vec<_>>(),
        vec!["name", "city", "product", "amount", "date"]
    );
    assert_eq!(column(&rows, "product")[..2], ["Laptop", "Headphones"]);
}

#[test]
fn test_product_join_with_like() {
    let rows = Executor::default()
        .execute(
            "SELECT c.name, o.product, o.amount FROM customers c \
             JOIN orders o ON c.id = o.customer_id WHERE o.product LIKE '%laptop%';",
        )
        .unwrap();

    assert_eq!(
        rows,
        vec![Row::from_pairs([
            ("name", Value::from("Alice Johnson")),
            ("product", Value::from("Laptop")),
            ("amount", Value::Float(1200.50)),
        ])]
    );
}

#[test]
fn test_left_and_inner_join_differ_on_unmatched_rows() {
    let dataset = Dataset::new()
        .with_table(
            "customers",
            vec![
                Row::from_pairs([("id", Value::Int(1)), ("name", Value::from("Ann"))]),
                Row::from_pairs([("id", Value::Int(2)), ("name", Value::from("Ben"))]),
            ],
        )
        .with_table(
            "orders",
            vec![Row::from_pairs([
                ("id", Value::Int(10)),
                ("customer_id", Value::Int(1)),
                ("product", Value::from("Lamp")),
            ])],
        );
    let executor = Executor::new(Arc::new(dataset));

    let left = executor
        .execute("SELECT * FROM customers c LEFT JOIN orders o ON c.id = o.customer_id;")
        .unwrap();
    assert_eq!(left.len(), 2);
    assert_eq!(left[0].get("product"), Some(&Value::from("Lamp")));
    assert_eq!(left[0].get("id"), Some(&Value::Int(10)));
    assert!(!left[1].contains("product"));

    let inner = executor
        .execute("SELECT * FROM customers c INNER JOIN orders o ON c.id = o.customer_id;")
        .unwrap();
    assert_eq!(inner.len(), 1);

    let grouped = executor.execute(ORDERS_PER_CUSTOMER).unwrap();
    assert_eq!(grouped, vec![Row::from_pairs([("total_orders", Value::Int(2))])]);
}

#[test]
fn test_order_by_desc() {
    let rows = Executor::default()
        .execute("SELECT product, amount FROM orders ORDER BY amount DESC;")
        .unwrap();
    let products = column(&rows, "product");
    assert_eq!(products.first().map(String::as_str), Some("Laptop"));
    assert_eq!(products.last().map(String::as_str), Some("Keyboard"));

    let rows = Executor::default()
        .execute("select name from customers order by name")
        .unwrap();
    assert_eq!(column(&rows, "name")[0], "Alice Johnson");
}

#[test]
fn test_projection_omits_absent_columns() {
    let rows = Executor::default()
        .execute("SELECT name, nickname FROM customers WHERE city = 'Berlin';")
        .unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("name", "Diana Wilson")])]);

    let rows = Executor::default()
        .execute("SELECT c.city, c.nickname FROM customers c GROUP BY c.city;")
        .unwrap();
    assert_eq!(
        rows,
        vec![
            Row::from_pairs([("city", "London")]),
            Row::from_pairs([("city", "Paris")]),
            Row::from_pairs([("city", "Berlin")]),
        ]
    );

    let rows = Executor::default()
        .execute("SELECT c.city, COUNT(*) as n FROM customers c GROUP BY c.city;")
        .unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("n", Value::Int(3))])]);
}

#[test]
fn test_aggregates_collapse() {
    let executor = Executor::default();

    let rows = executor
        .execute("SELECT COUNT(*) as total_customers FROM customers;")
        .unwrap();
    assert_eq!(rows, vec![Row::from_pairs([("total_customers", Value::Int(5))])]);

    let rows = executor
        .execute("SELECT SUM(amount) as total FROM orders WHERE amount > 500;")
        .unwrap();
    let total = rows[0].get("total").and_then(Value::as_f64).unwrap();
    assert!((total - (1200.50 + 699.99 + 899.99)).abs() < 1e-9);

    let rows = executor
        .execute("SELECT AVG(amount) as avg FROM orders WHERE amount > 5000;")
        .unwrap();
    assert_eq!(serde_json::to_string(&rows).unwrap(), r#"[{"avg":null}]"#);
}

#[test]
fn test_equality_filters() {
    let executor = Executor::default();
    assert_eq!(
        column(&executor.execute("SELECT * FROM customers WHERE age = 28;").unwrap(), "name"),
        vec!["Alice Johnson"]
    );
    assert_eq!(
        executor
            .execute("SELECT * FROM customers WHERE city = 'london';")
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn test_execution_is_idempotent() {
    let executor = Executor::default();
    let first = executor.execute(ORDERS_PER_CUSTOMER).unwrap();
    let second = executor.execute(ORDERS_PER_CUSTOMER).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_mutating_statement_rejected_before_table_lookup() {
    let err = Executor::default()
        .execute("DELETE FROM nowhere;")
        .unwrap_err();
    assert!(matches!(err, ExecutionError::UnsafeStatement { ref keyword } if keyword == "DELETE FROM"));
}
