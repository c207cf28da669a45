//! In-memory dataset: named, immutable tables of rows

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::{Row, Value};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Named ordered sequence of rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `{ tableName: rows }`, fixed at startup and read-only afterwards
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    tables: BTreeMap<String, Table>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table registration
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.insert(name, rows);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<Row>) {
        let name = name.into();
        self.tables.insert(name.clone(), Table::new(name, rows));
    }

    /// Table lookup is case-sensitive.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, Vec<Row>> = serde_json::from_str(json)?;
        let mut dataset = Dataset::new();
        for (name, rows) in raw {
            dataset.insert(name, rows);
        }
        Ok(dataset)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// The built-in demo data: five customers and seven orders.
    pub fn sample() -> Self {
        let customers = [
            (1, "Alice Johnson", "London", 28, "alice@example.com"),
            (2, "Bob Smith", "Paris", 34, "bob@example.com"),
            (3, "Charlie Brown", "London", 45, "charlie@example.com"),
            (4, "Diana Wilson", "Berlin", 29, "diana@example.com"),
            (5, "Edward Davis", "Paris", 52, "edward@example.com"),
        ]
        .into_iter()
        .map(|(id, name, city, age, email)| {
            Row::from_pairs([
                ("id", Value::Int(id)),
                ("name", Value::from(name)),
                ("city", Value::from(city)),
                ("age", Value::Int(age)),
                ("email", Value::from(email)),
            ])
        })
        .collect();

        let orders = [
            (1, 1, "Laptop", 1200.50, "2024-01-15"),
            (2, 2, "Phone", 699.99, "2024-01-18"),
            (3, 1, "Headphones", 149.99, "2024-02-01"),
            (4, 3, "Tablet", 399.99, "2024-02-05"),
            (5, 2, "Watch", 249.99, "2024-02-10"),
            (6, 4, "Camera", 899.99, "2024-02-15"),
            (7, 5, "Keyboard", 79.99, "2024-03-01"),
        ]
        .into_iter()
        .map(|(id, customer_id, product, amount, date)| {
            Row::from_pairs([
                ("id", Value::Int(id)),
                ("customer_id", Value::Int(customer_id)),
                ("product", Value::from(product)),
                ("amount", Value::Float(amount)),
                ("date", Value::from(date)),
            ])
        })
        .collect();

        Dataset::new()
            .with_table("customers", customers)
            .with_table("orders", orders)
    }
}
