//! In-memory executor for generated SELECT statements

mod ops;
pub mod safety;

use nlsql_ast::ParseError;
use nlsql_ir::{Dataset, ParsedStatement, Row};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use safety::assert_read_only;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Only SELECT queries are allowed (found {keyword})")]
    UnsafeStatement { keyword: String },

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Runs statements against a shared, read-only dataset.
///
/// Stateless per call: every execution starts from fresh copies of the
/// referenced tables.
#[derive(Debug, Clone)]
pub struct Executor {
    dataset: Arc<Dataset>,
}

impl Executor {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Guard, parse and run SQL text
    pub fn execute(&self, sql: &str) -> Result<Vec<Row>, ExecutionError> {
        let sql = assert_read_only(sql)?;
        let statement = nlsql_ast::parse(sql)?;
        self.run(&statement)
    }

    /// Like [`execute`](Self::execute), keeping the SQL alongside the rows
    pub fn query(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        let rows = self.execute(sql)?;
        Ok(QueryResult {
            sql: sql.trim().to_string(),
            rows,
        })
    }

    /// Run an already parsed statement: join, filter, group, project, sort
    pub fn run(&self, statement: &ParsedStatement) -> Result<Vec<Row>, ExecutionError> {
        let base = self
            .dataset
            .table(&statement.table.name)
            .ok_or_else(|| ExecutionError::TableNotFound(statement.table.name.clone()))?;
        let mut rows = base.rows.clone();

        if let Some(join) = statement.join() {
            let right = self
                .dataset
                .table(&join.table.name)
                .ok_or_else(|| ExecutionError::TableNotFound(join.table.name.clone()))?;
            rows = ops::join(rows, statement.table.binding(), &right.rows, join);
            debug!(table = %join.table.name, rows = rows.len(), "joined");
        }

        if let Some(condition) = statement.filter() {
            rows.retain(|row| ops::matches(row, condition));
            debug!(condition = %condition.op, rows = rows.len(), "filtered");
        }

        if let Some(keys) = statement.group_by() {
            rows = ops::group(rows, keys, &statement.select);
            debug!(groups = rows.len(), "grouped");
        }

        rows = ops::project(rows, &statement.select);

        if let Some(key) = statement.order_by() {
            ops::sort(&mut rows, key);
        }

        Ok(rows)
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(Arc::new(Dataset::sample()))
    }
}

/// Rows produced for one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub sql: String,
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Column headers, taken from the first row
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
