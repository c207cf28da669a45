//! Translate, guard, parse and execute in one call

use nlsql_ast::ParseError;
use nlsql_exec::{assert_read_only, ExecutionError, Executor, QueryResult};
use nlsql_ir::{Dataset, Row};
use nlsql_registry::{TranslateError, Translator};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// First failure of a conversion, classified
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    NoMatch(#[from] TranslateError),

    #[error("Only SELECT queries are allowed (found {keyword})")]
    UnsafeStatement { keyword: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Table '{0}' not found")]
    TableNotFound(String),
}

impl ConvertError {
    /// Stable machine-readable tag
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::NoMatch(_) => "no_match",
            ConvertError::UnsafeStatement { .. } => "unsafe_statement",
            ConvertError::Parse(_) => "parse_error",
            ConvertError::TableNotFound(_) => "table_not_found",
        }
    }
}

impl From<ExecutionError> for ConvertError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::UnsafeStatement { keyword } => ConvertError::UnsafeStatement { keyword },
            ExecutionError::TableNotFound(table) => ConvertError::TableNotFound(table),
            ExecutionError::Parse(e) => ConvertError::Parse(e),
        }
    }
}

/// Successful conversion: the generated SQL, the rule behind it, its rows
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub rule: String,
    #[serde(flatten)]
    pub result: QueryResult,
}

impl Conversion {
    pub fn sql(&self) -> &str {
        &self.result.sql
    }

    pub fn rows(&self) -> &[Row] {
        &self.result.rows
    }
}

/// Cheap-to-clone facade over translator and executor
#[derive(Debug, Clone)]
pub struct Converter {
    translator: Arc<Translator>,
    executor: Executor,
}

impl Converter {
    pub fn new(translator: Translator, dataset: Arc<Dataset>) -> Self {
        Self {
            translator: Arc::new(translator),
            executor: Executor::new(dataset),
        }
    }

    /// Built-in phrasings over the given dataset
    pub fn with_dataset(dataset: Arc<Dataset>) -> Self {
        Self::new(Translator::default(), dataset)
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn convert(&self, text: &str) -> Result<Conversion, ConvertError> {
        let translation = self.translator.translate_detailed(text)?;
        let sql = assert_read_only(&translation.sql)?;
        let statement = nlsql_ast::parse(sql)?;
        let rows = self.executor.run(&statement)?;

        info!(
            rule = %translation.rule,
            rows = rows.len(),
            fingerprint = %statement.fingerprint(),
            "converted question"
        );

        Ok(Conversion {
            rule: translation.rule,
            result: QueryResult {
                sql: sql.to_string(),
                rows,
            },
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::with_dataset(Arc::new(Dataset::sample()))
    }
}
