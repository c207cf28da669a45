//! First-match-wins translation from text to SQL

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::rules::PatternLibrary;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(
        "Unable to convert this natural language query to SQL. \
         Please try rephrasing or use one of the example queries."
    )]
    NoMatch { text: String },
}

/// SQL rendered for a question, with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub rule: String,
    pub sql: String,
}

#[derive(Debug)]
pub struct Translator {
    library: PatternLibrary,
}

impl Translator {
    pub fn new(library: PatternLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Translate `text` to SQL
    pub fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.translate_detailed(text).map(|t| t.sql)
    }

    /// Like [`translate`](Self::translate), also naming the matched rule
    pub fn translate_detailed(&self, text: &str) -> Result<Translation, TranslateError> {
        let input = text.trim();

        for rule in self.library.rules() {
            if let Some(sql) = rule.apply(input) {
                debug!(rule = rule.name(), input, sql = %sql, "matched pattern");
                return Ok(Translation {
                    rule: rule.name().to_string(),
                    sql,
                });
            }
        }

        debug!(input, "no pattern matched");
        Err(TranslateError::NoMatch {
            text: input.to_string(),
        })
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(PatternLibrary::builtin())
    }
}
