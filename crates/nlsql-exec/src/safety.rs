//! Textual read-only guard, applied before parsing

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::ExecutionError;

/// Matched anywhere in the text, with no word boundaries
const DENYLIST: &[(&str, &str)] = &[
    ("DROP TABLE", r"(?i)DROP\s+TABLE"),
    ("DELETE FROM", r"(?i)DELETE\s+FROM"),
    ("INSERT INTO", r"(?i)INSERT\s+INTO"),
    ("UPDATE", r"(?i)UPDATE\s+(?:\S+\s+)?SET"),
    ("CREATE TABLE", r"(?i)CREATE\s+TABLE"),
    ("ALTER TABLE", r"(?i)ALTER\s+TABLE"),
    ("TRUNCATE", r"(?i)TRUNCATE"),
];

fn denylist() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DENYLIST
            .iter()
            .map(|(keyword, pattern)| {
                (*keyword, Regex::new(pattern).expect("denylist pattern should compile"))
            })
            .collect()
    })
}

/// Reject statements that mention a mutating command.
///
/// Returns the statement trimmed, otherwise untouched.
pub fn assert_read_only(sql: &str) -> Result<&str, ExecutionError> {
    for (keyword, pattern) in denylist() {
        if pattern.is_match(sql) {
            warn!(keyword, sql, "rejected mutating statement");
            return Err(ExecutionError::UnsafeStatement {
                keyword: (*keyword).to_string(),
            });
        }
    }
    Ok(sql.trim())
}
