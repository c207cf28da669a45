//! Typed form of a supported SELECT statement

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A parsed `SELECT <clause> FROM <table> [<rest>]` statement.
///
/// `clauses` holds at most one of each kind, in source order
/// (join, where, group by, order by).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub select: SelectClause,
    pub table: TableRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clauses: Vec<Clause>,
}

impl ParsedStatement {
    /// SHA-256 of the canonical JSON form
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("statement should always serialize");
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn join(&self) -> Option<&JoinClause> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Join(j) => Some(j),
            _ => None,
        })
    }

    pub fn filter(&self) -> Option<&Condition> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Where(cond) => Some(cond),
            _ => None,
        })
    }

    pub fn group_by(&self) -> Option<&[ColumnRef]> {
        self.clauses.iter().find_map(|c| match c {
            Clause::GroupBy(keys) => Some(keys.as_slice()),
            _ => None,
        })
    }

    pub fn order_by(&self) -> Option<&SortKey> {
        self.clauses.iter().find_map(|c| match c {
            Clause::OrderBy(key) => Some(key),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SelectClause {
    Wildcard,
    Items { items: Vec<SelectItem> },
}

impl SelectClause {
    /// Aggregate of the given function, if the clause holds one
    pub fn aggregate_of(&self, func: AggFunc) -> Option<&Aggregate> {
        match self {
            SelectClause::Wildcard => None,
            SelectClause::Items { items } => items.iter().find_map(|item| match item {
                SelectItem::Aggregate(agg) if agg.func == func => Some(agg),
                _ => None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectItem {
    Aggregate(Aggregate),
    Column(ColumnRef),
}

/// `FUNC(arg) as alias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub func: AggFunc,
    pub arg: AggArg,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggFunc {
    Avg,
    Sum,
    Count,
}

impl fmt::Display for AggFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggFunc::Avg => write!(f, "AVG"),
            AggFunc::Sum => write!(f, "SUM"),
            AggFunc::Count => write!(f, "COUNT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AggArg {
    Wildcard,
    Column { col: ColumnRef },
}

/// Column reference, optionally qualified by a table alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            table: None,
            column: column.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(t) => write!(f, "{}.{}", t, self.column),
            None => f.write_str(&self.column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl TableRef {
    /// The name other clauses use to qualify this table's columns
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "clause", content = "body")]
pub enum Clause {
    Join(JoinClause),
    Where(Condition),
    GroupBy(Vec<ColumnRef>),
    OrderBy(SortKey),
}

/// `[LEFT|INNER] JOIN <table> [<alias>] ON <left> = <right>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Left,
    Inner,
}

/// Single binary WHERE condition. `value` is the literal text, quotes removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub column: ColumnRef,
    pub op: CompareOp,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
    Like,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Like => write!(f, "LIKE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: ColumnRef,
    pub desc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_statement() -> ParsedStatement {
        ParsedStatement {
            select: SelectClause::Wildcard,
            table: TableRef {
                name: "customers".into(),
                alias: None,
            },
            clauses: vec![Clause::Where(Condition {
                column: ColumnRef::new("age"),
                op: CompareOp::Gt,
                value: "30".into(),
            })],
        }
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = sample_statement();
        let b = sample_statement();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let mut c = sample_statement();
        c.clauses.clear();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_clause_accessors() {
        let stmt = sample_statement();
        assert_eq!(stmt.filter().unwrap().op, CompareOp::Gt);
        assert!(stmt.join().is_none());
        assert!(stmt.group_by().is_none());
        assert!(stmt.order_by().is_none());
    }

    #[test]
    fn test_binding_prefers_alias() {
        let plain = TableRef { name: "orders".into(), alias: None };
        let aliased = TableRef { name: "orders".into(), alias: Some("o".into()) };
        assert_eq!(plain.binding(), "orders");
        assert_eq!(aliased.binding(), "o");
    }
}
