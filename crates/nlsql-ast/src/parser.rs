//! Pest-based parser for generated SELECT statements

use nlsql_ir::*;
use pest::error::{ErrorVariant, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "sql.pest"]
pub struct SqlParser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid SELECT query: {0}")]
    Syntax(String),

    #[error("Invalid SELECT query: {}", summarize(.0))]
    Pest(#[from] pest::error::Error<Rule>),
}

/// One-line rendering of a pest error: what was expected, and where
fn summarize(err: &pest::error::Error<Rule>) -> String {
    let (line, col) = match err.line_col {
        LineColLocation::Pos(pos) | LineColLocation::Span(pos, _) => pos,
    };

    let reason = match &err.variant {
        ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
            let expected: Vec<_> = positives.iter().map(|rule| rule_name(*rule)).collect();
            format!("expected {}", expected.join(" or "))
        }
        ErrorVariant::ParsingError { .. } => "unexpected input".to_string(),
        ErrorVariant::CustomError { message } => message.clone(),
    };

    format!("{} at line {}, column {}", reason, line, col)
}

fn rule_name(rule: Rule) -> String {
    let name = format!("{:?}", rule);
    match name.strip_prefix("kw_") {
        Some(keyword) => keyword.to_ascii_uppercase(),
        None => name.replace('_', " "),
    }
}

/// Parse SQL text into a typed statement
pub fn parse(sql: &str) -> Result<ParsedStatement, ParseError> {
    let mut pairs = SqlParser::parse(Rule::statement, sql)?;
    let statement = pairs
        .next()
        .ok_or_else(|| ParseError::Syntax("Empty input".to_string()))?;

    let mut select = None;
    let mut table = None;
    let mut clauses = Vec::new();

    for pair in statement.into_inner() {
        match pair.as_rule() {
            Rule::select_list => select = Some(parse_select_list(pair)?),
            Rule::table_ref => table = Some(parse_table_ref(pair)?),
            Rule::join_clause => clauses.push(Clause::Join(parse_join(pair)?)),
            Rule::where_clause => clauses.push(Clause::Where(parse_where(pair)?)),
            Rule::group_by_clause => {
                let keys = significant(pair)
                    .map(parse_col_ref)
                    .collect::<Result<Vec<_>, _>>()?;
                clauses.push(Clause::GroupBy(keys));
            }
            Rule::order_by_clause => clauses.push(Clause::OrderBy(parse_order_by(pair)?)),
            _ => {}
        }
    }

    let statement = ParsedStatement {
        select: select.ok_or_else(|| ParseError::Syntax("Missing select list".to_string()))?,
        table: table.ok_or_else(|| ParseError::Syntax("Missing table".to_string()))?,
        clauses,
    };
    tracing::trace!(statement = ?statement, "parsed statement");

    Ok(statement)
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_select
            | Rule::kw_from
            | Rule::kw_where
            | Rule::kw_group
            | Rule::kw_order
            | Rule::kw_by
            | Rule::kw_left
            | Rule::kw_outer
            | Rule::kw_inner
            | Rule::kw_join
            | Rule::kw_on
            | Rule::kw_as
            | Rule::kw_like
            | Rule::kw_asc
            | Rule::kw_desc
            | Rule::kw_avg
            | Rule::kw_sum
            | Rule::kw_count
    )
}

/// Inner pairs without keyword tokens
fn significant<'a>(pair: Pair<'a, Rule>) -> impl Iterator<Item = Pair<'a, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn expect_next<'a>(
    pairs: &mut impl Iterator<Item = Pair<'a, Rule>>,
    what: &str,
) -> Result<Pair<'a, Rule>, ParseError> {
    pairs
        .next()
        .ok_or_else(|| ParseError::Syntax(format!("Missing {}", what)))
}

fn parse_select_list(pair: Pair<Rule>) -> Result<SelectClause, ParseError> {
    let mut items = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::wildcard => return Ok(SelectClause::Wildcard),
            Rule::select_item => {
                let inner = expect_next(&mut item.into_inner(), "select item")?;
                let parsed = match inner.as_rule() {
                    Rule::aggregate => SelectItem::Aggregate(parse_aggregate(inner)?),
                    Rule::col_ref => SelectItem::Column(parse_col_ref(inner)?),
                    other => {
                        return Err(ParseError::Syntax(format!("Invalid select item: {:?}", other)))
                    }
                };
                items.push(parsed);
            }
            _ => {}
        }
    }

    Ok(SelectClause::Items { items })
}

fn parse_aggregate(pair: Pair<Rule>) -> Result<Aggregate, ParseError> {
    let mut inner = significant(pair);

    let func_pair = expect_next(&mut inner, "aggregate function")?;
    let func = match func_pair.into_inner().next().map(|p| p.as_rule()) {
        Some(Rule::kw_avg) => AggFunc::Avg,
        Some(Rule::kw_sum) => AggFunc::Sum,
        Some(Rule::kw_count) => AggFunc::Count,
        other => return Err(ParseError::Syntax(format!("Unknown aggregate: {:?}", other))),
    };

    let mut arg_inner = expect_next(&mut inner, "aggregate argument")?.into_inner();
    let arg_pair = expect_next(&mut arg_inner, "aggregate argument")?;
    let arg = match arg_pair.as_rule() {
        Rule::wildcard => AggArg::Wildcard,
        Rule::col_ref => AggArg::Column {
            col: parse_col_ref(arg_pair)?,
        },
        other => return Err(ParseError::Syntax(format!("Invalid aggregate argument: {:?}", other))),
    };

    let alias = expect_next(&mut inner, "aggregate alias")?.as_str().to_string();

    Ok(Aggregate { func, arg, alias })
}

fn parse_col_ref(pair: Pair<Rule>) -> Result<ColumnRef, ParseError> {
    let parts: Vec<_> = pair.into_inner().map(|p| p.as_str().to_string()).collect();

    match parts.as_slice() {
        [column] => Ok(ColumnRef::new(column.clone())),
        [table, column] => Ok(ColumnRef::qualified(table.clone(), column.clone())),
        _ => Err(ParseError::Syntax("Invalid column reference".to_string())),
    }
}

fn parse_table_ref(pair: Pair<Rule>) -> Result<TableRef, ParseError> {
    let mut inner = pair.into_inner();
    let name = expect_next(&mut inner, "table name")?.as_str().to_string();
    let alias = inner.next().map(|p| p.as_str().to_string());

    Ok(TableRef { name, alias })
}

fn parse_join(pair: Pair<Rule>) -> Result<JoinClause, ParseError> {
    let mut inner = significant(pair);

    let kind_pair = expect_next(&mut inner, "join kind")?;
    let kind = match kind_pair.into_inner().next().map(|p| p.as_rule()) {
        Some(Rule::left_join) => JoinKind::Left,
        Some(Rule::inner_join) => JoinKind::Inner,
        other => return Err(ParseError::Syntax(format!("Unknown join kind: {:?}", other))),
    };

    let table = parse_table_ref(expect_next(&mut inner, "joined table")?)?;
    let left = parse_col_ref(expect_next(&mut inner, "join key")?)?;
    let right = parse_col_ref(expect_next(&mut inner, "join key")?)?;

    Ok(JoinClause {
        kind,
        table,
        left,
        right,
    })
}

fn parse_where(pair: Pair<Rule>) -> Result<Condition, ParseError> {
    let mut inner = significant(pair);

    let column = parse_col_ref(expect_next(&mut inner, "filter column")?)?;

    let op = match expect_next(&mut inner, "comparison operator")?.as_str() {
        "=" => CompareOp::Eq,
        ">" => CompareOp::Gt,
        "<" => CompareOp::Lt,
        s if s.eq_ignore_ascii_case("like") => CompareOp::Like,
        other => return Err(ParseError::Syntax(format!("Unknown operator: {}", other))),
    };

    let value = parse_literal(expect_next(&mut inner, "literal")?)?;

    Ok(Condition { column, op, value })
}

fn parse_literal(pair: Pair<Rule>) -> Result<String, ParseError> {
    let inner = expect_next(&mut pair.into_inner(), "literal")?;
    match inner.as_rule() {
        Rule::number => Ok(inner.as_str().to_string()),
        Rule::string => {
            let text = inner
                .into_inner()
                .next()
                .map(|p| p.as_str())
                .unwrap_or_default();
            Ok(text.to_string())
        }
        other => Err(ParseError::Syntax(format!("Invalid literal: {:?}", other))),
    }
}

fn parse_order_by(pair: Pair<Rule>) -> Result<SortKey, ParseError> {
    let mut column = None;
    let mut desc = false;

    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::col_ref => column = Some(parse_col_ref(p)?),
            Rule::sort_dir => {
                desc = p.into_inner().any(|d| d.as_rule() == Rule::kw_desc);
            }
            _ => {}
        }
    }

    Ok(SortKey {
        column: column.ok_or_else(|| ParseError::Syntax("Missing sort column".to_string()))?,
        desc,
    })
}
