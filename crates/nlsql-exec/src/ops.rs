//! Pipeline stages over row vectors

use nlsql_ir::{
    AggArg, AggFunc, ColumnRef, CompareOp, Condition, JoinClause, JoinKind, Row, SelectClause,
    SelectItem, SortKey, Value,
};
use std::collections::HashMap;

/// Nested-loop join of `left` (bound to `left_binding`) with `right`.
///
/// Keys are read by bare column name from each side before merging.
pub(crate) fn join(left: Vec<Row>, left_binding: &str, right: &[Row], clause: &JoinClause) -> Vec<Row> {
    let right_binding = clause.table.binding();

    // ON sides may be written in either order
    let (left_key, right_key) = match (&clause.left.table, &clause.right.table) {
        (Some(a), Some(b)) if a == right_binding && b == left_binding => (&clause.right, &clause.left),
        _ => (&clause.left, &clause.right),
    };

    let mut joined = Vec::with_capacity(left.len());
    for row in left {
        let mut matched = false;
        if let Some(key) = row.resolve(left_key).cloned() {
            for other in right {
                if other.resolve(right_key).is_some_and(|v| join_eq(&key, v)) {
                    let mut merged = row.clone();
                    merged.merge(other);
                    joined.push(merged);
                    matched = true;
                }
            }
        }

        if !matched && clause.kind == JoinKind::Left {
            joined.push(row);
        }
    }
    joined
}

fn join_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::String(s), n) | (n, Value::String(s)) => n.loose_eq(s),
        (x, y) => x.as_f64() == y.as_f64(),
    }
}

/// Evaluate a single WHERE condition against a row
pub(crate) fn matches(row: &Row, condition: &Condition) -> bool {
    let Some(cell) = row.resolve(&condition.column) else {
        return false;
    };

    match condition.op {
        CompareOp::Eq => cell.loose_eq(&condition.value),
        CompareOp::Gt | CompareOp::Lt => {
            let literal = Value::from(condition.value.as_str()).as_f64();
            match (cell.as_f64(), literal) {
                (Some(a), Some(b)) if condition.op == CompareOp::Gt => a > b,
                (Some(a), Some(b)) => a < b,
                _ => false,
            }
        }
        CompareOp::Like => {
            if !cell.is_truthy() {
                return false;
            }
            let needle = condition.value.replace(['%', '\''], "").to_lowercase();
            cell.to_string().to_lowercase().contains(&needle)
        }
    }
}

/// Bucket rows by the grouping key, keeping first-appearance order.
///
/// Keys use bare column names, so `c.id` after a join groups on the merged
/// `id`. Each bucket collapses to its first row; a COUNT aggregate in the
/// select list is filled in with the bucket size.
pub(crate) fn group(rows: Vec<Row>, keys: &[ColumnRef], select: &SelectClause) -> Vec<Row> {
    let mut order: Vec<(Row, i64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let key = keys
            .iter()
            .map(|k| row.resolve(k).map(Value::to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("|");

        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key, order.len());
                order.push((row, 1));
            }
        }
    }

    let count = select.aggregate_of(AggFunc::Count);
    order
        .into_iter()
        .map(|(mut row, size)| {
            if let Some(agg) = count {
                row.insert(agg.alias.clone(), Value::Int(size));
            }
            row
        })
        .collect()
}

/// Apply the select list.
///
/// An aggregate (AVG, then SUM, then COUNT) collapses the whole input into one
/// row holding only its alias, grouped or not. Otherwise each row keeps the
/// requested columns it has, keyed by bare column name.
pub(crate) fn project(rows: Vec<Row>, select: &SelectClause) -> Vec<Row> {
    let columns = match select {
        SelectClause::Wildcard => return rows,
        SelectClause::Items { items } => items,
    };

    let aggregate = [AggFunc::Avg, AggFunc::Sum, AggFunc::Count]
        .into_iter()
        .find_map(|func| select.aggregate_of(func));
    if let Some(agg) = aggregate {
        let value = match agg.func {
            AggFunc::Count => Value::Int(rows.len() as i64),
            AggFunc::Sum => Value::Float(numeric_values(&rows, &agg.arg).sum()),
            AggFunc::Avg => {
                let total: f64 = numeric_values(&rows, &agg.arg).sum();
                Value::Float(total / rows.len() as f64)
            }
        };
        return vec![Row::from_pairs([(agg.alias.clone(), value)])];
    }

    rows.iter()
        .map(|row| {
            let mut out = Row::new();
            for item in columns {
                if let SelectItem::Column(col) = item {
                    if let Some(value) = row.resolve(col) {
                        out.insert(col.column.clone(), value.clone());
                    }
                }
            }
            out
        })
        .collect()
}

fn numeric_values<'a>(rows: &'a [Row], arg: &'a AggArg) -> impl Iterator<Item = f64> + 'a {
    rows.iter().map(move |row| match arg {
        AggArg::Wildcard => 0.0,
        AggArg::Column { col } => row
            .resolve(col)
            .and_then(Value::as_f64)
            .filter(|v| !v.is_nan())
            .unwrap_or(0.0),
    })
}

/// Stable single-key sort
pub(crate) fn sort(rows: &mut [Row], key: &SortKey) {
    rows.sort_by(|a, b| {
        let x = a.resolve(&key.column).unwrap_or(&Value::Null);
        let y = b.resolve(&key.column).unwrap_or(&Value::Null);
        let ordering = x.sort_cmp(y);
        if key.desc {
            ordering.reverse()
        } else {
            ordering
        }
    });
}
