//! Pure, I/O-free translation of the tabular filter/sort/aggregation DSL
//! into a PostgREST query string.
//!
//! [`compile`] is the single entry point; everything else in this crate
//! is an implementation detail of one DSL fragment kind (plain filter,
//! aggregator, or boolean group).

mod aggregate;
mod error;
mod fragment;
mod group;
mod policy;

pub use error::CompileError;

use aggregate::add_aggregator;
use fragment::add_filter;
use group::parse_operator;
use std::collections::BTreeSet;

/// Translates a flat list of `<column>__<operator>[=<value>]` style
/// query arguments (plus any `or=(...)` boolean groups) into a
/// PostgREST query string.
///
/// `resource_id` and `aggregation_allowed` gate aggregator usage: when
/// the request contains any aggregator and a `resource_id` is given,
/// the caller's `aggregation_allowed` flag must be `true` or the whole
/// request is rejected. `indexes` is the resource's index policy: when
/// set, every filter, sort, and aggregator column must be a member.
/// `page_size` of `None` or `Some(0)` omits the `limit=` clause, mirroring
/// the DSL's "falsy means unset" convention.
pub fn compile(
    request_args: &[&str],
    resource_id: Option<&str>,
    aggregation_allowed: bool,
    indexes: Option<&BTreeSet<String>>,
    page_size: Option<u64>,
    offset: u64,
) -> Result<String, CompileError> {
    let mut sql_query: Vec<String> = Vec::new();
    let mut aggregators: Vec<(String, Vec<String>)> = Vec::new();
    let mut sorted = false;

    for arg in request_args {
        if arg.starts_with("or=(") {
            sql_query.push(parse_operator(arg, "or", true, indexes)?);
            continue;
        }
        let split: Vec<&str> = arg.split('=').collect();
        match split.len() {
            2 => {
                let (filter, sets_order) = add_filter(split[0], Some(split[1]), false, indexes)?;
                if let Some(filter) = filter {
                    sorted = sorted || sets_order;
                    sql_query.push(filter);
                }
            }
            1 => {
                let parts: Vec<&str> = split[0].split("__").collect();
                let is_null_filter = parts
                    .get(1)
                    .map(|op| *op == "isnull" || *op == "isnotnull")
                    .unwrap_or(false);
                if is_null_filter {
                    let (filter, _) = add_filter(split[0], None, false, indexes)?;
                    if let Some(filter) = filter {
                        sql_query.push(filter);
                    }
                } else {
                    let (column, operator) = add_aggregator(split[0], indexes)?;
                    match aggregators.iter_mut().find(|(op, _)| op == &operator) {
                        Some((_, columns)) => columns.push(column),
                        None => aggregators.push((operator, vec![column])),
                    }
                }
            }
            _ => {
                return Err(CompileError::Malformed(arg.to_string()));
            }
        }
    }

    if !aggregators.is_empty() {
        if let Some(resource_id) = resource_id {
            if !aggregation_allowed {
                let operators = aggregators
                    .iter()
                    .map(|(op, _)| op.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                return Err(CompileError::AggregationNotAllowed {
                    resource_id: resource_id.to_string(),
                    operators,
                });
            }
        }
        let mut agg_query = String::from("select=");
        for (operator, columns) in &aggregators {
            if operator == "groupby" {
                agg_query.push_str(&columns.join(","));
                agg_query.push(',');
            } else {
                for column in columns {
                    let bare = &column[1..column.len() - 1];
                    agg_query.push_str(&format!("\"{bare}__{operator}\":{column}.{operator}(),"));
                }
            }
        }
        agg_query.pop();
        sql_query.push(agg_query);
    }

    if let Some(page_size) = page_size {
        if page_size != 0 {
            sql_query.push(format!("limit={page_size}"));
        }
    }
    if offset >= 1 {
        sql_query.push(format!("offset={offset}"));
    }
    if !sorted && aggregators.is_empty() {
        sql_query.push("order=__id.asc".to_string());
    }

    let query = sql_query.join("&");
    if query.matches("select=").count() > 1 {
        return Err(CompileError::ColumnsWithAggregators);
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_only_fragment() {
        let query = compile(&["column_name__sort=asc"], None, false, None, Some(50), 0).unwrap();
        assert_eq!(query, "order=\"column_name\".asc&limit=50");
    }

    #[test]
    fn exact_filter_gets_default_order() {
        let query =
            compile(&["column_name__exact=BIDULE"], None, false, None, Some(50), 0).unwrap();
        assert_eq!(query, "\"column_name\"=eq.BIDULE&limit=50&order=__id.asc");
    }

    #[test]
    fn greater_filter_with_offset() {
        let query =
            compile(&["column_name__greater=12"], None, false, None, Some(50), 12).unwrap();
        assert_eq!(
            query,
            "\"column_name\"=gte.12&limit=50&offset=12&order=__id.asc"
        );
    }

    #[test]
    fn or_group_compiles() {
        let query = compile(
            &["or=(a__exact.BIDULE,b__less.12)"],
            None,
            false,
            None,
            None,
            0,
        )
        .unwrap();
        assert!(query.contains("or=(\"a\".eq.BIDULE,\"b\".lte.12)"));
    }

    #[test]
    fn aggregation_rejected_when_not_allowed() {
        let err = compile(
            &["a__groupby", "a__min", "a__avg"],
            Some("my-resource"),
            false,
            None,
            Some(50),
            0,
        )
        .unwrap_err();
        match err {
            CompileError::AggregationNotAllowed {
                resource_id,
                operators,
            } => {
                assert_eq!(resource_id, "my-resource");
                assert_eq!(operators, "groupby,min,avg");
            }
            other => panic!("expected AggregationNotAllowed, got {other:?}"),
        }
    }

    #[test]
    fn aggregation_accepted_when_allowed() {
        let query = compile(
            &["a__groupby", "a__min", "a__avg"],
            Some("my-resource"),
            true,
            None,
            Some(50),
            0,
        )
        .unwrap();
        assert_eq!(
            query,
            "select=\"a\",\"a__min\":\"a\".min(),\"a__avg\":\"a\".avg()&limit=50"
        );
    }

    #[test]
    fn columns_with_aggregators_rejected() {
        let err = compile(
            &["columns=a,b", "a__min"],
            Some("my-resource"),
            true,
            None,
            Some(50),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::ColumnsWithAggregators));
    }

    #[test]
    fn isnull_is_a_filter_not_an_aggregator() {
        let query = compile(&["column_name__isnull"], None, false, None, Some(50), 0).unwrap();
        assert_eq!(query, "\"column_name\"=is.null&limit=50&order=__id.asc");
    }

    #[test]
    fn index_policy_blocks_disallowed_column() {
        let mut idx = BTreeSet::new();
        idx.insert("column_name".to_string());
        let err = compile(&["other__exact=x"], None, false, Some(&idx), Some(50), 0).unwrap_err();
        assert!(matches!(err, CompileError::ColumnNotAllowed { .. }));
    }
}
