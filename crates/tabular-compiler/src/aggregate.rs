//! Aggregator fragment parsing (`<column>__<groupby|count|avg|min|max|sum>`).

use crate::error::CompileError;
use crate::fragment::column_and_operator;
use crate::policy::raise_if_not_index;
use std::collections::BTreeSet;

const AGGREGATOR_OPERATORS: [&str; 6] = ["avg", "count", "max", "min", "sum", "groupby"];

/// Parses an aggregator fragment into `(quoted_column, operator)`,
/// checking the column against the index policy along the way.
pub fn add_aggregator(
    argument: &str,
    indexes: Option<&BTreeSet<String>>,
) -> Result<(String, String), CompileError> {
    if !argument.contains("__") {
        return Err(CompileError::Malformed(format!(
            "argument '{argument}' could not be parsed"
        )));
    }
    let (column, operator) = column_and_operator(argument);
    raise_if_not_index(&column, indexes)?;
    if AGGREGATOR_OPERATORS.contains(&operator.as_str()) {
        Ok((column, operator))
    } else {
        Err(CompileError::Malformed(format!(
            "argument '{argument}' could not be parsed"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_operator_outside_catalogue() {
        let err = add_aggregator("a__bogus", None).unwrap_err();
        assert!(matches!(err, CompileError::Malformed(_)));
    }

    #[test]
    fn enforces_index_policy() {
        let mut idx = BTreeSet::new();
        idx.insert("a".to_string());
        let err = add_aggregator("b__count", Some(&idx)).unwrap_err();
        assert!(matches!(err, CompileError::ColumnNotAllowed { .. }));
        assert!(add_aggregator("a__count", Some(&idx)).is_ok());
    }
}
