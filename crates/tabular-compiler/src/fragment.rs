//! Single-fragment parsing: `<column>__<operator>[=<value>]`.

use crate::error::CompileError;
use crate::policy::raise_if_not_index;
use std::collections::BTreeSet;

/// Splits `argument` on the *last* `__`, quoting and escaping the
/// column part. Everything before the last `__` is the column name
/// (any inner `__` is preserved); the suffix is the lower-cased
/// operator.
pub fn column_and_operator(argument: &str) -> (String, String) {
    let parts: Vec<&str> = argument.split("__").collect();
    let operator = parts.last().copied().unwrap_or("").to_lowercase();
    let column_parts = &parts[..parts.len().saturating_sub(1)];
    let raw_column = column_parts.join("__");
    let escaped = raw_column.replace('"', "\\\"");
    (format!("\"{escaped}\""), operator)
}

/// Translate one filter/sort fragment into its PostgREST form.
///
/// `in_operator` selects the dotted encapsulated form (`"c".eq.V`)
/// used inside boolean groups, versus the top-level `"c"=eq.V` form.
/// `indexes` enforces the index policy on the referenced column — every
/// filter or sort the compiler emits must reference an allowed column
/// when a policy is configured. Returns `(emitted_fragment,
/// sets_explicit_order)`; `page`/`page_size` fragments are consumed
/// silently and emit nothing.
pub fn add_filter(
    argument: &str,
    value: Option<&str>,
    in_operator: bool,
    indexes: Option<&BTreeSet<String>>,
) -> Result<(Option<String>, bool), CompileError> {
    if argument == "page" || argument == "page_size" {
        if in_operator {
            return Err(CompileError::Malformed(format!(
                "Argument `{argument}` can't be set within an operator"
            )));
        }
        return Ok((None, false));
    }
    if argument == "columns" {
        if in_operator {
            return Err(CompileError::Malformed(format!(
                "Argument `{argument}` can't be set within an operator"
            )));
        }
        let value = value.unwrap_or("");
        return Ok((Some(format!("select={value}")), false));
    }
    if argument.contains("__") {
        let (column, comparator) = column_and_operator(argument);
        raise_if_not_index(&column, indexes)?;
        let op = if in_operator { "." } else { "=" };
        let value = value.unwrap_or("");
        let emitted = match comparator.as_str() {
            "sort" => {
                if in_operator {
                    return Err(CompileError::Malformed(format!(
                        "Argument `{argument}` can't be set within an operator"
                    )));
                }
                return Ok((Some(format!("order={column}.{value}")), true));
            }
            "exact" => format!("{column}{op}eq.{value}"),
            "differs" => format!("{column}{op}isdistinct.{value}"),
            "isnull" => format!("{column}{op}is.null"),
            "isnotnull" => format!("{column}{op}not.is.null"),
            "contains" => format!("{column}{op}ilike.*{value}*"),
            "notcontains" => format!("{column}{op}not.ilike.*{value}*"),
            "in" => format!("{column}{op}in.({value})"),
            "notin" => format!("{column}{op}not.in.({value})"),
            "less" => format!("{column}{op}lte.{value}"),
            "greater" => format!("{column}{op}gte.{value}"),
            "strictly_less" => format!("{column}{op}lt.{value}"),
            "strictly_greater" => format!("{column}{op}gt.{value}"),
            _ => {
                return Err(CompileError::Malformed(format!(
                    "argument '{argument}={value}' could not be parsed"
                )))
            }
        };
        return Ok((Some(emitted), false));
    }
    Err(CompileError::Malformed(format!(
        "argument '{argument}={}' could not be parsed",
        value.unwrap_or("")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_preserves_inner_double_underscore() {
        let (column, op) = column_and_operator("a__b__exact");
        assert_eq!(column, "\"a__b\"");
        assert_eq!(op, "exact");
    }

    #[test]
    fn escapes_embedded_quotes() {
        let (column, _) = column_and_operator("weird\"col__exact");
        assert_eq!(column, "\"weird\\\"col\"");
    }

    #[test]
    fn exact_filter_emits_eq() {
        let (filter, sets_order) =
            add_filter("column_name__exact", Some("BIDULE"), false, None).unwrap();
        assert_eq!(filter.unwrap(), "\"column_name\"=eq.BIDULE");
        assert!(!sets_order);
    }

    #[test]
    fn sort_is_in_operator_rejected() {
        let err = add_filter("column_name__sort", Some("asc"), true, None).unwrap_err();
        assert!(matches!(err, CompileError::Malformed(_)));
    }

    #[test]
    fn filter_honors_index_policy() {
        let mut idx = BTreeSet::new();
        idx.insert("column_name".to_string());
        assert!(add_filter("column_name__exact", Some("x"), false, Some(&idx)).is_ok());
        let err = add_filter("other__exact", Some("x"), false, Some(&idx)).unwrap_err();
        assert!(matches!(err, CompileError::ColumnNotAllowed { .. }));
    }
}
