//! Boolean `or(...)`/`and(...)` group parsing.
//!
//! Groups nest arbitrarily; content is split on top-level commas
//! (commas inside a nested group's parentheses don't count), and each
//! item is either a recursive group or a dotted filter `col.op.val`
//! where either side may be double-quoted if it contains a literal
//! dot.

use crate::error::CompileError;
use crate::fragment::add_filter;
use std::collections::BTreeSet;

/// Split `s` on commas that are not inside parentheses.
pub fn split_top_level(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Matches `^"[^"]*"__[a-z]+` and returns the matched prefix.
fn match_column_operator_prefix(s: &str) -> Option<&str> {
    if !s.starts_with('"') {
        return None;
    }
    let rest = &s[1..];
    let end_quote = rest.find('"')?;
    let after_quote = &rest[end_quote + 1..];
    let after_sep = after_quote.strip_prefix("__")?;
    let op_len = after_sep
        .chars()
        .take_while(|c| c.is_ascii_lowercase())
        .count();
    if op_len == 0 {
        return None;
    }
    let match_len = 1 + end_quote + 1 + 2 + op_len;
    Some(&s[..match_len])
}

/// Matches `\."[^"]*"$` and returns the matched suffix (leading dot
/// included).
fn match_value_suffix(s: &str) -> Option<&str> {
    if !s.ends_with('"') || s.len() < 2 {
        return None;
    }
    let without_last = &s[..s.len() - 1];
    let start_quote = without_last.rfind('"')?;
    if start_quote == 0 {
        return None;
    }
    if &s[start_quote - 1..start_quote] != "." {
        return None;
    }
    Some(&s[start_quote - 1..])
}

/// Splits one boolean-group item into `(argument, value)`, handling
/// the four quoting combinations: `col.op.val`, `"col.umn".op.val`,
/// `col.op."val.ue"`, `"col.umn".op."val.ue"`.
pub fn find_arg_val(param: &str) -> Result<(String, String), CompileError> {
    let quote_count = param.matches('"').count();
    if ![0, 2, 4].contains(&quote_count) {
        return Err(CompileError::Malformed(format!(
            "argument '{param}' could not be parsed"
        )));
    }
    if quote_count == 0 {
        let parts: Vec<&str> = param.split('.').collect();
        if parts.len() != 2 {
            return Err(CompileError::Malformed(format!(
                "argument '{param}' could not be parsed"
            )));
        }
        return Ok((parts[0].to_string(), parts[1].to_string()));
    }
    if quote_count == 4 {
        let col_op = match_column_operator_prefix(param);
        let val = match_value_suffix(param);
        return match (col_op, val) {
            (Some(co), Some(v)) => Ok((co.replace('"', ""), v[1..].to_string())),
            _ => Err(CompileError::Malformed(format!(
                "argument '{param}' could not be parsed"
            ))),
        };
    }
    // quote_count == 2
    let col_op = match_column_operator_prefix(param);
    let val = match_value_suffix(param);
    match col_op {
        None => {
            let val = val.ok_or_else(|| {
                CompileError::Malformed(format!("argument '{param}' could not be parsed"))
            })?;
            let first_dot = param
                .find('.')
                .ok_or_else(|| CompileError::Malformed(format!("argument '{param}' could not be parsed")))?;
            Ok((param[..first_dot].to_string(), val[1..].to_string()))
        }
        Some(co) => {
            let last_dot = param.rfind('.').ok_or_else(|| {
                CompileError::Malformed(format!("argument '{param}' could not be parsed"))
            })?;
            Ok((co.replace('"', ""), param[last_dot + 1..].to_string()))
        }
    }
}

/// Recursively emits a boolean group (`or(...)`/`and(...)`), given its
/// full text including the leading `operator(` or (for the top-level
/// group) `operator=(`.
pub fn parse_operator(
    query: &str,
    operator: &str,
    top_level: bool,
    indexes: Option<&BTreeSet<String>>,
) -> Result<String, CompileError> {
    if !query.ends_with(')') {
        return Err(CompileError::Malformed(format!(
            "argument '{query}' could not be parsed"
        )));
    }
    let prefix = if top_level {
        format!("{operator}=(")
    } else {
        format!("{operator}(")
    };
    if !query.starts_with(&prefix) {
        return Err(CompileError::Malformed(format!(
            "argument '{query}' could not be parsed"
        )));
    }
    let inner = &query[prefix.len()..query.len() - 1];
    let params = split_top_level(inner);
    let mut emitted = Vec::with_capacity(params.len());
    for param in params {
        if param.starts_with("and(") || param.starts_with("or(") {
            let nested_operator = param.split('(').next().unwrap_or("");
            emitted.push(parse_operator(&param, nested_operator, false, indexes)?);
        } else if param.ends_with("__isnull") || param.ends_with("__isnotnull") {
            let cleaned = param.replace('"', "");
            let (filter, _) = add_filter(&cleaned, None, true, indexes)?;
            emitted.push(filter.ok_or_else(|| {
                CompileError::Malformed(format!("argument '{param}' could not be parsed"))
            })?);
        } else {
            let (argument, value) = find_arg_val(&param)?;
            let (filter, _) = add_filter(&argument, Some(&value), true, indexes)?;
            emitted.push(filter.ok_or_else(|| {
                CompileError::Malformed(format!("argument '{param}' could not be parsed"))
            })?);
        }
    }
    let joined = emitted.join(",");
    if top_level {
        Ok(format!("{operator}=({joined})"))
    } else {
        Ok(format!("{operator}({joined})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_top_level_commas_only() {
        let parts = split_top_level("a.eq.1,and(b.eq.2,c.eq.3)");
        assert_eq!(parts, vec!["a.eq.1", "and(b.eq.2,c.eq.3)"]);
    }

    #[test]
    fn find_arg_val_plain() {
        let (col, val) = find_arg_val("a__exact.BIDULE").unwrap();
        assert_eq!(col, "a__exact");
        assert_eq!(val, "BIDULE");
    }

    #[test]
    fn find_arg_val_quoted_value() {
        let (col, val) = find_arg_val("a__exact.\"val.ue\"").unwrap();
        assert_eq!(col, "a__exact");
        assert_eq!(val, "\"val.ue\"");
    }

    #[test]
    fn find_arg_val_quoted_column() {
        let (col, val) = find_arg_val("\"col.umn\"__exact.val").unwrap();
        assert_eq!(col, "col.umn__exact");
        assert_eq!(val, "val");
    }

    #[test]
    fn simple_or_group() {
        let emitted =
            parse_operator("or=(a__exact.BIDULE,b__less.12)", "or", true, None).unwrap();
        assert_eq!(emitted, "or=(\"a\".eq.BIDULE,\"b\".lte.12)");
    }

    #[test]
    fn or_group_honors_index_policy() {
        let mut idx = BTreeSet::new();
        idx.insert("a".to_string());
        let err =
            parse_operator("or=(a__exact.BIDULE,b__less.12)", "or", true, Some(&idx)).unwrap_err();
        assert!(matches!(err, CompileError::ColumnNotAllowed { .. }));
    }
}
