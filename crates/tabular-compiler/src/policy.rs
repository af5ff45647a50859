//! Index-policy enforcement shared by filter, sort, and aggregator
//! parsing (spec invariant: every column the compiler references must
//! be in the allowed set when one is configured).

use crate::error::CompileError;
use std::collections::BTreeSet;

/// `column_name` is the already-quoted form (`"c"`); `indexes` is
/// `None` when the resource carries no index-policy restriction.
pub fn raise_if_not_index(
    column_name: &str,
    indexes: Option<&BTreeSet<String>>,
) -> Result<(), CompileError> {
    let Some(indexes) = indexes else {
        return Ok(());
    };
    let bare = column_name
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(column_name);
    if !indexes.contains(bare) {
        let mut allowed: Vec<&str> = indexes.iter().map(String::as_str).collect();
        allowed.sort_unstable();
        return Err(CompileError::ColumnNotAllowed {
            column: bare.to_string(),
            allowed: format!("{{{}}}", allowed.join(", ")),
        });
    }
    Ok(())
}
