//! Raw query-string handling shared by every data-bearing handler.
//!
//! Fragments are kept in their raw, undecoded form and original order
//! (`axum::extract::RawQuery` rather than `Query<T>`) because the
//! compiler's fragment parser needs the literal `&`-separated tokens,
//! the same way the distilled-from source splits `request.query_string`
//! on `&` without touching percent-encoding.

use crate::error::ApiError;
use serde_json::json;

/// Splits a raw query string on `&`, dropping empty fragments.
pub fn split_fragments(raw_query: &Option<String>) -> Vec<String> {
    match raw_query {
        Some(raw) if !raw.is_empty() => raw.split('&').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Reads `page`/`page_size` out of the fragment list, defaulting and
/// validating against the configured maximum (§6.3: requests with
/// `page_size > PAGE_SIZE_MAX` fail 400).
pub fn parse_pagination(
    fragments: &[String],
    default_page_size: u32,
    max_page_size: u32,
) -> Result<(u32, u32), ApiError> {
    let mut page: u32 = 1;
    let mut page_size: u32 = default_page_size;
    for fragment in fragments {
        if let Some(value) = fragment.strip_prefix("page_size=") {
            if let Ok(parsed) = value.parse() {
                page_size = parsed;
            }
        } else if let Some(value) = fragment.strip_prefix("page=") {
            if let Ok(parsed) = value.parse() {
                page = parsed;
            }
        }
    }
    if page_size > max_page_size {
        return Err(ApiError::new(
            400,
            "Invalid query string",
            json!("Page size exceeds allowed maximum"),
        ));
    }
    Ok((page, page_size))
}

/// Offset derived from a 1-indexed page number; page 1 has offset 0.
pub fn build_offset(page: u32, page_size: u32) -> u64 {
    if page > 1 {
        page_size as u64 * (page as u64 - 1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_page_one() {
        let (page, page_size) = parse_pagination(&[], 50, 1000).unwrap();
        assert_eq!((page, page_size), (1, 50));
    }

    #[test]
    fn reads_page_and_page_size() {
        let fragments = vec!["page=3".to_string(), "page_size=20".to_string()];
        let (page, page_size) = parse_pagination(&fragments, 50, 1000).unwrap();
        assert_eq!((page, page_size), (3, 20));
    }

    #[test]
    fn rejects_page_size_over_max() {
        let fragments = vec!["page_size=5000".to_string()];
        let err = parse_pagination(&fragments, 50, 1000).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn offset_is_zero_on_first_page() {
        assert_eq!(build_offset(1, 50), 0);
        assert_eq!(build_offset(3, 50), 100);
    }
}
