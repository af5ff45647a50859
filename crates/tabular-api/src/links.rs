//! Absolute pagination links (`core/url.py::build_link_with_page` and
//! `tabular/app.py::build_next_page`).

/// Rebuilds `path`'s query string with `page`/`page_size` replacing
/// any existing `page*` fragment, and prefixes it with the externally
/// visible base URL.
pub fn build_link_with_page(base_url: &str, path: &str, fragments: &[String], page: u32, page_size: u32) -> String {
    let mut rebuilt: Vec<String> = fragments
        .iter()
        .filter(|f| !f.starts_with("page"))
        .cloned()
        .collect();
    rebuilt.push(format!("page={page}"));
    rebuilt.push(format!("page_size={page_size}"));
    format!("{base_url}{path}?{}", rebuilt.join("&"))
}

/// `next` is present when the server plausibly has more rows: for
/// plain/filtered queries, the known `total` settles it exactly; for
/// aggregation queries `total` describes the base table and is
/// useless, so the heuristic "did this page come back full" is used
/// instead (`tabular/app.py::build_next_page`).
pub fn build_next_page(
    nb_results: usize,
    page_size: u32,
    offset: u64,
    total: Option<u64>,
    default_next: &str,
) -> Option<String> {
    match total {
        Some(total) => {
            if page_size as u64 + offset < total {
                Some(default_next.to_string())
            } else {
                None
            }
        }
        None => {
            if (nb_results as u32) < page_size {
                None
            } else {
                Some(default_next.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuilds_query_dropping_existing_page_fragments() {
        let fragments = vec!["a__exact=x".to_string(), "page=1".to_string(), "page_size=10".to_string()];
        let link = build_link_with_page("http://host", "/api/resources/r/data/", &fragments, 2, 10);
        assert_eq!(link, "http://host/api/resources/r/data/?a__exact=x&page=2&page_size=10");
    }

    #[test]
    fn next_present_when_total_exceeds_page() {
        let next = build_next_page(50, 50, 0, Some(120), "http://next");
        assert_eq!(next, Some("http://next".to_string()));
    }

    #[test]
    fn next_absent_when_total_exhausted() {
        let next = build_next_page(10, 50, 100, Some(110), "http://next");
        assert_eq!(next, None);
    }

    #[test]
    fn aggregation_next_uses_row_count_heuristic() {
        assert_eq!(build_next_page(50, 50, 0, None, "http://next"), Some("http://next".to_string()));
        assert_eq!(build_next_page(10, 50, 0, None, "http://next"), None);
    }
}
