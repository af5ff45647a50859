//! Executor (§4.3): issues the compiled query against PostgREST and
//! recovers the total row count from `Content-Range`.

use crate::error::ClientError;

const AGGREGATOR_CALLS: [&str; 5] = [".count()", ".max()", ".min()", ".sum()", ".avg()"];

#[derive(Clone)]
pub struct Executor {
    http: reqwest::Client,
    base_url: String,
}

impl Executor {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Runs `sql_query` against `parsing_table`, returning the parsed
    /// rows and the total match count — `None` when the query contains
    /// an aggregator, since PostgREST's count in that case describes
    /// the base table, not the aggregated result.
    pub async fn execute_paged(
        &self,
        parsing_table: &str,
        sql_query: &str,
    ) -> Result<(Vec<serde_json::Value>, Option<u64>), ClientError> {
        let url = format!("{}/{}?{}", self.base_url, parsing_table, sql_query);
        let response = self
            .http
            .get(&url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let status = response.status();
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<serde_json::Value> = response.json().await?;
        let skip_total = AGGREGATOR_CALLS.iter().any(|call| sql_query.contains(call));
        let total = if skip_total {
            None
        } else {
            content_range.as_deref().and_then(process_total)
        };
        Ok((rows, total))
    }
}

/// Parses the `T` out of a `Content-Range: a-b/T` header value.
pub fn process_total(content_range: &str) -> Option<u64> {
    content_range.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_range_total() {
        assert_eq!(process_total("0-49/128"), Some(128));
    }

    #[test]
    fn unknown_total_marker_is_none() {
        assert_eq!(process_total("0-49/*"), None);
    }

    #[test]
    fn detects_aggregator_calls() {
        let query = "select=\"a\",\"a__min\":\"a\".min()&limit=50";
        assert!(AGGREGATOR_CALLS.iter().any(|call| query.contains(call)));
    }
}
